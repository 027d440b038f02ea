//! Checkout view models: the checkout plan, price breakdown and the
//! response bodies assembled for transaction endpoints.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{
    listing::ListingSummary,
    message::ConversationEntry,
    payu::PayuCheckoutForm,
    person::PersonSummary,
    shipping_address::ShippingAddressResponse,
    transaction::{PaymentProcess, TransactionResponse},
};

/// Next step of the checkout flow for a listing.
///
/// `FreeMessage` is handled in-process; the remaining steps are
/// redirect targets for flows that live outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    FreeMessage,
    Book,
    InitiateOrder,
    PreauthorizePayment,
    PostPay,
}

/// Price breakdown shown alongside a checkout or transaction.
///
/// # JSON Example
///
/// ```json
/// {
///   "unit_price_cents": 150000,
///   "quantity": 2,
///   "booking": false,
///   "subtotal_cents": 300000,
///   "shipping_price_cents": 5000,
///   "total_cents": 305000,
///   "total_label": "price"
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PriceBreakDown {
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub booking: bool,
    pub start_on: Option<NaiveDate>,
    pub end_on: Option<NaiveDate>,
    /// Booked days for day-unit listings
    pub duration: Option<i64>,
    /// Present when quantity > 1, the checkout is a booking, or a
    /// shipping price exists
    pub subtotal_cents: Option<i64>,
    pub shipping_price_cents: i64,
    pub total_cents: i64,
    /// "total" for preauthorized checkout, "price" otherwise
    pub total_label: &'static str,
}

impl PriceBreakDown {
    /// Build a breakdown, or `None` for free checkout on an unpriced
    /// listing.
    pub fn build(
        process: PaymentProcess,
        unit_price_cents: i64,
        shipping_price_cents: Option<i64>,
        quantity: i32,
        booking_range: Option<(NaiveDate, NaiveDate)>,
    ) -> Option<PriceBreakDown> {
        if process == PaymentProcess::None && unit_price_cents == 0 {
            return None;
        }

        let booking = booking_range.is_some();
        let duration = booking_range.map(|(start, end)| (end - start).num_days());
        let shipping = shipping_price_cents.unwrap_or(0);
        let subtotal = unit_price_cents * i64::from(quantity);
        let show_subtotal = booking || quantity > 1 || shipping_price_cents.is_some();

        Some(PriceBreakDown {
            unit_price_cents,
            quantity,
            booking,
            start_on: booking_range.map(|(start, _)| start),
            end_on: booking_range.map(|(_, end)| end),
            duration,
            subtotal_cents: show_subtotal.then_some(subtotal),
            shipping_price_cents: shipping,
            total_cents: subtotal + shipping,
            total_label: if process == PaymentProcess::Preauthorize {
                "total"
            } else {
                "price"
            },
        })
    }
}

/// Response for `GET /api/v1/listings/{id}/checkout`.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub step: CheckoutStep,
    /// Redirect target for steps handled outside this service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    pub listing: ListingSummary,
    pub author: PersonSummary,
    pub quantity: i32,
    pub booking_start: Option<NaiveDate>,
    pub booking_end: Option<NaiveDate>,
    /// Whether the client should show the payment button
    /// ('selling'/'renting-out' shapes only)
    pub payment_button: bool,
    /// Phone number prefilled from the viewer's profile
    pub phone_number: Option<String>,
    /// Latest address on file for the viewer, for form prefill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddressResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_break_down: Option<PriceBreakDown>,
}

/// Response for `POST /api/v1/transactions`.
///
/// Free checkout carries a notice and a redirect to the new
/// transaction; gateway checkout carries the PayU form payload instead.
#[derive(Debug, Serialize)]
pub struct CreateTransactionResponse {
    pub transaction: TransactionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payu_form: Option<PayuCheckoutForm>,
}

/// Response for `GET /api/v1/transactions/{id}`.
#[derive(Debug, Serialize)]
pub struct ShowTransactionResponse {
    pub transaction: TransactionResponse,
    pub listing: ListingSummary,
    /// "participant" or "admin"
    pub role: &'static str,
    pub is_author: bool,
    /// Whether the seller should be offered the pickup-address form
    pub address_button: bool,
    pub other_party: PersonSummary,
    /// Conversation messages and order-status transitions, merged
    /// chronologically (newest first)
    pub entries: Vec<ConversationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_break_down: Option<PriceBreakDown>,
}

/// Response for `GET /api/v1/transactions/{id}/pickup`.
#[derive(Debug, Serialize)]
pub struct PickupResponse {
    pub transaction: TransactionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<ShippingAddressResponse>,
    pub phone_number: Option<String>,
}

/// Notice-and-redirect body used where the original flow ended in a
/// flash message.
#[derive(Debug, Serialize)]
pub struct NoticeResponse {
    pub notice: String,
    pub redirect: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_unpriced_checkout_has_no_breakdown() {
        assert_eq!(
            PriceBreakDown::build(PaymentProcess::None, 0, None, 1, None),
            None
        );
    }

    #[test]
    fn single_unit_without_shipping_hides_subtotal() {
        let breakdown =
            PriceBreakDown::build(PaymentProcess::Preauthorize, 150_000, None, 1, None).unwrap();
        assert_eq!(breakdown.subtotal_cents, None);
        assert_eq!(breakdown.total_cents, 150_000);
        assert_eq!(breakdown.total_label, "total");
    }

    #[test]
    fn quantity_and_shipping_produce_subtotal() {
        let breakdown =
            PriceBreakDown::build(PaymentProcess::Postpay, 150_000, Some(5_000), 2, None).unwrap();
        assert_eq!(breakdown.subtotal_cents, Some(300_000));
        assert_eq!(breakdown.total_cents, 305_000);
        assert_eq!(breakdown.total_label, "price");
    }

    #[test]
    fn booking_breakdown_carries_duration() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 13).unwrap();
        let breakdown = PriceBreakDown::build(
            PaymentProcess::Preauthorize,
            80_000,
            None,
            3,
            Some((start, end)),
        )
        .unwrap();
        assert!(breakdown.booking);
        assert_eq!(breakdown.duration, Some(3));
        assert_eq!(breakdown.subtotal_cents, Some(240_000));
        assert_eq!(breakdown.total_cents, 240_000);
    }
}
