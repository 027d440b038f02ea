//! Transaction data models and the order-status lifecycle.
//!
//! This module defines:
//! - `Transaction`: Database entity representing a marketplace order
//! - `OrderStatus` / `OrderEvent`: the one-way order lifecycle
//! - Request types for creating transactions
//! - `TransactionResponse`: Response body returned to clients

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment process attached to a listing.
///
/// - `None`: free, message-only transactions
/// - `Preauthorize`: payment is authorized up front
/// - `Postpay`: payment is settled after the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "payment_process", rename_all = "snake_case")]
pub enum PaymentProcess {
    None,
    Preauthorize,
    Postpay,
}

/// Payment gateway the marketplace is configured with.
///
/// Only PayU checkout is handled in-process; PayPal and Braintree
/// appear as redirect targets in the checkout plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentGateway {
    None,
    Payu,
    Paypal,
    Braintree,
}

impl PaymentGateway {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "payu" => Some(Self::Payu),
            "paypal" => Some(Self::Paypal),
            "braintree" => Some(Self::Braintree),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Payu => "payu",
            Self::Paypal => "paypal",
            Self::Braintree => "braintree",
        }
    }
}

/// Order status of a transaction.
///
/// # Lifecycle
///
/// ```text
/// pending            -> payment_successful | payment_failure
/// payment_successful -> order_accepted | cancelled_by_seller
/// ```
///
/// `payment_failure`, `order_accepted` and `cancelled_by_seller` are
/// terminal. There is no rollback edge anywhere in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PaymentSuccessful,
    PaymentFailure,
    OrderAccepted,
    CancelledBySeller,
}

/// Events that drive the order lifecycle.
///
/// Payment events come from the gateway callback; seller events come
/// from the seller accepting (sharing a pickup address) or declining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    PaymentSucceeded,
    PaymentFailed,
    SellerAccepted,
    SellerDeclined,
}

impl OrderStatus {
    /// Next status for `event`, or `None` when the event has no edge
    /// from the current status.
    ///
    /// Every applied transition is paired with exactly one system
    /// message; callers reject events that return `None` without
    /// mutating anything.
    pub fn apply(self, event: OrderEvent) -> Option<OrderStatus> {
        match (self, event) {
            (OrderStatus::Pending, OrderEvent::PaymentSucceeded) => {
                Some(OrderStatus::PaymentSuccessful)
            }
            (OrderStatus::Pending, OrderEvent::PaymentFailed) => Some(OrderStatus::PaymentFailure),
            (OrderStatus::PaymentSuccessful, OrderEvent::SellerAccepted) => {
                Some(OrderStatus::OrderAccepted)
            }
            (OrderStatus::PaymentSuccessful, OrderEvent::SellerDeclined) => {
                Some(OrderStatus::CancelledBySeller)
            }
            _ => None,
        }
    }

    /// Statuses with no outgoing edges.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::PaymentFailure
                | OrderStatus::OrderAccepted
                | OrderStatus::CancelledBySeller
        )
    }
}

/// Represents a transaction record from the database.
///
/// # Database Table
///
/// Maps to the `transactions` table. Each transaction:
/// - References the listing and both participants
/// - Denormalizes the listing title and prices at creation time
/// - Owns one conversation for the message log
/// - Tracks its order status through the one-way lifecycle above
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    /// Unique identifier for this transaction
    pub id: Uuid,

    /// Listing the transaction was started from
    pub listing_id: Uuid,

    /// Listing title at the time the transaction was created
    pub listing_title: String,

    /// Person who started the transaction (the buyer)
    pub starter_id: Uuid,

    /// Author of the listing (the seller)
    pub listing_author_id: Uuid,

    /// Conversation holding buyer/seller and system messages
    pub conversation_id: Uuid,

    /// Unit price in cents at creation time
    pub unit_price_cents: i64,

    /// Shipping price in cents at creation time, if any
    pub shipping_price_cents: Option<i64>,

    /// Number of units, or booked days for day-unit listings
    pub listing_quantity: i32,

    /// Payment process copied from the listing
    pub payment_process: PaymentProcess,

    /// Gateway in effect when the transaction was created
    pub payment_gateway: String,

    /// Current order status
    pub order_status: OrderStatus,

    /// Booking range for day-unit listings
    pub booking_start: Option<NaiveDate>,
    pub booking_end: Option<NaiveDate>,

    /// When each participant last opened the transaction
    pub last_seen_by_starter_at: Option<DateTime<Utc>>,
    pub last_seen_by_author_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether `person_id` is the buyer or the seller on this order.
    pub fn is_participant(&self, person_id: Uuid) -> bool {
        self.starter_id == person_id || self.listing_author_id == person_id
    }

    /// Order total in cents: unit price times quantity plus shipping.
    pub fn total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.listing_quantity)
            + self.shipping_price_cents.unwrap_or(0)
    }
}

/// Request to create a transaction from a listing.
///
/// # JSON Example
///
/// ```json
/// {
///   "listing_id": "550e8400-e29b-41d4-a716-446655440000",
///   "message": "Is this still available?",
///   "quantity": 1,
///   "name": "Asha",
///   "phone_number": "9811001100",
///   "address1": "12 Lake View Road",
///   "city": "Pune",
///   "state": "Maharashtra",
///   "pincode": "411001"
/// }
/// ```
///
/// # Validation
///
/// - `message` is mandatory for free (process `none`) listings
/// - `quantity` must be at least 1 (defaults to 1)
/// - `start_on`/`end_on` must come as a pair with `end_on` after
///   `start_on`; the day span then overrides `quantity`
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Listing to start the transaction from
    pub listing_id: Uuid,

    /// Initial message from the buyer
    pub message: Option<String>,

    /// Number of units
    #[serde(default = "default_quantity")]
    pub quantity: i32,

    /// Booking range for day-unit listings (ISO dates)
    pub start_on: Option<NaiveDate>,
    pub end_on: Option<NaiveDate>,

    /// Contact and address fields forwarded to the gateway checkout
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
}

fn default_quantity() -> i32 {
    1
}

/// Response returned for transaction reads.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub listing_title: String,
    pub starter_id: Uuid,
    pub listing_author_id: Uuid,
    pub conversation_id: Uuid,
    pub unit_price_cents: i64,
    pub shipping_price_cents: Option<i64>,
    pub listing_quantity: i32,
    pub payment_process: PaymentProcess,
    pub payment_gateway: String,
    pub order_status: OrderStatus,
    pub booking_start: Option<NaiveDate>,
    pub booking_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Convert database Transaction to API TransactionResponse.
///
/// Drops the per-participant seen timestamps, which only feed the
/// unread-state bookkeeping.
impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            listing_id: transaction.listing_id,
            listing_title: transaction.listing_title,
            starter_id: transaction.starter_id,
            listing_author_id: transaction.listing_author_id,
            conversation_id: transaction.conversation_id,
            unit_price_cents: transaction.unit_price_cents,
            shipping_price_cents: transaction.shipping_price_cents,
            listing_quantity: transaction.listing_quantity,
            payment_process: transaction.payment_process,
            payment_gateway: transaction.payment_gateway,
            order_status: transaction.order_status,
            booking_start: transaction.booking_start,
            booking_end: transaction.booking_end,
            created_at: transaction.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_branches_on_payment_outcome() {
        assert_eq!(
            OrderStatus::Pending.apply(OrderEvent::PaymentSucceeded),
            Some(OrderStatus::PaymentSuccessful)
        );
        assert_eq!(
            OrderStatus::Pending.apply(OrderEvent::PaymentFailed),
            Some(OrderStatus::PaymentFailure)
        );
    }

    #[test]
    fn seller_events_require_successful_payment() {
        assert_eq!(
            OrderStatus::PaymentSuccessful.apply(OrderEvent::SellerAccepted),
            Some(OrderStatus::OrderAccepted)
        );
        assert_eq!(
            OrderStatus::PaymentSuccessful.apply(OrderEvent::SellerDeclined),
            Some(OrderStatus::CancelledBySeller)
        );
        assert_eq!(OrderStatus::Pending.apply(OrderEvent::SellerAccepted), None);
        assert_eq!(OrderStatus::Pending.apply(OrderEvent::SellerDeclined), None);
    }

    #[test]
    fn terminal_statuses_accept_no_events() {
        let events = [
            OrderEvent::PaymentSucceeded,
            OrderEvent::PaymentFailed,
            OrderEvent::SellerAccepted,
            OrderEvent::SellerDeclined,
        ];
        for status in [
            OrderStatus::PaymentFailure,
            OrderStatus::OrderAccepted,
            OrderStatus::CancelledBySeller,
        ] {
            assert!(status.is_terminal());
            for event in events {
                assert_eq!(status.apply(event), None);
            }
        }
    }

    #[test]
    fn payment_cannot_be_recorded_twice() {
        // A duplicate gateway callback finds the order out of `pending`
        // and must be rejected.
        let after_success = OrderStatus::Pending
            .apply(OrderEvent::PaymentSucceeded)
            .unwrap();
        assert_eq!(after_success.apply(OrderEvent::PaymentSucceeded), None);
        assert_eq!(after_success.apply(OrderEvent::PaymentFailed), None);
    }

    #[test]
    fn gateway_parse_round_trips() {
        for gateway in [
            PaymentGateway::None,
            PaymentGateway::Payu,
            PaymentGateway::Paypal,
            PaymentGateway::Braintree,
        ] {
            assert_eq!(PaymentGateway::parse(gateway.as_str()), Some(gateway));
        }
        assert_eq!(PaymentGateway::parse("stripe"), None);
    }
}
