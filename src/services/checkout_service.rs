//! Checkout service: resolving everything a transaction start needs
//! and routing it to the right checkout step.

use uuid::Uuid;

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    models::{
        checkout::CheckoutStep,
        listing::Listing,
        person::Person,
        transaction::{PaymentGateway, PaymentProcess},
    },
};

/// Everything the checkout endpoints need about a listing: the listing
/// itself, its author, and the gateway in effect.
#[derive(Debug)]
pub struct CheckoutContext {
    pub listing: Listing,
    pub author: Person,
    pub gateway: PaymentGateway,
}

/// Resolve the dependent lookups behind a checkout: listing, author,
/// configured gateway. Each missing link is its own error.
pub async fn fetch_checkout_context(
    pool: &DbPool,
    config: &Config,
    listing_id: Uuid,
) -> Result<CheckoutContext, AppError> {
    let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
        .bind(listing_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::ListingNotFound)?;

    let author = sqlx::query_as::<_, Person>("SELECT * FROM people WHERE id = $1")
        .bind(listing.author_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::PersonNotFound)?;

    let gateway = PaymentGateway::parse(&config.payment_gateway).ok_or_else(|| {
        AppError::InvalidRequest(format!(
            "Unknown payment gateway: {}",
            config.payment_gateway
        ))
    })?;

    Ok(CheckoutContext {
        listing,
        author,
        gateway,
    })
}

/// Guards a listing must pass before a transaction can start, checked
/// in order: open, not the viewer's own, visible to the viewer.
pub fn ensure_can_start(listing: &Listing, viewer_id: Uuid) -> Result<(), AppError> {
    if !listing.open {
        return Err(AppError::ListingClosed);
    }
    if listing.author_id == viewer_id {
        return Err(AppError::OwnListing);
    }
    if !listing.visible_to(viewer_id) {
        return Err(AppError::NotAuthorized);
    }
    Ok(())
}

/// Route a checkout by `(payment process, gateway, booking)`.
///
/// Mirrors the listing-start branching: free listings stay in-process;
/// preauthorized bookings go to the booking flow regardless of
/// gateway; preauthorized PayPal/Braintree checkouts go to their own
/// flows; postpay has one flow. Combinations with no edge are
/// unroutable (preauthorize over PayU without booking, since PayU
/// checkout only starts at transaction creation).
pub fn resolve_checkout_step(
    process: PaymentProcess,
    gateway: PaymentGateway,
    booking: bool,
) -> Option<CheckoutStep> {
    match (process, gateway, booking) {
        (PaymentProcess::None, _, _) => Some(CheckoutStep::FreeMessage),
        (PaymentProcess::Preauthorize, _, true) => Some(CheckoutStep::Book),
        (PaymentProcess::Preauthorize, PaymentGateway::Paypal, false) => {
            Some(CheckoutStep::InitiateOrder)
        }
        (PaymentProcess::Preauthorize, PaymentGateway::Braintree, false) => {
            Some(CheckoutStep::PreauthorizePayment)
        }
        (PaymentProcess::Postpay, _, _) => Some(CheckoutStep::PostPay),
        _ => None,
    }
}

/// Redirect target for checkout steps handled outside this service.
pub fn step_redirect(step: CheckoutStep, listing_id: Uuid) -> Option<String> {
    match step {
        CheckoutStep::FreeMessage => None,
        CheckoutStep::Book => Some(format!("/en/listings/{listing_id}/book")),
        CheckoutStep::InitiateOrder => Some(format!("/en/listings/{listing_id}/initiate_order")),
        CheckoutStep::PreauthorizePayment => {
            Some(format!("/en/listings/{listing_id}/preauthorize_payment"))
        }
        CheckoutStep::PostPay => Some(format!("/en/listings/{listing_id}/post_pay")),
    }
}

/// Free (process `none`) transactions must open with a message.
pub fn validate_message(
    process: PaymentProcess,
    message: Option<&str>,
) -> Result<Option<String>, AppError> {
    let message = message.map(str::trim).filter(|m| !m.is_empty());
    if process == PaymentProcess::None && message.is_none() {
        return Err(AppError::InvalidRequest(
            "Message cannot be empty".to_string(),
        ));
    }
    Ok(message.map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn listing(open: bool, deleted: bool, author_id: Uuid) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            author_id,
            title: "Wooden rocking horse".to_string(),
            price_cents: 150_000,
            shipping_price_cents: None,
            shape: "selling".to_string(),
            unit_type: "piece".to_string(),
            payment_process: PaymentProcess::Preauthorize,
            open,
            deleted,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn guards_run_in_order() {
        let author = Uuid::new_v4();
        let viewer = Uuid::new_v4();

        assert!(matches!(
            ensure_can_start(&listing(false, false, author), viewer),
            Err(AppError::ListingClosed)
        ));
        assert!(matches!(
            ensure_can_start(&listing(true, false, author), author),
            Err(AppError::OwnListing)
        ));
        assert!(matches!(
            ensure_can_start(&listing(true, true, author), viewer),
            Err(AppError::NotAuthorized)
        ));
        assert!(ensure_can_start(&listing(true, false, author), viewer).is_ok());
    }

    #[test]
    fn free_process_routes_to_free_message() {
        for gateway in [PaymentGateway::Payu, PaymentGateway::None] {
            for booking in [false, true] {
                assert_eq!(
                    resolve_checkout_step(PaymentProcess::None, gateway, booking),
                    Some(CheckoutStep::FreeMessage)
                );
            }
        }
    }

    #[test]
    fn preauthorized_bookings_win_over_gateway() {
        for gateway in [
            PaymentGateway::Payu,
            PaymentGateway::Paypal,
            PaymentGateway::Braintree,
        ] {
            assert_eq!(
                resolve_checkout_step(PaymentProcess::Preauthorize, gateway, true),
                Some(CheckoutStep::Book)
            );
        }
    }

    #[test]
    fn preauthorize_routes_by_gateway() {
        assert_eq!(
            resolve_checkout_step(PaymentProcess::Preauthorize, PaymentGateway::Paypal, false),
            Some(CheckoutStep::InitiateOrder)
        );
        assert_eq!(
            resolve_checkout_step(
                PaymentProcess::Preauthorize,
                PaymentGateway::Braintree,
                false
            ),
            Some(CheckoutStep::PreauthorizePayment)
        );
        // PayU checkout starts at transaction creation, not here.
        assert_eq!(
            resolve_checkout_step(PaymentProcess::Preauthorize, PaymentGateway::Payu, false),
            None
        );
    }

    #[test]
    fn postpay_has_a_single_flow() {
        assert_eq!(
            resolve_checkout_step(PaymentProcess::Postpay, PaymentGateway::Payu, false),
            Some(CheckoutStep::PostPay)
        );
        assert_eq!(
            resolve_checkout_step(PaymentProcess::Postpay, PaymentGateway::Paypal, true),
            Some(CheckoutStep::PostPay)
        );
    }

    #[test]
    fn free_process_requires_a_message() {
        assert!(validate_message(PaymentProcess::None, None).is_err());
        assert!(validate_message(PaymentProcess::None, Some("   ")).is_err());
        assert_eq!(
            validate_message(PaymentProcess::None, Some("Is this available?")).unwrap(),
            Some("Is this available?".to_string())
        );
        assert_eq!(
            validate_message(PaymentProcess::Preauthorize, None).unwrap(),
            None
        );
    }
}
