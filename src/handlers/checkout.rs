//! Checkout-plan HTTP handler.
//!
//! `GET /api/v1/listings/{id}/checkout` resolves where a transaction
//! on a listing should start: the in-process free flow, the PayU
//! checkout (entered at transaction creation), or a redirect to one of
//! the external payment flows.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::CurrentPerson,
    models::{
        checkout::{CheckoutResponse, CheckoutStep, PriceBreakDown},
        person::Person,
        shipping_address::AddressType,
    },
    services::{address_service, checkout_service, transaction_service},
    state::AppState,
};

/// Optional checkout parameters carried over from the listing page.
#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub start_on: Option<NaiveDate>,
    pub end_on: Option<NaiveDate>,
}

fn default_quantity() -> i32 {
    1
}

/// Plan a checkout for a listing.
///
/// # Response (200)
///
/// ```json
/// {
///   "step": "free_message",
///   "listing": { "id": "...", "title": "Wooden rocking horse", "price_cents": 150000 },
///   "author": { "id": "...", "username": "ravi75", "display_name": "Ravi" },
///   "quantity": 1,
///   "payment_button": true,
///   "phone_number": "9811001100",
///   "price_break_down": { "total_cents": 150000 }
/// }
/// ```
///
/// # Guards
///
/// The listing must be open, not the viewer's own, and visible to the
/// viewer; combinations of payment process and gateway with no
/// checkout path return 422.
pub async fn checkout_plan(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPerson>,
    Path(listing_id): Path<Uuid>,
    Query(query): Query<CheckoutQuery>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let context =
        checkout_service::fetch_checkout_context(&state.pool, &state.config, listing_id).await?;
    checkout_service::ensure_can_start(&context.listing, current.person_id)?;

    let booking_requested = transaction_service::booking_range(query.start_on, query.end_on)?;
    let booking = context.listing.is_booking();

    let step = checkout_service::resolve_checkout_step(
        context.listing.payment_process,
        context.gateway,
        booking,
    )
    .ok_or_else(|| {
        AppError::UnroutableCheckout(format!(
            "listing_id: {listing_id}, payment_gateway: {}, payment_process: {:?}, booking: {booking}",
            context.gateway.as_str(),
            context.listing.payment_process,
        ))
    })?;

    // Prefill from the viewer's latest address and profile phone.
    let shipping_address = address_service::latest_address_with_fallback(
        &state.pool,
        current.person_id,
        AddressType::Buyer,
        AddressType::Seller,
    )
    .await?;

    let viewer = sqlx::query_as::<_, Person>("SELECT * FROM people WHERE id = $1")
        .bind(current.person_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::PersonNotFound)?;

    let quantity = transaction_service::resolve_quantity(query.quantity, booking_requested);
    let price_break_down = matches!(step, CheckoutStep::FreeMessage)
        .then(|| {
            PriceBreakDown::build(
                context.listing.payment_process,
                context.listing.price_cents,
                context.listing.shipping_price_cents,
                quantity,
                booking_requested,
            )
        })
        .flatten();

    Ok(Json(CheckoutResponse {
        step,
        redirect: checkout_service::step_redirect(step, listing_id),
        payment_button: context.listing.is_sale_shape(),
        quantity,
        booking_start: booking_requested.map(|(start, _)| start),
        booking_end: booking_requested.map(|(_, end)| end),
        phone_number: viewer.phone_number,
        shipping_address: shipping_address.map(Into::into),
        price_break_down,
        listing: context.listing.into(),
        author: context.author.into(),
    }))
}
