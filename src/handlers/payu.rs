//! PayU callback HTTP handler.
//!
//! `POST /payu/callback` is the asynchronous return leg of the hosted
//! checkout. It is mounted outside the authentication middleware (the
//! gateway cannot present a member token); the SHA-512 response hash
//! is the only thing that authenticates the call.

use axum::{
    Form,
    extract::State,
    response::Redirect,
};

use crate::{
    error::AppError,
    models::{
        payu::PayuCallbackParams,
        person::Person,
        shipping_address::{AddressFields, AddressType},
        transaction::OrderEvent,
    },
    services::{
        address_service, message_service, notifier_service, payu_service, transaction_service,
    },
    state::AppState,
};

/// Record a payment outcome reported by PayU.
///
/// # Process
///
/// 1. Strip the 8-character date prefix from `txnid` and load the
///    transaction by the remaining UUID
/// 2. Recompute the response hash over the received fields; the
///    payment succeeded only if a hash was received, `status` is
///    `"success"`, and the hashes match
/// 3. Apply the matching order-status transition with its system
///    message (a duplicate callback finds the order out of `pending`
///    and gets 409 with no further effect)
/// 4. Backfill the buyer's profile phone and record the buyer
///    shipping address from the callback fields
/// 5. On success only, close the listing; failed verification never
///    touches listing visibility
/// 6. Send exactly one admin notice with the payment outcome
///
/// Responds with a redirect to the transaction's conversation page,
/// for both outcomes.
pub async fn payu_callback(
    State(state): State<AppState>,
    Form(params): Form<PayuCallbackParams>,
) -> Result<Redirect, AppError> {
    let transaction_id = payu_service::parse_txnid(&params.txnid).ok_or_else(|| {
        AppError::InvalidRequest(format!("Unrecognized txnid: {}", params.txnid))
    })?;

    let transaction = transaction_service::get_transaction_by_id(&state.pool, transaction_id)
        .await?
        .ok_or(AppError::TransactionNotFound)?;

    let seller = sqlx::query_as::<_, Person>("SELECT * FROM people WHERE id = $1")
        .bind(transaction.listing_author_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::PersonNotFound)?;

    let credentials = state.config.payu_credentials();
    let payment_success = payu_service::verify_response(&credentials, &params);
    let marketplace = &state.config.marketplace_name;

    let (event, content) = if payment_success {
        (
            OrderEvent::PaymentSucceeded,
            message_service::payment_received_message(
                &seller.given_name,
                &params.amount,
                &params.productinfo,
                &params.txnid,
                marketplace,
            ),
        )
    } else {
        (
            OrderEvent::PaymentFailed,
            message_service::payment_failed_message(
                &seller.given_name,
                &params.amount,
                &params.productinfo,
                marketplace,
            ),
        )
    };

    // The system message is written in the buyer's voice.
    let transaction = transaction_service::apply_order_event(
        &state.pool,
        transaction.id,
        event,
        transaction.starter_id,
        &content,
    )
    .await?;

    tracing::info!(
        transaction_id = %transaction.id,
        status = %params.status,
        payment_success,
        "PayU callback recorded"
    );

    transaction_service::backfill_phone_number(&state.pool, transaction.starter_id, &params.phone)
        .await?;

    let fields = AddressFields {
        status: params.status.clone(),
        name: params.firstname.clone(),
        phone: params.phone.clone(),
        street1: params.address1.clone(),
        street2: params.address2.clone(),
        city: params.city.clone(),
        state_or_province: params.state.clone(),
        postal_code: params.zipcode.clone(),
        country: params.country.clone(),
    };
    address_service::upsert_address(
        &state.pool,
        transaction.id,
        transaction.starter_id,
        AddressType::Buyer,
        &fields,
    )
    .await?;

    if payment_success {
        transaction_service::close_listing(&state.pool, transaction.listing_id).await?;
    }

    notifier_service::notify_admins(
        &state.pool,
        &state.config,
        &transaction,
        &params.status,
        &params,
    )
    .await?;

    Ok(Redirect::to(&state.config.transaction_url(transaction.id)))
}
