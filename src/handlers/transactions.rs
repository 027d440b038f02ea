//! Transaction HTTP handlers.
//!
//! This module implements the transaction-related API endpoints:
//! - POST /api/v1/transactions - Create a transaction from a listing
//! - GET /api/v1/transactions/:id - Transaction with its conversation log
//! - GET /api/v1/transactions/:id/pickup - Seller's pickup view
//! - POST /api/v1/transactions/:id/decline - Seller declines the order

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::CurrentPerson,
    models::{
        checkout::{
            CreateTransactionResponse, NoticeResponse, PickupResponse, PriceBreakDown,
            ShowTransactionResponse,
        },
        listing::Listing,
        message::ConversationEntry,
        payu::PayuCheckoutForm,
        person::Person,
        shipping_address::AddressType,
        transaction::{
            CreateTransactionRequest, OrderEvent, OrderStatus, PaymentProcess, Transaction,
        },
    },
    services::{
        address_service, checkout_service, message_service, notifier_service, payu_service,
        transaction_service,
    },
    state::AppState,
};

/// Create a transaction from a listing.
///
/// # Request Body
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
/// # Response (201)
///
/// Free checkout returns a notice and a redirect to the transaction;
/// sale-shape listings ('selling'/'renting-out') return the PayU
/// checkout form with the signed request hash instead.
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPerson>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<CreateTransactionResponse>), AppError> {
    let context =
        checkout_service::fetch_checkout_context(&state.pool, &state.config, request.listing_id)
            .await?;
    let message =
        checkout_service::validate_message(context.listing.payment_process, request.message.as_deref())?;
    checkout_service::ensure_can_start(&context.listing, current.person_id)?;

    // Paid processes without a sale shape are routed to external flows
    // at checkout planning; there is no in-process create for them.
    if context.listing.payment_process != PaymentProcess::None && !context.listing.is_sale_shape() {
        return Err(AppError::UnroutableCheckout(format!(
            "listing_id: {}, payment_process: {:?}",
            context.listing.id, context.listing.payment_process,
        )));
    }

    let booking = transaction_service::booking_range(request.start_on, request.end_on)?;
    let quantity = transaction_service::resolve_quantity(request.quantity, booking);

    let (transaction, initial_message) = transaction_service::create_transaction(
        &state.pool,
        &context.listing,
        current.person_id,
        context.gateway,
        message.as_deref(),
        quantity,
        booking,
    )
    .await?;

    tracing::info!(
        transaction_id = %transaction.id,
        listing_id = %context.listing.id,
        starter_id = %current.person_id,
        "Transaction created"
    );

    // Sale-shape listings proceed straight to the gateway checkout.
    if context.listing.is_sale_shape() {
        let buyer = sqlx::query_as::<_, Person>("SELECT * FROM people WHERE id = $1")
            .bind(current.person_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(AppError::PersonNotFound)?;

        let payu_form = build_payu_form(&state, &transaction, &buyer, &request);

        return Ok((
            StatusCode::CREATED,
            Json(CreateTransactionResponse {
                transaction: transaction.into(),
                notice: None,
                redirect: None,
                payu_form: Some(payu_form),
            }),
        ));
    }

    if let Some(posted) = initial_message {
        notifier_service::message_sent(transaction.id, transaction.conversation_id, posted.id);
    }

    let redirect = state.config.transaction_url(transaction.id);
    Ok((
        StatusCode::CREATED,
        Json(CreateTransactionResponse {
            transaction: transaction.into(),
            notice: Some("Message sent".to_string()),
            redirect: Some(redirect),
            payu_form: None,
        }),
    ))
}

/// Assemble the hosted-checkout form: `txnid` is today's UTC date plus
/// the transaction UUID, the amount is the order total, and the hash
/// signs the field sequence PayU verifies on its side.
fn build_payu_form(
    state: &AppState,
    transaction: &Transaction,
    buyer: &Person,
    request: &CreateTransactionRequest,
) -> PayuCheckoutForm {
    let credentials = state.config.payu_credentials();
    let txnid = payu_service::checkout_txnid(Utc::now().date_naive(), transaction.id);
    let amount = payu_service::format_amount(transaction.total_cents());
    let udf1 = transaction.conversation_id.to_string();
    let callback_url = state.config.payu_callback_url();

    let hash = payu_service::request_hash(
        &credentials,
        &txnid,
        &amount,
        &transaction.listing_title,
        &request.name,
        &buyer.email,
        &udf1,
    );

    PayuCheckoutForm {
        pay_url: state.config.payu_url.clone(),
        key: credentials.key,
        txnid,
        amount,
        productinfo: transaction.listing_title.clone(),
        firstname: request.name.clone(),
        email: buyer.email.clone(),
        phone: request.phone_number.clone(),
        address1: request.address1.clone(),
        address2: request.address2.clone(),
        city: request.city.clone(),
        state: request.state.clone(),
        zipcode: request.pincode.clone(),
        country: "India".to_string(),
        udf1,
        surl: callback_url.clone(),
        furl: callback_url,
        hash,
    }
}

/// Get a transaction with its merged conversation log.
///
/// # Authorization
///
/// Participants see their own transactions; community admins see any
/// transaction with `role = "admin"`. Everyone else gets 403.
///
/// # Side Effects
///
/// Marks the transaction seen for the viewing participant.
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPerson>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<ShowTransactionResponse>, AppError> {
    let transaction = transaction_service::get_transaction_by_id(&state.pool, transaction_id)
        .await?
        .ok_or(AppError::TransactionNotFound)?;

    let role = if transaction.is_participant(current.person_id) {
        "participant"
    } else if current.is_admin {
        "admin"
    } else {
        return Err(AppError::NotAuthorized);
    };

    let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
        .bind(transaction.listing_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::ListingNotFound)?;

    let other_party_id = if transaction.starter_id == current.person_id {
        transaction.listing_author_id
    } else {
        transaction.starter_id
    };
    let other_party = sqlx::query_as::<_, Person>("SELECT * FROM people WHERE id = $1")
        .bind(other_party_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::PersonNotFound)?;

    // Merged log, newest first.
    let mut entries: Vec<ConversationEntry> =
        message_service::conversation_messages(&state.pool, transaction.conversation_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
    entries.reverse();

    transaction_service::mark_seen(&state.pool, &transaction, current.person_id).await?;

    let address_button = transaction.listing_author_id == current.person_id
        && transaction.order_status == OrderStatus::PaymentSuccessful;
    let is_author = role == "admin" || listing.author_id == current.person_id;

    let booking = transaction
        .booking_start
        .zip(transaction.booking_end);
    let price_break_down = PriceBreakDown::build(
        transaction.payment_process,
        transaction.unit_price_cents,
        transaction.shipping_price_cents,
        transaction.listing_quantity,
        booking,
    );

    Ok(Json(ShowTransactionResponse {
        role,
        is_author,
        address_button,
        other_party: other_party.into(),
        entries,
        price_break_down,
        listing: listing.into(),
        transaction: transaction.into(),
    }))
}

/// Seller's pickup view of a sale.
///
/// Returns 403 unless the viewer is the listing author of the
/// transaction. The pickup address prefill prefers the author's
/// latest seller address and falls back to their buyer address.
pub async fn pickup(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPerson>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<PickupResponse>, AppError> {
    let transaction = sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE id = $1 AND listing_author_id = $2",
    )
    .bind(transaction_id)
    .bind(current.person_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotAuthorized)?;

    let pickup_address = address_service::latest_address_with_fallback(
        &state.pool,
        transaction.listing_author_id,
        AddressType::Seller,
        AddressType::Buyer,
    )
    .await?;

    let viewer = sqlx::query_as::<_, Person>("SELECT * FROM people WHERE id = $1")
        .bind(current.person_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::PersonNotFound)?;

    Ok(Json(PickupResponse {
        transaction: transaction.into(),
        pickup_address: pickup_address.map(Into::into),
        phone_number: viewer.phone_number,
    }))
}

/// Seller declines the order.
///
/// Applies `payment_successful -> cancelled_by_seller` and appends the
/// decline message; any other current status is a 409 and mutates
/// nothing.
pub async fn decline_transaction(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPerson>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<NoticeResponse>, AppError> {
    let transaction = transaction_service::get_transaction_by_id(&state.pool, transaction_id)
        .await?
        .ok_or(AppError::TransactionNotFound)?;

    if transaction.listing_author_id != current.person_id {
        return Err(AppError::NotAuthorized);
    }

    transaction_service::apply_order_event(
        &state.pool,
        transaction.id,
        OrderEvent::SellerDeclined,
        current.person_id,
        &message_service::order_declined_message(&state.config.marketplace_name),
    )
    .await?;

    tracing::info!(transaction_id = %transaction.id, "Order declined by seller");

    Ok(Json(NoticeResponse {
        notice: "Buyer has been informed of your refusal. Your listing is now closed.".to_string(),
        redirect: state.config.transaction_url(transaction.id),
    }))
}
