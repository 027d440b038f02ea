//! Seller address HTTP handler.
//!
//! `PUT /api/v1/transactions/{id}/seller-address` records the seller's
//! pickup address. The first save accepts the order; later saves only
//! update the address in place.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::CurrentPerson,
    models::{checkout::NoticeResponse, shipping_address::SellerAddressRequest},
    services::{address_service, transaction_service},
    state::AppState,
};

/// Save the seller's pickup address for a transaction.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Ravi",
///   "phone_number": "9822002200",
///   "address1": "4 Hill Street",
///   "city": "Pune",
///   "state": "Maharashtra",
///   "pincode": "411002"
/// }
/// ```
///
/// # Behavior
///
/// - First save: records the address, transitions the order to
///   `order_accepted`, appends the acceptance message, and backfills
///   the seller's profile phone if blank.
/// - Later saves: update the address row in place only.
///
/// # Authorization
///
/// Only the listing author of the transaction may save a pickup
/// address.
pub async fn save_seller_address(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPerson>,
    Path(transaction_id): Path<Uuid>,
    Json(request): Json<SellerAddressRequest>,
) -> Result<Json<NoticeResponse>, AppError> {
    let transaction = transaction_service::get_transaction_by_id(&state.pool, transaction_id)
        .await?
        .ok_or(AppError::TransactionNotFound)?;

    if transaction.listing_author_id != current.person_id {
        return Err(AppError::NotAuthorized);
    }

    let fields = request.into_fields();
    let accepted = address_service::save_seller_address(
        &state.pool,
        &transaction,
        &fields,
        &state.config.marketplace_name,
    )
    .await?;

    if accepted {
        tracing::info!(transaction_id = %transaction.id, "Order accepted by seller");
    }

    Ok(Json(NoticeResponse {
        notice: "Your address updated successfully".to_string(),
        redirect: state.config.transaction_url(transaction.id),
    }))
}
