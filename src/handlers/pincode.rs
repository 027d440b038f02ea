//! Postal pincode lookup handler.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    error::AppError,
    services::pincode_service::{self, PincodeLookup},
    state::AppState,
};

/// Look up district and state for a postal pincode.
///
/// # Response (200)
///
/// ```json
/// { "status": "success", "district": "Pune City", "state": "Maharashtra" }
/// ```
///
/// Unknown pincodes return `{"status": "failure"}`; an unreachable
/// upstream service returns 502.
pub async fn lookup_pincode(
    State(state): State<AppState>,
    Path(pincode): Path<String>,
) -> Result<Json<PincodeLookup>, AppError> {
    let lookup = pincode_service::lookup(&state.config, &pincode).await?;
    Ok(Json(lookup))
}
