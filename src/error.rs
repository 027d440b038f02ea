//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::transaction::{OrderEvent, OrderStatus};

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid or missing access tokens
/// - **Resource Errors**: Requested resources not found
/// - **Checkout Guards**: Listings that cannot start a transaction
/// - **Lifecycle Errors**: Order-status events with no matching edge
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Access token is missing, invalid, or unknown.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid access token")]
    InvalidAccessToken,

    /// Requested listing does not exist.
    #[error("Listing not found")]
    ListingNotFound,

    /// Requested transaction does not exist.
    #[error("Transaction not found")]
    TransactionNotFound,

    /// Requested person does not exist.
    #[error("Person not found")]
    PersonNotFound,

    /// The listing is closed and cannot start a new transaction.
    #[error("You cannot reply to a closed offer")]
    ListingClosed,

    /// A member cannot start a transaction on their own listing.
    #[error("You cannot send a message to yourself")]
    OwnListing,

    /// The viewer is not allowed to see this content.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("You are not authorized to view this content")]
    NotAuthorized,

    /// An order-status event arrived in a state with no matching edge.
    ///
    /// Returns HTTP 409 Conflict. Nothing is mutated when this is raised.
    #[error("Cannot apply {event:?} to order in status {status:?}")]
    OrderStatusConflict {
        status: OrderStatus,
        event: OrderEvent,
    },

    /// No checkout path exists for the listing's payment configuration.
    #[error("Cannot find a checkout path for {0}")]
    UnroutableCheckout(String),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// An upstream HTTP call (postal lookup) failed.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Convert AppError into an HTTP response.
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidAccessToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_access_token",
                self.to_string(),
            ),
            AppError::ListingNotFound => {
                (StatusCode::NOT_FOUND, "listing_not_found", self.to_string())
            }
            AppError::TransactionNotFound => (
                StatusCode::NOT_FOUND,
                "transaction_not_found",
                self.to_string(),
            ),
            AppError::PersonNotFound => {
                (StatusCode::NOT_FOUND, "person_not_found", self.to_string())
            }
            AppError::ListingClosed => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "listing_closed",
                self.to_string(),
            ),
            AppError::OwnListing => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "own_listing",
                self.to_string(),
            ),
            AppError::NotAuthorized => {
                (StatusCode::FORBIDDEN, "not_authorized", self.to_string())
            }
            AppError::OrderStatusConflict { .. } => (
                StatusCode::CONFLICT,
                "order_status_conflict",
                self.to_string(),
            ),
            AppError::UnroutableCheckout(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unroutable_checkout",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
            AppError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "upstream_error",
                "Upstream request failed".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
