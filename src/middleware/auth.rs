//! Access-token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the access token from the Authorization header
//! 2. Hash it and look the member up in the database
//! 3. Inject the member's identity into the request
//! 4. Reject unauthorized requests with HTTP 401
//!
//! The gateway callback route is mounted outside this middleware: the
//! payment gateway cannot present a member token.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{error::AppError, models::person::Person, state::AppState};

/// Identity of the authenticated member, attached to the request.
///
/// Handlers extract this with `Extension<CurrentPerson>` to know who
/// is acting.
#[derive(Debug, Clone)]
pub struct CurrentPerson {
    pub person_id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

/// Access-token authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header from request
/// 2. Hash the `<token>` using SHA-256
/// 3. Query the `people` table for the matching hash
/// 4. If found: inject `CurrentPerson` into the request, call next handler
/// 5. If not found: return 401 Unauthorized
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidAccessToken)?;

    // Expected format: "Bearer <access_token>"
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidAccessToken)?;

    let token_hash = hash_token(token);

    let person = sqlx::query_as::<_, Person>("SELECT * FROM people WHERE token_hash = $1")
        .bind(&token_hash)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::InvalidAccessToken)?;

    request.extensions_mut().insert(CurrentPerson {
        person_id: person.id,
        username: person.username,
        is_admin: person.is_admin,
    });

    Ok(next.run(request).await)
}

/// SHA-256 hex digest of an access token, as stored in `people.token_hash`.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hash_is_64_hex_chars_and_deterministic() {
        let hash = hash_token("secret-token");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash_token("secret-token"));
        assert_ne!(hash, hash_token("other-token"));
    }
}
