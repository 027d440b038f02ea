//! Outbound notifications: admin notices after gateway callbacks and
//! the message-sent signal for free transactions.
//!
//! Admin notices go to a configured relay endpoint (the piece that
//! turns them into email) with a signed JSON payload; every delivery
//! attempt is recorded in `admin_notifications`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    models::{payu::PayuCallbackParams, transaction::Transaction},
};

type HmacSha256 = Hmac<Sha256>;

/// Send exactly one admin notice for a recorded payment outcome.
///
/// # Process
///
/// 1. Build the notice payload (transaction URL, listing URL, payment
///    status, gateway fields)
/// 2. POST it to `ADMIN_NOTIFY_URL` when configured, signing with
///    `ADMIN_NOTIFY_SECRET` when present
/// 3. Record the delivery attempt in `admin_notifications`
///
/// Delivery failures are logged and recorded, not propagated: the
/// payment outcome stands regardless of whether the notice arrived.
pub async fn notify_admins(
    pool: &DbPool,
    config: &Config,
    transaction: &Transaction,
    payment_status: &str,
    params: &PayuCallbackParams,
) -> Result<(), AppError> {
    let payload = serde_json::json!({
        "event_type": "order.payment_recorded",
        "transaction_url": config.transaction_url(transaction.id),
        "listing_url": config.listing_url(transaction.listing_id),
        "payment_status": payment_status,
        "gateway": {
            "txnid": params.txnid,
            "amount": params.amount,
            "productinfo": params.productinfo,
            "firstname": params.firstname,
            "email": params.email,
            "phone": params.phone,
        },
    });

    let (response_status, response_body) = match config.admin_notify_url.as_deref() {
        Some(notify_url) => deliver(config, notify_url, &payload).await,
        None => {
            tracing::info!(
                transaction_id = %transaction.id,
                payment_status,
                "Admin notice skipped: no ADMIN_NOTIFY_URL configured"
            );
            (None, None)
        }
    };

    sqlx::query(
        r#"
        INSERT INTO admin_notifications (
            transaction_id,
            payment_status,
            payload,
            response_status,
            response_body
        )
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(transaction.id)
    .bind(payment_status)
    .bind(&payload)
    .bind(response_status)
    .bind(response_body)
    .execute(pool)
    .await?;

    Ok(())
}

/// POST the notice and capture the response for the delivery log.
async fn deliver(
    config: &Config,
    notify_url: &str,
    payload: &serde_json::Value,
) -> (Option<i32>, Option<String>) {
    let body = payload.to_string();

    let client = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build admin notice client: {e}");
            return (None, Some(format!("client error: {e}")));
        }
    };

    let mut request = client
        .post(notify_url)
        .header("Content-Type", "application/json")
        .body(body.clone());

    if let Some(secret) = config.admin_notify_secret.as_deref() {
        request = request.header("X-Notification-Signature", sign_payload(secret, &body));
    }

    match request.send().await {
        Ok(response) => {
            let status = response.status().as_u16() as i32;
            let text = response.text().await.ok();
            (Some(status), text)
        }
        Err(e) => {
            tracing::error!("Failed to deliver admin notice to {notify_url}: {e}");
            (None, Some(format!("request failed: {e}")))
        }
    }
}

/// HMAC-SHA256 signature over the notice body: `sha256=<hex>`.
fn sign_payload(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key length is valid");
    mac.update(payload.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Signal that a conversation message went out on a free transaction.
pub fn message_sent(transaction_id: Uuid, conversation_id: Uuid, message_id: Uuid) {
    tracing::info!(
        transaction_id = %transaction_id,
        conversation_id = %conversation_id,
        message_id = %message_id,
        "NOTIFICATION: message sent"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_has_sha256_prefix_and_hex_body() {
        let signature = sign_payload("secret", r#"{"payment_status":"success"}"#);
        let hex_part = signature.strip_prefix("sha256=").unwrap();
        assert_eq!(hex_part.len(), 64);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_depends_on_secret_and_payload() {
        let body = r#"{"payment_status":"success"}"#;
        assert_eq!(sign_payload("secret", body), sign_payload("secret", body));
        assert_ne!(sign_payload("secret", body), sign_payload("other", body));
        assert_ne!(
            sign_payload("secret", body),
            sign_payload("secret", r#"{"payment_status":"failure"}"#)
        );
    }
}
