//! PayU hashing and checkout-form assembly.
//!
//! PayU signs both directions of the hosted-checkout flow with SHA-512
//! over a pipe-delimited field sequence:
//!
//! - request:  `key|txnid|amount|productinfo|firstname|email|udf1|<9 empty>|salt`
//! - response: `salt|status|<9 empty>|udf1|email|firstname|productinfo|amount|txnid|key`
//!
//! The nine empty fields are udf2..udf5 plus the reserved slots, which
//! this marketplace never populates. `txnid` is the UTC date
//! (`YYYYMMDD`) concatenated with the transaction UUID.

use chrono::NaiveDate;
use sha2::{Digest, Sha512};
use uuid::Uuid;

use crate::models::payu::PayuCallbackParams;

/// Merchant key and salt issued by PayU.
#[derive(Debug, Clone)]
pub struct PayuCredentials {
    pub key: String,
    pub salt: String,
}

/// Number of unused fields between the last populated udf and the salt.
const EMPTY_HASH_FIELDS: usize = 9;

fn sha512_hex(input: &str) -> String {
    hex::encode(Sha512::digest(input.as_bytes()))
}

/// Gateway transaction id for a marketplace transaction:
/// `YYYYMMDD<uuid>`.
pub fn checkout_txnid(date: NaiveDate, transaction_id: Uuid) -> String {
    format!("{}{}", date.format("%Y%m%d"), transaction_id)
}

/// Recover the transaction UUID from a gateway `txnid` by stripping
/// the 8-character date prefix.
pub fn parse_txnid(txnid: &str) -> Option<Uuid> {
    let rest = txnid.get(8..)?;
    Uuid::parse_str(rest).ok()
}

/// Cents rendered the way PayU expects amounts: two decimal places.
pub fn format_amount(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Hash sent with the checkout form.
pub fn request_hash(
    credentials: &PayuCredentials,
    txnid: &str,
    amount: &str,
    productinfo: &str,
    firstname: &str,
    email: &str,
    udf1: &str,
) -> String {
    let mut fields: Vec<&str> = vec![
        &credentials.key,
        txnid,
        amount,
        productinfo,
        firstname,
        email,
        udf1,
    ];
    fields.extend(std::iter::repeat_n("", EMPTY_HASH_FIELDS));
    fields.push(&credentials.salt);
    sha512_hex(&fields.join("|"))
}

/// Hash PayU sends back with the callback, recomputed over the
/// received fields.
pub fn response_hash(credentials: &PayuCredentials, params: &PayuCallbackParams) -> String {
    let mut fields: Vec<&str> = vec![&credentials.salt, &params.status];
    fields.extend(std::iter::repeat_n("", EMPTY_HASH_FIELDS));
    fields.extend([
        params.udf1.as_str(),
        params.email.as_str(),
        params.firstname.as_str(),
        params.productinfo.as_str(),
        params.amount.as_str(),
        params.txnid.as_str(),
        &credentials.key,
    ]);
    sha512_hex(&fields.join("|"))
}

/// Whether the callback records a successful payment.
///
/// True only when a hash was received, the gateway status is
/// `"success"`, and the received hash matches the recomputation.
/// Everything else routes to the failure branch.
pub fn verify_response(credentials: &PayuCredentials, params: &PayuCallbackParams) -> bool {
    if params.hash.trim().is_empty() || params.status != "success" {
        return false;
    }
    let expected = response_hash(credentials, params);
    secure_eq(expected.as_bytes(), params.hash.trim().as_bytes())
}

/// Constant-time byte comparison for received hashes.
fn secure_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0_u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "gtKFFx";
    const SALT: &str = "eCwWELxi";
    const TX_UUID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    const CONVERSATION_UUID: &str = "c56a4180-65aa-42ec-a945-5fd21dec0538";
    const TXNID: &str = "202601153fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn credentials() -> PayuCredentials {
        PayuCredentials {
            key: KEY.to_string(),
            salt: SALT.to_string(),
        }
    }

    fn success_params() -> PayuCallbackParams {
        let mut params = PayuCallbackParams {
            txnid: TXNID.to_string(),
            status: "success".to_string(),
            amount: "1500.00".to_string(),
            productinfo: "Wooden rocking horse".to_string(),
            firstname: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            udf1: CONVERSATION_UUID.to_string(),
            ..PayuCallbackParams::default()
        };
        params.hash = response_hash(&credentials(), &params);
        params
    }

    #[test]
    fn txnid_concatenates_date_and_uuid() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let id = Uuid::parse_str(TX_UUID).unwrap();
        assert_eq!(checkout_txnid(date, id), TXNID);
    }

    #[test]
    fn parse_txnid_strips_date_prefix() {
        assert_eq!(parse_txnid(TXNID), Some(Uuid::parse_str(TX_UUID).unwrap()));
        assert_eq!(parse_txnid("20260115not-a-uuid"), None);
        assert_eq!(parse_txnid("short"), None);
        assert_eq!(parse_txnid(""), None);
    }

    #[test]
    fn amount_renders_two_decimal_places() {
        assert_eq!(format_amount(150_000), "1500.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(100), "1.00");
        assert_eq!(format_amount(12_345), "123.45");
    }

    // Pinned against an independently computed SHA-512 of
    // "gtKFFx|<txnid>|1500.00|Wooden rocking horse|Asha|asha@example.com|<udf1>||||||||||eCwWELxi"
    #[test]
    fn request_hash_matches_known_vector() {
        let hash = request_hash(
            &credentials(),
            TXNID,
            "1500.00",
            "Wooden rocking horse",
            "Asha",
            "asha@example.com",
            CONVERSATION_UUID,
        );
        assert_eq!(
            hash,
            "9bb2052641da36c321b8dc4223a154ba5713ab697a0d9a71634b719ca039db9e\
             3e6e90cf0bb3ab970e859af52ceaa08fafebd580364474760a08914d0e76184d"
        );
    }

    // Pinned against an independently computed SHA-512 of
    // "eCwWELxi|success||||||||||<udf1>|asha@example.com|Asha|Wooden rocking horse|1500.00|<txnid>|gtKFFx"
    #[test]
    fn response_hash_matches_known_vector() {
        let params = success_params();
        assert_eq!(
            params.hash,
            "a52208c7081d727fdbdd24b54c775f2b505f3a11aef5f2654cf455bfb7692309\
             4458618760ee9a06adb9b87d2c9ea4d9f0714a491fd861352e1ba2281997f8c6"
        );
    }

    #[test]
    fn valid_success_callback_verifies() {
        assert!(verify_response(&credentials(), &success_params()));
    }

    #[test]
    fn tampered_amount_is_rejected() {
        let mut params = success_params();
        params.amount = "1.00".to_string();
        assert!(!verify_response(&credentials(), &params));
    }

    #[test]
    fn non_success_status_is_rejected_even_with_matching_hash() {
        let mut params = success_params();
        params.status = "failure".to_string();
        // Re-sign so the hash itself is consistent with the new status.
        params.hash = response_hash(&credentials(), &params);
        assert!(!verify_response(&credentials(), &params));
    }

    #[test]
    fn missing_hash_is_rejected() {
        let mut params = success_params();
        params.hash = String::new();
        assert!(!verify_response(&credentials(), &params));
        params.hash = "   ".to_string();
        assert!(!verify_response(&credentials(), &params));
    }

    #[test]
    fn wrong_salt_is_rejected() {
        let other = PayuCredentials {
            key: KEY.to_string(),
            salt: "wrong".to_string(),
        };
        assert!(!verify_response(&other, &success_params()));
    }
}
