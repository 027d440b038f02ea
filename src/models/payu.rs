//! PayU gateway types: the hosted-checkout form payload and the
//! asynchronous callback parameters.

use serde::{Deserialize, Serialize};

/// Form payload the client posts to PayU's hosted checkout page.
///
/// # JSON Example
///
/// ```json
/// {
///   "pay_url": "https://test.payu.in/_payment",
///   "key": "gtKFFx",
///   "txnid": "20260115550e8400-e29b-41d4-a716-446655440000",
///   "amount": "1500.00",
///   "productinfo": "Wooden rocking horse",
///   "firstname": "Asha",
///   "email": "asha@example.com",
///   "phone": "9811001100",
///   "udf1": "c56a4180-65aa-42ec-a945-5fd21dec0538",
///   "surl": "https://market.example.com/payu/callback",
///   "furl": "https://market.example.com/payu/callback",
///   "hash": "9bb20526..."
/// }
/// ```
///
/// `txnid` is the UTC date (`YYYYMMDD`) followed by the transaction
/// UUID; `udf1` carries the conversation UUID so the callback can link
/// back to the message log.
#[derive(Debug, Serialize)]
pub struct PayuCheckoutForm {
    pub pay_url: String,
    pub key: String,
    pub txnid: String,
    pub amount: String,
    pub productinfo: String,
    pub firstname: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    pub udf1: String,
    pub surl: String,
    pub furl: String,
    pub hash: String,
}

/// Parameters PayU posts back to the callback endpoint.
///
/// All fields default to empty strings: the gateway omits fields on
/// some failure paths, and a missing field must route to the failure
/// branch rather than fail deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayuCallbackParams {
    #[serde(default)]
    pub txnid: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub productinfo: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub udf1: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub zipcode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_params_tolerate_missing_fields() {
        // Failure callbacks can arrive with most fields absent.
        let params: PayuCallbackParams = serde_json::from_value(serde_json::json!({
            "txnid": "20260115abc",
            "status": "failure"
        }))
        .unwrap();
        assert_eq!(params.status, "failure");
        assert_eq!(params.hash, "");
        assert_eq!(params.udf1, "");
    }
}
