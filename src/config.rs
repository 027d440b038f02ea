//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

use crate::{error::AppError, services::payu_service::PayuCredentials};

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `BASE_URL` (optional): public URL of this service, used for gateway
///   callback URLs and redirect targets
/// - `MARKETPLACE_NAME` (optional): brand name used in system messages
/// - `PAYU_KEY` / `PAYU_SALT` (required): PayU merchant credentials
/// - `PAYU_URL` (optional): PayU payment endpoint, defaults to the sandbox
/// - `PAYMENT_GATEWAY` (optional): active gateway, defaults to "payu"
/// - `ADMIN_NOTIFY_URL` (optional): endpoint that relays admin emails
/// - `ADMIN_NOTIFY_SECRET` (optional): HMAC secret for signing notices
/// - `PINCODE_API_URL` (optional): postal pincode lookup service
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_marketplace_name")]
    pub marketplace_name: String,

    pub payu_key: String,
    pub payu_salt: String,

    #[serde(default = "default_payu_url")]
    pub payu_url: String,

    #[serde(default = "default_payment_gateway")]
    pub payment_gateway: String,

    pub admin_notify_url: Option<String>,
    pub admin_notify_secret: Option<String>,

    #[serde(default = "default_pincode_api_url")]
    pub pincode_api_url: String,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_marketplace_name() -> String {
    "the marketplace".to_string()
}

/// PayU sandbox endpoint; override with the production URL in deployment.
fn default_payu_url() -> String {
    "https://test.payu.in/_payment".to_string()
}

fn default_payment_gateway() -> String {
    "payu".to_string()
}

fn default_pincode_api_url() -> String {
    "http://postalpincode.in/api/pincode".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL, PAYU_KEY)
    /// - Environment variable values cannot be parsed into expected types
    /// - ADMIN_NOTIFY_URL is set but not a valid URL
    pub fn from_env() -> anyhow::Result<Self> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        let config = envy::from_env::<Config>()?;

        if let Some(ref notify_url) = config.admin_notify_url {
            url::Url::parse(notify_url)
                .map_err(|e| anyhow::anyhow!("ADMIN_NOTIFY_URL is not a valid URL: {e}"))?;
        }

        Ok(config)
    }

    /// PayU merchant credentials used for request and response hashes.
    pub fn payu_credentials(&self) -> PayuCredentials {
        PayuCredentials {
            key: self.payu_key.clone(),
            salt: self.payu_salt.clone(),
        }
    }

    /// URL of a transaction's conversation page, used in redirects and
    /// admin notices.
    pub fn transaction_url(&self, transaction_id: uuid::Uuid) -> String {
        format!("{}/en/transactions/{}", self.base_url, transaction_id)
    }

    /// URL of a listing's public page.
    pub fn listing_url(&self, listing_id: uuid::Uuid) -> String {
        format!("{}/en/listings/{}", self.base_url, listing_id)
    }

    /// Gateway callback URL handed to PayU as both success and failure
    /// return target.
    pub fn payu_callback_url(&self) -> String {
        format!("{}/payu/callback", self.base_url)
    }

    pub fn validate_gateway(&self) -> Result<(), AppError> {
        match self.payment_gateway.as_str() {
            "none" | "payu" | "paypal" | "braintree" => Ok(()),
            other => Err(AppError::InvalidRequest(format!(
                "Unknown payment gateway: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            server_port: default_port(),
            base_url: "https://market.example.com".to_string(),
            marketplace_name: default_marketplace_name(),
            payu_key: "gtKFFx".to_string(),
            payu_salt: "eCwWELxi".to_string(),
            payu_url: default_payu_url(),
            payment_gateway: default_payment_gateway(),
            admin_notify_url: None,
            admin_notify_secret: None,
            pincode_api_url: default_pincode_api_url(),
        }
    }

    #[test]
    fn builds_transaction_and_listing_urls() {
        let config = test_config();
        let id = uuid::Uuid::nil();
        assert_eq!(
            config.transaction_url(id),
            format!("https://market.example.com/en/transactions/{id}")
        );
        assert_eq!(
            config.listing_url(id),
            format!("https://market.example.com/en/listings/{id}")
        );
        assert_eq!(
            config.payu_callback_url(),
            "https://market.example.com/payu/callback"
        );
    }

    #[test]
    fn rejects_unknown_gateway() {
        let mut config = test_config();
        config.payment_gateway = "stripe".to_string();
        assert!(config.validate_gateway().is_err());
        config.payment_gateway = "payu".to_string();
        assert!(config.validate_gateway().is_ok());
    }
}
