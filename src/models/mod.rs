//! Data models representing database entities and API payloads.

/// Checkout plan and response view models
pub mod checkout;
/// Listing model
pub mod listing;
/// Conversations and messages
pub mod message;
/// PayU form payload and callback parameters
pub mod payu;
/// Marketplace member model
pub mod person;
/// Shipping address model
pub mod shipping_address;
/// Transaction model and order lifecycle
pub mod transaction;
