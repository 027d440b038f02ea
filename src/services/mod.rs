//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and complex operations.

pub mod address_service;
pub mod checkout_service;
pub mod message_service;
pub mod notifier_service;
pub mod payu_service;
pub mod pincode_service;
pub mod transaction_service;
