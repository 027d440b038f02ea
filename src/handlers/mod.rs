//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Performs business logic (database queries, validation)
//! 3. Returns HTTP response (JSON, status code)

/// Seller pickup address endpoint
pub mod addresses;
/// Checkout plan endpoint
pub mod checkout;
/// Health check endpoint
pub mod health;
/// PayU gateway callback endpoint
pub mod payu;
/// Postal pincode lookup endpoint
pub mod pincode;
/// Transaction lifecycle endpoints
pub mod transactions;
