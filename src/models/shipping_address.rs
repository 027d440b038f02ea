//! Shipping address data models.
//!
//! Addresses are keyed by `(transaction_id, person_id, address_type)`:
//! saving again for the same key updates the row in place instead of
//! inserting a second one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side of the transaction an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Buyer,
    Seller,
}

impl AddressType {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressType::Buyer => "buyer",
            AddressType::Seller => "seller",
        }
    }
}

/// Represents a shipping address record from the database.
///
/// # Database Table
///
/// Maps to the `shipping_addresses` table. The buyer address is
/// recorded from the gateway callback; the seller (pickup) address is
/// recorded when the seller accepts the order.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ShippingAddress {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub person_id: Uuid,
    pub address_type: String,
    /// Gateway payment status at recording time ("success" for seller
    /// addresses)
    pub status: String,
    pub name: String,
    pub phone: String,
    pub street1: String,
    pub street2: String,
    pub city: String,
    pub state_or_province: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Address fields shared by the gateway callback and the seller
/// address form.
#[derive(Debug, Clone)]
pub struct AddressFields {
    pub status: String,
    pub name: String,
    pub phone: String,
    pub street1: String,
    pub street2: String,
    pub city: String,
    pub state_or_province: String,
    pub postal_code: String,
    pub country: String,
}

/// Request body for the seller (pickup) address form.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Ravi",
///   "phone_number": "9822002200",
///   "address1": "4 Hill Street",
///   "address2": "",
///   "city": "Pune",
///   "state": "Maharashtra",
///   "pincode": "411002"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct SellerAddressRequest {
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "India".to_string()
}

impl SellerAddressRequest {
    /// Seller addresses are always recorded with a "success" status.
    pub fn into_fields(self) -> AddressFields {
        AddressFields {
            status: "success".to_string(),
            name: self.name,
            phone: self.phone_number,
            street1: self.address1,
            street2: self.address2,
            city: self.city,
            state_or_province: self.state,
            postal_code: self.pincode,
            country: self.country,
        }
    }
}

/// Address summary returned in checkout and pickup responses.
#[derive(Debug, Serialize)]
pub struct ShippingAddressResponse {
    pub id: Uuid,
    pub address_type: String,
    pub name: String,
    pub phone: String,
    pub street1: String,
    pub street2: String,
    pub city: String,
    pub state_or_province: String,
    pub postal_code: String,
    pub country: String,
}

impl From<ShippingAddress> for ShippingAddressResponse {
    fn from(address: ShippingAddress) -> Self {
        Self {
            id: address.id,
            address_type: address.address_type,
            name: address.name,
            phone: address.phone,
            street1: address.street1,
            street2: address.street2,
            city: address.city,
            state_or_province: address.state_or_province,
            postal_code: address.postal_code,
            country: address.country,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seller_request_defaults_country_and_forces_success_status() {
        let request: SellerAddressRequest = serde_json::from_value(serde_json::json!({
            "name": "Ravi",
            "phone_number": "9822002200",
            "address1": "4 Hill Street",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411002"
        }))
        .unwrap();
        assert_eq!(request.country, "India");
        let fields = request.into_fields();
        assert_eq!(fields.status, "success");
        assert_eq!(fields.postal_code, "411002");
    }
}
