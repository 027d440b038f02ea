//! Listing data models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::transaction::PaymentProcess;

/// Listing shapes that take paid (gateway) checkout. Every other shape
/// is message-only even when a payment process is configured.
pub const SALE_SHAPES: [&str; 2] = ["selling", "renting-out"];

/// Represents a listing record from the database.
///
/// # Database Table
///
/// Maps to the `listings` table. Each listing:
/// - Belongs to one author
/// - Carries the payment process its transactions follow
/// - Is closed (`open = false`) once a payment for it succeeds
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Listing {
    /// Unique identifier for this listing
    pub id: Uuid,

    /// Person who published the listing (the seller)
    pub author_id: Uuid,

    /// Listing title, denormalized onto transactions at creation
    pub title: String,

    /// Unit price in cents
    pub price_cents: i64,

    /// Shipping price in cents, NULL when the listing has none
    pub shipping_price_cents: Option<i64>,

    /// Listing shape: 'selling', 'renting-out', 'giving' or 'requesting'
    pub shape: String,

    /// 'piece' for quantity checkout, 'day' for date-range bookings
    pub unit_type: String,

    /// Payment process for transactions on this listing
    pub payment_process: PaymentProcess,

    /// Whether the listing still accepts transactions
    pub open: bool,

    /// Soft-delete flag; deleted listings are invisible to everyone
    /// but their author
    pub deleted: bool,

    /// Timestamp when the listing was created
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Whether transactions on this listing go through the payment
    /// gateway ('selling' and 'renting-out' shapes only).
    pub fn is_sale_shape(&self) -> bool {
        SALE_SHAPES.contains(&self.shape.as_str())
    }

    /// Day-unit listings are booked over a date range.
    pub fn is_booking(&self) -> bool {
        self.unit_type == "day"
    }

    /// Whether the given person may see this listing at all.
    pub fn visible_to(&self, person_id: Uuid) -> bool {
        !self.deleted || self.author_id == person_id
    }
}

/// Listing summary embedded in checkout and transaction responses.
#[derive(Debug, Serialize)]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: String,
    pub price_cents: i64,
    pub shipping_price_cents: Option<i64>,
    pub shape: String,
    pub unit_type: String,
    pub open: bool,
}

impl From<Listing> for ListingSummary {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title,
            price_cents: listing.price_cents,
            shipping_price_cents: listing.shipping_price_cents,
            shape: listing.shape,
            unit_type: listing.unit_type,
            open: listing.open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(shape: &str, unit_type: &str) -> Listing {
        Listing {
            id: Uuid::nil(),
            author_id: Uuid::nil(),
            title: "Wooden rocking horse".to_string(),
            price_cents: 150_000,
            shipping_price_cents: None,
            shape: shape.to_string(),
            unit_type: unit_type.to_string(),
            payment_process: PaymentProcess::Preauthorize,
            open: true,
            deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn only_selling_and_renting_out_are_sale_shapes() {
        assert!(listing("selling", "piece").is_sale_shape());
        assert!(listing("renting-out", "piece").is_sale_shape());
        assert!(!listing("giving", "piece").is_sale_shape());
        assert!(!listing("requesting", "piece").is_sale_shape());
    }

    #[test]
    fn day_unit_listings_are_bookings() {
        assert!(listing("renting-out", "day").is_booking());
        assert!(!listing("selling", "piece").is_booking());
    }

    #[test]
    fn deleted_listings_stay_visible_to_their_author() {
        let author = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let mut l = listing("selling", "piece");
        l.author_id = author;
        l.deleted = true;
        assert!(l.visible_to(author));
        assert!(!l.visible_to(viewer));
    }
}
