//! Marketplace member data models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Represents a member record from the database.
///
/// # Database Table
///
/// Maps to the `people` table. Each person:
/// - Authenticates with an access token stored as a SHA-256 hash
/// - May have a phone number on file (backfilled from checkout forms)
/// - May hold admin rights, which allow viewing any transaction
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Person {
    /// Unique identifier for this person
    pub id: Uuid,

    /// Login / profile handle, unique across the marketplace
    pub username: String,

    /// First name shown in conversation messages
    pub given_name: String,

    /// Contact email, handed to the payment gateway at checkout
    pub email: String,

    /// Phone number from the profile
    ///
    /// NULL until the person fills it in, either on the profile or as a
    /// side effect of a checkout or address form.
    pub phone_number: Option<String>,

    /// SHA-256 hash of the access token (64 hex characters)
    pub token_hash: String,

    /// Whether this person has marketplace admin rights
    pub is_admin: bool,

    /// Timestamp when the profile was created
    pub created_at: DateTime<Utc>,
}

/// Public summary of a person, embedded in transaction responses.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "username": "asha92",
///   "display_name": "Asha"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct PersonSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
}

impl From<Person> for PersonSummary {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            username: person.username,
            display_name: person.given_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_given_name_as_display_name() {
        let person = Person {
            id: Uuid::nil(),
            username: "asha92".to_string(),
            given_name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone_number: None,
            token_hash: "0".repeat(64),
            is_admin: false,
            created_at: Utc::now(),
        };
        let summary = PersonSummary::from(person);
        assert_eq!(summary.display_name, "Asha");
        assert_eq!(summary.username, "asha92");
    }
}
