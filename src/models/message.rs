//! Conversation and message data models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Represents a message record from the database.
///
/// Every transaction owns exactly one conversation; buyer, seller and
/// system-generated messages all land in it.
///
/// `system_generated` marks the messages appended by order-status
/// transitions; each applied transition writes exactly one of these.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub system_generated: bool,
    pub created_at: DateTime<Utc>,
}

/// One entry of a transaction's merged conversation log.
///
/// # JSON Example
///
/// ```json
/// {
///   "kind": "transition",
///   "sender_id": "550e8400-e29b-41d4-a716-446655440000",
///   "content": "Dear Ravi, I have successfully made the payment...",
///   "created_at": "2026-01-15T10:30:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ConversationEntry {
    /// "message" for participant messages, "transition" for the
    /// system-generated entries paired with order-status changes
    pub kind: &'static str,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for ConversationEntry {
    fn from(message: Message) -> Self {
        Self {
            kind: if message.system_generated {
                "transition"
            } else {
                "message"
            },
            sender_id: message.sender_id,
            content: message.content,
            created_at: message.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_kind_follows_system_flag() {
        let base = Message {
            id: Uuid::nil(),
            conversation_id: Uuid::nil(),
            sender_id: Uuid::nil(),
            content: "hello".to_string(),
            system_generated: false,
            created_at: Utc::now(),
        };
        assert_eq!(ConversationEntry::from(base.clone()).kind, "message");
        let system = Message {
            system_generated: true,
            ..base
        };
        assert_eq!(ConversationEntry::from(system).kind, "transition");
    }
}
