//! Conversation messages: posting, loading, and the fixed templates
//! paired with order-status transitions.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{db::DbPool, error::AppError, models::message::Message};

/// Insert a message into a conversation.
///
/// Runs on a caller-supplied connection so transition messages commit
/// atomically with their status update.
pub async fn post_message(
    conn: &mut PgConnection,
    conversation_id: Uuid,
    sender_id: Uuid,
    content: &str,
    system_generated: bool,
) -> Result<Message, AppError> {
    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (conversation_id, sender_id, content, system_generated)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(conversation_id)
    .bind(sender_id)
    .bind(content)
    .bind(system_generated)
    .fetch_one(conn)
    .await?;

    Ok(message)
}

/// All messages of a conversation, oldest first.
pub async fn conversation_messages(
    pool: &DbPool,
    conversation_id: Uuid,
) -> Result<Vec<Message>, AppError> {
    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC",
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Message appended when the gateway confirms a payment. Written in the
/// buyer's voice, addressed to the seller.
pub fn payment_received_message(
    seller_given_name: &str,
    amount: &str,
    productinfo: &str,
    txnid: &str,
    marketplace_name: &str,
) -> String {
    format!(
        "Dear {seller_given_name},\n\
         I have successfully made the payment of Rs.{amount} to {marketplace_name} towards your listing \"{productinfo}\". Transaction reference number is {txnid}.\n\
         Kindly acknowledge that the product is with you and ready to ship by replying \"I accept\" to this message. Along with this, please ensure your bank details are updated.\n\
         Once the product reaches me and is acceptable, I will also reply back \"I accept\" to your message and {marketplace_name} will release the payment to your bank account.\n\
         Thanks."
    )
}

/// Message appended when the gateway reports a failed payment.
pub fn payment_failed_message(
    seller_given_name: &str,
    amount: &str,
    productinfo: &str,
    marketplace_name: &str,
) -> String {
    format!(
        "Dear {seller_given_name},\n\
         Attempt to make payment of Rs.{amount} to {marketplace_name} towards your listing \"{productinfo}\" failed due to some reason.\n\
         If I am still interested, I will retry. This transaction stands closed.\n\
         Thanks."
    )
}

/// Message appended when the seller shares a pickup address for the
/// first time, accepting the order.
pub fn order_accepted_message(marketplace_name: &str) -> String {
    format!(
        "I have accepted the transaction and shared my pickup details with {marketplace_name}. \
         We will hear from {marketplace_name} in next 24 hours about the next steps."
    )
}

/// Message appended when the seller declines the order.
pub fn order_declined_message(marketplace_name: &str) -> String {
    format!(
        "The product is not available for sale anymore. You will receive a refund from \
         {marketplace_name} within 7 working days. Apologies for the inconvenience caused. \
         The listing is now closed."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_received_mentions_amount_and_reference() {
        let content = payment_received_message(
            "Ravi",
            "1500.00",
            "Wooden rocking horse",
            "20260115abc",
            "SecondCry",
        );
        assert!(content.starts_with("Dear Ravi,"));
        assert!(content.contains("Rs.1500.00"));
        assert!(content.contains("\"Wooden rocking horse\""));
        assert!(content.contains("Transaction reference number is 20260115abc."));
    }

    #[test]
    fn payment_failed_marks_transaction_closed() {
        let content = payment_failed_message("Ravi", "1500.00", "Wooden rocking horse", "SecondCry");
        assert!(content.contains("failed due to some reason"));
        assert!(content.contains("This transaction stands closed."));
    }

    #[test]
    fn seller_templates_name_the_marketplace() {
        assert!(order_accepted_message("SecondCry").contains("pickup details with SecondCry"));
        assert!(order_declined_message("SecondCry").contains("refund from SecondCry"));
    }
}
