//! Transaction service - creating orders and driving the order-status
//! lifecycle.
//!
//! # Atomicity Guarantees
//!
//! A status transition and its paired system message commit in one
//! database transaction; a rejected event leaves both untouched.

use chrono::NaiveDate;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        listing::Listing,
        message::Message,
        transaction::{OrderEvent, OrderStatus, PaymentGateway, PaymentProcess, Transaction},
    },
    services::message_service,
};

/// Validate a booking date pair.
///
/// Both dates must come together, with the end strictly after the
/// start.
pub fn booking_range(
    start_on: Option<NaiveDate>,
    end_on: Option<NaiveDate>,
) -> Result<Option<(NaiveDate, NaiveDate)>, AppError> {
    match (start_on, end_on) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) if end > start => Ok(Some((start, end))),
        (Some(_), Some(_)) => Err(AppError::InvalidRequest(
            "Booking end date must be after the start date".to_string(),
        )),
        _ => Err(AppError::InvalidRequest(
            "Booking requires both start and end dates".to_string(),
        )),
    }
}

/// Ordered quantity: the booked day span when a range is given, the
/// requested quantity otherwise.
pub fn resolve_quantity(quantity: i32, booking: Option<(NaiveDate, NaiveDate)>) -> i32 {
    match booking {
        Some((start, end)) => (end - start).num_days() as i32,
        None => quantity,
    }
}

/// Create a transaction with its conversation and optional initial
/// buyer message.
///
/// # Process
///
/// 1. Start database transaction
/// 2. Insert the conversation between buyer and listing author
/// 3. Insert the initial message, when one was given
/// 4. Insert the transaction row, denormalizing listing title and
///    prices; `order_status` starts at `pending`
/// 5. Commit
///
/// The stored gateway is `none` for free-process listings regardless
/// of the configured gateway.
///
/// Returns the transaction and the initial message, when one was
/// posted.
pub async fn create_transaction(
    pool: &DbPool,
    listing: &Listing,
    starter_id: Uuid,
    gateway: PaymentGateway,
    message: Option<&str>,
    quantity: i32,
    booking: Option<(NaiveDate, NaiveDate)>,
) -> Result<(Transaction, Option<Message>), AppError> {
    if quantity < 1 {
        return Err(AppError::InvalidRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let stored_gateway = if listing.payment_process == PaymentProcess::None {
        PaymentGateway::None
    } else {
        gateway
    };

    let mut tx = pool.begin().await?;

    let conversation_id: Uuid = sqlx::query_scalar(
        "INSERT INTO conversations (starter_id, author_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(starter_id)
    .bind(listing.author_id)
    .fetch_one(&mut *tx)
    .await?;

    let mut initial_message = None;
    if let Some(content) = message {
        initial_message = Some(
            message_service::post_message(&mut *tx, conversation_id, starter_id, content, false)
                .await?,
        );
    }

    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            listing_id,
            listing_title,
            starter_id,
            listing_author_id,
            conversation_id,
            unit_price_cents,
            shipping_price_cents,
            listing_quantity,
            payment_process,
            payment_gateway,
            booking_start,
            booking_end
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(listing.id)
    .bind(&listing.title)
    .bind(starter_id)
    .bind(listing.author_id)
    .bind(conversation_id)
    .bind(listing.price_cents)
    .bind(listing.shipping_price_cents)
    .bind(quantity)
    .bind(listing.payment_process)
    .bind(stored_gateway.as_str())
    .bind(booking.map(|(start, _)| start))
    .bind(booking.map(|(_, end)| end))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((transaction, initial_message))
}

/// Get transaction by ID.
pub async fn get_transaction_by_id(
    pool: &DbPool,
    transaction_id: Uuid,
) -> Result<Option<Transaction>, AppError> {
    let transaction = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
        .bind(transaction_id)
        .fetch_optional(pool)
        .await?;

    Ok(transaction)
}

/// Apply an order-status event and append its paired system message.
///
/// Runs on a caller-supplied connection; callers that have no wider
/// unit of work use [`apply_order_event`]. The current status row is
/// locked, the event is checked against the lifecycle graph, and a
/// rejected event returns `OrderStatusConflict` without writing
/// anything.
pub async fn transition_order_status(
    conn: &mut PgConnection,
    transaction_id: Uuid,
    event: OrderEvent,
    sender_id: Uuid,
    message_content: &str,
) -> Result<Transaction, AppError> {
    let status: OrderStatus =
        sqlx::query_scalar("SELECT order_status FROM transactions WHERE id = $1 FOR UPDATE")
            .bind(transaction_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(AppError::TransactionNotFound)?;

    let next = status
        .apply(event)
        .ok_or(AppError::OrderStatusConflict { status, event })?;

    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        UPDATE transactions
        SET order_status = $1,
            updated_at = NOW()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(next)
    .bind(transaction_id)
    .fetch_one(&mut *conn)
    .await?;

    // Exactly one system message per applied transition.
    message_service::post_message(
        conn,
        transaction.conversation_id,
        sender_id,
        message_content,
        true,
    )
    .await?;

    Ok(transaction)
}

/// [`transition_order_status`] in its own database transaction.
pub async fn apply_order_event(
    pool: &DbPool,
    transaction_id: Uuid,
    event: OrderEvent,
    sender_id: Uuid,
    message_content: &str,
) -> Result<Transaction, AppError> {
    let mut tx = pool.begin().await?;

    match transition_order_status(&mut *tx, transaction_id, event, sender_id, message_content)
        .await
    {
        Ok(transaction) => {
            tx.commit().await?;
            Ok(transaction)
        }
        Err(error) => {
            tx.rollback().await?;
            Err(error)
        }
    }
}

/// Close a listing once a payment for it succeeds.
pub async fn close_listing(pool: &DbPool, listing_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE listings SET open = FALSE WHERE id = $1")
        .bind(listing_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Record that the viewer has opened the transaction.
pub async fn mark_seen(
    pool: &DbPool,
    transaction: &Transaction,
    viewer_id: Uuid,
) -> Result<(), AppError> {
    let column = if transaction.starter_id == viewer_id {
        "last_seen_by_starter_at"
    } else if transaction.listing_author_id == viewer_id {
        "last_seen_by_author_at"
    } else {
        return Ok(());
    };

    sqlx::query(&format!(
        "UPDATE transactions SET {column} = NOW() WHERE id = $1"
    ))
    .bind(transaction.id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Backfill a person's profile phone number when it is still blank.
pub async fn backfill_phone_number(
    pool: &DbPool,
    person_id: Uuid,
    phone: &str,
) -> Result<(), AppError> {
    if phone.trim().is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        UPDATE people
        SET phone_number = $1
        WHERE id = $2
          AND (phone_number IS NULL OR phone_number = '')
        "#,
    )
    .bind(phone)
    .bind(person_id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    #[test]
    fn booking_range_requires_a_full_pair() {
        assert_eq!(booking_range(None, None).unwrap(), None);
        assert!(booking_range(Some(date(10)), None).is_err());
        assert!(booking_range(None, Some(date(12))).is_err());
    }

    #[test]
    fn booking_range_requires_end_after_start() {
        assert_eq!(
            booking_range(Some(date(10)), Some(date(12))).unwrap(),
            Some((date(10), date(12)))
        );
        assert!(booking_range(Some(date(12)), Some(date(10))).is_err());
        assert!(booking_range(Some(date(10)), Some(date(10))).is_err());
    }

    #[test]
    fn booked_days_override_requested_quantity() {
        assert_eq!(resolve_quantity(5, Some((date(10), date(13)))), 3);
        assert_eq!(resolve_quantity(5, None), 5);
    }
}
