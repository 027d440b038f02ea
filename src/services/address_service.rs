//! Shipping address service: the find-or-create upsert keyed on
//! `(transaction_id, person_id, address_type)` and the seller
//! acceptance flow built on top of it.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        shipping_address::{AddressFields, AddressType, ShippingAddress},
        transaction::{OrderEvent, Transaction},
    },
    services::{message_service, transaction_service},
};

/// Find-or-create on a caller-supplied connection.
///
/// Returns the stored row and whether it was newly created. An
/// existing row for the key is updated in place; the unique index on
/// the key backs this up under concurrent callers.
pub async fn upsert_address_on(
    conn: &mut PgConnection,
    transaction_id: Uuid,
    person_id: Uuid,
    address_type: AddressType,
    fields: &AddressFields,
) -> Result<(ShippingAddress, bool), AppError> {
    let existing = sqlx::query_as::<_, ShippingAddress>(
        r#"
        SELECT * FROM shipping_addresses
        WHERE transaction_id = $1 AND person_id = $2 AND address_type = $3
        FOR UPDATE
        "#,
    )
    .bind(transaction_id)
    .bind(person_id)
    .bind(address_type.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    let address = match existing {
        Some(address) => {
            let updated = sqlx::query_as::<_, ShippingAddress>(
                r#"
                UPDATE shipping_addresses
                SET status = $1,
                    name = $2,
                    phone = $3,
                    street1 = $4,
                    street2 = $5,
                    city = $6,
                    state_or_province = $7,
                    postal_code = $8,
                    country = $9,
                    updated_at = NOW()
                WHERE id = $10
                RETURNING *
                "#,
            )
            .bind(&fields.status)
            .bind(&fields.name)
            .bind(&fields.phone)
            .bind(&fields.street1)
            .bind(&fields.street2)
            .bind(&fields.city)
            .bind(&fields.state_or_province)
            .bind(&fields.postal_code)
            .bind(&fields.country)
            .bind(address.id)
            .fetch_one(&mut *conn)
            .await?;
            return Ok((updated, false));
        }
        None => {
            sqlx::query_as::<_, ShippingAddress>(
                r#"
                INSERT INTO shipping_addresses (
                    transaction_id,
                    person_id,
                    address_type,
                    status,
                    name,
                    phone,
                    street1,
                    street2,
                    city,
                    state_or_province,
                    postal_code,
                    country
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING *
                "#,
            )
            .bind(transaction_id)
            .bind(person_id)
            .bind(address_type.as_str())
            .bind(&fields.status)
            .bind(&fields.name)
            .bind(&fields.phone)
            .bind(&fields.street1)
            .bind(&fields.street2)
            .bind(&fields.city)
            .bind(&fields.state_or_province)
            .bind(&fields.postal_code)
            .bind(&fields.country)
            .fetch_one(&mut *conn)
            .await?
        }
    };

    Ok((address, true))
}

/// [`upsert_address_on`] in its own database transaction.
pub async fn upsert_address(
    pool: &DbPool,
    transaction_id: Uuid,
    person_id: Uuid,
    address_type: AddressType,
    fields: &AddressFields,
) -> Result<(ShippingAddress, bool), AppError> {
    let mut tx = pool.begin().await?;

    match upsert_address_on(&mut *tx, transaction_id, person_id, address_type, fields).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(error) => {
            tx.rollback().await?;
            Err(error)
        }
    }
}

/// Latest address on file for a person, preferring one side and
/// falling back to the other (buyer-first for checkout prefill,
/// seller-first for pickup).
pub async fn latest_address_with_fallback(
    pool: &DbPool,
    person_id: Uuid,
    preferred: AddressType,
    fallback: AddressType,
) -> Result<Option<ShippingAddress>, AppError> {
    for address_type in [preferred, fallback] {
        let address = sqlx::query_as::<_, ShippingAddress>(
            r#"
            SELECT * FROM shipping_addresses
            WHERE person_id = $1 AND address_type = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(person_id)
        .bind(address_type.as_str())
        .fetch_optional(pool)
        .await?;

        if address.is_some() {
            return Ok(address);
        }
    }

    Ok(None)
}

/// Save the seller's pickup address for an order.
///
/// # Process
///
/// First save of the address accepts the order: the
/// `payment_successful -> order_accepted` transition, its acceptance
/// message and the address row commit together, and the seller's
/// profile phone is backfilled afterwards. A later save only updates
/// the address in place, with no message and no status change.
///
/// Returns whether the order was accepted by this call.
pub async fn save_seller_address(
    pool: &DbPool,
    transaction: &Transaction,
    fields: &AddressFields,
    marketplace_name: &str,
) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    let existing_id: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT id FROM shipping_addresses
        WHERE transaction_id = $1 AND person_id = $2 AND address_type = $3
        "#,
    )
    .bind(transaction.id)
    .bind(transaction.listing_author_id)
    .bind(AddressType::Seller.as_str())
    .fetch_optional(&mut *tx)
    .await?;

    let accepted = existing_id.is_none();

    if accepted {
        // Transition first: a rejected event must leave the address
        // unrecorded too.
        if let Err(error) = transaction_service::transition_order_status(
            &mut *tx,
            transaction.id,
            OrderEvent::SellerAccepted,
            transaction.listing_author_id,
            &message_service::order_accepted_message(marketplace_name),
        )
        .await
        {
            tx.rollback().await?;
            return Err(error);
        }
    }

    if let Err(error) = upsert_address_on(
        &mut *tx,
        transaction.id,
        transaction.listing_author_id,
        AddressType::Seller,
        fields,
    )
    .await
    {
        tx.rollback().await?;
        return Err(error);
    }

    tx.commit().await?;

    if accepted {
        transaction_service::backfill_phone_number(
            pool,
            transaction.listing_author_id,
            &fields.phone,
        )
        .await?;
    }

    Ok(accepted)
}
