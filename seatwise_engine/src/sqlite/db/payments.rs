use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPayment, Payment, PaymentStatus},
    traits::StorageError,
};

/// Inserts a `PENDING` payment unless the booking already has one. The existence check is part of the insert
/// statement itself, so there is no window between check and write.
pub async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<Payment, StorageError> {
    let booking_id = payment.booking_id;
    let inserted: Option<Payment> = sqlx::query_as(
        r#"
            INSERT INTO payments (booking_id, account_id, amount, method)
            SELECT $1, $2, $3, $4
            WHERE NOT EXISTS (SELECT 1 FROM payments WHERE booking_id = $1)
            RETURNING *;
        "#,
    )
    .bind(payment.booking_id)
    .bind(payment.account_id)
    .bind(payment.amount)
    .bind(payment.method)
    .fetch_optional(conn)
    .await?;
    match inserted {
        Some(p) => {
            debug!("💳️ Payment {} for booking {booking_id} saved. Amount: {}", p.id, p.amount);
            Ok(p)
        },
        None => Err(StorageError::PaymentAlreadyExists(booking_id)),
    }
}

pub async fn fetch_payment(payment_id: i64, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    let payment =
        sqlx::query_as("SELECT * FROM payments WHERE id = $1").bind(payment_id).fetch_optional(conn).await?;
    Ok(payment)
}

pub async fn fetch_payment_for_booking(
    booking_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE booking_id = $1 ORDER BY id DESC LIMIT 1")
        .bind(booking_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

pub async fn fetch_payments_for_account(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Payment>, sqlx::Error> {
    let payments = sqlx::query_as("SELECT * FROM payments WHERE account_id = $1 ORDER BY id DESC")
        .bind(account_id)
        .fetch_all(conn)
        .await?;
    Ok(payments)
}

/// Compare-and-set on the payment status. Returns `None` if the payment does not exist or is not in `from` status.
pub async fn update_payment_status(
    payment_id: i64,
    from: PaymentStatus,
    to: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = $3
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(payment_id)
    .bind(from)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// Hands back the money for a booking that is being replaced: paid payments are returned and pending ones canceled.
pub async fn settle_payments_for_booking(
    booking_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Payment>, sqlx::Error> {
    let payments = sqlx::query_as(
        r#"
            UPDATE payments SET
                status = CASE status WHEN 'PAID' THEN 'RETURNED' ELSE 'CANCELED' END,
                updated_at = CURRENT_TIMESTAMP
            WHERE booking_id = $1 AND status IN ('PAID', 'PENDING')
            RETURNING *;
        "#,
    )
    .bind(booking_id)
    .fetch_all(conn)
    .await?;
    Ok(payments)
}

/// Explains why a status transition on the payment did not apply.
pub async fn status_conflict(payment_id: i64, conn: &mut SqliteConnection) -> Result<StorageError, sqlx::Error> {
    let err = match fetch_payment(payment_id, conn).await? {
        Some(p) => StorageError::PaymentStatusConflict { id: payment_id, status: p.status },
        None => StorageError::PaymentNotFound(payment_id),
    };
    Ok(err)
}
