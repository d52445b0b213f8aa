use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use super::seats;
use crate::{
    db_types::{Booking, BookingRecord, BookingStatus, NewBooking},
    traits::StorageError,
};

/// Inserts the booking and its seat links. This is not atomic on its own; run it inside a transaction and pass
/// `&mut *tx` as the connection.
pub async fn insert_booking(booking: NewBooking, conn: &mut SqliteConnection) -> Result<Booking, sqlx::Error> {
    let record: BookingRecord =
        sqlx::query_as("INSERT INTO bookings (account_id, showing_id) VALUES ($1, $2) RETURNING *")
            .bind(booking.account_id)
            .bind(booking.showing_id)
            .fetch_one(&mut *conn)
            .await?;
    for (position, seat_id) in booking.seat_ids.iter().enumerate() {
        #[allow(clippy::cast_possible_wrap)]
        let position = position as i64;
        sqlx::query("INSERT INTO booking_seats (booking_id, seat_id, position) VALUES ($1, $2, $3)")
            .bind(record.id)
            .bind(*seat_id)
            .bind(position)
            .execute(&mut *conn)
            .await?;
    }
    debug!("🎟️ Booking {} saved with {} seats", record.id, booking.seat_ids.len());
    Ok(record.with_seats(booking.seat_ids))
}

pub async fn fetch_booking_record(
    booking_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<BookingRecord>, sqlx::Error> {
    let record =
        sqlx::query_as("SELECT * FROM bookings WHERE id = $1").bind(booking_id).fetch_optional(conn).await?;
    Ok(record)
}

pub async fn fetch_seat_ids(booking_id: i64, conn: &mut SqliteConnection) -> Result<Vec<i64>, sqlx::Error> {
    let ids = sqlx::query_scalar("SELECT seat_id FROM booking_seats WHERE booking_id = $1 ORDER BY position ASC")
        .bind(booking_id)
        .fetch_all(conn)
        .await?;
    Ok(ids)
}

/// Attaches the seat list to each booking record.
async fn hydrate(records: Vec<BookingRecord>, conn: &mut SqliteConnection) -> Result<Vec<Booking>, sqlx::Error> {
    let mut bookings = Vec::with_capacity(records.len());
    for record in records {
        let seat_ids = fetch_seat_ids(record.id, &mut *conn).await?;
        bookings.push(record.with_seats(seat_ids));
    }
    Ok(bookings)
}

pub async fn fetch_booking(booking_id: i64, conn: &mut SqliteConnection) -> Result<Option<Booking>, sqlx::Error> {
    match fetch_booking_record(booking_id, &mut *conn).await? {
        Some(record) => {
            let seat_ids = fetch_seat_ids(booking_id, conn).await?;
            Ok(Some(record.with_seats(seat_ids)))
        },
        None => Ok(None),
    }
}

pub async fn fetch_bookings_for_account(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Booking>, sqlx::Error> {
    let records = sqlx::query_as("SELECT * FROM bookings WHERE account_id = $1 ORDER BY id DESC")
        .bind(account_id)
        .fetch_all(&mut *conn)
        .await?;
    hydrate(records, conn).await
}

/// Fetches pending bookings, oldest first. When `min_age_secs` is given, only bookings created at least that long ago
/// are returned. The comparison goes through `datetime()` so that it is independent of the stored text format.
pub async fn fetch_pending_bookings(
    min_age_secs: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Booking>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM bookings WHERE status = 'PENDING'");
    if let Some(age) = min_age_secs {
        builder.push(" AND datetime(created_at) <= datetime('now', ");
        builder.push_bind(format!("-{} seconds", age.max(0)));
        builder.push(")");
    }
    builder.push(" ORDER BY created_at ASC, id ASC");
    trace!("🎟️ Executing query: {}", builder.sql());
    let records = builder.build_query_as::<BookingRecord>().fetch_all(&mut *conn).await?;
    hydrate(records, conn).await
}

pub async fn count_active_bookings(showing_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE showing_id = $1 AND status != 'CANCELED'")
        .bind(showing_id)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// Compare-and-set on the booking status. The row is only updated if its current status is one of `from`.
/// Returns `None` if the booking does not exist or is in some other status.
pub async fn update_booking_status(
    booking_id: i64,
    from: &[BookingStatus],
    to: BookingStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<BookingRecord>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE bookings SET status = ");
    builder.push_bind(to);
    builder.push(", updated_at = CURRENT_TIMESTAMP WHERE id = ");
    builder.push_bind(booking_id);
    builder.push(" AND status IN (");
    let mut statuses = builder.separated(", ");
    for status in from {
        statuses.push_bind(*status);
    }
    builder.push(") RETURNING *");
    let record = builder.build_query_as::<BookingRecord>().fetch_optional(conn).await?;
    Ok(record)
}

/// Takes the write lock on the booking row without changing it, returning the current record.
pub async fn touch_booking(booking_id: i64, conn: &mut SqliteConnection) -> Result<Option<BookingRecord>, sqlx::Error> {
    let record = sqlx::query_as("UPDATE bookings SET updated_at = updated_at WHERE id = $1 RETURNING *")
        .bind(booking_id)
        .fetch_optional(conn)
        .await?;
    Ok(record)
}

pub async fn delete_booking(booking_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM bookings WHERE id = $1").bind(booking_id).execute(conn).await?;
    Ok(())
}

/// Moves the booking to `CANCELED` if its status is one of `from`, and releases its seats. Returns `None` without
/// touching anything if the status did not match. Must run inside a transaction.
pub async fn cancel_booking(
    booking_id: i64,
    from: &[BookingStatus],
    conn: &mut SqliteConnection,
) -> Result<Option<Booking>, StorageError> {
    let record = match update_booking_status(booking_id, from, BookingStatus::Canceled, &mut *conn).await? {
        Some(r) => r,
        None => return Ok(None),
    };
    let seat_ids = fetch_seat_ids(booking_id, &mut *conn).await?;
    for seat_id in &seat_ids {
        seats::release_seat(*seat_id, &mut *conn).await?;
    }
    debug!("🎟️ Booking {booking_id} canceled. {} seats released", seat_ids.len());
    Ok(Some(record.with_seats(seat_ids)))
}

/// Explains why a status transition on the booking did not apply.
pub async fn status_conflict(booking_id: i64, conn: &mut SqliteConnection) -> Result<StorageError, sqlx::Error> {
    let err = match fetch_booking_record(booking_id, conn).await? {
        Some(record) => StorageError::BookingStatusConflict { id: booking_id, status: record.status },
        None => StorageError::BookingNotFound(booking_id),
    };
    Ok(err)
}
