use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewSeat, Seat, SeatStatus},
    traits::StorageError,
};

/// Reserves the seat with a single conditional update. The `status = 'AVAILABLE'` predicate is what makes this safe
/// under concurrency: SQLite serialises writers, so only the first of several racing updates matches the row.
pub async fn reserve_seat(seat_id: i64, showing_id: i64, conn: &mut SqliteConnection) -> Result<Seat, StorageError> {
    let reserved: Option<Seat> = sqlx::query_as(
        r#"
            UPDATE show_seats SET status = 'BOOKED', updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND showing_id = $2 AND status = 'AVAILABLE'
            RETURNING *;
        "#,
    )
    .bind(seat_id)
    .bind(showing_id)
    .fetch_optional(&mut *conn)
    .await?;
    match reserved {
        Some(seat) => {
            trace!("🪑️ Seat {} ({}) reserved for showing {showing_id}", seat.id, seat.name);
            Ok(seat)
        },
        None => match fetch_seat_in_showing(seat_id, showing_id, conn).await? {
            Some(seat) => {
                debug!("🪑️ Seat {seat_id} could not be reserved. It is {}", seat.status);
                Err(StorageError::SeatNotAvailable(seat_id))
            },
            None => Err(StorageError::SeatNotFound(seat_id)),
        },
    }
}

/// Returns a booked seat to the available pool. Seats that are already available, or out of service, are untouched.
pub async fn release_seat(seat_id: i64, conn: &mut SqliteConnection) -> Result<(), StorageError> {
    let result = sqlx::query(
        "UPDATE show_seats SET status = 'AVAILABLE', updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND status = \
         'BOOKED'",
    )
    .bind(seat_id)
    .execute(conn)
    .await?;
    trace!("🪑️ Release seat {seat_id}: {} rows affected", result.rows_affected());
    Ok(())
}

pub async fn fetch_seat(seat_id: i64, conn: &mut SqliteConnection) -> Result<Option<Seat>, sqlx::Error> {
    let seat = sqlx::query_as("SELECT * FROM show_seats WHERE id = $1").bind(seat_id).fetch_optional(conn).await?;
    Ok(seat)
}

pub async fn fetch_seat_in_showing(
    seat_id: i64,
    showing_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Seat>, sqlx::Error> {
    let seat = sqlx::query_as("SELECT * FROM show_seats WHERE id = $1 AND showing_id = $2")
        .bind(seat_id)
        .bind(showing_id)
        .fetch_optional(conn)
        .await?;
    Ok(seat)
}

pub async fn fetch_seats_for_showing(showing_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Seat>, sqlx::Error> {
    let seats = sqlx::query_as("SELECT * FROM show_seats WHERE showing_id = $1 ORDER BY id ASC")
        .bind(showing_id)
        .fetch_all(conn)
        .await?;
    Ok(seats)
}

/// Fetches the given seats in the same order as `seat_ids`.
pub async fn fetch_seats(seat_ids: &[i64], conn: &mut SqliteConnection) -> Result<Vec<Seat>, sqlx::Error> {
    if seat_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM show_seats WHERE id IN (");
    let mut ids = builder.separated(", ");
    for id in seat_ids {
        ids.push_bind(*id);
    }
    builder.push(")");
    trace!("🪑️ Executing query: {}", builder.sql());
    let mut found: Vec<Seat> = builder.build_query_as::<Seat>().fetch_all(conn).await?;
    let mut ordered = Vec::with_capacity(found.len());
    for id in seat_ids {
        if let Some(pos) = found.iter().position(|s| s.id == *id) {
            ordered.push(found.swap_remove(pos));
        }
    }
    Ok(ordered)
}

pub async fn count_seats_with_status(
    showing_id: i64,
    status: SeatStatus,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM show_seats WHERE showing_id = $1 AND status = $2")
        .bind(showing_id)
        .bind(status)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

pub async fn insert_seat(showing_id: i64, seat: NewSeat, conn: &mut SqliteConnection) -> Result<Seat, sqlx::Error> {
    let seat = sqlx::query_as(
        r#"
            INSERT INTO show_seats (showing_id, name, seat_class, price)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(showing_id)
    .bind(seat.name)
    .bind(seat.seat_class)
    .bind(seat.price)
    .fetch_one(conn)
    .await?;
    Ok(seat)
}
