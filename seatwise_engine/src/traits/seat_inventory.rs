use crate::{
    db_types::{Seat, SeatStatus},
    traits::StorageError,
};

/// Per-showing seat records and their availability.
///
/// `reserve_seat` and `release_seat` are the only operations that mutate a seat's status.
#[allow(async_fn_in_trait)]
pub trait SeatInventory: Clone {
    /// Atomically moves the seat from `AVAILABLE` to `BOOKED`.
    ///
    /// Fails with [`StorageError::SeatNotFound`] if the seat does not belong to `showing_id`, and with
    /// [`StorageError::SeatNotAvailable`] if the seat is in any status other than `AVAILABLE`. When several callers
    /// race for the same seat, exactly one of them succeeds.
    async fn reserve_seat(&self, seat_id: i64, showing_id: i64) -> Result<Seat, StorageError>;

    /// Sets the seat back to `AVAILABLE`. Releasing an available seat is a no-op, and releasing an unknown seat is
    /// not an error.
    async fn release_seat(&self, seat_id: i64) -> Result<(), StorageError>;

    async fn count_available_seats(&self, showing_id: i64) -> Result<i64, StorageError>;

    async fn count_seats_with_status(&self, showing_id: i64, status: SeatStatus) -> Result<i64, StorageError>;

    async fn fetch_seat(&self, seat_id: i64) -> Result<Option<Seat>, StorageError>;

    /// The seat map for a showing, ordered by seat id.
    async fn fetch_seats_for_showing(&self, showing_id: i64) -> Result<Vec<Seat>, StorageError>;

    /// Fetches the given seats, preserving the order of `seat_ids`. Unknown ids are skipped.
    async fn fetch_seats(&self, seat_ids: &[i64]) -> Result<Vec<Seat>, StorageError>;
}
