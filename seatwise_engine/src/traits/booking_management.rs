use crate::{
    db_types::{Booking, NewBooking},
    traits::{data_objects::BookingReopened, SeatInventory, StorageError},
};

/// Persistence and atomic status transitions for bookings.
///
/// Backends must guarantee that every method in this trait that touches more than one row does so within a single
/// transaction, so that the cancel-releases-seats and re-open-revalidates-seats side effects are never half applied.
#[allow(async_fn_in_trait)]
pub trait BookingManagement: Clone + SeatInventory {
    /// The number of non-canceled bookings for the showing.
    async fn count_active_bookings(&self, showing_id: i64) -> Result<i64, StorageError>;

    /// Stores a new `PENDING` booking along with its ordered seat list. The seats must already have been reserved.
    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StorageError>;

    async fn fetch_booking(&self, booking_id: i64) -> Result<Option<Booking>, StorageError>;

    /// All bookings for the account, most recent first.
    async fn fetch_bookings_for_account(&self, account_id: i64) -> Result<Vec<Booking>, StorageError>;

    /// All `PENDING` bookings, oldest first. If `min_age_secs` is given, only bookings created at least that many
    /// seconds ago are returned.
    async fn fetch_pending_bookings(&self, min_age_secs: Option<i64>) -> Result<Vec<Booking>, StorageError>;

    /// Moves a `PENDING` or `BOOKED` booking to `CANCELED`, releases all of its seats and settles its payments
    /// (`PAID` to `RETURNED`, `PENDING` to `CANCELED`).
    ///
    /// Fails with [`StorageError::BookingStatusConflict`] if the booking is already canceled.
    async fn cancel_booking(&self, booking_id: i64) -> Result<Booking, StorageError>;

    /// Moves a `PENDING` booking to `BOOKED`. Seats are unaffected.
    async fn confirm_booking(&self, booking_id: i64) -> Result<Booking, StorageError>;

    /// Replaces a non-pending booking with a brand-new `PENDING` booking for the same account, showing and seats.
    ///
    /// The old booking's seats are released and then reserved again for the replacement. If any of them cannot be
    /// reserved, nothing changes and the error is returned. Payments for the old booking are settled: `PAID` payments
    /// become `RETURNED` and `PENDING` payments are canceled.
    async fn reopen_booking(&self, booking_id: i64) -> Result<BookingReopened, StorageError>;
}
