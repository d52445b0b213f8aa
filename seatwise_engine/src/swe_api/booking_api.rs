use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Booking, BookingStatus, NewBooking, Seat, Showing},
    queues::{QueueProducer, SpamReason, SpamSignal},
    swe_api::{booking_objects::BookingDetail, errors::ReservationError},
    traits::{AccountManagement, BookingManagement, ShowCatalog, StorageError},
};

pub const SEATS_FULL_MESSAGE: &str = "Sorry, seats of this show are full. Please choose another show";
pub const CANNOT_CANCEL_MESSAGE: &str = "This ticket can not be canceled";
pub const CONFIRM_BY_PAYING_MESSAGE: &str = "Bookings are confirmed by paying for them";

/// `BookingApi` creates, cancels and transitions bookings, and owns the seat allocation race.
///
/// Every operation takes the id of the calling account. Bookings that belong to somebody else are reported as not
/// found, so that callers cannot discover other users' bookings.
pub struct BookingApi<B> {
    db: B,
    spam: QueueProducer<SpamSignal>,
}

impl<B> Debug for BookingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BookingApi")
    }
}

impl<B> BookingApi<B> {
    pub fn new(db: B, spam: QueueProducer<SpamSignal>) -> Self {
        Self { db, spam }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> BookingApi<B>
where B: BookingManagement + AccountManagement + ShowCatalog
{
    /// Reserves the given seats for the account and records a `PENDING` booking.
    ///
    /// Seats are reserved one at a time, each with its own atomic compare-and-set. If any seat fails, the seats
    /// already reserved by this call are released again before the error is returned, so a failed request never
    /// leaves seats held.
    ///
    /// Duplicate seat ids are collapsed. An empty seat list is rejected.
    pub async fn create_booking(
        &self,
        account_id: i64,
        showing_id: i64,
        seat_ids: &[i64],
    ) -> Result<Booking, ReservationError> {
        if seat_ids.is_empty() {
            return Err(ReservationError::BadRequest("At least one seat must be selected".to_string()));
        }
        let seat_ids = unique_in_order(seat_ids);
        let account = self
            .db
            .fetch_account(account_id)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("Account ID {account_id} is not found")))?;
        let showing = self.fetch_showing(showing_id).await?;
        self.check_capacity(&showing).await?;

        let mut reserved = Vec::with_capacity(seat_ids.len());
        for seat_id in &seat_ids {
            match self.db.reserve_seat(*seat_id, showing.id).await {
                Ok(seat) => reserved.push(seat.id),
                Err(e) => {
                    debug!("🎟️ Could not reserve seat {seat_id} for account {}. {e}", account.id);
                    self.release_all(&reserved).await;
                    return Err(e.into());
                },
            }
        }
        let new_booking = NewBooking::new(account.id, showing.id, reserved.clone());
        let booking = match self.db.insert_booking(new_booking).await {
            Ok(b) => b,
            Err(e) => {
                error!("🎟️ Seats were reserved but the booking could not be saved. Releasing them. {e}");
                self.release_all(&reserved).await;
                return Err(e.into());
            },
        };
        info!(
            "🎟️ Booking {} created for account {} on showing {}. Seats: {:?}",
            booking.id, account.id, showing.id, booking.seat_ids
        );
        Ok(booking)
    }

    /// Cancels the booking and releases its seats. Only `PENDING` and `BOOKED` bookings can be canceled.
    ///
    /// A pending payment for the booking is canceled with it, and a paid one is marked as returned.
    pub async fn cancel_booking(&self, account_id: i64, booking_id: i64) -> Result<Booking, ReservationError> {
        let booking = self.fetch_owned_booking(account_id, booking_id).await?;
        if !matches!(booking.status, BookingStatus::Pending | BookingStatus::Booked) {
            return Err(ReservationError::BadRequest(CANNOT_CANCEL_MESSAGE.to_string()));
        }
        let canceled = self.db.cancel_booking(booking_id).await.map_err(|e| match e {
            StorageError::BookingStatusConflict { .. } => ReservationError::BadRequest(CANNOT_CANCEL_MESSAGE.into()),
            e => e.into(),
        })?;
        info!("🎟️ Booking {booking_id} canceled by account {account_id}");
        Ok(canceled)
    }

    pub async fn get_booking(&self, account_id: i64, booking_id: i64) -> Result<BookingDetail, ReservationError> {
        let booking = self.fetch_owned_booking(account_id, booking_id).await?;
        let showing = self.fetch_showing(booking.showing_id).await?;
        let seats = self.db.fetch_seats(&booking.seat_ids).await?;
        Ok(BookingDetail::new(booking, showing, seats))
    }

    pub async fn list_bookings(&self, account_id: i64) -> Result<Vec<Booking>, ReservationError> {
        let bookings = self.db.fetch_bookings_for_account(account_id).await?;
        Ok(bookings)
    }

    /// The status changes a customer may ask for: cancelling a booking, or re-opening it as `PENDING`.
    ///
    /// A booking only becomes `BOOKED` once its payment has been received, so asking for `BOOKED` is refused.
    pub async fn request_booking_status(
        &self,
        account_id: i64,
        booking_id: i64,
        target: BookingStatus,
    ) -> Result<Booking, ReservationError> {
        if target == BookingStatus::Booked {
            debug!("🎟️ Account {account_id} asked to confirm booking {booking_id} without paying. Refused.");
            return Err(ReservationError::BadRequest(CONFIRM_BY_PAYING_MESSAGE.to_string()));
        }
        self.set_booking_status(account_id, booking_id, target).await
    }

    /// Moves the booking to `target`. This is the operator-level transition; customer requests go through
    /// [`Self::request_booking_status`].
    ///
    /// * `CANCELED` behaves exactly like [`Self::cancel_booking`].
    /// * `BOOKED` force-confirms a `PENDING` booking.
    /// * `PENDING` re-opens a booked or canceled booking. The booking is replaced by a new one with a new id, for
    ///   the same seats. The seats are validated again, so re-opening fails with a conflict if any of them has been
    ///   taken in the meantime. Payments of the old booking are handed back.
    ///
    /// Returns the booking in its new state (for a re-open, the replacement booking).
    pub async fn set_booking_status(
        &self,
        account_id: i64,
        booking_id: i64,
        target: BookingStatus,
    ) -> Result<Booking, ReservationError> {
        use BookingStatus::*;
        if target == Canceled {
            return self.cancel_booking(account_id, booking_id).await;
        }
        let booking = self.fetch_owned_booking(account_id, booking_id).await?;
        match (booking.status, target) {
            (old, new) if old == new => {
                Err(ReservationError::BadRequest(format!("Booking {booking_id} is already {new}")))
            },
            (Pending, Booked) => {
                let booking = self.db.confirm_booking(booking_id).await?;
                info!("🎟️ Booking {booking_id} force-confirmed");
                Ok(booking)
            },
            (Canceled, Booked) => Err(ReservationError::BadRequest(format!(
                "Booking {booking_id} is canceled. Re-open it before confirming it"
            ))),
            (_, Pending) => {
                let result = self.db.reopen_booking(booking_id).await?;
                info!("🎟️ Booking {booking_id} was re-opened as booking {}", result.new_booking.id);
                Ok(result.new_booking)
            },
            (old, new) => Err(ReservationError::BadRequest(format!(
                "Booking {booking_id} cannot change from {old} to {new}"
            ))),
        }
    }

    /// The seat map for a showing.
    pub async fn seat_map(&self, showing_id: i64) -> Result<Vec<Seat>, ReservationError> {
        let showing = self.fetch_showing(showing_id).await?;
        let seats = self.db.fetch_seats_for_showing(showing.id).await?;
        Ok(seats)
    }

    /// Reports suspicious activity by the account to the abuse throttle.
    pub fn flag_suspicious(&self, account_id: i64, reason: SpamReason) {
        debug!("🎟️ Flagging account {account_id} as suspicious ({reason:?})");
        self.spam.push(SpamSignal::new(account_id, reason));
    }

    async fn fetch_showing(&self, showing_id: i64) -> Result<Showing, ReservationError> {
        self.db
            .fetch_showing(showing_id)
            .await?
            .ok_or_else(|| ReservationError::NotFound(format!("Showing ID {showing_id} is not found")))
    }

    async fn fetch_owned_booking(&self, account_id: i64, booking_id: i64) -> Result<Booking, ReservationError> {
        match self.db.fetch_booking(booking_id).await? {
            Some(b) if b.account_id == account_id => Ok(b),
            _ => Err(ReservationError::booking_not_found(booking_id)),
        }
    }

    /// Fast-fails when the hall is sold out. This check is advisory; the per-seat reservation is what actually
    /// prevents overselling.
    async fn check_capacity(&self, showing: &Showing) -> Result<(), ReservationError> {
        let active = self.db.count_active_bookings(showing.id).await?;
        if active < showing.capacity {
            return Ok(());
        }
        let available = self.db.count_available_seats(showing.id).await?;
        if available == 0 {
            debug!("🎟️ Showing {} is full. {active} active bookings, no seats available", showing.id);
            return Err(ReservationError::ResourceLocked(SEATS_FULL_MESSAGE.to_string()));
        }
        Ok(())
    }

    async fn release_all(&self, seat_ids: &[i64]) {
        for seat_id in seat_ids {
            if let Err(e) = self.db.release_seat(*seat_id).await {
                error!("🎟️ Could not release seat {seat_id}. It may stay held until an operator frees it. {e}");
            }
        }
    }
}

fn unique_in_order(ids: &[i64]) -> Vec<i64> {
    let mut result = Vec::with_capacity(ids.len());
    for id in ids {
        if !result.contains(id) {
            result.push(*id);
        }
    }
    result
}

#[cfg(test)]
mod test {
    use super::unique_in_order;

    #[test]
    fn duplicate_seats_are_collapsed() {
        assert_eq!(unique_in_order(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert_eq!(unique_in_order(&[]), Vec::<i64>::new());
    }
}
