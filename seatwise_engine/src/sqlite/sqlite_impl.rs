//! `SqliteDatabase` is a concrete implementation of a Seatwise engine backend.
//!
//! It uses SQLite as the storage engine and implements all the storage traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{accounts, bookings, db_url, new_pool, payments, seats, showings};
use crate::{
    db_types::{
        Account,
        AccountStatus,
        Booking,
        BookingStatus,
        NewAccount,
        NewBooking,
        NewPayment,
        NewSeat,
        NewShowing,
        Payment,
        PaymentStatus,
        Seat,
        SeatStatus,
        Showing,
        SpamCounter,
    },
    traits::{
        AccountManagement,
        BookingManagement,
        BookingReopened,
        PaymentManagement,
        PaymentSettled,
        SeatInventory,
        ShowCatalog,
        StorageError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SeatInventory for SqliteDatabase {
    async fn reserve_seat(&self, seat_id: i64, showing_id: i64) -> Result<Seat, StorageError> {
        // The update is the first statement of the transaction, so it takes the write lock straight away and the
        // busy handler retries it under contention.
        let mut tx = self.pool.begin().await?;
        let seat = seats::reserve_seat(seat_id, showing_id, &mut tx).await?;
        tx.commit().await?;
        Ok(seat)
    }

    async fn release_seat(&self, seat_id: i64) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        seats::release_seat(seat_id, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn count_available_seats(&self, showing_id: i64) -> Result<i64, StorageError> {
        self.count_seats_with_status(showing_id, SeatStatus::Available).await
    }

    async fn count_seats_with_status(&self, showing_id: i64, status: SeatStatus) -> Result<i64, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let count = seats::count_seats_with_status(showing_id, status, &mut conn).await?;
        Ok(count)
    }

    async fn fetch_seat(&self, seat_id: i64) -> Result<Option<Seat>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let seat = seats::fetch_seat(seat_id, &mut conn).await?;
        Ok(seat)
    }

    async fn fetch_seats_for_showing(&self, showing_id: i64) -> Result<Vec<Seat>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let seats = seats::fetch_seats_for_showing(showing_id, &mut conn).await?;
        Ok(seats)
    }

    async fn fetch_seats(&self, seat_ids: &[i64]) -> Result<Vec<Seat>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let seats = seats::fetch_seats(seat_ids, &mut conn).await?;
        Ok(seats)
    }
}

impl ShowCatalog for SqliteDatabase {
    async fn fetch_showing(&self, showing_id: i64) -> Result<Option<Showing>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let showing = showings::fetch_showing(showing_id, &mut conn).await?;
        Ok(showing)
    }

    async fn insert_showing(
        &self,
        showing: NewShowing,
        seat_layout: Vec<NewSeat>,
    ) -> Result<(Showing, Vec<Seat>), StorageError> {
        let mut tx = self.pool.begin().await?;
        let showing = showings::insert_showing(showing, &mut tx).await?;
        let mut created = Vec::with_capacity(seat_layout.len());
        for seat in seat_layout {
            created.push(seats::insert_seat(showing.id, seat, &mut tx).await?);
        }
        tx.commit().await?;
        debug!("🗃️ Showing {} ({}) created with {} seats", showing.id, showing.movie_name, created.len());
        Ok((showing, created))
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_account(&self, account_id: i64) -> Result<Option<Account>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let account = accounts::fetch_account(account_id, &mut conn).await?;
        Ok(account)
    }

    async fn fetch_account_by_username(&self, username: &str) -> Result<Option<Account>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let account = accounts::fetch_account_by_username(username, &mut conn).await?;
        Ok(account)
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account, StorageError> {
        let mut tx = self.pool.begin().await?;
        let account = accounts::insert_account(account, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }

    async fn set_account_status(&self, account_id: i64, status: AccountStatus) -> Result<Account, StorageError> {
        let mut tx = self.pool.begin().await?;
        let account = accounts::update_account_status(account_id, status, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }

    async fn increment_spam_counter(&self, account_id: i64) -> Result<SpamCounter, StorageError> {
        let mut tx = self.pool.begin().await?;
        let counter = accounts::increment_spam_counter(account_id, &mut tx).await?;
        tx.commit().await?;
        Ok(counter)
    }

    async fn fetch_spam_counter(&self, account_id: i64) -> Result<Option<SpamCounter>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let counter = accounts::fetch_spam_counter(account_id, &mut conn).await?;
        Ok(counter)
    }
}

impl BookingManagement for SqliteDatabase {
    async fn count_active_bookings(&self, showing_id: i64) -> Result<i64, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let count = bookings::count_active_bookings(showing_id, &mut conn).await?;
        Ok(count)
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StorageError> {
        let mut tx = self.pool.begin().await?;
        let booking = bookings::insert_booking(booking, &mut tx).await?;
        tx.commit().await?;
        Ok(booking)
    }

    async fn fetch_booking(&self, booking_id: i64) -> Result<Option<Booking>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let booking = bookings::fetch_booking(booking_id, &mut conn).await?;
        Ok(booking)
    }

    async fn fetch_bookings_for_account(&self, account_id: i64) -> Result<Vec<Booking>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let bookings = bookings::fetch_bookings_for_account(account_id, &mut conn).await?;
        Ok(bookings)
    }

    async fn fetch_pending_bookings(&self, min_age_secs: Option<i64>) -> Result<Vec<Booking>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let bookings = bookings::fetch_pending_bookings(min_age_secs, &mut conn).await?;
        Ok(bookings)
    }

    async fn cancel_booking(&self, booking_id: i64) -> Result<Booking, StorageError> {
        let mut tx = self.pool.begin().await?;
        let from = [BookingStatus::Pending, BookingStatus::Booked];
        let booking = match bookings::cancel_booking(booking_id, &from, &mut tx).await? {
            Some(b) => b,
            None => return Err(bookings::status_conflict(booking_id, &mut tx).await?),
        };
        let settled = payments::settle_payments_for_booking(booking_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Booking {booking_id} canceled. {} payments settled", settled.len());
        Ok(booking)
    }

    async fn confirm_booking(&self, booking_id: i64) -> Result<Booking, StorageError> {
        let mut tx = self.pool.begin().await?;
        let from = [BookingStatus::Pending];
        let record = match bookings::update_booking_status(booking_id, &from, BookingStatus::Booked, &mut tx).await? {
            Some(r) => r,
            None => return Err(bookings::status_conflict(booking_id, &mut tx).await?),
        };
        let seat_ids = bookings::fetch_seat_ids(booking_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Booking {booking_id} confirmed");
        Ok(record.with_seats(seat_ids))
    }

    async fn reopen_booking(&self, booking_id: i64) -> Result<BookingReopened, StorageError> {
        let mut tx = self.pool.begin().await?;
        let record =
            bookings::touch_booking(booking_id, &mut tx).await?.ok_or(StorageError::BookingNotFound(booking_id))?;
        if record.status == BookingStatus::Pending {
            return Err(StorageError::BookingStatusConflict { id: booking_id, status: record.status });
        }
        let seat_ids = bookings::fetch_seat_ids(booking_id, &mut tx).await?;
        let old_booking = record.with_seats(seat_ids.clone());
        // A BOOKED booking still holds its seats and hands them straight to the replacement. A canceled one released
        // them, so they have to be won back. Any seat taken in the meantime aborts the whole re-open.
        if old_booking.status == BookingStatus::Canceled {
            for seat_id in &seat_ids {
                seats::reserve_seat(*seat_id, old_booking.showing_id, &mut tx).await?;
            }
        }
        let settled_payments = payments::settle_payments_for_booking(booking_id, &mut tx).await?;
        bookings::delete_booking(booking_id, &mut tx).await?;
        let replacement = NewBooking::new(old_booking.account_id, old_booking.showing_id, seat_ids);
        let new_booking = bookings::insert_booking(replacement, &mut tx).await?;
        tx.commit().await?;
        info!(
            "🗃️ Booking {booking_id} re-opened as booking {}. {} payments settled",
            new_booking.id,
            settled_payments.len()
        );
        Ok(BookingReopened { old_booking, new_booking, settled_payments })
    }
}

impl PaymentManagement for SqliteDatabase {
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, StorageError> {
        let mut tx = self.pool.begin().await?;
        let payment = payments::insert_payment(payment, &mut tx).await?;
        tx.commit().await?;
        Ok(payment)
    }

    async fn fetch_payment(&self, payment_id: i64) -> Result<Option<Payment>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment(payment_id, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_payment_for_booking(&self, booking_id: i64) -> Result<Option<Payment>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_for_booking(booking_id, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_payments_for_account(&self, account_id: i64) -> Result<Vec<Payment>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let payments = payments::fetch_payments_for_account(account_id, &mut conn).await?;
        Ok(payments)
    }

    async fn update_payment_status(&self, payment_id: i64, new_status: PaymentStatus) -> Result<Payment, StorageError> {
        let mut tx = self.pool.begin().await?;
        let payment = match payments::update_payment_status(payment_id, PaymentStatus::Pending, new_status, &mut tx)
            .await?
        {
            Some(p) => p,
            None => return Err(payments::status_conflict(payment_id, &mut tx).await?),
        };
        tx.commit().await?;
        Ok(payment)
    }

    async fn settle_paid_payment(&self, payment_id: i64) -> Result<PaymentSettled, StorageError> {
        let mut tx = self.pool.begin().await?;
        let mut payment =
            match payments::update_payment_status(payment_id, PaymentStatus::Pending, PaymentStatus::Paid, &mut tx)
                .await?
            {
                Some(p) => p,
                None => return Err(payments::status_conflict(payment_id, &mut tx).await?),
            };
        let booking_id = payment.booking_id;
        let from = [BookingStatus::Pending];
        let booking = match bookings::update_booking_status(booking_id, &from, BookingStatus::Booked, &mut tx).await? {
            Some(record) => {
                let seat_ids = bookings::fetch_seat_ids(booking_id, &mut tx).await?;
                Some(record.with_seats(seat_ids))
            },
            None => {
                let current = bookings::fetch_booking(booking_id, &mut tx).await?;
                let still_held = matches!(&current, Some(b) if b.status == BookingStatus::Booked);
                if !still_held {
                    warn!(
                        "🗃️ Payment {payment_id} was paid, but booking {booking_id} is no longer held. The payment \
                         is marked as returned."
                    );
                    payment = payments::update_payment_status(
                        payment_id,
                        PaymentStatus::Paid,
                        PaymentStatus::Returned,
                        &mut tx,
                    )
                    .await?
                    .ok_or(StorageError::PaymentNotFound(payment_id))?;
                }
                current
            },
        };
        tx.commit().await?;
        debug!("🗃️ Payment {payment_id} settled as {}", payment.status);
        Ok(PaymentSettled { payment, booking })
    }

    async fn cancel_payment_and_booking(&self, payment_id: i64) -> Result<PaymentSettled, StorageError> {
        let mut tx = self.pool.begin().await?;
        let payment =
            match payments::update_payment_status(payment_id, PaymentStatus::Pending, PaymentStatus::Canceled, &mut tx)
                .await?
            {
                Some(p) => p,
                None => return Err(payments::status_conflict(payment_id, &mut tx).await?),
            };
        let booking_id = payment.booking_id;
        let booking = match bookings::cancel_booking(booking_id, &[BookingStatus::Pending], &mut tx).await? {
            Some(b) => Some(b),
            None => bookings::fetch_booking(booking_id, &mut tx).await?,
        };
        tx.commit().await?;
        debug!("🗃️ Payment {payment_id} and booking {booking_id} canceled");
        Ok(PaymentSettled { payment, booking })
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Applies any outstanding schema migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
