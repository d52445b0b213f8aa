//! Seatwise Engine
//!
//! The Seatwise engine sells cinema seats. It holds seats for a customer while they pay, settles the payment with an
//! external gateway and gives abandoned seats back to the pool.
//!
//! The library is divided into these sections:
//! 1. Storage contracts ([`mod@traits`]) and the SQLite backend that implements them ([`SqliteDatabase`]). Seat
//!    reservation is an atomic compare-and-set in the backend, which is what makes double-booking impossible.
//! 2. The public engine API ([`mod@swe_api`]). [`BookingApi`] and [`PaymentApi`] serve requests.
//!    [`ExpiryReconciler`], [`AbuseThrottle`] and [`NotificationRelay`] are driven periodically by background workers.
//! 3. Work queues ([`mod@queues`]) that carry spam signals and outgoing mail from the request path to the workers.
mod sqlite;

pub mod db_types;
pub mod helpers;
pub mod queues;
pub mod swe_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use swe_api::{
    booking_api::BookingApi,
    booking_objects,
    errors::{ErrorKind, ReservationError},
    notifications::NotificationRelay,
    payment_api::PaymentApi,
    reconciler::ExpiryReconciler,
    throttle::AbuseThrottle,
};
