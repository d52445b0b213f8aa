use thiserror::Error;

use crate::db_types::{BookingStatus, PaymentStatus};

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Seat {0} does not exist in the requested showing")]
    SeatNotFound(i64),
    #[error("Seat {0} is not available")]
    SeatNotAvailable(i64),
    #[error("The requested showing {0} does not exist")]
    ShowingNotFound(i64),
    #[error("The requested booking {0} does not exist")]
    BookingNotFound(i64),
    #[error("The requested payment {0} does not exist")]
    PaymentNotFound(i64),
    #[error("The requested account {0} does not exist")]
    AccountNotFound(i64),
    #[error("Booking {id} cannot change status. Its current status is {status}")]
    BookingStatusConflict { id: i64, status: BookingStatus },
    #[error("Payment {id} cannot change status. Its current status is {status}")]
    PaymentStatusConflict { id: i64, status: PaymentStatus },
    #[error("Booking {0} already has a payment")]
    PaymentAlreadyExists(i64),
    #[error("Username {0} is already taken")]
    AccountAlreadyExists(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::DatabaseError(e.to_string())
    }
}
