use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::traits::{GatewayError, StorageError};

/// Coarse classification of a [`ReservationError`], used by callers that map failures onto a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Conflict,
    ResourceLocked,
    Gateway,
    Backend,
}

/// The result type of every booking and payment operation.
#[derive(Debug, Clone, Error)]
pub enum ReservationError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    ResourceLocked(String),
    #[error("Payment gateway error. {0}")]
    Gateway(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl ReservationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::ResourceLocked(_) => ErrorKind::ResourceLocked,
            Self::Gateway(_) => ErrorKind::Gateway,
            Self::DatabaseError(_) => ErrorKind::Backend,
        }
    }

    pub fn booking_not_found(booking_id: i64) -> Self {
        Self::NotFound(format!("Booking ID {booking_id} is not found"))
    }

    pub fn payment_not_found(payment_id: i64) -> Self {
        Self::NotFound(format!("Payment ID {payment_id} is not found"))
    }
}

impl From<StorageError> for ReservationError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::DatabaseError(s) => Self::DatabaseError(s),
            StorageError::SeatNotFound(id) => Self::NotFound(format!("Not found seat id: {id}")),
            StorageError::SeatNotAvailable(id) => Self::Conflict(format!("Seat ID {id} is reserved")),
            StorageError::ShowingNotFound(id) => Self::NotFound(format!("Showing ID {id} is not found")),
            StorageError::BookingNotFound(id) => Self::booking_not_found(id),
            StorageError::PaymentNotFound(id) => Self::payment_not_found(id),
            StorageError::AccountNotFound(id) => Self::NotFound(format!("Account ID {id} is not found")),
            StorageError::BookingStatusConflict { id, status } => {
                Self::BadRequest(format!("Booking {id} cannot change status. It is {status}"))
            },
            StorageError::PaymentStatusConflict { id, status } => {
                Self::BadRequest(format!("Payment {id} cannot change status. It is {status}"))
            },
            StorageError::PaymentAlreadyExists(_) => {
                Self::BadRequest("This ticket has already been submitted for payment.".to_string())
            },
            StorageError::AccountAlreadyExists(name) => Self::BadRequest(format!("Username {name} is already taken")),
        }
    }
}

impl From<GatewayError> for ReservationError {
    fn from(e: GatewayError) -> Self {
        Self::Gateway(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db_types::BookingStatus;

    #[test]
    fn storage_errors_map_to_kinds() {
        let e = ReservationError::from(StorageError::SeatNotFound(9));
        assert_eq!(e.kind(), ErrorKind::NotFound);
        assert_eq!(e.to_string(), "Not found seat id: 9");
        let e = ReservationError::from(StorageError::SeatNotAvailable(3));
        assert_eq!(e.kind(), ErrorKind::Conflict);
        assert_eq!(e.to_string(), "Seat ID 3 is reserved");
        let e = ReservationError::from(StorageError::BookingStatusConflict { id: 1, status: BookingStatus::Canceled });
        assert_eq!(e.kind(), ErrorKind::BadRequest);
        let e = ReservationError::from(StorageError::DatabaseError("disk full".into()));
        assert_eq!(e.kind(), ErrorKind::Backend);
        let e = ReservationError::from(GatewayError::Unreachable("timeout".into()));
        assert_eq!(e.kind(), ErrorKind::Gateway);
    }
}
