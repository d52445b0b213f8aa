//! Data types shared between the storage backends and the public engine API.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

pub use sw_common::Money;

#[derive(Debug, Clone, Error)]
#[error("Invalid {kind} value: {value}")]
pub struct ConversionError {
    kind: &'static str,
    value: String,
}

impl ConversionError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

/// Generates `Display` and `FromStr` for the upper-case status enums so that the text form always matches the
/// representation stored in the database.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $text),)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ConversionError::new($kind, other)),
                }
            }
        }
    };
}

//--------------------------------------      SeatStatus       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatStatus {
    /// The seat can be reserved.
    Available,
    /// The seat is held by exactly one non-canceled booking.
    Booked,
    /// The seat has been taken out of service by the venue.
    Unavailable,
}

text_enum!(SeatStatus, "seat status", {
    Available => "AVAILABLE",
    Booked => "BOOKED",
    Unavailable => "UNAVAILABLE",
});

//--------------------------------------       SeatClass       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatClass {
    #[default]
    Regular,
    Premium,
}

text_enum!(SeatClass, "seat class", {
    Regular => "REGULAR",
    Premium => "PREMIUM",
});

//--------------------------------------     BookingStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    /// Seats are held, payment has not been confirmed.
    Pending,
    /// Payment was confirmed (or an operator force-confirmed the booking).
    Booked,
    /// The booking was canceled and its seats were released.
    Canceled,
}

text_enum!(BookingStatus, "booking status", {
    Pending => "PENDING",
    Booked => "BOOKED",
    Canceled => "CANCELED",
});

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Canceled,
    /// A paid payment whose booking was re-opened by an operator.
    Returned,
}

text_enum!(PaymentStatus, "payment status", {
    Pending => "PENDING",
    Paid => "PAID",
    Canceled => "CANCELED",
    Returned => "RETURNED",
});

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

//--------------------------------------     AccountStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    #[default]
    Active,
    Blacklisted,
}

text_enum!(AccountStatus, "account status", {
    Active => "ACTIVE",
    Blacklisted => "BLACKLISTED",
});

//--------------------------------------        Account        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
}

impl NewAccount {
    pub fn new<S: Into<String>, E: Into<String>>(username: S, email: E) -> Self {
        Self { username: username.into(), email: email.into() }
    }
}

//--------------------------------------      SpamCounter      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SpamCounter {
    pub account_id: i64,
    pub count: i64,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        Showing        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Showing {
    pub id: i64,
    pub movie_name: String,
    pub hall_name: String,
    pub start_time: DateTime<Utc>,
    /// The number of seats in the hall (rows x columns).
    pub capacity: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShowing {
    pub movie_name: String,
    pub hall_name: String,
    pub start_time: DateTime<Utc>,
    pub capacity: i64,
}

//--------------------------------------          Seat         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub showing_id: i64,
    pub name: String,
    pub seat_class: SeatClass,
    pub price: Money,
    pub status: SeatStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSeat {
    pub name: String,
    pub seat_class: SeatClass,
    pub price: Money,
}

impl NewSeat {
    pub fn new<S: Into<String>>(name: S, seat_class: SeatClass, price: Money) -> Self {
        Self { name: name.into(), seat_class, price }
    }
}

//--------------------------------------        Booking        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub account_id: i64,
    pub showing_id: i64,
    /// Seat ids in the order they were requested.
    pub seat_ids: Vec<i64>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The `bookings` table row. The seat list lives in `booking_seats` and is attached by the backend.
#[derive(Debug, Clone, FromRow)]
pub struct BookingRecord {
    pub id: i64,
    pub account_id: i64,
    pub showing_id: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRecord {
    pub fn with_seats(self, seat_ids: Vec<i64>) -> Booking {
        Booking {
            id: self.id,
            account_id: self.account_id,
            showing_id: self.showing_id,
            seat_ids,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub account_id: i64,
    pub showing_id: i64,
    pub seat_ids: Vec<i64>,
}

impl NewBooking {
    pub fn new(account_id: i64, showing_id: i64, seat_ids: Vec<i64>) -> Self {
        Self { account_id, showing_id, seat_ids }
    }
}

//--------------------------------------        Payment        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    /// The booking this payment settles. The booking may no longer exist if it was re-opened.
    pub booking_id: i64,
    pub account_id: i64,
    pub amount: Money,
    pub method: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub booking_id: i64,
    pub account_id: i64,
    pub amount: Money,
    pub method: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_text_round_trips_through_display() {
        assert_eq!(BookingStatus::Canceled.to_string(), "CANCELED");
        assert_eq!("pending".parse::<BookingStatus>().unwrap(), BookingStatus::Pending);
        assert_eq!(" Paid ".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert!("EXPIRED".parse::<BookingStatus>().is_err());
        assert_eq!(SeatStatus::Unavailable.to_string(), "UNAVAILABLE");
        assert_eq!("BLACKLISTED".parse::<AccountStatus>().unwrap(), AccountStatus::Blacklisted);
    }

    #[test]
    fn serde_uses_upper_case() {
        let json = serde_json::to_string(&PaymentStatus::Returned).unwrap();
        assert_eq!(json, "\"RETURNED\"");
        let status: SeatClass = serde_json::from_str("\"PREMIUM\"").unwrap();
        assert_eq!(status, SeatClass::Premium);
    }

    #[test]
    fn terminal_payment_states() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Canceled.is_terminal());
        assert!(PaymentStatus::Returned.is_terminal());
    }
}
