use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sw_common::Money;

use crate::db_types::{Booking, Payment, Seat, Showing};

/// The URL returned to the customer when the gateway could not register a payment.
pub const NO_PAYMENT_URL: &str = "none";

/// A booking together with the showing and seat information needed to display it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetail {
    pub booking: Booking,
    pub movie_name: String,
    pub hall_name: String,
    pub start_time: DateTime<Utc>,
    pub seats: Vec<Seat>,
    pub total_price: Money,
}

impl BookingDetail {
    pub fn new(booking: Booking, showing: Showing, seats: Vec<Seat>) -> Self {
        let total_price = seats.iter().map(|s| s.price).sum();
        Self {
            booking,
            movie_name: showing.movie_name,
            hall_name: showing.hall_name,
            start_time: showing.start_time,
            seats,
            total_price,
        }
    }

    pub fn seat_names(&self) -> Vec<String> {
        self.seats.iter().map(|s| s.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreated {
    pub payment: Payment,
    /// Where the customer completes the payment, or [`NO_PAYMENT_URL`] if the gateway call failed.
    pub payment_url: String,
}

/// Human-readable result of a payment verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: String,
    pub message: String,
}

impl StatusReport {
    pub fn new<S: Into<String>, M: Into<String>>(status: S, message: M) -> Self {
        Self { status: status.into(), message: message.into() }
    }
}
