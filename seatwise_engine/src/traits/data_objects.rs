use serde::{Deserialize, Serialize};

use crate::db_types::{Booking, Payment};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingReopened {
    /// The booking as it was just before it was deleted.
    pub old_booking: Booking,
    pub new_booking: Booking,
    /// Payments of the old booking that were returned or canceled as part of the re-open.
    pub settled_payments: Vec<Payment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettled {
    pub payment: Payment,
    /// The booking after settlement, if it still exists.
    pub booking: Option<Booking>,
}

/// The outcome of a single reconciler sweep over the pending bookings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpiryResult {
    /// Bookings that were confirmed because their payment was paid.
    pub confirmed: Vec<i64>,
    /// Bookings that were canceled and had their seats released.
    pub canceled: Vec<i64>,
    /// Bookings that could not be processed. They are retried on the next sweep.
    pub failed: Vec<i64>,
}

impl ExpiryResult {
    pub fn confirmed_count(&self) -> usize {
        self.confirmed.len()
    }

    pub fn canceled_count(&self) -> usize {
        self.canceled.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn total_count(&self) -> usize {
        self.confirmed_count() + self.canceled_count() + self.failed_count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThrottleResult {
    pub processed: usize,
    /// Accounts that crossed the threshold during this drain.
    pub blacklisted: Vec<i64>,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayResult {
    pub sent: usize,
    pub failed: usize,
}
