use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sw_common::Money;

//--------------------------------------      SpamSignal       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpamReason {
    /// The account held seats until the reconciler released them without ever starting a payment.
    AbandonedHold,
    /// Raised by an operator or an upstream service.
    Reported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpamSignal {
    pub account_id: i64,
    pub reason: SpamReason,
}

impl SpamSignal {
    pub fn new(account_id: i64, reason: SpamReason) -> Self {
        Self { account_id, reason }
    }
}

//--------------------------------------      MailMessage      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Everything a payment receipt shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptDetails {
    pub payment_id: i64,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
    pub movie_name: String,
    pub hall_name: String,
    pub start_time: DateTime<Utc>,
    pub seats: Vec<String>,
}

pub const RECEIPT_SUBJECT: &str = "Seatwise: Payment information";
pub const VERIFICATION_SUBJECT: &str = "Seatwise: Verify your email address";

impl MailMessage {
    pub fn new<S: Into<String>>(to: S, subject: S, body: S) -> Self {
        Self { to: to.into(), subject: subject.into(), body: body.into() }
    }

    pub fn payment_receipt(to: &str, receipt: &ReceiptDetails) -> Self {
        let body = format!(
            "Payment ID {}\nTotal amount: {}\nCreated at: {}\nMovie name: {}\nHall name: {}\nStart time: {}\nSeats: {}",
            receipt.payment_id,
            receipt.amount,
            receipt.created_at.format("%Y-%m-%d %H:%M:%S"),
            receipt.movie_name,
            receipt.hall_name,
            receipt.start_time.format("%Y-%m-%d %H:%M"),
            receipt.seats.join(", ")
        );
        Self { to: to.to_string(), subject: RECEIPT_SUBJECT.to_string(), body }
    }

    pub fn signup_verification(to: &str, username: &str, verification_url: &str) -> Self {
        let body = format!(
            "Hi {username},\n\nThanks for signing up. Please confirm your email address by opening the link \
             below:\n\n{verification_url}\n\nIf you did not create an account, you can ignore this message."
        );
        Self { to: to.to_string(), subject: VERIFICATION_SUBJECT.to_string(), body }
    }
}
