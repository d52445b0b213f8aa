use std::fmt::Display;

use seatwise_engine::db_types::BookingStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookingRequest {
    pub showing_id: i64,
    pub seat_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPaymentRequest {
    pub booking_id: i64,
    /// The payment method offered by the gateway, e.g. `card` or `wallet`.
    #[serde(default = "default_payment_method")]
    pub method: String,
}

fn default_payment_method() -> String {
    "card".to_string()
}
