use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::Payment;

/// The three verdicts a gateway can return when asked about a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayOutcome {
    Paid = 0,
    Pending = 1,
    Failed = 2,
}

impl TryFrom<i32> for GatewayOutcome {
    type Error = GatewayError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Paid),
            1 => Ok(Self::Pending),
            2 => Ok(Self::Failed),
            c => Err(GatewayError::InvalidResponse(format!("Unknown verification code {c}"))),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Could not initialize gateway client: {0}")]
    Initialization(String),
    #[error("Could not reach the payment gateway: {0}")]
    Unreachable(String),
    #[error("Payment gateway rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Payment gateway returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// A payment gateway. Implementations must be side-effect free from the engine's point of view: the engine alone
/// decides how payment records change in response to what the gateway says.
#[allow(async_fn_in_trait)]
pub trait GatewayClient: Clone {
    /// Registers the payment with the gateway and returns the URL the customer should be sent to.
    async fn create_payment(&self, payment: &Payment, method: &str, client_ip: &str) -> Result<String, GatewayError>;

    async fn verify_payment(&self, payment: &Payment) -> Result<GatewayOutcome, GatewayError>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn outcome_codes() {
        assert_eq!(GatewayOutcome::try_from(0).unwrap(), GatewayOutcome::Paid);
        assert_eq!(GatewayOutcome::try_from(1).unwrap(), GatewayOutcome::Pending);
        assert_eq!(GatewayOutcome::try_from(2).unwrap(), GatewayOutcome::Failed);
        assert!(matches!(GatewayOutcome::try_from(7), Err(GatewayError::InvalidResponse(_))));
        assert_eq!(GatewayOutcome::Failed as i32, 2);
    }
}
