use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum MailError {
    #[error("Could not initialize mail transport: {0}")]
    Initialization(String),
    #[error("Mail could not be delivered to {to}: {reason}")]
    DeliveryFailed { to: String, reason: String },
}

#[allow(async_fn_in_trait)]
pub trait MailTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}
