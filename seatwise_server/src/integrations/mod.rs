//! Clients for the external services the server depends on.
mod gateway;
mod mail;

pub use gateway::HttpGatewayClient;
pub use mail::{HttpMailTransport, LogMailTransport, MailBackend};
