use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use seatwise_engine::traits::{MailError, MailTransport};
use serde::Serialize;

use crate::config::MailConfig;

#[derive(Debug, Serialize)]
struct SendMailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends mail through an HTTP mail API.
#[derive(Clone)]
pub struct HttpMailTransport {
    url: String,
    sender: String,
    client: Arc<Client>,
}

impl HttpMailTransport {
    pub fn new(url: &str, config: &MailConfig) -> Result<Self, MailError> {
        let mut headers = HeaderMap::with_capacity(1);
        if config.api_key.is_empty() {
            warn!("📬️ No mail API key is configured. Requests to {url} will be sent without credentials.");
        } else {
            let auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.reveal()))
                .map_err(|e| MailError::Initialization(e.to_string()))?;
            headers.insert("Authorization", auth);
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| MailError::Initialization(e.to_string()))?;
        let url = format!("{}/messages", url.trim_end_matches('/'));
        Ok(Self { url, sender: config.default_sender.clone(), client: Arc::new(client) })
    }
}

impl MailTransport for HttpMailTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let payload = SendMailBody { from: &self.sender, to, subject, text: body };
        let failed = |reason: String| MailError::DeliveryFailed { to: to.to_string(), reason };
        let response = self.client.post(&self.url).json(&payload).send().await.map_err(|e| failed(e.to_string()))?;
        if response.status().is_success() {
            trace!("📬️ Mail API accepted message to {to}");
            Ok(())
        } else {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            Err(failed(format!("Mail API returned {status}. {message}")))
        }
    }
}

/// Writes outgoing mail to the log. Used when no mail API is configured.
#[derive(Clone, Debug, Default)]
pub struct LogMailTransport;

impl MailTransport for LogMailTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        info!("📬️ Mail to {to}: {subject}\n{body}");
        Ok(())
    }
}

/// The transport selected by the configuration.
#[derive(Clone)]
pub enum MailBackend {
    Http(HttpMailTransport),
    Log(LogMailTransport),
}

impl MailBackend {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        match &config.api_url {
            Some(url) => Ok(Self::Http(HttpMailTransport::new(url, config)?)),
            None => Ok(Self::Log(LogMailTransport)),
        }
    }
}

impl MailTransport for MailBackend {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        match self {
            Self::Http(t) => t.send(to, subject, body).await,
            Self::Log(t) => t.send(to, subject, body).await,
        }
    }
}
