use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use seatwise_engine::{
    db_types::Payment,
    traits::{GatewayClient, GatewayError, GatewayOutcome},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sw_common::DEFAULT_CURRENCY_CODE;

use crate::config::GatewayConfig;

#[derive(Debug, Serialize)]
struct CreatePaymentBody<'a> {
    reference: String,
    booking_id: i64,
    /// Minor currency units
    amount: i64,
    currency: &'a str,
    method: &'a str,
    client_ip: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatePaymentResponse {
    payment_url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyPaymentResponse {
    code: i32,
}

/// A JSON-over-HTTP payment gateway client.
#[derive(Clone)]
pub struct HttpGatewayClient {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl HttpGatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.api_key.reveal().as_str())
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        headers.insert("X-Api-Key", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.url.trim_end_matches('/'))
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, GatewayError> {
        let url = self.url(path);
        trace!("💳️ Sending gateway request: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| GatewayError::Unreachable(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ Gateway request successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayError::InvalidResponse(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
            Err(GatewayError::Rejected { status, message })
        }
    }
}

impl GatewayClient for HttpGatewayClient {
    async fn create_payment(&self, payment: &Payment, method: &str, client_ip: &str) -> Result<String, GatewayError> {
        let body = CreatePaymentBody {
            reference: payment_reference(payment),
            booking_id: payment.booking_id,
            amount: payment.amount.value(),
            currency: DEFAULT_CURRENCY_CODE,
            method,
            client_ip,
        };
        let result = self.rest_query::<CreatePaymentResponse, _>(Method::POST, "/payments", Some(body)).await?;
        debug!("💳️ Gateway created payment {}", payment.id);
        Ok(result.payment_url)
    }

    async fn verify_payment(&self, payment: &Payment) -> Result<GatewayOutcome, GatewayError> {
        let path = format!("/payments/{}", payment_reference(payment));
        let result = self.rest_query::<VerifyPaymentResponse, ()>(Method::GET, &path, None).await?;
        GatewayOutcome::try_from(result.code)
    }
}

fn payment_reference(payment: &Payment) -> String {
    format!("sw-{}", payment.id)
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use seatwise_engine::{db_types::Payment, traits::GatewayClient};
    use serde_json::json;
    use sw_common::Secret;
    use tokio::net::TcpListener;

    use super::HttpGatewayClient;
    use crate::config::GatewayConfig;

    fn payment() -> Payment {
        serde_json::from_value(json!({
            "id": 7,
            "booking_id": 3,
            "account_id": 1,
            "amount": 150_000,
            "method": "card",
            "status": "PENDING",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn silent_gateway_times_out() {
        let _ = env_logger::try_init();
        // Accepts connections and never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });
        let config = GatewayConfig {
            url: format!("http://{addr}"),
            api_key: Secret::new("key".to_string()),
            timeout: Duration::from_millis(300),
        };
        let client = HttpGatewayClient::new(config).unwrap();
        let started = Instant::now();
        let err = client.verify_payment(&payment()).await.unwrap_err();
        assert!(err.to_string().starts_with("Could not reach the payment gateway"), "{err}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let config = GatewayConfig { url: "http://gw.example.com/".to_string(), ..GatewayConfig::default() };
        let client = HttpGatewayClient::new(config).unwrap();
        assert_eq!(client.url("/payments"), "http://gw.example.com/payments");
    }
}
