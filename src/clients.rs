use crate::error::ExchangeError;
use crate::event::EventsPage;
use crate::signer::RequestSigner;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub const KALSHI_BASE_URL: &str = "https://api.elections.kalshi.com";
pub const EVENTS_PATH: &str = "/trade-api/v2/events";

/// Read access to the exchange's open-event listing.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Whether credentials are present at all. When false the catalog is
    /// never fetched.
    fn is_configured(&self) -> bool {
        true
    }

    /// One page of open events with nested markets.
    async fn list_open_events(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<EventsPage, ExchangeError>;
}

// Kalshi API Client
#[derive(Clone, Debug)]
pub struct KalshiClient {
    http_client: Client,
    signer: RequestSigner,
    base_url: String,
}

impl KalshiClient {
    pub fn new(signer: RequestSigner) -> Self {
        Self::with_base_url(signer, KALSHI_BASE_URL, Duration::from_secs(15))
    }

    pub fn with_base_url(signer: RequestSigner, base_url: &str, timeout: Duration) -> Self {
        // Create HTTP client with connection pooling and timeouts
        let http_client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|_| Client::new()); // Fallback to default if builder fails

        Self {
            http_client,
            signer,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }
}

#[async_trait]
impl ExchangeClient for KalshiClient {
    fn is_configured(&self) -> bool {
        self.signer.is_configured()
    }

    async fn list_open_events(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<EventsPage, ExchangeError> {
        // Signed path excludes the query; headers are rebuilt for every page.
        let headers = self.signer.headers("GET", EVENTS_PATH)?;

        let limit = limit.to_string();
        let mut query = vec![
            ("status", "open"),
            ("limit", limit.as_str()),
            ("with_nested_markets", "true"),
        ];
        if let Some(c) = cursor {
            query.push(("cursor", c));
        }

        debug!(cursor = ?cursor, "GET {}{}", self.base_url, EVENTS_PATH);

        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, EVENTS_PATH))
            .headers(headers)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ExchangeError::Decode(e.to_string()))
    }
}
