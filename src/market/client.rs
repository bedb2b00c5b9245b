//! Market-Data REST Client
//!
//! HTTP client for the public market-data API. One GET per call, JSON body
//! decoded into the record types. No retries here.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{MarketError, MarketResult};
use super::types::{CoinId, CoinInfo, CoinSummary, CoinTickers, OhlcvPoint};

/// Read-only operations of the market-data API
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Bulk coin listing, in API order
    async fn list_coins(&self) -> MarketResult<Vec<CoinSummary>>;

    /// Descriptive metadata of one coin
    async fn coin_info(&self, id: &CoinId) -> MarketResult<CoinInfo>;

    /// Current quote snapshot of one coin
    async fn coin_tickers(&self, id: &CoinId) -> MarketResult<CoinTickers>;

    /// Historical OHLCV samples of one coin, oldest first
    async fn coin_history(&self, id: &CoinId) -> MarketResult<Vec<OhlcvPoint>>;
}

/// Endpoint path templates, relative to the base URL. `{id}` is replaced by
/// the percent-encoded coin id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_coins_path")]
    pub coins: String,

    #[serde(default = "default_info_path")]
    pub info: String,

    #[serde(default = "default_tickers_path")]
    pub tickers: String,

    #[serde(default = "default_history_path")]
    pub history: String,
}

fn default_coins_path() -> String {
    "/v1/cryptocurrency/listing".to_string()
}

fn default_info_path() -> String {
    "/v1/cryptocurrency/{id}".to_string()
}

fn default_tickers_path() -> String {
    "/v1/cryptocurrency/{id}/quotes".to_string()
}

fn default_history_path() -> String {
    "/v1/cryptocurrency/{id}/ohlcv/historical".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            coins: default_coins_path(),
            info: default_info_path(),
            tickers: default_tickers_path(),
            history: default_history_path(),
        }
    }
}

/// Configuration for the market client
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Base URL of the API (e.g., "https://api.example.com")
    pub base_url: String,
    /// Endpoint path templates
    pub endpoints: Endpoints,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Trailing window of the history request in days, 0 for no window
    pub history_days: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            endpoints: Endpoints::default(),
            request_timeout_ms: 10_000,
            history_days: 14,
        }
    }
}

/// `reqwest`-backed implementation of [`MarketApi`]
pub struct MarketClient {
    client: Client,
    config: MarketConfig,
}

impl MarketClient {
    /// Create a new client with the given configuration
    pub fn new(config: MarketConfig) -> MarketResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| MarketError::transport(&config.base_url, &e))?;

        Ok(Self { client, config })
    }

    /// Build the absolute URL for an endpoint template
    fn url(&self, template: &str, id: Option<&CoinId>) -> String {
        let path = match id {
            Some(id) => template.replace("{id}", &urlencoding::encode(id.as_str())),
            None => template.to_string(),
        };
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Issue one GET and decode the body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> MarketResult<T> {
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketError::transport(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MarketError::status(url, status.as_u16(), &text));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MarketError::transport(url, &e))?;

        serde_json::from_slice(&body).map_err(|e| MarketError::decode(url, e))
    }

    /// `start`/`end` query parameters for the history window
    fn history_window(&self) -> Vec<(&'static str, String)> {
        if self.config.history_days == 0 {
            return Vec::new();
        }

        let end = Utc::now();
        let start = end - Duration::days(self.config.history_days as i64);
        vec![
            ("start", start.timestamp().to_string()),
            ("end", end.timestamp().to_string()),
        ]
    }
}

#[async_trait]
impl MarketApi for MarketClient {
    async fn list_coins(&self) -> MarketResult<Vec<CoinSummary>> {
        let url = self.url(&self.config.endpoints.coins, None);
        self.get_json(&url, &[]).await
    }

    async fn coin_info(&self, id: &CoinId) -> MarketResult<CoinInfo> {
        let url = self.url(&self.config.endpoints.info, Some(id));
        self.get_json(&url, &[]).await
    }

    async fn coin_tickers(&self, id: &CoinId) -> MarketResult<CoinTickers> {
        let url = self.url(&self.config.endpoints.tickers, Some(id));
        self.get_json(&url, &[]).await
    }

    async fn coin_history(&self, id: &CoinId) -> MarketResult<Vec<OhlcvPoint>> {
        let url = self.url(&self.config.endpoints.history, Some(id));
        let window = self.history_window();
        self.get_json(&url, &window).await
    }
}

/// Icon image URL for a ticker symbol. Only ever rendered, never fetched.
pub fn icon_url(icon_base_url: &str, symbol: &str) -> String {
    format!(
        "{}/{}",
        icon_base_url.trim_end_matches('/'),
        urlencoding::encode(&symbol.to_lowercase())
    )
}
