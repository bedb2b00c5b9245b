//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::market::{Endpoints, MarketConfig};
use crate::query::{CacheConfig, RetryConfig};
use crate::views::ViewConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Market-data API configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_history_days")]
    pub history_days: u32,

    #[serde(default)]
    pub endpoints: Endpoints,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_icon_base_url() -> String {
    "https://coinicons-api.vercel.app/api/icon".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_history_days() -> u32 {
    14
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            icon_base_url: default_icon_base_url(),
            request_timeout_secs: default_request_timeout(),
            history_days: default_history_days(),
            endpoints: Endpoints::default(),
        }
    }
}

/// Polling intervals in milliseconds; 0 disables polling
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_detail_tickers")]
    pub detail_tickers_ms: u64,

    #[serde(default = "default_price_tickers")]
    pub price_tickers_ms: u64,

    #[serde(default = "default_history")]
    pub history_ms: u64,
}

fn default_detail_tickers() -> u64 {
    5000
}

fn default_price_tickers() -> u64 {
    10_000
}

fn default_history() -> u64 {
    10_000
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            detail_tickers_ms: default_detail_tickers(),
            price_tickers_ms: default_price_tickers(),
            history_ms: default_history(),
        }
    }
}

fn interval(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Query cache configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_inactive_ttl")]
    pub inactive_ttl_secs: u64,
}

fn default_inactive_ttl() -> u64 {
    300
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            inactive_ttl_secs: default_inactive_ttl(),
        }
    }
}

/// Terminal UI configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_list_limit() -> usize {
    100
}

fn default_color() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
            color: default_color(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("coinwatch").join("config.toml")),
            Some(PathBuf::from("/etc/coinwatch/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `COINWATCH_*` overrides read through `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("COINWATCH_API_URL") {
            self.api.base_url = url;
        }
        if let Some(url) = lookup("COINWATCH_ICON_URL") {
            self.api.icon_base_url = url;
        }
        if let Some(limit) = lookup("COINWATCH_LIST_LIMIT") {
            match limit.parse() {
                Ok(limit) => self.ui.list_limit = limit,
                Err(_) => tracing::warn!(value = %limit, "Ignoring invalid COINWATCH_LIST_LIMIT"),
            }
        }

        if let Some(level) = lookup("COINWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("COINWATCH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Settings for the market client
    pub fn market_config(&self) -> MarketConfig {
        MarketConfig {
            base_url: self.api.base_url.clone(),
            endpoints: self.api.endpoints.clone(),
            request_timeout_ms: self.api.request_timeout_secs.saturating_mul(1000),
            history_days: self.api.history_days,
        }
    }

    /// Settings for the query caches
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            retry: self.retry.clone(),
            inactive_ttl: Duration::from_secs(self.cache.inactive_ttl_secs),
        }
    }

    /// Settings for the views
    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            list_limit: self.ui.list_limit,
            icon_base_url: self.api.icon_base_url.clone(),
            detail_tickers_interval: interval(self.polling.detail_tickers_ms),
            price_tickers_interval: interval(self.polling.price_tickers_ms),
            history_interval: interval(self.polling.history_ms),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# coinwatch configuration
#
# Environment variables override these settings:
# - COINWATCH_API_URL
# - COINWATCH_ICON_URL
# - COINWATCH_LIST_LIMIT
# - COINWATCH_LOG_LEVEL
# - COINWATCH_LOG_FORMAT

[api]
# Market-data API base URL
base_url = "http://127.0.0.1:8080"

# Coin icon service; icons are "{icon_base_url}/{symbol}"
icon_base_url = "https://coinicons-api.vercel.app/api/icon"

# Request timeout in seconds
request_timeout_secs = 10

# Days of OHLCV history to request (0 = API default)
history_days = 14

[api.endpoints]
# Path templates; {id} is replaced by the coin id
coins = "/v1/cryptocurrency/listing"
info = "/v1/cryptocurrency/{id}"
tickers = "/v1/cryptocurrency/{id}/quotes"
history = "/v1/cryptocurrency/{id}/ohlcv/historical"

[polling]
# Refetch intervals in milliseconds (0 = fetch once per visit)
detail_tickers_ms = 5000
price_tickers_ms = 10000
history_ms = 10000

[retry]
# Retries of transport errors, 408, 429 and 5xx
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_factor = 2.0

[cache]
# Seconds an unused entry keeps its last value
inactive_ttl_secs = 300

[ui]
# Most coins shown on the list page
list_limit = 100

# ANSI colours in text output
color = true

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path (logs go to stderr otherwise)
# file = "/var/log/coinwatch/coinwatch.log"
"#
    .to_string()
}
