//! Market-data record types
//!
//! Shapes returned by the API. Each record is decoded in full or not at all:
//! a body missing a required field is a decode error, never a partial record.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::de;

/// Identifier of a coin on the market-data API (e.g. `btc-bitcoin`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinId(String);

impl CoinId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CoinId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CoinId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One entry of the bulk coin listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSummary {
    pub id: CoinId,
    pub name: String,
    pub symbol: String,
    #[serde(deserialize_with = "de::rank::deserialize")]
    pub rank: u32,
    pub is_new: bool,
    pub is_active: bool,
    /// Category, e.g. `coin` or `token`
    #[serde(rename = "type")]
    pub kind: String,
}

/// Descriptive metadata of a single coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub id: CoinId,
    pub name: String,
    pub symbol: String,
    #[serde(deserialize_with = "de::rank::deserialize")]
    pub rank: u32,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub open_source: bool,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub development_status: Option<String>,
    #[serde(default)]
    pub hardware_wallet: bool,
    #[serde(default)]
    pub proof_type: Option<String>,
    #[serde(default)]
    pub org_structure: Option<String>,
    #[serde(default)]
    pub hash_algorithm: Option<String>,
    #[serde(default)]
    pub first_data_at: Option<String>,
    #[serde(default)]
    pub last_data_at: Option<String>,
}

/// Quote snapshot of a single coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinTickers {
    pub id: CoinId,
    pub name: String,
    pub symbol: String,
    #[serde(deserialize_with = "de::rank::deserialize")]
    pub rank: u32,
    #[serde(default, deserialize_with = "de::number_or_string::deserialize")]
    pub circulating_supply: f64,
    #[serde(default, deserialize_with = "de::number_or_string::deserialize")]
    pub total_supply: f64,
    #[serde(default, deserialize_with = "de::number_or_string::deserialize")]
    pub max_supply: f64,
    #[serde(default, deserialize_with = "de::number_or_string::deserialize")]
    pub beta_value: f64,
    #[serde(default)]
    pub first_data_at: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    pub quotes: Quotes,
}

impl CoinTickers {
    /// USD quote of this snapshot
    pub fn usd(&self) -> &UsdQuote {
        &self.quotes.usd
    }
}

/// Quotes keyed by currency; only USD is requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotes {
    #[serde(rename = "USD")]
    pub usd: UsdQuote,
}

/// USD quote with percentage changes over named windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsdQuote {
    pub price: f64,
    #[serde(default)]
    pub volume_24h: f64,
    #[serde(default)]
    pub volume_24h_change_24h: f64,
    #[serde(default)]
    pub market_cap: f64,
    #[serde(default)]
    pub market_cap_change_24h: f64,
    pub percent_change_15m: f64,
    pub percent_change_30m: f64,
    pub percent_change_1h: f64,
    pub percent_change_6h: f64,
    pub percent_change_12h: f64,
    pub percent_change_24h: f64,
    pub percent_change_7d: f64,
    pub percent_change_30d: f64,
    pub percent_change_1y: f64,
    #[serde(default)]
    pub percent_from_price_ath: Option<f64>,
    #[serde(default)]
    pub ath_price: Option<f64>,
    #[serde(default)]
    pub ath_date: Option<String>,
}

impl UsdQuote {
    /// Percentage changes in window order, labelled for display
    pub fn percent_changes(&self) -> [(&'static str, f64); 9] {
        [
            ("15m", self.percent_change_15m),
            ("30m", self.percent_change_30m),
            ("1h", self.percent_change_1h),
            ("6h", self.percent_change_6h),
            ("12h", self.percent_change_12h),
            ("24h", self.percent_change_24h),
            ("7d", self.percent_change_7d),
            ("30d", self.percent_change_30d),
            ("1y", self.percent_change_1y),
        ]
    }
}

/// One historical price sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvPoint {
    /// Open time, seconds since the epoch
    #[serde(default)]
    pub time_open: i64,
    /// Close time, seconds since the epoch
    pub time_close: i64,
    #[serde(deserialize_with = "de::number_or_string::deserialize")]
    pub open: f64,
    #[serde(deserialize_with = "de::number_or_string::deserialize")]
    pub high: f64,
    #[serde(deserialize_with = "de::number_or_string::deserialize")]
    pub low: f64,
    #[serde(deserialize_with = "de::number_or_string::deserialize")]
    pub close: f64,
    #[serde(default, deserialize_with = "de::opt_number_or_string::deserialize")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_number_or_string::deserialize")]
    pub market_cap: Option<f64>,
}
