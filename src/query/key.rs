//! Cache keys
//!
//! A key is a resource tag plus an optional coin id. Two subscriptions share
//! a cache entry (and its in-flight request) exactly when their keys are equal.

use serde::Serialize;
use std::fmt;

use crate::market::CoinId;

/// Kind of remote resource a key refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Bulk coin listing
    Coins,
    /// Coin metadata
    Info,
    /// Coin quote snapshot
    Tickers,
    /// Coin OHLCV history
    History,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Coins => "coins",
            Resource::Info => "info",
            Resource::Tickers => "tickers",
            Resource::History => "history",
        }
    }
}

/// Key of a cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryKey {
    pub resource: Resource,
    pub id: Option<CoinId>,
}

impl QueryKey {
    pub fn coins() -> Self {
        Self {
            resource: Resource::Coins,
            id: None,
        }
    }

    pub fn info(id: &CoinId) -> Self {
        Self {
            resource: Resource::Info,
            id: Some(id.clone()),
        }
    }

    pub fn tickers(id: &CoinId) -> Self {
        Self {
            resource: Resource::Tickers,
            id: Some(id.clone()),
        }
    }

    pub fn history(id: &CoinId) -> Self {
        Self {
            resource: Resource::History,
            id: Some(id.clone()),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{}", self.resource.as_str(), id),
            None => f.write_str(self.resource.as_str()),
        }
    }
}
