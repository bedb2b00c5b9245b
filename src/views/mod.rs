//! View Composition Layer
//!
//! Pages own the subscriptions for their route and project cache snapshots
//! into serializable view models:
//!
//! - **Route**: paths, tabs, links and navigation state
//! - **Coins**: the coin list
//! - **Coin**: the detail shell with its two tabs
//! - **Chart** / **Price**: the detail sub-views
//! - **Format**: display strings

mod chart;
mod coin;
mod coins;
pub mod format;
mod price;
mod route;

pub use chart::{
    build_candlestick, build_line, CandlestickChart, ChartOptions, ChartPage, ChartView, Charts,
    LineChart, Point, Series,
};
pub use coin::{CoinDetail, CoinDetailView, CoinPage, Panel, TabPage, TabView};
pub use coins::{CoinListItem, CoinListPage, CoinListView};
pub use price::{PriceCell, PricePage, PriceView};
pub use route::{Link, Route, RouteState, Tab};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::query::{QueryState, QueryStatus};

/// Settings the views need from the configuration
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Most entries the list shows
    pub list_limit: usize,
    /// Base URL of the coin icon service
    pub icon_base_url: String,
    /// Tickers polling on the detail shell
    pub detail_tickers_interval: Option<Duration>,
    /// Tickers polling on the price tab
    pub price_tickers_interval: Option<Duration>,
    /// History polling on the chart tab
    pub history_interval: Option<Duration>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            list_limit: 100,
            icon_base_url: "https://coinicons-api.vercel.app/api/icon".to_string(),
            detail_tickers_interval: Some(Duration::from_secs(5)),
            price_tickers_interval: Some(Duration::from_secs(10)),
            history_interval: Some(Duration::from_secs(10)),
        }
    }
}

/// Content slot of a view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "content", rename_all = "snake_case")]
pub enum Body<T> {
    /// No result yet; carries the loading text
    Loading(String),
    /// Every attempt failed and there is nothing to show
    Failed(String),
    Ready(T),
}

impl<T> Body<T> {
    /// Project a query state: data wins, then a final error, else loading
    pub fn from_state<S>(
        state: &QueryState<S>,
        loading: &str,
        ready: impl FnOnce(&S) -> T,
    ) -> Self {
        match (state.status(), state.data(), &state.error) {
            (QueryStatus::Success, Some(data), _) => Body::Ready(ready(data)),
            (QueryStatus::Error, _, Some(err)) => Body::Failed(err.to_string()),
            _ => Body::Loading(loading.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Body::Loading(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Body::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Aggregate query status of a page, shown in the footer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageStatus {
    /// Some query has no result yet
    pub loading: bool,
    /// Some request is outstanding
    pub fetching: bool,
    /// Most recent successful update
    pub updated_at: Option<DateTime<Utc>>,
    /// First error of the latest attempts
    pub error: Option<String>,
}

impl PageStatus {
    pub fn merge<S>(mut self, state: &QueryState<S>) -> Self {
        self.loading |= state.status() == QueryStatus::Loading;
        self.fetching |= state.is_fetching;
        self.updated_at = self.updated_at.max(state.updated_at);
        if self.error.is_none() {
            self.error = state.error.as_ref().map(ToString::to_string);
        }
        self
    }
}

/// Notice shown when displayed data is older than a failed refresh
pub fn stale_notice<S>(state: &QueryState<S>) -> Option<String> {
    match (&state.error, state.is_stale()) {
        (Some(err), true) => Some(format!("Showing last known data: {}", err)),
        _ => None,
    }
}
