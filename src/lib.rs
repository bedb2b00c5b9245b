//! # coinwatch
//!
//! Cryptocurrency price dashboard for the terminal: a coin list, a detail
//! page per coin, and chart and price views fed by a public market-data API.
//!
//! ## Modules
//!
//! - [`market`]: REST client and record types of the market-data API
//! - [`query`]: polling query cache with request dedup and stale-result discard
//! - [`theme`]: dark/light theme state
//! - [`views`]: routes and view models built from cache snapshots
//! - [`app`]: dashboard state owner and screen renderers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coinwatch::app::{render, Dashboard, Message};
//! use coinwatch::{Config, MarketClient, MarketQueries, Theme};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let client = MarketClient::new(config.market_config())?;
//!     let queries = MarketQueries::new(Arc::new(client), config.cache_config());
//!
//!     let mut dashboard = Dashboard::new(queries, config.view_config(), Theme::Light);
//!     dashboard.update(Message::Navigate("/btc-bitcoin/price".into(), None));
//!     dashboard.settle(Duration::from_secs(10)).await;
//!
//!     println!("{}", render::text(&dashboard.screen(), false));
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod logging;
pub mod market;
pub mod query;
pub mod theme;
pub mod views;

// Re-export top-level types for convenience
pub use market::{
    CoinId, CoinInfo, CoinSummary, CoinTickers, MarketApi, MarketClient, MarketConfig,
    MarketError, MarketResult, OhlcvPoint,
};

pub use query::{
    CacheConfig, MarketQueries, QueryCache, QueryKey, QueryOptions, QueryState, QueryStatus,
    Resource, RetryConfig, Subscription,
};

pub use theme::{Palette, Theme, ThemeState};

pub use views::{Route, RouteState, Tab, ViewConfig};

pub use config::{Config, ConfigError, LoggingConfig};
