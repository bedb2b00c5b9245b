//! Polling Query Cache
//!
//! Keyed cache in front of the market API:
//!
//! - **Key**: strongly typed `(resource, coin id)` cache keys
//! - **State**: what subscribers observe (loading, data, error)
//! - **Cache**: request dedup, polling, stale-result discard, eviction
//! - **Subscription**: live handle, unsubscribes on drop
//! - **Retry**: backoff policy for retryable failures
//! - **Market**: one cache per record type, bound to a `MarketApi`
//!
//! # Example
//!
//! ```rust,ignore
//! use coinwatch::query::{MarketQueries, CacheConfig};
//!
//! let queries = MarketQueries::new(api, CacheConfig::default());
//! let mut tickers = queries.coin_tickers(&id, Some(Duration::from_secs(5)));
//!
//! while tickers.changed().await {
//!     if let Some(t) = tickers.state().data() {
//!         println!("{}", t.usd().price);
//!     }
//! }
//! ```

mod cache;
mod key;
mod market;
mod retry;
mod state;
mod subscription;

pub use cache::{CacheConfig, QueryCache, SubscriptionId};
pub use key::{QueryKey, Resource};
pub use market::MarketQueries;
pub use retry::RetryConfig;
pub use state::{QueryOptions, QueryState, QueryStatus};
pub use subscription::Subscription;

#[cfg(test)]
pub(crate) use market::testing;
