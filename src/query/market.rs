//! Market queries
//!
//! One [`QueryCache`] per record type, bound to a shared [`MarketApi`].
//! Each constructor returns a live subscription for the matching key.

use std::sync::Arc;
use std::time::Duration;

use super::cache::{CacheConfig, QueryCache};
use super::key::QueryKey;
use super::state::QueryOptions;
use super::subscription::Subscription;
use crate::market::{CoinId, CoinInfo, CoinSummary, CoinTickers, MarketApi, OhlcvPoint};

/// Cached access to the market API
#[derive(Clone)]
pub struct MarketQueries {
    api: Arc<dyn MarketApi>,
    coins: QueryCache<Vec<CoinSummary>>,
    info: QueryCache<CoinInfo>,
    tickers: QueryCache<CoinTickers>,
    history: QueryCache<Vec<OhlcvPoint>>,
}

impl MarketQueries {
    pub fn new(api: Arc<dyn MarketApi>, config: CacheConfig) -> Self {
        Self {
            api,
            coins: QueryCache::new(config.clone()),
            info: QueryCache::new(config.clone()),
            tickers: QueryCache::new(config.clone()),
            history: QueryCache::new(config),
        }
    }

    /// Coin listing, fetched once per visit
    pub fn coins(&self) -> Subscription<Vec<CoinSummary>> {
        let api = self.api.clone();
        self.coins.subscribe(
            QueryKey::coins(),
            move || {
                let api = api.clone();
                async move { api.list_coins().await }
            },
            QueryOptions::once(),
        )
    }

    /// Coin metadata, fetched once per visit
    pub fn coin_info(&self, id: &CoinId) -> Subscription<CoinInfo> {
        let api = self.api.clone();
        let coin = id.clone();
        self.info.subscribe(
            QueryKey::info(id),
            move || {
                let api = api.clone();
                let coin = coin.clone();
                async move { api.coin_info(&coin).await }
            },
            QueryOptions::once(),
        )
    }

    /// Quote snapshot, optionally polled
    pub fn coin_tickers(&self, id: &CoinId, interval: Option<Duration>) -> Subscription<CoinTickers> {
        let api = self.api.clone();
        let coin = id.clone();
        self.tickers.subscribe(
            QueryKey::tickers(id),
            move || {
                let api = api.clone();
                let coin = coin.clone();
                async move { api.coin_tickers(&coin).await }
            },
            QueryOptions {
                refetch_interval: interval,
            },
        )
    }

    /// OHLCV history, optionally polled
    pub fn coin_history(
        &self,
        id: &CoinId,
        interval: Option<Duration>,
    ) -> Subscription<Vec<OhlcvPoint>> {
        let api = self.api.clone();
        let coin = id.clone();
        self.history.subscribe(
            QueryKey::history(id),
            move || {
                let api = api.clone();
                let coin = coin.clone();
                async move { api.coin_history(&coin).await }
            },
            QueryOptions {
                refetch_interval: interval,
            },
        )
    }

    /// Refetch every key that currently has subscribers
    pub fn refetch_all(&self) -> usize {
        let count = self.coins.refetch_active()
            + self.info.refetch_active()
            + self.tickers.refetch_active()
            + self.history.refetch_active();
        tracing::info!(queries = count, "Manual refresh");
        count
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`MarketApi`] used by tests across the crate.

    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::market::{
        CoinId, CoinInfo, CoinSummary, CoinTickers, MarketApi, MarketError, MarketResult,
        OhlcvPoint,
    };

    /// Canned responses plus per-operation call counters
    #[derive(Default)]
    pub struct FakeMarket {
        pub coins: Mutex<Option<MarketResult<Vec<CoinSummary>>>>,
        pub info: Mutex<HashMap<String, MarketResult<CoinInfo>>>,
        pub tickers: Mutex<HashMap<String, MarketResult<CoinTickers>>>,
        pub history: Mutex<HashMap<String, MarketResult<Vec<OhlcvPoint>>>>,
        pub delay: Duration,
        pub coin_calls: AtomicUsize,
        pub info_calls: AtomicUsize,
        pub ticker_calls: AtomicUsize,
        pub history_calls: AtomicUsize,
    }

    /// Tickers record with the given price and fixed percent changes
    pub fn tickers(id: &str, price: f64) -> CoinTickers {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": "Bitcoin",
            "symbol": "BTC",
            "rank": 1,
            "total_supply": 19500000,
            "max_supply": 21000000,
            "quotes": { "USD": {
                "price": price,
                "percent_change_15m": 0.01,
                "percent_change_30m": 0.02,
                "percent_change_1h": -0.1,
                "percent_change_6h": 0.5,
                "percent_change_12h": 1.25,
                "percent_change_24h": 2.0,
                "percent_change_7d": -4.5,
                "percent_change_30d": 10.75,
                "percent_change_1y": 120.3,
                "ath_price": 73750.07,
                "ath_date": "2024-03-14T07:10:36Z"
            }}
        }))
        .unwrap()
    }

    pub fn info(id: &str, name: &str) -> CoinInfo {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "symbol": "BTC",
            "rank": 1,
            "description": "Peer-to-peer electronic cash."
        }))
        .unwrap()
    }

    /// `count` listing entries named `Coin 0`, `Coin 1`, ...
    pub fn listing(count: usize) -> Vec<CoinSummary> {
        (0..count)
            .map(|i| CoinSummary {
                id: CoinId::new(format!("c{}-coin", i)),
                name: format!("Coin {}", i),
                symbol: format!("C{}", i),
                rank: i as u32 + 1,
                is_new: false,
                is_active: true,
                kind: "coin".to_string(),
            })
            .collect()
    }

    /// `count` daily points closing at 100, 101, ...
    pub fn history(count: usize) -> Vec<OhlcvPoint> {
        (0..count)
            .map(|i| {
                let close = 100.0 + i as f64;
                OhlcvPoint {
                    time_open: 1_700_000_000 + i as i64 * 86_400,
                    time_close: 1_700_086_399 + i as i64 * 86_400,
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: Some(1_000.0),
                    market_cap: None,
                }
            })
            .collect()
    }

    fn missing(what: &str, id: &CoinId) -> MarketError {
        MarketError::status(format!("fake://{}/{}", what, id), 404, "")
    }

    impl FakeMarket {
        pub fn calls(counter: &AtomicUsize) -> usize {
            counter.load(Ordering::SeqCst)
        }

        async fn pause(&self) {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
    }

    #[async_trait]
    impl MarketApi for FakeMarket {
        async fn list_coins(&self) -> MarketResult<Vec<CoinSummary>> {
            self.coin_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            self.coins
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn coin_info(&self, id: &CoinId) -> MarketResult<CoinInfo> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            self.info
                .lock()
                .unwrap()
                .get(id.as_str())
                .cloned()
                .unwrap_or_else(|| Err(missing("info", id)))
        }

        async fn coin_tickers(&self, id: &CoinId) -> MarketResult<CoinTickers> {
            self.ticker_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            self.tickers
                .lock()
                .unwrap()
                .get(id.as_str())
                .cloned()
                .unwrap_or_else(|| Err(missing("tickers", id)))
        }

        async fn coin_history(&self, id: &CoinId) -> MarketResult<Vec<OhlcvPoint>> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            self.history
                .lock()
                .unwrap()
                .get(id.as_str())
                .cloned()
                .unwrap_or_else(|| Err(missing("history", id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{self, FakeMarket};
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_shell_and_price_tab_share_tickers() {
        let fake = Arc::new(FakeMarket {
            delay: Duration::from_millis(50),
            ..Default::default()
        });
        fake.tickers
            .lock()
            .unwrap()
            .insert("btc-bitcoin".into(), Ok(testing::tickers("btc-bitcoin", 1.0)));

        let queries = MarketQueries::new(fake.clone(), CacheConfig::default());
        let id = CoinId::from("btc-bitcoin");

        let shell = queries.coin_tickers(&id, Some(Duration::from_secs(5)));
        let price = queries.coin_tickers(&id, Some(Duration::from_secs(10)));

        sleep(Duration::from_millis(100)).await;
        assert_eq!(FakeMarket::calls(&fake.ticker_calls), 1);
        assert_eq!(shell.state().data().map(|t| t.usd().price), Some(1.0));
        assert_eq!(price.state().data().map(|t| t.usd().price), Some(1.0));

        // Shell's 5s interval wins while both are subscribed.
        sleep(Duration::from_secs(5)).await;
        assert_eq!(FakeMarket::calls(&fake.ticker_calls), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_all_only_touches_active_keys() {
        let fake = Arc::new(FakeMarket::default());
        let queries = MarketQueries::new(fake.clone(), CacheConfig::default());

        let coins = queries.coins();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(FakeMarket::calls(&fake.coin_calls), 1);

        assert_eq!(queries.refetch_all(), 1);
        sleep(Duration::from_millis(10)).await;
        assert_eq!(FakeMarket::calls(&fake.coin_calls), 2);
        assert_eq!(FakeMarket::calls(&fake.info_calls), 0);
        drop(coins);
    }
}
