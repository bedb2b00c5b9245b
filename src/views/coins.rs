//! Coin list page.

use serde::Serialize;

use super::route::Link;
use super::{Body, PageStatus, ViewConfig};
use crate::market::{icon_url, CoinId, CoinSummary};
use crate::query::{MarketQueries, QueryState, Subscription};

pub const TITLE: &str = "Crypto Coins";

/// One row of the list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinListItem {
    pub id: CoinId,
    pub name: String,
    pub symbol: String,
    pub rank: u32,
    pub icon_url: String,
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinListView {
    pub title: String,
    pub body: Body<Vec<CoinListItem>>,
}

impl CoinListView {
    /// Project the listing: first `list_limit` entries in API order
    pub fn build(state: &QueryState<Vec<CoinSummary>>, config: &ViewConfig) -> Self {
        let body = Body::from_state(state, "Loading...", |coins| {
            coins
                .iter()
                .take(config.list_limit)
                .map(|coin| CoinListItem {
                    id: coin.id.clone(),
                    name: coin.name.clone(),
                    symbol: coin.symbol.clone(),
                    rank: coin.rank,
                    icon_url: icon_url(&config.icon_base_url, &coin.symbol),
                    link: Link::to_coin(format!("{} →", coin.name), &coin.id, &coin.name),
                })
                .collect()
        });

        Self {
            title: TITLE.to_string(),
            body,
        }
    }
}

/// Subscriptions of the list route
pub struct CoinListPage {
    coins: Subscription<Vec<CoinSummary>>,
}

impl CoinListPage {
    pub fn new(queries: &MarketQueries) -> Self {
        Self {
            coins: queries.coins(),
        }
    }

    pub fn view(&self, config: &ViewConfig) -> CoinListView {
        CoinListView::build(&self.coins.state(), config)
    }

    pub fn status(&self) -> PageStatus {
        PageStatus::default().merge(&self.coins.state())
    }

    pub async fn changed(&mut self) -> bool {
        self.coins.changed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::testing;
    use std::sync::Arc;

    fn ready(count: usize) -> QueryState<Vec<CoinSummary>> {
        let mut state = QueryState::loading();
        state.is_loading = false;
        state.data = Some(Arc::new(testing::listing(count)));
        state
    }

    #[test]
    fn test_limits_to_first_hundred_in_order() {
        let view = CoinListView::build(&ready(150), &ViewConfig::default());
        let items = view.body.ready().unwrap();

        assert_eq!(view.title, "Crypto Coins");
        assert_eq!(items.len(), 100);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.name, format!("Coin {}", i));
            assert_eq!(item.link.href, format!("/c{}-coin", i));
            assert!(item.link.href.contains(item.id.as_str()));
            assert_eq!(item.link.state.as_ref().unwrap().name, item.name);
        }
    }

    #[test]
    fn test_short_list_and_icons() {
        let config = ViewConfig {
            icon_base_url: "https://icons.test/api/icon".into(),
            ..Default::default()
        };
        let view = CoinListView::build(&ready(3), &config);
        let items = view.body.ready().unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].icon_url, "https://icons.test/api/icon/c0");
        assert_eq!(items[0].link.label, "Coin 0 →");
    }

    #[test]
    fn test_loading() {
        let view = CoinListView::build(&QueryState::loading(), &ViewConfig::default());
        assert!(view.body.is_loading());
    }
}
