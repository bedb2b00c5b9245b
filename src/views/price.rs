//! Price sub-view: all-time high plus the percent-change grid.

use serde::Serialize;

use super::format::{percent, usd, MISSING};
use super::{stale_notice, Body, PageStatus, ViewConfig};
use crate::market::{CoinId, CoinTickers};
use crate::query::{MarketQueries, QueryState, Subscription};

pub const LOADING: &str = "Loading quotes...";

/// Columns of the grid
pub const COLUMNS: u8 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceCell {
    pub title: String,
    pub value: String,
    /// Grid columns the cell spans
    pub span: u8,
}

impl PriceCell {
    fn new(title: impl Into<String>, value: String, span: u8) -> Self {
        Self {
            title: title.into(),
            value,
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceView {
    pub columns: u8,
    pub body: Body<Vec<PriceCell>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Grid cells: ATH date and price (two columns each), then one cell per window
pub fn cells(tickers: &CoinTickers) -> Vec<PriceCell> {
    let quote = tickers.usd();
    let mut cells = vec![
        PriceCell::new(
            "ATH DATE",
            quote.ath_date.clone().unwrap_or_else(|| MISSING.to_string()),
            2,
        ),
        PriceCell::new(
            "ATH PRICE",
            quote.ath_price.map_or_else(|| MISSING.to_string(), usd),
            2,
        ),
    ];

    cells.extend(
        quote
            .percent_changes()
            .iter()
            .map(|(window, value)| PriceCell::new(format!("{}%", window), percent(*value), 1)),
    );
    cells
}

impl PriceView {
    pub fn build(state: &QueryState<CoinTickers>) -> Self {
        Self {
            columns: COLUMNS,
            body: Body::from_state(state, LOADING, cells),
            notice: stale_notice(state),
        }
    }
}

/// Subscriptions of the price tab
pub struct PricePage {
    tickers: Subscription<CoinTickers>,
}

impl PricePage {
    pub fn new(queries: &MarketQueries, id: &CoinId, config: &ViewConfig) -> Self {
        Self {
            tickers: queries.coin_tickers(id, config.price_tickers_interval),
        }
    }

    pub fn view(&self) -> PriceView {
        PriceView::build(&self.tickers.state())
    }

    pub fn status(&self) -> PageStatus {
        PageStatus::default().merge(&self.tickers.state())
    }

    pub async fn changed(&mut self) -> bool {
        self.tickers.changed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MarketError;
    use crate::query::testing;
    use std::sync::Arc;

    fn ready(tickers: CoinTickers) -> QueryState<CoinTickers> {
        let mut state = QueryState::loading();
        state.is_loading = false;
        state.data = Some(Arc::new(tickers));
        state
    }

    #[test]
    fn test_grid() {
        let view = PriceView::build(&ready(testing::tickers("btc-bitcoin", 1.0)));
        let cells = view.body.ready().unwrap();

        let titles: Vec<&str> = cells.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "ATH DATE", "ATH PRICE", "15m%", "30m%", "1h%", "6h%", "12h%", "24h%", "7d%",
                "30d%", "1y%"
            ]
        );
        assert_eq!(cells[0].value, "2024-03-14T07:10:36Z");
        assert_eq!(cells[1].value, "$73750.070");
        assert_eq!((cells[0].span, cells[1].span, cells[2].span), (2, 2, 1));
        assert_eq!(cells[3].value, "0.02%");
        assert_eq!(cells[7].value, "2%");
        assert_eq!(cells[8].value, "-4.5%");
        assert_eq!(view.columns, 4);
    }

    #[test]
    fn test_missing_ath() {
        let mut tickers = testing::tickers("btc-bitcoin", 1.0);
        tickers.quotes.usd.ath_price = None;
        tickers.quotes.usd.ath_date = None;
        let view = PriceView::build(&ready(tickers));
        let cells = view.body.ready().unwrap();
        assert_eq!(cells[0].value, "-");
        assert_eq!(cells[1].value, "-");
    }

    #[test]
    fn test_loading_and_stale() {
        let view = PriceView::build(&QueryState::loading());
        assert_eq!(view.body, Body::Loading("Loading quotes...".to_string()));

        let mut state = ready(testing::tickers("btc-bitcoin", 1.0));
        state.error = Some(MarketError::status("http://api/q", 503, ""));
        let view = PriceView::build(&state);
        assert!(view.body.ready().is_some());
        assert!(view.notice.unwrap().contains("HTTP 503"));
    }
}
