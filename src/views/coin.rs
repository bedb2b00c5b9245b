//! Coin detail shell
//!
//! Info (fetched once) and tickers (polled) for one coin, the summary panels,
//! and whichever tab is active. The title prefers the name carried by the
//! navigation, so the page is labelled before either fetch resolves.

use serde::Serialize;

use super::chart::{ChartPage, ChartView};
use super::format::{supply, usd};
use super::price::{PricePage, PriceView};
use super::route::{Link, Route, RouteState, Tab};
use super::{stale_notice, Body, PageStatus, ViewConfig};
use crate::market::{CoinId, CoinInfo, CoinTickers};
use crate::query::{MarketQueries, QueryState, QueryStatus, Subscription};
use crate::theme::Theme;

pub const LOADING: &str = "Loading...";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub label: String,
    pub value: String,
}

impl Panel {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// Loaded content of the shell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinDetail {
    /// Rank, symbol, price
    pub overview: Vec<Panel>,
    pub description: String,
    /// Total and max supply
    pub supply: Vec<Panel>,
}

impl CoinDetail {
    pub fn build(info: &CoinInfo, tickers: &CoinTickers) -> Self {
        Self {
            overview: vec![
                Panel::new("Rank", info.rank.to_string()),
                Panel::new("Symbol", format!("${}", info.symbol)),
                Panel::new("Price", usd(tickers.usd().price)),
            ],
            description: info.description.clone(),
            supply: vec![
                Panel::new("Total Supply", supply(tickers.total_supply)),
                Panel::new("Max Supply", supply(tickers.max_supply)),
            ],
        }
    }
}

/// View of the active tab
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tab", rename_all = "lowercase")]
pub enum TabView {
    Chart(ChartView),
    Price(PriceView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinDetailView {
    pub id: CoinId,
    pub title: String,
    pub home: Link,
    pub body: Body<CoinDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub tabs: Vec<Link>,
    pub child: TabView,
}

/// Title: navigation hint, else "Loading..." while either query is pending,
/// else the fetched name (the id when info could not be fetched)
pub fn title(
    id: &CoinId,
    hint: Option<&RouteState>,
    info: &QueryState<CoinInfo>,
    tickers: &QueryState<CoinTickers>,
) -> String {
    if let Some(hint) = hint {
        return hint.name.clone();
    }
    if info.is_loading || tickers.is_loading {
        return LOADING.to_string();
    }
    info.data()
        .map_or_else(|| id.to_string(), |info| info.name.clone())
}

/// Body of the shell: both records present, else the first final failure
pub fn body(info: &QueryState<CoinInfo>, tickers: &QueryState<CoinTickers>) -> Body<CoinDetail> {
    match (info.data(), tickers.data()) {
        (Some(info), Some(tickers)) => Body::Ready(CoinDetail::build(info, tickers)),
        _ => {
            let failed = [(info.status(), &info.error), (tickers.status(), &tickers.error)]
                .into_iter()
                .find_map(|(status, error)| match status {
                    QueryStatus::Error => error.as_ref(),
                    _ => None,
                });
            match failed {
                Some(err) => Body::Failed(err.to_string()),
                None => Body::Loading(LOADING.to_string()),
            }
        }
    }
}

pub fn tabs(id: &CoinId, active: Tab) -> Vec<Link> {
    [Tab::Chart, Tab::Price]
        .into_iter()
        .map(|tab| {
            Link::new(
                tab.label(),
                Route::Coin {
                    id: id.clone(),
                    tab,
                },
            )
            .active(tab == active)
        })
        .collect()
}

/// Subscriptions of the active tab
pub enum TabPage {
    Chart(ChartPage),
    Price(PricePage),
}

impl TabPage {
    fn new(queries: &MarketQueries, id: &CoinId, tab: Tab, config: &ViewConfig) -> Self {
        match tab {
            Tab::Chart => TabPage::Chart(ChartPage::new(queries, id, config)),
            Tab::Price => TabPage::Price(PricePage::new(queries, id, config)),
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            TabPage::Chart(_) => Tab::Chart,
            TabPage::Price(_) => Tab::Price,
        }
    }

    fn view(&self, theme: Theme) -> TabView {
        match self {
            TabPage::Chart(page) => TabView::Chart(page.view(theme)),
            TabPage::Price(page) => TabView::Price(page.view()),
        }
    }

    fn status(&self) -> PageStatus {
        match self {
            TabPage::Chart(page) => page.status(),
            TabPage::Price(page) => page.status(),
        }
    }

    async fn changed(&mut self) -> bool {
        match self {
            TabPage::Chart(page) => page.changed().await,
            TabPage::Price(page) => page.changed().await,
        }
    }
}

/// Subscriptions of a coin route
pub struct CoinPage {
    id: CoinId,
    hint: Option<RouteState>,
    info: Subscription<CoinInfo>,
    tickers: Subscription<CoinTickers>,
    tab: TabPage,
}

impl CoinPage {
    pub fn new(
        queries: &MarketQueries,
        id: CoinId,
        hint: Option<RouteState>,
        tab: Tab,
        config: &ViewConfig,
    ) -> Self {
        let info = queries.coin_info(&id);
        let tickers = queries.coin_tickers(&id, config.detail_tickers_interval);
        let tab = TabPage::new(queries, &id, tab, config);
        Self {
            id,
            hint,
            info,
            tickers,
            tab,
        }
    }

    pub fn id(&self) -> &CoinId {
        &self.id
    }

    /// Switch tabs, keeping the shell's own subscriptions
    pub fn set_tab(&mut self, queries: &MarketQueries, tab: Tab, config: &ViewConfig) {
        if self.tab.tab() != tab {
            self.tab = TabPage::new(queries, &self.id, tab, config);
        }
    }

    pub fn view(&self, theme: Theme) -> CoinDetailView {
        let info = self.info.state();
        let tickers = self.tickers.state();

        CoinDetailView {
            id: self.id.clone(),
            title: title(&self.id, self.hint.as_ref(), &info, &tickers),
            home: Link::home(),
            body: body(&info, &tickers),
            notice: stale_notice(&info).or_else(|| stale_notice(&tickers)),
            tabs: tabs(&self.id, self.tab.tab()),
            child: self.tab.view(theme),
        }
    }

    /// Status of the shell and its tab
    pub fn status(&self) -> PageStatus {
        let tab = self.tab.status();
        let shell = PageStatus::default()
            .merge(&self.info.state())
            .merge(&self.tickers.state());
        PageStatus {
            loading: shell.loading || tab.loading,
            fetching: shell.fetching || tab.fetching,
            updated_at: shell.updated_at.max(tab.updated_at),
            error: shell.error.or(tab.error),
        }
    }

    /// Resolves when any of the page's subscriptions changed
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            changed = self.info.changed() => changed,
            changed = self.tickers.changed() => changed,
            changed = self.tab.changed() => changed,
        }
    }
}
