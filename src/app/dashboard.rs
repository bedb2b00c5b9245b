//! Dashboard state owner
//!
//! All mutations arrive as [`Message`]s. Navigation drops the previous
//! page's subscriptions before the next page subscribes; switching tabs on
//! the same coin keeps the shell's subscriptions.

use serde::Serialize;
use std::time::Duration;

use crate::query::MarketQueries;
use crate::theme::{Palette, Theme, ThemeReader, ThemeState};
use crate::views::{
    CoinDetailView, CoinListPage, CoinListView, CoinPage, Link, PageStatus, Route, RouteState,
    ViewConfig,
};

/// Mutation of the dashboard
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Go to a path, optionally carrying navigation state
    Navigate(String, Option<RouteState>),
    Home,
    ToggleTheme,
    /// Refetch every active query now
    Refresh,
}

/// View of the active page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageView {
    CoinList(CoinListView),
    Coin(CoinDetailView),
    NotFound { path: String, home: Link },
}

/// Footer line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footer {
    pub theme: Theme,
    #[serde(flatten)]
    pub status: PageStatus,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    pub path: String,
    pub theme: Theme,
    pub palette: Palette,
    pub page: PageView,
    pub footer: Footer,
}

enum Page {
    CoinList(CoinListPage),
    Coin(CoinPage),
    NotFound(String),
}

pub struct Dashboard {
    queries: MarketQueries,
    theme: ThemeState,
    config: ViewConfig,
    route: Route,
    page: Page,
}

impl Dashboard {
    /// Create a dashboard showing the coin list
    pub fn new(queries: MarketQueries, config: ViewConfig, theme: Theme) -> Self {
        let page = Page::CoinList(CoinListPage::new(&queries));
        Self {
            queries,
            theme: ThemeState::new(theme),
            config,
            route: Route::CoinList,
            page,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn subscribe_theme(&mut self) -> ThemeReader {
        self.theme.subscribe()
    }

    /// Apply a message
    pub fn update(&mut self, message: Message) {
        match message {
            Message::Navigate(path, state) => self.navigate(&path, state),
            Message::Home => self.navigate("/", None),
            Message::ToggleTheme => {
                let theme = self.theme.toggle();
                tracing::info!(theme = %theme, "Theme changed");
            }
            Message::Refresh => {
                self.queries.refetch_all();
            }
        }
    }

    fn navigate(&mut self, path: &str, state: Option<RouteState>) {
        let route = Route::parse(path);
        tracing::info!(path = %path, route = %route, "Navigate");

        let tab_switch = match (&route, &self.page) {
            (Route::Coin { id, tab }, Page::Coin(page)) if page.id() == id && state.is_none() => {
                Some(*tab)
            }
            _ => None,
        };
        if let (Some(tab), Page::Coin(page)) = (tab_switch, &mut self.page) {
            page.set_tab(&self.queries, tab, &self.config);
            self.route = route;
            return;
        }

        // Tear down before the next page subscribes.
        self.page = Page::NotFound(String::new());
        self.page = match &route {
            Route::CoinList => Page::CoinList(CoinListPage::new(&self.queries)),
            Route::Coin { id, tab } => Page::Coin(CoinPage::new(
                &self.queries,
                id.clone(),
                state,
                *tab,
                &self.config,
            )),
            Route::NotFound { path } => Page::NotFound(path.clone()),
        };
        self.route = route;
    }

    /// Aggregate status of the active page
    pub fn status(&self) -> PageStatus {
        match &self.page {
            Page::CoinList(page) => page.status(),
            Page::Coin(page) => page.status(),
            Page::NotFound(_) => PageStatus::default(),
        }
    }

    /// Derive the current frame from the cache snapshots
    pub fn screen(&self) -> Screen {
        let theme = self.theme.theme();
        let page = match &self.page {
            Page::CoinList(page) => PageView::CoinList(page.view(&self.config)),
            Page::Coin(page) => PageView::Coin(page.view(theme)),
            Page::NotFound(path) => PageView::NotFound {
                path: path.clone(),
                home: Link::home(),
            },
        };

        Screen {
            path: self.route.path(),
            theme,
            palette: theme.palette(),
            page,
            footer: Footer {
                theme,
                status: self.status(),
            },
        }
    }

    /// Resolves when a subscription of the active page changed.
    ///
    /// Never resolves on pages without subscriptions.
    pub async fn changed(&mut self) {
        let alive = match &mut self.page {
            Page::CoinList(page) => page.changed().await,
            Page::Coin(page) => page.changed().await,
            Page::NotFound(_) => false,
        };
        if !alive {
            std::future::pending::<()>().await;
        }
    }

    /// Wait until the page has a result for every query, or `timeout`.
    ///
    /// Returns false on timeout.
    pub async fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.status().loading {
            if tokio::time::timeout_at(deadline, self.changed())
                .await
                .is_err()
            {
                return false;
            }
        }
        true
    }
}
