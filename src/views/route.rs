//! Client-side routes and links.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::market::CoinId;

/// Detail sub-view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Chart,
    Price,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Chart => "chart",
            Tab::Price => "price",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Chart => "Chart",
            Tab::Price => "Price",
        }
    }

    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "chart" => Some(Tab::Chart),
            "price" => Some(Tab::Price),
            _ => None,
        }
    }
}

/// Parsed location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Route {
    CoinList,
    Coin { id: CoinId, tab: Tab },
    NotFound { path: String },
}

impl Route {
    /// Parse `/`, `/{id}`, `/{id}/chart` or `/{id}/price`
    pub fn parse(path: &str) -> Self {
        let not_found = || Route::NotFound {
            path: path.to_string(),
        };

        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let id = match segments.first() {
            None => return Route::CoinList,
            Some(raw) => match urlencoding::decode(raw) {
                Ok(id) if !id.trim().is_empty() => CoinId::new(id.into_owned()),
                _ => return not_found(),
            },
        };

        let tab = match segments.get(1..) {
            Some([]) | None => Tab::Chart,
            Some([segment]) => match Tab::parse(segment) {
                Some(tab) => tab,
                None => return not_found(),
            },
            Some(_) => return not_found(),
        };

        Route::Coin { id, tab }
    }

    /// Canonical path of this route
    pub fn path(&self) -> String {
        match self {
            Route::CoinList => "/".to_string(),
            Route::Coin { id, tab } => {
                format!("/{}/{}", urlencoding::encode(id.as_str()), tab.as_str())
            }
            Route::NotFound { path } => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// State carried along a navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteState {
    /// Display name known before the detail fetch resolves
    pub name: String,
}

/// Navigation target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub label: String,
    pub href: String,
    pub route: Route,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<RouteState>,
    pub active: bool,
}

impl Link {
    pub fn new(label: impl Into<String>, route: Route) -> Self {
        Self {
            label: label.into(),
            href: route.path(),
            route,
            state: None,
            active: false,
        }
    }

    /// Link to a coin's detail page carrying its name as state
    pub fn to_coin(label: impl Into<String>, id: &CoinId, name: &str) -> Self {
        let route = Route::Coin {
            id: id.clone(),
            tab: Tab::Chart,
        };
        Self {
            label: label.into(),
            href: format!("/{}", urlencoding::encode(id.as_str())),
            route,
            state: Some(RouteState {
                name: name.to_string(),
            }),
            active: false,
        }
    }

    pub fn home() -> Self {
        Self::new("Home", Route::CoinList)
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, tab: Tab) -> Route {
        Route::Coin {
            id: CoinId::from(id),
            tab,
        }
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::CoinList);
        assert_eq!(Route::parse(""), Route::CoinList);
        assert_eq!(Route::parse("/btc-bitcoin"), coin("btc-bitcoin", Tab::Chart));
        assert_eq!(Route::parse("/btc-bitcoin/"), coin("btc-bitcoin", Tab::Chart));
        assert_eq!(Route::parse("/btc-bitcoin/chart"), coin("btc-bitcoin", Tab::Chart));
        assert_eq!(Route::parse("/btc-bitcoin/price"), coin("btc-bitcoin", Tab::Price));
        assert_eq!(Route::parse("btc-bitcoin/price?x=1"), coin("btc-bitcoin", Tab::Price));
    }

    #[test]
    fn test_parse_not_found() {
        assert_eq!(
            Route::parse("/btc-bitcoin/volume"),
            Route::NotFound {
                path: "/btc-bitcoin/volume".to_string()
            }
        );
        assert!(matches!(Route::parse("/a/chart/extra"), Route::NotFound { .. }));
    }

    #[test]
    fn test_path_round_trips_encoded_ids() {
        let route = coin("odd id", Tab::Price);
        assert_eq!(route.path(), "/odd%20id/price");
        assert_eq!(Route::parse(&route.path()), route);
    }

    #[test]
    fn test_coin_link() {
        let link = Link::to_coin("Bitcoin →", &CoinId::from("btc-bitcoin"), "Bitcoin");
        assert_eq!(link.href, "/btc-bitcoin");
        assert_eq!(link.state.as_ref().map(|s| s.name.as_str()), Some("Bitcoin"));
        assert_eq!(link.route, coin("btc-bitcoin", Tab::Chart));
    }
}
