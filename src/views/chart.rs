//! Chart sub-view
//!
//! Maps OHLCV history into the series and options handed to the chart
//! renderer. Times go out in milliseconds, candles as `[open, high, low, close]`.

use serde::Serialize;

use super::format::tooltip_usd;
use super::{stale_notice, Body, PageStatus, ViewConfig};
use crate::market::{CoinId, OhlcvPoint};
use crate::query::{MarketQueries, QueryState, Subscription};
use crate::theme::{Palette, Theme};

pub const LOADING: &str = "Loading Charts...";

/// One chart sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point<Y> {
    /// Close time, epoch milliseconds
    pub x: i64,
    pub y: Y,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<Y> {
    pub name: String,
    pub data: Vec<Point<Y>>,
}

/// Close time in epoch milliseconds; `None` if it does not fit an `i64`
fn close_millis(point: &OhlcvPoint) -> Option<i64> {
    let millis = point.time_close.checked_mul(1000);
    if millis.is_none() {
        tracing::debug!(
            time_close = point.time_close,
            "Dropping sample with unrepresentable time"
        );
    }
    millis
}

/// Line series of closes, named "Price".
///
/// Samples whose close time overflows in milliseconds are skipped, here and
/// in [`build_candlestick`] alike.
pub fn build_line(points: &[OhlcvPoint]) -> Series<f64> {
    Series {
        name: "Price".to_string(),
        data: points
            .iter()
            .filter_map(|p| {
                Some(Point {
                    x: close_millis(p)?,
                    y: p.close,
                })
            })
            .collect(),
    }
}

/// Candlestick series, named "Rates"
pub fn build_candlestick(points: &[OhlcvPoint]) -> Series<[f64; 4]> {
    Series {
        name: "Rates".to_string(),
        data: points
            .iter()
            .filter_map(|p| {
                Some(Point {
                    x: close_millis(p)?,
                    y: [p.open, p.high, p.low, p.close],
                })
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animations {
    pub enabled: bool,
    pub easing: &'static str,
    pub gradual_delay_ms: u32,
    pub dynamic_speed_ms: u32,
    pub speed_ms: u32,
}

impl Default for Animations {
    fn default() -> Self {
        Self {
            enabled: true,
            easing: "easeinout",
            gradual_delay_ms: 150,
            dynamic_speed_ms: 350,
            speed_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisOptions {
    pub kind: &'static str,
    pub labels: bool,
    pub ticks: bool,
    pub border: bool,
    pub tooltip: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub curve: &'static str,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientFill {
    pub to_colors: Vec<&'static str>,
    pub stops: [u32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleColors {
    pub upward: &'static str,
    pub downward: &'static str,
    pub wick_uses_fill: bool,
}

/// Visual toggles for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub theme: &'static str,
    pub height: u32,
    pub width: u32,
    pub toolbar: bool,
    pub background: &'static str,
    pub font_family: Option<&'static str>,
    pub animations: Animations,
    pub grid: bool,
    pub x_axis: AxisOptions,
    pub y_labels: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<GradientFill>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candles: Option<CandleColors>,
    pub tooltip_prefix: &'static str,
    pub tooltip_decimals: u32,
}

impl ChartOptions {
    fn base(theme: Theme) -> Self {
        Self {
            theme: theme.mode(),
            height: 300,
            width: 500,
            toolbar: false,
            background: "transparent",
            font_family: None,
            animations: Animations::default(),
            grid: false,
            x_axis: AxisOptions {
                kind: "datetime",
                labels: false,
                ticks: false,
                border: false,
                tooltip: true,
            },
            y_labels: false,
            stroke: None,
            fill: None,
            colors: Vec::new(),
            candles: None,
            tooltip_prefix: "$",
            tooltip_decimals: 2,
        }
    }

    /// Smooth gradient line in the accent colour
    pub fn line(theme: Theme) -> Self {
        Self {
            stroke: Some(Stroke {
                curve: "smooth",
                width: 3,
            }),
            fill: Some(GradientFill {
                to_colors: vec!["#0be881"],
                stops: [0, 100],
            }),
            colors: vec![theme.palette().accent],
            ..Self::base(theme)
        }
    }

    /// Candles coloured by direction
    pub fn candlestick(theme: Theme) -> Self {
        let palette: Palette = theme.palette();
        let mut options = Self {
            font_family: Some("inherit"),
            candles: Some(CandleColors {
                upward: palette.up,
                downward: palette.down,
                wick_uses_fill: true,
            }),
            ..Self::base(theme)
        };
        options.x_axis.tooltip = false;
        options
    }

    /// Render a tooltip value
    pub fn tooltip(&self, value: f64) -> String {
        tooltip_usd(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub series: Vec<Series<f64>>,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickChart {
    pub series: Vec<Series<[f64; 4]>>,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub line: LineChart,
    pub candlestick: CandlestickChart,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub body: Body<Charts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl ChartView {
    pub fn build(state: &QueryState<Vec<OhlcvPoint>>, theme: Theme) -> Self {
        let body = Body::from_state(state, LOADING, |points| Charts {
            line: LineChart {
                series: vec![build_line(points)],
                options: ChartOptions::line(theme),
            },
            candlestick: CandlestickChart {
                series: vec![build_candlestick(points)],
                options: ChartOptions::candlestick(theme),
            },
        });

        Self {
            body,
            notice: stale_notice(state),
        }
    }
}

/// Subscriptions of the chart tab
pub struct ChartPage {
    history: Subscription<Vec<OhlcvPoint>>,
}

impl ChartPage {
    pub fn new(queries: &MarketQueries, id: &CoinId, config: &ViewConfig) -> Self {
        Self {
            history: queries.coin_history(id, config.history_interval),
        }
    }

    pub fn view(&self, theme: Theme) -> ChartView {
        ChartView::build(&self.history.state(), theme)
    }

    pub fn status(&self) -> PageStatus {
        PageStatus::default().merge(&self.history.state())
    }

    pub async fn changed(&mut self) -> bool {
        self.history.changed().await
    }
}
