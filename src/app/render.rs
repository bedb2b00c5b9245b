//! Screen renderers
//!
//! `text` draws a frame for a terminal, colouring with the theme palette
//! unless colour is off. `json` hands the same frame to an external renderer.

use std::fmt::Write;

use super::dashboard::{PageView, Screen};
use crate::theme::Palette;
use crate::views::format::{tooltip_usd, MISSING};
use crate::views::{
    Body, ChartView, Charts, CoinDetailView, CoinListView, Panel, PriceView, TabView,
};

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Widest sparkline drawn
pub const SPARK_WIDTH: usize = 60;

/// Serialize a screen as pretty JSON
pub fn json(screen: &Screen) -> serde_json::Result<String> {
    serde_json::to_string_pretty(screen)
}

/// RGB of a palette colour; `None` for `transparent` or unknown names
fn rgb(color: &str) -> Option<(u8, u8, u8)> {
    match color {
        "black" => Some((0, 0, 0)),
        "white" => Some((255, 255, 255)),
        "whitesmoke" => Some((245, 245, 245)),
        hex if hex.len() == 7 && hex.is_ascii() && hex.starts_with('#') => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some((channel(1)?, channel(3)?, channel(5)?))
        }
        _ => None,
    }
}

struct Painter {
    palette: Palette,
    color: bool,
}

impl Painter {
    fn paint(&self, color: &str, text: &str) -> String {
        match (self.color, rgb(color)) {
            (true, Some((r, g, b))) => format!("\x1b[38;2;{};{};{}m{}\x1b[0m", r, g, b, text),
            _ => text.to_string(),
        }
    }

    fn accent(&self, text: &str) -> String {
        self.paint(self.palette.accent, text)
    }

    fn up(&self, text: &str) -> String {
        self.paint(self.palette.up, text)
    }

    fn down(&self, text: &str) -> String {
        self.paint(self.palette.down, text)
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            format!("\x1b[1m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }
}

/// Sparkline of `values`, scaled to their own range, last [`SPARK_WIDTH`] only
pub fn sparkline(values: &[f64]) -> String {
    let values = &values[values.len().saturating_sub(SPARK_WIDTH)..];
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= 0.0 || !span.is_finite() {
                SPARK[SPARK.len() / 2]
            } else {
                let level = ((v - min) / span * (SPARK.len() - 1) as f64).round() as usize;
                SPARK[level.min(SPARK.len() - 1)]
            }
        })
        .collect()
}

/// Render a screen as terminal text
pub fn text(screen: &Screen, color: bool) -> String {
    let painter = Painter {
        palette: screen.palette,
        color,
    };
    let mut out = String::new();

    match &screen.page {
        PageView::CoinList(view) => coin_list(&mut out, &painter, view),
        PageView::Coin(view) => coin_detail(&mut out, &painter, view),
        PageView::NotFound { path, home } => {
            let _ = writeln!(out, "{}", painter.accent("Not Found"));
            let _ = writeln!(out, "No page at {}", path);
            let _ = writeln!(out, "← {} ({})", home.label, home.href);
        }
    }

    let status = &screen.footer.status;
    let state = if let Some(error) = &status.error {
        painter.down(&format!("error: {}", error))
    } else if status.loading {
        "loading…".to_string()
    } else if let Some(at) = status.updated_at {
        format!("updated {}", at.format("%H:%M:%S"))
    } else {
        String::new()
    };
    let fetching = if status.fetching { " ⟳" } else { "" };
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "[{}] {}{}   t: theme  r: refresh  h: home  q: quit",
        screen.theme, state, fetching
    );
    out
}

fn loading_or_failed<T>(out: &mut String, painter: &Painter, body: &Body<T>) {
    match body {
        Body::Loading(message) => {
            let _ = writeln!(out, "{}", message);
        }
        Body::Failed(message) => {
            let _ = writeln!(out, "{}", painter.down(message));
        }
        Body::Ready(_) => {}
    }
}

fn coin_list(out: &mut String, painter: &Painter, view: &CoinListView) {
    let _ = writeln!(out, "{}", painter.accent(&painter.bold(&view.title)));
    let _ = writeln!(out);

    let Body::Ready(items) = &view.body else {
        loading_or_failed(out, painter, &view.body);
        return;
    };
    for item in items {
        let _ = writeln!(
            out,
            "{:>4}  {:<8} {}  {}",
            item.rank, item.symbol, item.link.label, item.link.href
        );
    }
}

fn coin_detail(out: &mut String, painter: &Painter, view: &CoinDetailView) {
    let _ = writeln!(out, "← {} ({})", view.home.label, view.home.href);
    let _ = writeln!(out, "{}", painter.accent(&painter.bold(&view.title)));
    let _ = writeln!(out);

    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{}", painter.down(notice));
    }

    match &view.body {
        Body::Ready(detail) => {
            let _ = writeln!(out, "{}", panel_row(&detail.overview));
            if !detail.description.is_empty() {
                let _ = writeln!(out, "{}", detail.description);
            }
            let _ = writeln!(out, "{}", panel_row(&detail.supply));
        }
        body => loading_or_failed(out, painter, body),
    }

    let _ = writeln!(out);
    let tabs: Vec<String> = view
        .tabs
        .iter()
        .map(|tab| {
            if tab.active {
                painter.accent(&format!("[{}]", tab.label))
            } else {
                format!(" {} ", tab.label)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", tabs.join(" "));
    let _ = writeln!(out);

    match &view.child {
        TabView::Chart(chart) => chart_tab(out, painter, chart),
        TabView::Price(price) => price_tab(out, painter, price),
    }
}

fn panel_row(panels: &[Panel]) -> String {
    panels
        .iter()
        .map(|p| format!("{}: {}", p.label.to_uppercase(), p.value))
        .collect::<Vec<_>>()
        .join("  |  ")
}

fn chart_tab(out: &mut String, painter: &Painter, view: &ChartView) {
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{}", painter.down(notice));
    }
    let Body::Ready(Charts { line, candlestick }) = &view.body else {
        loading_or_failed(out, painter, &view.body);
        return;
    };

    for series in &line.series {
        let closes: Vec<f64> = series.data.iter().map(|p| p.y).collect();
        let (Some(first), Some(last)) = (closes.first(), closes.last()) else {
            let _ = writeln!(out, "{}: no data", series.name);
            continue;
        };
        let spark = sparkline(&closes);
        let spark = if last >= first {
            painter.up(&spark)
        } else {
            painter.down(&spark)
        };
        let _ = writeln!(
            out,
            "{}  {}  {} → {}",
            series.name,
            spark,
            line.options.tooltip(*first),
            line.options.tooltip(*last)
        );
    }

    for series in &candlestick.series {
        match series.data.last() {
            Some(candle) => {
                let [open, high, low, close] = candle.y;
                let text = format!(
                    "{}  O {}  H {}  L {}  C {}",
                    series.name,
                    tooltip_usd(open),
                    tooltip_usd(high),
                    tooltip_usd(low),
                    tooltip_usd(close)
                );
                let text = if close >= open {
                    painter.up(&text)
                } else {
                    painter.down(&text)
                };
                let _ = writeln!(out, "{}", text);
            }
            None => {
                let _ = writeln!(out, "{}: {}", series.name, MISSING);
            }
        }
    }
}

fn price_tab(out: &mut String, painter: &Painter, view: &PriceView) {
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{}", painter.down(notice));
    }
    let Body::Ready(cells) = &view.body else {
        loading_or_failed(out, painter, &view.body);
        return;
    };

    const CELL: usize = 14;
    let mut row = String::new();
    let mut used = 0u8;
    for cell in cells {
        if used + cell.span > view.columns {
            let _ = writeln!(out, "{}", row.trim_end());
            row.clear();
            used = 0;
        }
        let width = CELL * cell.span as usize;
        let value = if cell.value.starts_with('-') {
            painter.down(&cell.value)
        } else {
            cell.value.clone()
        };
        let _ = write!(row, "{:<w$}", format!("{} {}", cell.title, value), w = width);
        used += cell.span;
    }
    if !row.is_empty() {
        let _ = writeln!(out, "{}", row.trim_end());
    }
}
