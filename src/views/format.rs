//! Display formatting shared by the views.

/// Monetary value, three decimals: `$1234.568`
pub fn usd(value: f64) -> String {
    format!("${:.3}", value)
}

/// Percentage as delivered by the API, no rounding: `-4.5%`
pub fn percent(value: f64) -> String {
    format!("{}%", value)
}

/// Chart tooltip value, two decimals
pub fn tooltip_usd(value: f64) -> String {
    format!("${:.2}", value)
}

/// Supply figure as delivered by the API
pub fn supply(value: f64) -> String {
    format!("{}", value)
}

/// Placeholder for absent values
pub const MISSING: &str = "-";
