//! Host shell
//!
//! Stands in for the browser: owns the router state, the theme and the
//! page subscriptions, and renders screens for the terminal.
//!
//! - **Dashboard**: message-driven state owner
//! - **Render**: text and JSON output of a [`Screen`]

mod dashboard;
pub mod render;

pub use dashboard::{Dashboard, Footer, Message, PageView, Screen};
