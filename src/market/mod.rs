//! Market Data Client
//!
//! Read-only access to the public market-data API:
//!
//! - **Types**: Record shapes returned by the API (coins, info, tickers, OHLCV)
//! - **Client**: `MarketApi` trait and the `reqwest`-backed `MarketClient`
//! - **Errors**: `NetworkError` / `DecodeError` taxonomy
//!
//! The client performs exactly one GET per call. Retrying is left to the
//! query cache.

mod client;
mod de;
mod error;
mod types;

pub use client::{icon_url, Endpoints, MarketApi, MarketClient, MarketConfig};
pub use error::{MarketError, MarketResult};
pub use types::{CoinId, CoinInfo, CoinSummary, CoinTickers, OhlcvPoint, Quotes, UsdQuote};
