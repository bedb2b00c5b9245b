//! Market client error types
//!
//! Two failure kinds reach callers: the request never produced a successful
//! response (`Network`), or the body could not be decoded (`Decode`).

use thiserror::Error;

/// Errors returned by the market-data client
///
/// Cloneable so the query cache can hand the same error to every subscriber.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    /// Transport failure or non-success HTTP status
    #[error("Network error for {url}: {message}")]
    Network {
        url: String,
        /// HTTP status when the server answered, `None` for transport failures
        status: Option<u16>,
        message: String,
    },

    /// Response body was not valid JSON for the expected record shape
    #[error("Decode error for {url}: {message}")]
    Decode { url: String, message: String },
}

impl MarketError {
    /// Build a network error from a transport failure
    pub fn transport(url: impl Into<String>, error: &reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            format!("connection failed: {}", error)
        } else {
            error.to_string()
        };

        MarketError::Network {
            url: url.into(),
            status: None,
            message,
        }
    }

    /// Build a network error from a non-success status
    pub fn status(url: impl Into<String>, status: u16, body: &str) -> Self {
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, truncate(body, 200))
        };

        MarketError::Network {
            url: url.into(),
            status: Some(status),
            message,
        }
    }

    /// Build a decode error
    pub fn decode(url: impl Into<String>, error: impl std::fmt::Display) -> Self {
        MarketError::Decode {
            url: url.into(),
            message: error.to_string(),
        }
    }

    /// Whether a later attempt could succeed
    ///
    /// Transport failures, 408, 429 and 5xx are retryable. Other statuses and
    /// decode failures are not: the same request would get the same answer.
    pub fn is_retryable(&self) -> bool {
        match self {
            MarketError::Network { status: None, .. } => true,
            MarketError::Network {
                status: Some(code), ..
            } => *code == 408 || *code == 429 || *code >= 500,
            MarketError::Decode { .. } => false,
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

/// Result type alias for market client operations
pub type MarketResult<T> = Result<T, MarketError>;
