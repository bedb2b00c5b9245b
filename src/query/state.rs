//! Observed query state
//!
//! What a subscriber sees for a key: either still loading, or a complete
//! record (possibly alongside the error of the latest failed refresh).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::market::MarketError;

/// Snapshot of a cache entry as seen by subscribers
#[derive(Debug)]
pub struct QueryState<T> {
    /// Latest successfully fetched value
    pub data: Option<Arc<T>>,
    /// Error of the latest applied fetch, cleared by the next success
    pub error: Option<MarketError>,
    /// No fetch outcome has been applied yet
    pub is_loading: bool,
    /// A request for this key is outstanding
    pub is_fetching: bool,
    /// When `data` was last replaced
    pub updated_at: Option<DateTime<Utc>>,
}

// Manual impls: `T` itself does not need to be `Clone` or `Default`.
impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            updated_at: self.updated_at,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::loading()
    }
}

/// Coarse status derived from a [`QueryState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Loading,
    Error,
    Success,
}

impl<T> QueryState<T> {
    /// State of an entry whose first fetch has not completed
    pub fn loading() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: true,
            is_fetching: false,
            updated_at: None,
        }
    }

    /// An earlier error without data counts as loading while a new
    /// request is outstanding.
    pub fn status(&self) -> QueryStatus {
        if self.data.is_some() {
            QueryStatus::Success
        } else if self.error.is_some() && !self.is_loading && !self.is_fetching {
            QueryStatus::Error
        } else {
            QueryStatus::Loading
        }
    }

    /// Data is shown but the latest refresh failed
    pub fn is_stale(&self) -> bool {
        self.data.is_some() && self.error.is_some()
    }

    /// Borrow the data, if any
    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }
}

/// Per-subscription options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Re-fetch this long after the previous fetch completed
    pub refetch_interval: Option<Duration>,
}

impl QueryOptions {
    /// Fetch once per visit, no polling
    pub fn once() -> Self {
        Self {
            refetch_interval: None,
        }
    }

    /// Poll with the given interval
    pub fn polling(interval: Duration) -> Self {
        Self {
            refetch_interval: Some(interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network_error() -> MarketError {
        MarketError::status("http://api/x", 503, "")
    }

    #[test]
    fn test_status_transitions() {
        let mut state: QueryState<u32> = QueryState::loading();
        assert_eq!(state.status(), QueryStatus::Loading);

        state.is_loading = false;
        state.error = Some(network_error());
        assert_eq!(state.status(), QueryStatus::Error);
        assert!(!state.is_stale());

        state.is_fetching = true;
        assert_eq!(state.status(), QueryStatus::Loading);
        state.is_fetching = false;

        state.data = Some(Arc::new(7));
        assert_eq!(state.status(), QueryStatus::Success);
        assert!(state.is_stale());
        assert_eq!(state.data(), Some(&7));
    }

    #[test]
    fn test_options() {
        assert_eq!(QueryOptions::once().refetch_interval, None);
        assert_eq!(
            QueryOptions::polling(Duration::from_secs(5)).refetch_interval,
            Some(Duration::from_secs(5))
        );
    }
}
