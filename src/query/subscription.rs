//! Subscription handles.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use super::cache::{CacheInner, SubscriptionId};
use super::key::QueryKey;
use super::state::QueryState;

/// Live view of one cache key.
///
/// Holds the key's state channel; dropping the handle removes the
/// subscriber, so a torn-down view never sees results that arrive later.
pub struct Subscription<T: Send + Sync + 'static> {
    id: SubscriptionId,
    key: QueryKey,
    receiver: watch::Receiver<QueryState<T>>,
    cache: Arc<CacheInner<T>>,
}

impl<T: Send + Sync + 'static> Subscription<T> {
    pub(super) fn new(
        id: SubscriptionId,
        key: QueryKey,
        receiver: watch::Receiver<QueryState<T>>,
        cache: Arc<CacheInner<T>>,
    ) -> Self {
        Self {
            id,
            key,
            receiver,
            cache,
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> QueryState<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next state change.
    ///
    /// Returns false if the entry was dropped and no change can follow.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("key", &self.key)
            .finish()
    }
}

impl<T: Send + Sync + 'static> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cache.unsubscribe(&self.key, self.id);
    }
}
