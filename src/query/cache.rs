//! Polling Query Cache
//!
//! Keyed cache of remote results. Each key has at most one fetcher, a set of
//! subscribers with their requested polling intervals and a `watch` channel
//! carrying the observed [`QueryState`]. All bookkeeping happens under one
//! short-lived mutex; fetches, retries, poll timers and eviction run as
//! detached tokio tasks that hold only a weak reference to the cache.

use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use super::key::QueryKey;
use super::retry::RetryConfig;
use super::state::{QueryOptions, QueryState};
use super::subscription::Subscription;
use crate::market::MarketResult;

/// Unique identifier of one subscription
pub type SubscriptionId = Uuid;

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, MarketResult<T>> + Send + Sync>;

/// Cache-wide settings
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Backoff for retryable failures
    pub retry: RetryConfig,
    /// How long an entry without subscribers keeps its value
    pub inactive_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            inactive_ttl: Duration::from_secs(300),
        }
    }
}

/// Cache of values of type `T`, shared by cloning
pub struct QueryCache<T> {
    inner: Arc<CacheInner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub(super) struct CacheInner<T> {
    entries: Mutex<HashMap<QueryKey, Entry<T>>>,
    config: CacheConfig,
}

struct Entry<T> {
    state: watch::Sender<QueryState<T>>,
    fetcher: Fetcher<T>,
    /// Subscriber → requested polling interval
    subscribers: HashMap<SubscriptionId, Option<Duration>>,
    /// Latest generation handed out
    issued: u64,
    /// Latest generation whose outcome was applied
    applied: u64,
    /// Requests issued but not yet completed or abandoned
    pending: usize,
    completed_at: Option<Instant>,
    timer: Option<(u64, JoinHandle<()>)>,
    eviction: Option<(u64, JoinHandle<()>)>,
    next_token: u64,
}

impl<T> Entry<T> {
    fn new(fetcher: Fetcher<T>) -> Self {
        let (state, _) = watch::channel(QueryState::loading());
        Self {
            state,
            fetcher,
            subscribers: HashMap::new(),
            issued: 0,
            applied: 0,
            pending: 0,
            completed_at: None,
            timer: None,
            eviction: None,
            next_token: 0,
        }
    }

    /// Minimum of the subscribers' intervals
    fn effective_interval(&self) -> Option<Duration> {
        self.subscribers.values().flatten().min().copied()
    }

    fn token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn cancel_timer(&mut self) {
        if let Some((_, handle)) = self.timer.take() {
            handle.abort();
        }
    }

    fn cancel_eviction(&mut self) {
        if let Some((_, handle)) = self.eviction.take() {
            handle.abort();
        }
    }

    fn publish(&self, update: impl FnOnce(&mut QueryState<T>)) {
        self.state.send_modify(update);
    }

    fn publish_fetching(&self) {
        let fetching = self.pending > 0;
        self.publish(|state| state.is_fetching = fetching);
    }
}

impl<T> Drop for Entry<T> {
    fn drop(&mut self) {
        self.cancel_timer();
        self.cancel_eviction();
    }
}

/// Spawn on the ambient runtime, if there is one
fn spawn<F>(future: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => Some(handle.spawn(future)),
        Err(_) => {
            tracing::warn!("No tokio runtime, background task skipped");
            None
        }
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    /// Create an empty cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Subscribe to `key`.
    ///
    /// The first subscriber of an idle key fetches immediately (unless a
    /// request is still outstanding) and its `fetch` becomes the key's
    /// fetcher. Dropping the returned handle unsubscribes.
    pub fn subscribe<F, Fut>(&self, key: QueryKey, fetch: F, options: QueryOptions) -> Subscription<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = MarketResult<T>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || fetch().boxed());
        let id = Uuid::new_v4();

        let mut entries = self.inner.entries();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(fetcher.clone()));

        entry.cancel_eviction();
        let was_idle = entry.subscribers.is_empty();
        entry.subscribers.insert(id, options.refetch_interval);
        let receiver = entry.state.subscribe();

        tracing::debug!(
            key = %key,
            subscribers = entry.subscribers.len(),
            interval_ms = ?options.refetch_interval.map(|d| d.as_millis()),
            "Subscribed"
        );

        if was_idle {
            entry.fetcher = fetcher;
            if entry.pending == 0 {
                self.inner.start_fetch(&key, entry);
            }
        } else {
            self.inner.arm_timer(&key, entry);
        }
        drop(entries);

        Subscription::new(id, key, receiver, self.inner.clone())
    }

    /// Issue a fresh fetch for `key`, superseding any outstanding request.
    ///
    /// Returns false when nobody is subscribed to `key`.
    pub fn refetch(&self, key: &QueryKey) -> bool {
        let mut entries = self.inner.entries();
        match entries.get_mut(key) {
            Some(entry) if !entry.subscribers.is_empty() => {
                self.inner.start_fetch(key, entry);
                true
            }
            _ => false,
        }
    }

    /// Refetch every key that has subscribers; returns how many were issued
    pub fn refetch_active(&self) -> usize {
        let mut entries = self.inner.entries();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if !entry.subscribers.is_empty() {
                self.inner.start_fetch(key, entry);
                count += 1;
            }
        }
        count
    }

    /// Current state of `key`, if the cache holds an entry for it
    pub fn state(&self, key: &QueryKey) -> Option<QueryState<T>> {
        self.inner
            .entries()
            .get(key)
            .map(|entry| entry.state.borrow().clone())
    }

    /// Number of live subscriptions to `key`
    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.inner
            .entries()
            .get(key)
            .map_or(0, |entry| entry.subscribers.len())
    }

    /// Number of entries, including inactive ones awaiting eviction
    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Send + Sync + 'static> CacheInner<T> {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a request for `key` and run it, with retries, in the background
    fn start_fetch(self: &Arc<Self>, key: &QueryKey, entry: &mut Entry<T>) {
        entry.cancel_timer();
        entry.issued += 1;
        entry.pending += 1;
        let generation = entry.issued;

        tracing::debug!(key = %key, generation, "Fetch issued");

        let fetcher = entry.fetcher.clone();
        let retry = self.config.retry.clone();
        let weak = Arc::downgrade(self);
        let task_key = key.clone();

        let spawned = spawn(async move {
            let mut attempt = 0;
            let outcome = loop {
                match (*fetcher)().await {
                    Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                        let delay = retry.delay_for_attempt(attempt);
                        attempt += 1;
                        tracing::warn!(
                            key = %task_key,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Fetch failed, retrying"
                        );
                        tokio::time::sleep(delay).await;

                        let keep_going = Weak::upgrade(&weak)
                            .map_or(false, |inner| inner.continue_retry(&task_key, generation));
                        if !keep_going {
                            return;
                        }
                    }
                    other => break other,
                }
            };

            if let Some(inner) = weak.upgrade() {
                inner.complete(&task_key, generation, outcome);
            }
        });

        if spawned.is_none() {
            entry.pending -= 1;
        }
        entry.publish_fetching();
    }

    /// Whether a retrying request is still wanted; abandons it if not
    fn continue_retry(self: &Arc<Self>, key: &QueryKey, generation: u64) -> bool {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };

        if !entry.subscribers.is_empty() && generation == entry.issued {
            return true;
        }

        tracing::debug!(key = %key, generation, "Retry abandoned");
        entry.pending = entry.pending.saturating_sub(1);
        entry.publish_fetching();
        self.arm_timer(key, entry);
        false
    }

    /// Apply the final outcome of request `generation`
    fn complete(self: &Arc<Self>, key: &QueryKey, generation: u64, outcome: MarketResult<T>) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        entry.pending = entry.pending.saturating_sub(1);

        if generation <= entry.applied {
            tracing::debug!(
                key = %key,
                generation,
                applied = entry.applied,
                "Discarding stale result"
            );
            entry.publish_fetching();
            self.arm_timer(key, entry);
            return;
        }

        entry.applied = generation;
        entry.completed_at = Some(Instant::now());
        let fetching = entry.pending > 0;

        match outcome {
            Ok(value) => {
                tracing::debug!(key = %key, generation, "Fetch applied");
                entry.publish(|state| {
                    state.data = Some(Arc::new(value));
                    state.error = None;
                    state.is_loading = false;
                    state.is_fetching = fetching;
                    state.updated_at = Some(Utc::now());
                });
            }
            Err(err) => {
                tracing::warn!(key = %key, generation, error = %err, "Fetch failed");
                entry.publish(|state| {
                    state.error = Some(err);
                    state.is_loading = false;
                    state.is_fetching = fetching;
                });
            }
        }

        self.arm_timer(key, entry);
    }

    /// (Re)arm the poll timer from the last completion
    fn arm_timer(self: &Arc<Self>, key: &QueryKey, entry: &mut Entry<T>) {
        entry.cancel_timer();
        if entry.pending > 0 || entry.subscribers.is_empty() {
            return;
        }
        let (Some(interval), Some(completed_at)) = (entry.effective_interval(), entry.completed_at)
        else {
            return;
        };

        let deadline = completed_at + interval;
        let token = entry.token();
        let weak = Arc::downgrade(self);
        let task_key = key.clone();

        entry.timer = spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = weak.upgrade() {
                inner.fire(&task_key, token);
            }
        })
        .map(|handle| (token, handle));
    }

    fn fire(self: &Arc<Self>, key: &QueryKey, token: u64) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.timer.as_ref().map(|(t, _)| *t) != Some(token) {
            return;
        }
        entry.timer = None;

        if entry.pending == 0 && !entry.subscribers.is_empty() {
            tracing::debug!(key = %key, "Poll interval elapsed");
            self.start_fetch(key, entry);
        }
    }

    pub(super) fn unsubscribe(self: &Arc<Self>, key: &QueryKey, id: SubscriptionId) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.subscribers.remove(&id).is_none() {
            return;
        }

        if entry.subscribers.is_empty() {
            tracing::debug!(key = %key, "Last subscriber left");
            entry.cancel_timer();
            self.schedule_eviction(key, entry);
        } else {
            self.arm_timer(key, entry);
        }
    }

    fn schedule_eviction(self: &Arc<Self>, key: &QueryKey, entry: &mut Entry<T>) {
        entry.cancel_eviction();
        let token = entry.token();
        let ttl = self.config.inactive_ttl;
        let weak = Arc::downgrade(self);
        let task_key = key.clone();

        entry.eviction = spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                inner.evict(&task_key, token);
            }
        })
        .map(|handle| (token, handle));
    }

    fn evict(&self, key: &QueryKey, token: u64) {
        let mut entries = self.entries();
        let due = entries.get_mut(key).map_or(false, |entry| {
            let matches = entry.eviction.as_ref().map(|(t, _)| *t) == Some(token);
            if matches && entry.subscribers.is_empty() {
                entry.eviction = None;
                true
            } else {
                false
            }
        });

        if due {
            entries.remove(key);
            tracing::debug!(key = %key, "Evicted inactive entry");
        }
    }
}
