//! Single-flight query cache with tag invalidation.
//!
//! Entries are keyed by [`QueryKey`] and hold a type-erased [`QueryState`].
//! At most one network call is in flight per key: later requests for the
//! same key attach to it. The fetch runs on a spawned task, so it completes
//! (and populates the cache) even if every caller that asked for it has
//! gone away.
//!
//! Only the task that owns the in-flight fetch writes the settled state for
//! its key. Locks are never held across an await or while invoking
//! subscriber callbacks.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use pulse_core::FetchResult;
use tokio::sync::watch;

use super::key::{QueryKey, Tag};
use super::state::{ErasedState, ErasedValue, QueryState};
use super::traits::{Endpoint, Transport};

type Loader =
    Arc<dyn Fn(Arc<dyn Transport>) -> BoxFuture<'static, FetchResult<Arc<ErasedValue>>> + Send + Sync>;
type Listener = Arc<dyn Fn(&ErasedState) + Send + Sync>;

/// Configuration for the query cache.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Age after which a successful entry is revalidated on the next request.
    /// `None` keeps entries fresh until invalidated or refetched.
    pub stale_time: Option<Duration>,
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stale time.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from a fresh entry.
    pub hits: u64,
    /// Requests that had to go to the network.
    pub misses: u64,
    /// Network calls issued, including forced refetches.
    pub network_calls: u64,
    /// Requests that attached to an in-flight call.
    pub deduplicated: u64,
    /// Entries touched by tag invalidation.
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    network_calls: AtomicU64,
    deduplicated: AtomicU64,
    invalidations: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            network_calls: self.network_calls.load(Ordering::Relaxed),
            deduplicated: self.deduplicated.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

struct Entry {
    state: watch::Sender<ErasedState>,
    tags: Vec<Tag>,
    loader: Loader,
    listeners: Vec<(u64, Listener)>,
    fetched_at: Option<Instant>,
    /// Invalidated while a fetch was in flight.
    refetch_on_settle: bool,
}

impl Entry {
    fn new<E: Endpoint>(arg: &E::Arg) -> Self {
        let (state, _) = watch::channel(ErasedState::idle());
        let loader_arg = arg.clone();
        let loader: Loader = Arc::new(
            move |transport: Arc<dyn Transport>| -> BoxFuture<'static, FetchResult<Arc<ErasedValue>>> {
                let arg = loader_arg.clone();
                Box::pin(async move {
                    let path = E::path(&arg);
                    let raw = transport.get_json(&path).await?;
                    let value = E::decode(raw, &arg, &path)?;
                    Ok(Arc::new(value) as Arc<ErasedValue>)
                })
            },
        );
        Self {
            state,
            tags: E::tags(arg),
            loader,
            listeners: Vec::new(),
            fetched_at: None,
            refetch_on_settle: false,
        }
    }

    fn snapshot(&self) -> ErasedState {
        self.state.borrow().clone()
    }

    fn is_fetching(&self) -> bool {
        self.state.borrow().is_fetching
    }

    fn is_fresh(&self, stale_time: Option<Duration>) -> bool {
        let state = self.state.borrow();
        if !state.is_success() || state.is_stale {
            return false;
        }
        match (stale_time, self.fetched_at) {
            (Some(max_age), Some(fetched_at)) => fetched_at.elapsed() < max_age,
            _ => true,
        }
    }

    fn listener_fns(&self) -> Vec<Listener> {
        self.listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

/// A fetch that has been claimed under the lock and must be dispatched
/// after it is released.
struct Pending {
    key: QueryKey,
    loader: Loader,
    state: ErasedState,
    listeners: Vec<Listener>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    config: CacheConfig,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    next_listener_id: AtomicU64,
    counters: Counters,
}

impl Inner {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide whether `entry` needs a network call and claim it if so.
    fn plan(&self, key: &QueryKey, entry: &mut Entry, force: bool) -> Option<Pending> {
        if entry.is_fetching() {
            Counters::bump(&self.counters.deduplicated);
            tracing::debug!(key = %key, "Attached to in-flight fetch");
            return None;
        }
        if !force {
            if entry.is_fresh(self.config.stale_time) {
                Counters::bump(&self.counters.hits);
                return None;
            }
            Counters::bump(&self.counters.misses);
        }

        entry.state.send_modify(|state| state.begin_fetch());
        Counters::bump(&self.counters.network_calls);
        tracing::debug!(key = %key, force, "Starting fetch");

        Some(Pending {
            key: key.clone(),
            loader: Arc::clone(&entry.loader),
            state: entry.snapshot(),
            listeners: entry.listener_fns(),
        })
    }

    fn dispatch(self: &Arc<Self>, pending: Pending) {
        notify(&pending.listeners, &pending.state);

        let inner = Arc::clone(self);
        let transport = Arc::clone(&self.transport);
        let Pending { key, loader, .. } = pending;
        tokio::spawn(async move {
            let result = loader(transport).await;
            inner.settle(&key, result);
        });
    }

    fn settle(self: &Arc<Self>, key: &QueryKey, result: FetchResult<Arc<ErasedValue>>) {
        match &result {
            Ok(_) => tracing::debug!(key = %key, "Fetch succeeded"),
            Err(err) => tracing::warn!(key = %key, error = %err, "Fetch failed"),
        }

        let (settled, listeners, follow_up) = {
            let mut entries = self.entries();
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            entry.state.send_modify(|state| state.resolve(result));
            entry.fetched_at = Some(Instant::now());
            let settled = entry.snapshot();
            let listeners = entry.listener_fns();

            let mut follow_up = None;
            if std::mem::take(&mut entry.refetch_on_settle) {
                if entry.listeners.is_empty() {
                    entry.state.send_modify(|state| state.mark_stale());
                } else {
                    follow_up = self.plan(key, entry, true);
                }
            }
            (settled, listeners, follow_up)
        };

        notify(&listeners, &settled);
        if let Some(pending) = follow_up {
            self.dispatch(pending);
        }
    }

    fn remove_listener(&self, key: &QueryKey, id: u64) {
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(key) {
            entry.listeners.retain(|(listener_id, _)| *listener_id != id);
            tracing::debug!(key = %key, remaining = entry.listeners.len(), "Unsubscribed");
        }
    }
}

fn notify(listeners: &[Listener], state: &ErasedState) {
    for listener in listeners {
        listener(state);
    }
}

/// Client-side query cache.
///
/// Cheap to clone; clones share entries. Fetches are spawned on the ambient
/// tokio runtime, so requests must be issued from within one.
///
/// # Example
///
/// ```ignore
/// let cache = QueryCache::new(Arc::new(rest_client), CacheConfig::default());
///
/// let _sub = cache.subscribe::<GetUsers, _>((), |state| {
///     if let Some(users) = state.data() {
///         println!("{} users", users.len());
///     }
/// });
///
/// let posts = cache.query::<GetPosts>(&()).await;
/// cache.invalidate(tags::POSTS);
/// ```
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl QueryCache {
    pub fn new(transport: Arc<dyn Transport>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                entries: Mutex::new(HashMap::new()),
                next_listener_id: AtomicU64::new(1),
                counters: Counters::default(),
            }),
        }
    }

    /// Create a new query cache with default configuration.
    pub fn with_defaults(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Register `on_change` for every state transition of `E(arg)`.
    ///
    /// The callback first receives the current state, then each later
    /// transition in order. A fetch is started unless fresh data is cached
    /// or one is already in flight. Dropping the returned handle stops
    /// delivery but never cancels a fetch.
    pub fn subscribe<E, F>(&self, arg: E::Arg, on_change: F) -> Subscription
    where
        E: Endpoint,
        F: Fn(&QueryState<E::Output>) + Send + Sync + 'static,
    {
        let key = QueryKey::of::<E>(&arg);
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);

        // Deliveries race between the subscribing thread and the fetch task;
        // never hand the callback an older state than it has already seen.
        let delivered = AtomicU64::new(0);
        let listener: Listener = Arc::new(move |state: &ErasedState| {
            let seen = state.version + 1;
            if delivered.fetch_max(seen, Ordering::AcqRel) < seen {
                on_change(&state.downcast::<E::Output>());
            }
        });

        let (current, pending) = {
            let mut entries = self.inner.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new::<E>(&arg));
            entry.listeners.push((id, Arc::clone(&listener)));
            let pending = self.inner.plan(&key, entry, false);
            (entry.snapshot(), pending)
        };

        tracing::debug!(key = %key, "Subscribed");
        match pending {
            Some(pending) => self.inner.dispatch(pending),
            None => listener(&current),
        }

        Subscription {
            inner: Arc::downgrade(&self.inner),
            key,
            id,
        }
    }

    /// Request `E(arg)` and wait for a settled state.
    ///
    /// Served from cache when fresh; otherwise shares the in-flight fetch
    /// or starts one. Failures come back as an `Error` state, never a panic
    /// or `Err`.
    pub async fn query<E: Endpoint>(&self, arg: &E::Arg) -> QueryState<E::Output> {
        self.request::<E>(arg, false).await
    }

    /// Force a network call for `E(arg)` and wait for it to settle.
    ///
    /// Existing data stays visible while the refetch is in flight. If a
    /// fetch is already running, this attaches to it.
    pub async fn refetch<E: Endpoint>(&self, arg: &E::Arg) -> QueryState<E::Output> {
        self.request::<E>(arg, true).await
    }

    async fn request<E: Endpoint>(&self, arg: &E::Arg, force: bool) -> QueryState<E::Output> {
        let key = QueryKey::of::<E>(arg);
        let (mut settled_rx, pending) = {
            let mut entries = self.inner.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new::<E>(arg));
            let pending = self.inner.plan(&key, entry, force);
            (entry.state.subscribe(), pending)
        };

        if let Some(pending) = pending {
            self.inner.dispatch(pending);
        }

        let settled = settled_rx
            .wait_for(|state| !state.is_fetching)
            .await
            .map(|state| state.clone())
            .ok();
        settled
            .unwrap_or_else(|| settled_rx.borrow().clone())
            .downcast::<E::Output>()
    }

    /// Force a network call for an existing entry without waiting.
    ///
    /// Returns `false` if nothing has ever requested `key`.
    pub fn refetch_key(&self, key: &QueryKey) -> bool {
        let pending = {
            let mut entries = self.inner.entries();
            let Some(entry) = entries.get_mut(key) else {
                return false;
            };
            self.inner.plan(key, entry, true)
        };
        if let Some(pending) = pending {
            self.inner.dispatch(pending);
        }
        true
    }

    /// Force a network call for every known entry of `endpoint`.
    ///
    /// Returns the number of entries refetched or already in flight.
    pub fn refetch_endpoint(&self, endpoint: &str) -> usize {
        let mut touched = 0;
        let pending: Vec<Pending> = {
            let mut entries = self.inner.entries();
            entries
                .iter_mut()
                .filter(|(key, _)| key.endpoint() == endpoint)
                .filter_map(|(key, entry)| {
                    touched += 1;
                    self.inner.plan(key, entry, true)
                })
                .collect()
        };
        for pending in pending {
            self.inner.dispatch(pending);
        }
        touched
    }

    /// Invalidate every entry carrying `tag`.
    ///
    /// Subscribed entries are refetched exactly once (deferred until an
    /// in-flight fetch lands). Unsubscribed entries are only marked stale so
    /// their next request goes to the network. Returns the number of
    /// refetches triggered or scheduled.
    pub fn invalidate(&self, tag: Tag) -> usize {
        let mut triggered = 0;
        let mut marked_stale = 0;
        let mut pending = Vec::new();
        {
            let mut entries = self.inner.entries();
            for (key, entry) in entries.iter_mut() {
                if !entry.tags.contains(&tag) {
                    continue;
                }
                Counters::bump(&self.inner.counters.invalidations);

                if entry.is_fetching() {
                    entry.refetch_on_settle = true;
                    if !entry.listeners.is_empty() {
                        triggered += 1;
                    }
                    continue;
                }
                if entry.listeners.is_empty() {
                    entry.state.send_modify(|state| state.mark_stale());
                    marked_stale += 1;
                    continue;
                }
                if let Some(claimed) = self.inner.plan(key, entry, true) {
                    pending.push(claimed);
                    triggered += 1;
                }
            }
        }

        tracing::debug!(tag = %tag, triggered, marked_stale, "Invalidated tag");
        for claimed in pending {
            self.inner.dispatch(claimed);
        }
        triggered
    }

    /// Current state of `E(arg)` without triggering a fetch.
    pub fn state<E: Endpoint>(&self, arg: &E::Arg) -> QueryState<E::Output> {
        let key = QueryKey::of::<E>(arg);
        self.inner
            .entries()
            .get(&key)
            .map(|entry| entry.snapshot().downcast::<E::Output>())
            .unwrap_or_default()
    }

    /// Number of live subscriptions on `key`.
    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.inner
            .entries()
            .get(key)
            .map(|entry| entry.listeners.len())
            .unwrap_or(0)
    }

    /// Number of cache entries.
    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.counters.snapshot()
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.inner.config)
            .field("entries", &self.len())
            .finish()
    }
}

/// Live registration of a callback against one cache key.
///
/// Dropping it unsubscribes. An in-flight fetch started on its behalf keeps
/// running and still populates the cache.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    inner: Weak<Inner>,
    key: QueryKey,
    id: u64,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.remove_listener(&self.key, self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}
