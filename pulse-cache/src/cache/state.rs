//! Query state snapshots delivered to subscribers.
//!
//! Every transition of a cache entry produces a new [`QueryState`]. States
//! are plain values so consumers (and tests) can inspect them without a
//! rendering layer.

use chrono::{DateTime, Utc};
use pulse_core::FetchError;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Lifecycle status of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueryStatus {
    /// Never requested, or created but not yet fetched.
    #[default]
    Idle,
    /// First fetch in flight; no data yet.
    Loading,
    Success,
    Error,
}

/// Snapshot of one cache entry.
///
/// `data` is present iff `status` is `Success`; `error` is present iff
/// `status` is `Error`. A refetch of a successful entry keeps the previous
/// data visible with `is_fetching` set instead of dropping back to `Loading`.
pub struct QueryState<T: ?Sized> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<FetchError>,
    /// A network call for this entry is in flight.
    pub is_fetching: bool,
    /// Invalidated while nobody was subscribed; the next request refetches.
    pub is_stale: bool,
    /// When the last fetch settled.
    pub updated_at: Option<DateTime<Utc>>,
    /// Monotonic transition counter, used to drop out-of-order deliveries.
    pub(crate) version: u64,
}

pub(crate) type ErasedValue = dyn Any + Send + Sync;
pub(crate) type ErasedState = QueryState<ErasedValue>;

impl<T: ?Sized> QueryState<T> {
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_fetching: false,
            is_stale: false,
            updated_at: None,
            version: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == QueryStatus::Idle
    }

    /// First load in progress with nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// The cached value, if any.
    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    pub(crate) fn begin_fetch(&mut self) {
        if self.status == QueryStatus::Success && self.data.is_some() {
            self.is_fetching = true;
        } else {
            self.status = QueryStatus::Loading;
            self.data = None;
            self.error = None;
            self.is_fetching = true;
        }
        self.version += 1;
    }

    pub(crate) fn resolve(&mut self, result: Result<Arc<T>, FetchError>) {
        match result {
            Ok(value) => {
                self.status = QueryStatus::Success;
                self.data = Some(value);
                self.error = None;
            }
            Err(err) => {
                self.status = QueryStatus::Error;
                self.data = None;
                self.error = Some(err);
            }
        }
        self.is_fetching = false;
        self.is_stale = false;
        self.updated_at = Some(Utc::now());
        self.version += 1;
    }

    pub(crate) fn mark_stale(&mut self) {
        self.is_stale = true;
        self.version += 1;
    }
}

impl ErasedState {
    /// Typed view of a type-erased state.
    pub(crate) fn downcast<T: Any + Send + Sync>(&self) -> QueryState<T> {
        let data = self
            .data
            .clone()
            .and_then(|value| value.downcast::<T>().ok());
        debug_assert!(
            self.data.is_none() || data.is_some(),
            "endpoint NAME shared by two output types"
        );
        QueryState {
            status: self.status,
            data,
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            is_stale: self.is_stale,
            updated_at: self.updated_at,
            version: self.version,
        }
    }
}

impl<T: ?Sized> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            is_stale: self.is_stale,
            updated_at: self.updated_at,
            version: self.version,
        }
    }
}

impl<T: ?Sized> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T: ?Sized> fmt::Debug for QueryState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryState")
            .field("status", &self.status)
            .field("has_data", &self.data.is_some())
            .field("error", &self.error)
            .field("is_fetching", &self.is_fetching)
            .field("is_stale", &self.is_stale)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fetch_enters_loading() {
        let mut state = QueryState::<u32>::idle();
        state.begin_fetch();
        assert!(state.is_loading());
        assert!(state.is_fetching);
        assert!(state.data.is_none());
    }

    #[test]
    fn test_refetch_keeps_previous_data() {
        let mut state = QueryState::<u32>::idle();
        state.begin_fetch();
        state.resolve(Ok(Arc::new(7)));
        state.begin_fetch();

        assert!(state.is_success());
        assert!(state.is_fetching);
        assert_eq!(state.data(), Some(&7));
    }

    #[test]
    fn test_error_drops_data_and_retry_clears_error() {
        let mut state = QueryState::<u32>::idle();
        state.begin_fetch();
        state.resolve(Ok(Arc::new(1)));
        state.begin_fetch();
        state.resolve(Err(FetchError::transport("users", "connection refused")));

        assert!(state.is_error());
        assert!(state.data.is_none());
        assert!(state.error.is_some());

        state.begin_fetch();
        assert!(state.is_loading());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_versions_increase_on_every_transition() {
        let mut state = QueryState::<u32>::idle();
        let v0 = state.version;
        state.begin_fetch();
        let v1 = state.version;
        state.resolve(Ok(Arc::new(3)));
        let v2 = state.version;
        state.mark_stale();
        assert!(v0 < v1 && v1 < v2 && v2 < state.version);
        assert!(state.is_stale);
    }

    #[test]
    fn test_downcast_roundtrip() {
        let mut erased = ErasedState::idle();
        erased.begin_fetch();
        erased.resolve(Ok(Arc::new(vec![1u64, 2]) as Arc<ErasedValue>));

        let typed = erased.downcast::<Vec<u64>>();
        assert!(typed.is_success());
        assert_eq!(typed.data(), Some(&vec![1, 2]));
    }
}
