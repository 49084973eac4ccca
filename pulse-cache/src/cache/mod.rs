//! Query cache with single-flight fetching and tag invalidation.
//!
//! The cache holds one entry per [`QueryKey`] (endpoint name plus argument).
//! Concurrent requests for the same key share one network call, results are
//! served from memory until invalidated, and every transition of an entry is
//! pushed to its subscribers as a [`QueryState`].
//!
//! # Example
//!
//! ```ignore
//! let cache = QueryCache::new(transport, CacheConfig::default());
//!
//! // Callback receives Loading, then Success or Error.
//! let sub = cache.subscribe::<GetPosts, _>((), |state| render(state));
//!
//! // After a mutation elsewhere, refetch everything tagged Posts.
//! cache.invalidate(tags::POSTS);
//!
//! drop(sub);
//! ```

pub mod key;
pub mod query_cache;
pub mod state;
pub mod traits;

pub use key::{QueryArg, QueryKey, Tag};
pub use query_cache::{CacheConfig, CacheStats, QueryCache, Subscription};
pub use state::{QueryState, QueryStatus};
pub use traits::{decode_json, Endpoint, Transport};
