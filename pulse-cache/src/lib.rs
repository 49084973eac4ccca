//! Pulse Cache - Data Layer for the Analytics Dashboard
//!
//! A client-side query cache over a REST source: one network call per key
//! per fetch cycle, tag-based invalidation, and observer callbacks that
//! receive every state transition as a plain [`QueryState`] value.
//!
//! The analytics endpoints (users, posts, comments, post search) live in
//! [`endpoints`]; the network itself sits behind [`Transport`].

pub mod cache;
pub mod endpoints;

pub use cache::{
    decode_json, CacheConfig, CacheStats, Endpoint, QueryArg, QueryCache, QueryKey, QueryState,
    QueryStatus, Subscription, Tag, Transport,
};
pub use endpoints::{
    filter_posts, tags, GetComments, GetPosts, GetPostsByUser, GetUser, GetUsers, SearchPosts,
    SEARCH_RESULT_LIMIT,
};
