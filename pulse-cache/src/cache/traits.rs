//! Transport and endpoint traits.
//!
//! [`Transport`] is the network seam; [`Endpoint`] describes one named
//! resource the cache can hold.

use async_trait::async_trait;
use pulse_core::{FetchError, FetchResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::key::{QueryArg, Tag};

/// Issues GET requests against the upstream source.
///
/// Implementations classify failures: unreachable hosts and non-2xx
/// responses are transport errors, unparseable bodies are decode errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` relative to the base URL and return the JSON body.
    async fn get_json(&self, path: &str) -> FetchResult<Value>;
}

/// A named, cacheable resource.
///
/// `NAME` must be unique across endpoints sharing a cache: entries are keyed
/// by it and typed reads rely on it.
pub trait Endpoint: Send + Sync + 'static {
    const NAME: &'static str;

    type Arg: QueryArg;
    type Output: Send + Sync + 'static;

    /// Resource path for `arg`, relative to the base URL.
    fn path(arg: &Self::Arg) -> String;

    /// Invalidation tags carried by the entry for `arg`.
    fn tags(_arg: &Self::Arg) -> Vec<Tag> {
        Vec::new()
    }

    /// Turn the raw response body into the cached value.
    fn decode(raw: Value, arg: &Self::Arg, path: &str) -> FetchResult<Self::Output>;
}

/// Deserialize a response body, reporting mismatches as decode errors.
pub fn decode_json<T: DeserializeOwned>(raw: Value, path: &str) -> FetchResult<T> {
    serde_json::from_value(raw).map_err(|e| FetchError::decode(path, e))
}
