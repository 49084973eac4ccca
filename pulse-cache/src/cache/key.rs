//! Cache keys, invalidation tags, and argument serialization.

use std::fmt;

use super::traits::Endpoint;

/// Identity of a cache entry: endpoint name plus serialized argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    endpoint: &'static str,
    arg: String,
}

impl QueryKey {
    pub fn new(endpoint: &'static str, arg: impl Into<String>) -> Self {
        Self {
            endpoint,
            arg: arg.into(),
        }
    }

    /// Key for `E` called with `arg`.
    pub fn of<E: Endpoint>(arg: &E::Arg) -> Self {
        Self::new(E::NAME, arg.cache_key())
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn arg(&self) -> &str {
        &self.arg
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arg.is_empty() {
            write!(f, "{}", self.endpoint)
        } else {
            write!(f, "{}({})", self.endpoint, self.arg)
        }
    }
}

/// Invalidation category attached to cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(&'static str);

impl Tag {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Query argument that can be folded into a [`QueryKey`].
///
/// Two arguments must produce the same string if and only if they should
/// share a cache entry.
pub trait QueryArg: Clone + Send + Sync + 'static {
    fn cache_key(&self) -> String;
}

impl QueryArg for () {
    fn cache_key(&self) -> String {
        String::new()
    }
}

impl QueryArg for String {
    fn cache_key(&self) -> String {
        self.clone()
    }
}

impl QueryArg for u64 {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(QueryKey::new("getUsers", "").to_string(), "getUsers");
        assert_eq!(QueryKey::new("searchPosts", "hi").to_string(), "searchPosts(hi)");
    }

    #[test]
    fn test_keys_differ_by_argument() {
        let a = QueryKey::new("getUser", 1u64.cache_key());
        let b = QueryKey::new("getUser", 2u64.cache_key());
        assert_ne!(a, b);
        assert_eq!(a, QueryKey::new("getUser", "1"));
    }

    #[test]
    fn test_unit_argument_is_empty() {
        assert_eq!(().cache_key(), "");
        assert_eq!("Term".to_string().cache_key(), "Term");
    }
}
