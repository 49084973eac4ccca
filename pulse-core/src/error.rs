//! Error types for Pulse data fetching

use thiserror::Error;

/// Failure of a single fetch against the upstream source.
///
/// Delivered to subscribers as the `error` payload of a query state; never
/// retried automatically.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport failure for {path}: {reason}")]
    Transport { path: String, reason: String },

    #[error("HTTP {status} for {path}: {body}")]
    Status { path: String, status: u16, body: String },

    #[error("Failed to decode response for {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl FetchError {
    pub fn transport(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Network unreachable or a non-2xx response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }

    /// Response body did not match the expected shape.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Transport { path, .. } | Self::Status { path, .. } | Self::Decode { path, .. } => {
                path
            }
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
