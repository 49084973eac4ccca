//! Pulse Core - Entity Types and Derived Metrics
//!
//! Pure data structures plus the side-effect-free metrics layer.
//! All other crates depend on this.

pub mod entities;
pub mod error;
pub mod metrics;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Upstream numeric user identifier.
pub type UserId = u64;

/// Upstream numeric post identifier.
pub type PostId = u64;

/// Upstream numeric comment identifier.
pub type CommentId = u64;

pub use entities::{Address, Comment, Company, Post, User};
pub use error::{FetchError, FetchResult};
pub use metrics::{
    compute_metrics, recent_activity, ActivityItem, ContributorShare, DashboardMetrics,
    MetricCards, Totals, UserActivity, CONTRIBUTOR_LIMIT, PER_USER_LIMIT, RECENT_ACTIVITY_LIMIT,
};
