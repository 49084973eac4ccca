//! Reusable widget components.

pub mod detail;
pub mod metric_card;
pub mod share;
pub mod status;

pub use detail::DetailPanel;
pub use metric_card::{CardValue, MetricCard};
pub use share::ShareGauges;
pub use status::StatusIndicator;
