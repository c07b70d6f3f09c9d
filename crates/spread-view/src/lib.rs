//! Spread View - interactive state and chart view models for the dashboard
//!
//! [`Dashboard`] owns the loaded dataset, the processed timeline and the only
//! mutable state (cursor, selections, playback). Every state change recomputes
//! the visible set, redraws all charts and publishes a [`ViewSnapshot`] to
//! subscribers. Chart output is a serializable scene any surface can render.

pub mod aggregate;
pub mod category_chart;
pub mod chart;
pub mod dashboard;
pub mod error;
pub mod highlight;
pub mod playback;
pub mod propagation_map;
pub mod state;
pub mod time_trend;

pub use aggregate::{group_counts, CategoryCount};
pub use category_chart::CategoryChart;
pub use chart::*;
pub use dashboard::{Dashboard, DashboardOptions, InfoSummary, ViewSnapshot};
pub use error::ViewError;
pub use highlight::{highlight_targets, HighlightOutcome, HighlightTarget};
pub use playback::{Playback, TimelineKey, DEFAULT_STEP, DEFAULT_SWEEP};
pub use propagation_map::{layout_map, MapCluster, MapLink, MapNode, MapScene};
pub use state::{visible_posts, PlatformFilter, ViewState};
pub use time_trend::{daily_buckets, DayBucket, TimeTrendChart};
