//! Statistics module deriving per-day dashboard summaries.

pub mod aggregator;
pub mod errors;
pub mod models;

pub use aggregator::StatsAggregator;
pub use errors::{StatsError, StatsResult};
pub use models::{DailyStats, HourlySlot};
