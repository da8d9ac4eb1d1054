//! Availability module computing which tables are free for a time window.
//!
//! A reservation occupies a fixed 2-hour half-open window; a table is free
//! for a requested start when no non-CANCELLED reservation holding it has an
//! overlapping window. All reads, no side effects.

pub mod errors;
pub mod models;
pub mod resolver;

pub use errors::{AvailabilityError, AvailabilityResult};
pub use models::TimeWindow;
pub use resolver::{AvailabilityResolver, free_tables};
