//! # Table Book
//!
//! A restaurant table reservation engine: table registry, availability
//! resolution, the reservation status lifecycle, and per-day statistics.
//!
//! ## Architecture
//!
//! Reservations occupy a fixed 2-hour half-open window starting at their
//! stored start time. The core invariant is that no table belongs to two
//! non-CANCELLED reservations with overlapping windows; it is enforced at a
//! single chokepoint, [`reservations::ReservationManager::create`], which
//! re-resolves availability and claims the tables inside one database
//! transaction with the table rows locked. Everything else is CRUD around
//! that invariant:
//!
//! - **Table registry**: physical tables with a number, seat capacity, and
//!   an active flag. Inactive tables never appear in availability results;
//!   referenced tables cannot be deleted.
//! - **Availability**: active tables minus those claimed for an overlapping
//!   window, ordered by table number.
//! - **Lifecycle**: PENDING / CONFIRMED / CANCELLED, staff-driven, no
//!   terminal state; cancelling releases the tables immediately.
//! - **Statistics**: on-demand per-day totals, status buckets, and hourly
//!   slots for the dashboard.
//!
//! Who is calling is always explicit: staff-gated operations take a
//! [`identity::Caller`] built by the server edge from a verified credential.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use table_book::availability::AvailabilityResolver;
//! use table_book::db::{Database, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()).await?;
//!     let resolver = AvailabilityResolver::new(Arc::new(db.pool().clone()));
//!
//!     let free = resolver
//!         .find_available_tables("2024-01-01T19:00:00Z".parse()?, Some(4))
//!         .await?;
//!     println!("{} tables free", free.len());
//!     Ok(())
//! }
//! ```

/// PostgreSQL connection pooling.
pub mod db;

/// Request-scoped caller identity.
pub mod identity;
pub use identity::{Caller, UserId};

/// Table registry.
pub mod tables;
pub use tables::{Table, TableId, TableManager};

/// Free-table resolution for a time window.
pub mod availability;
pub use availability::{AvailabilityResolver, TimeWindow};

/// Reservation lifecycle and admission control.
pub mod reservations;
pub use reservations::{
    RESERVATION_DURATION_HOURS, Reservation, ReservationManager, ReservationStatus,
};

/// Per-day statistics.
pub mod stats;
pub use stats::{DailyStats, StatsAggregator};
