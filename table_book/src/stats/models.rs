//! Statistics data models. Derived on demand, never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reservation count and guest sum for one hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySlot {
    /// Hour label, e.g. `"19:00"`
    pub hour: String,
    pub reservations: i64,
    pub guests: i64,
}

/// Per-day dashboard summary.
///
/// Totals count every status; the pending/confirmed buckets exclude
/// CANCELLED, which therefore shows up in `total_reservations` without
/// landing in either bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_reservations: i64,
    pub pending_reservations: i64,
    pub confirmed_reservations: i64,
    pub total_guests: i64,
    pub hourly: Vec<HourlySlot>,
}

impl DailyStats {
    /// The all-zero summary for a day with no reservations.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_reservations: 0,
            pending_reservations: 0,
            confirmed_reservations: 0,
            total_guests: 0,
            hourly: Vec::new(),
        }
    }
}
