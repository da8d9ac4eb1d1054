//! Statistics aggregator implementation.

use super::{
    errors::{StatsError, StatsResult},
    models::{DailyStats, HourlySlot},
};
use crate::identity::Caller;
use crate::reservations::ReservationStatus;
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Statistics aggregator
///
/// A pure function of the reservation store's current contents; the dashboard
/// polls it on an interval and it keeps no state between calls.
#[derive(Clone)]
pub struct StatsAggregator {
    pool: Arc<PgPool>,
}

/// One reservation's contribution to a day's numbers.
struct DayEntry {
    start_at: DateTime<Utc>,
    guests: i32,
    status: ReservationStatus,
}

impl StatsAggregator {
    /// Create a new statistics aggregator
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Summarize the reservations starting within `day` (staff only)
    ///
    /// Scans `[day 00:00, day+1 00:00)` and tabulates totals, status
    /// buckets, and one hourly slot per hour that actually has reservations.
    /// A day with no reservations yields the zeroed structure.
    pub async fn daily_stats(&self, caller: &Caller, day: NaiveDate) -> StatsResult<DailyStats> {
        if !caller.can_manage() {
            return Err(StatsError::StaffOnly);
        }

        let day_start = day.and_hms_opt(0, 0, 0).expect("midnight is valid");
        let day_end = day_start + Duration::days(1);

        let rows = sqlx::query(
            r#"
            SELECT start_at, guests, status
            FROM reservations
            WHERE start_at >= $1 AND start_at < $2
            "#,
        )
        .bind(day_start)
        .bind(day_end)
        .fetch_all(self.pool.as_ref())
        .await?;

        let entries: Vec<DayEntry> = rows
            .iter()
            .map(|row| DayEntry {
                start_at: row.get::<chrono::NaiveDateTime, _>("start_at").and_utc(),
                guests: row.get("guests"),
                status: row
                    .get::<String, _>("status")
                    .parse()
                    .unwrap_or(ReservationStatus::Pending),
            })
            .collect();

        Ok(aggregate_daily(day, &entries))
    }
}

/// Fold one day's reservations into the dashboard summary.
fn aggregate_daily(day: NaiveDate, entries: &[DayEntry]) -> DailyStats {
    let mut stats = DailyStats::empty(day);
    let mut hourly: BTreeMap<u32, (i64, i64)> = BTreeMap::new();

    for entry in entries {
        stats.total_reservations += 1;
        stats.total_guests += i64::from(entry.guests);
        match entry.status {
            ReservationStatus::Pending => stats.pending_reservations += 1,
            ReservationStatus::Confirmed => stats.confirmed_reservations += 1,
            ReservationStatus::Cancelled => {}
        }

        let slot = hourly.entry(entry.start_at.hour()).or_insert((0, 0));
        slot.0 += 1;
        slot.1 += i64::from(entry.guests);
    }

    stats.hourly = hourly
        .into_iter()
        .map(|(hour, (reservations, guests))| HourlySlot {
            hour: format!("{hour}:00"),
            reservations,
            guests,
        })
        .collect();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn entry(time: &str, guests: i32, status: ReservationStatus) -> DayEntry {
        DayEntry {
            start_at: format!("2024-01-01T{time}Z").parse().unwrap(),
            guests,
            status,
        }
    }

    #[test]
    fn empty_day_is_all_zeroes() {
        let stats = aggregate_daily(day(), &[]);
        assert_eq!(stats, DailyStats::empty(day()));
        assert!(stats.hourly.is_empty());
    }

    #[test]
    fn totals_include_cancelled_but_buckets_do_not() {
        let entries = vec![
            entry("19:00:00", 4, ReservationStatus::Pending),
            entry("19:30:00", 2, ReservationStatus::Confirmed),
            entry("20:00:00", 6, ReservationStatus::Cancelled),
        ];
        let stats = aggregate_daily(day(), &entries);
        assert_eq!(stats.total_reservations, 3);
        assert_eq!(stats.pending_reservations, 1);
        assert_eq!(stats.confirmed_reservations, 1);
        assert_eq!(stats.total_guests, 12);
    }

    #[test]
    fn hourly_slots_cover_only_hours_present() {
        let entries = vec![
            entry("12:15:00", 2, ReservationStatus::Confirmed),
            entry("19:00:00", 4, ReservationStatus::Pending),
            entry("19:45:00", 3, ReservationStatus::Pending),
        ];
        let stats = aggregate_daily(day(), &entries);
        assert_eq!(
            stats.hourly,
            vec![
                HourlySlot {
                    hour: "12:00".to_string(),
                    reservations: 1,
                    guests: 2,
                },
                HourlySlot {
                    hour: "19:00".to_string(),
                    reservations: 2,
                    guests: 7,
                },
            ]
        );
    }
}
