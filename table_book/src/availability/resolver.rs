//! Availability resolver implementation.

use super::{
    errors::AvailabilityResult,
    models::TimeWindow,
};
use crate::reservations::reservation_duration;
use crate::tables::{Table, TableId};
use chrono::{DateTime, Utc};
use log::debug;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use std::sync::Arc;

/// Availability resolver
///
/// Read-only view over the table registry and the reservation store. Safe and
/// cheap to call repeatedly; the booking form hits it on every date change.
#[derive(Clone)]
pub struct AvailabilityResolver {
    pool: Arc<PgPool>,
}

impl AvailabilityResolver {
    /// Create a new availability resolver
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Tables free for the fixed window starting at `requested_start`
    ///
    /// Active tables minus every table referenced by a non-CANCELLED
    /// reservation whose window overlaps the requested one, ordered by table
    /// number. An empty vec means "fully booked", not failure.
    ///
    /// # Arguments
    ///
    /// * `requested_start` - Desired reservation start (UTC)
    /// * `party_hint` - Optional party size; only used to log a soft
    ///   capacity warning, never to filter
    ///
    /// # Returns
    ///
    /// * `AvailabilityResult<Vec<Table>>` - Free tables or store error
    pub async fn find_available_tables(
        &self,
        requested_start: DateTime<Utc>,
        party_hint: Option<i32>,
    ) -> AvailabilityResult<Vec<Table>> {
        let window = TimeWindow::starting_at(requested_start);

        let active_rows = sqlx::query(
            r#"
            SELECT id, table_number, seats, is_active
            FROM dining_tables
            WHERE is_active = TRUE
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        let active_tables: Vec<Table> = active_rows
            .iter()
            .map(|row| Table {
                id: row.get("id"),
                number: row.get("table_number"),
                seats: row.get("seats"),
                is_active: row.get("is_active"),
            })
            .collect();

        // Every window spans the same fixed duration, so "overlaps the
        // requested window" reduces to a band of permissible start times.
        let earliest = (window.start - reservation_duration()).naive_utc();
        let latest = window.end.naive_utc();

        let occupied_rows = sqlx::query(
            r#"
            SELECT DISTINCT rt.table_id
            FROM reservation_tables rt
            JOIN reservations r ON r.id = rt.reservation_id
            WHERE r.status <> 'CANCELLED'
              AND r.start_at > $1
              AND r.start_at < $2
            "#,
        )
        .bind(earliest)
        .bind(latest)
        .fetch_all(self.pool.as_ref())
        .await?;

        let occupied: HashSet<TableId> =
            occupied_rows.iter().map(|row| row.get("table_id")).collect();

        let free = free_tables(active_tables, &occupied);

        if let Some(guests) = party_hint {
            let capacity: i32 = free.iter().map(|t| t.seats).sum();
            if capacity < guests {
                debug!(
                    "Free capacity {} below requested party size {} at {}",
                    capacity, guests, requested_start
                );
            }
        }

        Ok(free)
    }
}

/// Subtract the occupied set from the active tables, ordered by table number.
pub fn free_tables(active_tables: Vec<Table>, occupied: &HashSet<TableId>) -> Vec<Table> {
    let mut free: Vec<Table> = active_tables
        .into_iter()
        .filter(|t| !occupied.contains(&t.id))
        .collect();
    free.sort_by_key(|t| t.number);
    free
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: TableId, number: i32, seats: i32) -> Table {
        Table {
            id,
            number,
            seats,
            is_active: true,
        }
    }

    #[test]
    fn subtracts_occupied_tables() {
        let tables = vec![table(1, 1, 4), table(2, 2, 2)];
        let occupied = HashSet::from([1]);
        let free = free_tables(tables, &occupied);
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].id, 2);
    }

    #[test]
    fn nothing_occupied_returns_all_by_number() {
        let tables = vec![table(10, 5, 4), table(11, 2, 2), table(12, 9, 6)];
        let free = free_tables(tables, &HashSet::new());
        let numbers: Vec<i32> = free.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![2, 5, 9]);
    }

    #[test]
    fn everything_occupied_returns_empty() {
        let tables = vec![table(1, 1, 4)];
        let occupied = HashSet::from([1]);
        assert!(free_tables(tables, &occupied).is_empty());
    }
}
