//! Reservation lifecycle manager implementation.
//!
//! `create` is the admission-control chokepoint: the availability re-check
//! and the writes that claim the tables run inside one transaction, with the
//! requested table rows locked, so two concurrent bookings for the same
//! table and window cannot both commit.

use super::{
    errors::{ReservationError, ReservationResult},
    models::{
        CreateReservation, Reservation, ReservationId, ReservationStatus, UpdateReservation,
        reservation_duration,
    },
};
use crate::identity::Caller;
use crate::tables::{Table, TableId};
use chrono::{DateTime, Utc};
use log::info;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::collections::HashMap;
use std::sync::Arc;

/// Reservation lifecycle manager
#[derive(Clone)]
pub struct ReservationManager {
    pool: Arc<PgPool>,
}

impl ReservationManager {
    /// Create a new reservation manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create a reservation in PENDING state
    ///
    /// Availability is re-resolved here rather than trusting whatever the
    /// client read earlier, closing the gap between loading the booking form
    /// and submitting it. The requested table rows are locked first, so
    /// concurrent admissions targeting the same tables serialize: exactly one
    /// commits, the rest observe the fresh reservation and get a conflict.
    ///
    /// # Arguments
    ///
    /// * `request` - Customer details, start time, party size, table IDs
    ///
    /// # Returns
    ///
    /// * `ReservationResult<Reservation>` - Created reservation or error
    ///
    /// # Errors
    ///
    /// * `ReservationError::EmptyCustomerName` / `EmptyCustomerPhone` /
    ///   `InvalidGuests` / `NoTablesRequested` - Invalid input fields
    /// * `ReservationError::UnknownTable` - A table ID is not in the registry
    /// * `ReservationError::TableConflict` - A table is inactive or already
    ///   claimed for an overlapping window
    pub async fn create(&self, request: CreateReservation) -> ReservationResult<Reservation> {
        validate_booking_fields(
            &request.customer_name,
            &request.customer_phone,
            request.guests,
            &request.table_ids,
        )?;
        let table_ids = normalize_table_ids(&request.table_ids);

        let mut tx = self.pool.begin().await?;

        let tables = lock_tables(&mut tx, &table_ids).await?;
        let conflicts = occupied_among(&mut tx, &table_ids, request.start_at).await?;

        let mut unavailable: Vec<TableId> = tables
            .iter()
            .filter(|t| !t.is_active)
            .map(|t| t.id)
            .chain(conflicts)
            .collect();
        unavailable.sort_unstable();
        unavailable.dedup();
        if !unavailable.is_empty() {
            return Err(ReservationError::TableConflict {
                table_ids: unavailable,
            });
        }

        let notes = request.notes.unwrap_or_default();
        let row = sqlx::query(
            r#"
            INSERT INTO reservations (customer_name, customer_phone, start_at, guests, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, customer_name, customer_phone, start_at, guests, notes, status,
                      created_at, updated_at
            "#,
        )
        .bind(request.customer_name.trim())
        .bind(request.customer_phone.trim())
        .bind(request.start_at.naive_utc())
        .bind(request.guests)
        .bind(&notes)
        .bind(ReservationStatus::Pending.to_string())
        .fetch_one(&mut *tx)
        .await?;

        attach_tables(&mut tx, row.get("id"), &table_ids).await?;
        tx.commit().await?;

        let reservation = reservation_from_row(&row, tables);
        info!(
            "Created reservation {} for {} ({} guests) at {}",
            reservation.id, reservation.customer_name, reservation.guests, reservation.start_at
        );
        Ok(reservation)
    }

    /// List reservations, newest start time first (staff only)
    ///
    /// # Arguments
    ///
    /// * `caller` - Caller identity (staff only)
    /// * `status` - Optional status filter
    pub async fn list(
        &self,
        caller: &Caller,
        status: Option<ReservationStatus>,
    ) -> ReservationResult<Vec<Reservation>> {
        if !caller.can_manage() {
            return Err(ReservationError::StaffOnly);
        }

        let rows = match status {
            Some(status) => {
                sqlx::query(
                    r#"
                    SELECT id, customer_name, customer_phone, start_at, guests, notes, status,
                           created_at, updated_at
                    FROM reservations
                    WHERE status = $1
                    ORDER BY start_at DESC, id DESC
                    "#,
                )
                .bind(status.to_string())
                .fetch_all(self.pool.as_ref())
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, customer_name, customer_phone, start_at, guests, notes, status,
                           created_at, updated_at
                    FROM reservations
                    ORDER BY start_at DESC, id DESC
                    "#,
                )
                .fetch_all(self.pool.as_ref())
                .await?
            }
        };

        let ids: Vec<ReservationId> = rows.iter().map(|r| r.get("id")).collect();
        let mut tables_by_reservation = self.tables_for(&ids).await?;

        Ok(rows
            .iter()
            .map(|row| {
                let id: ReservationId = row.get("id");
                reservation_from_row(row, tables_by_reservation.remove(&id).unwrap_or_default())
            })
            .collect())
    }

    /// Get a single reservation by ID (staff only)
    pub async fn get(&self, caller: &Caller, id: ReservationId) -> ReservationResult<Reservation> {
        if !caller.can_manage() {
            return Err(ReservationError::StaffOnly);
        }

        let row = sqlx::query(
            r#"
            SELECT id, customer_name, customer_phone, start_at, guests, notes, status,
                   created_at, updated_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(ReservationError::ReservationNotFound(id))?;

        let mut tables = self.tables_for(&[id]).await?;
        Ok(reservation_from_row(
            &row,
            tables.remove(&id).unwrap_or_default(),
        ))
    }

    /// Move a reservation to a new status (staff only)
    ///
    /// Any transition among the three states is permitted and a
    /// self-transition is a harmless no-op. Concurrent updates to the same
    /// reservation resolve last-writer-wins through the single UPDATE below.
    ///
    /// Moving a reservation out of CANCELLED does NOT re-check whether its
    /// tables were claimed in the meantime; staff can silently recreate a
    /// double-booking this way. Known gap, kept to match the legacy system.
    pub async fn update_status(
        &self,
        caller: &Caller,
        id: ReservationId,
        new_status: ReservationStatus,
    ) -> ReservationResult<Reservation> {
        if !caller.can_manage() {
            return Err(ReservationError::StaffOnly);
        }

        let row = sqlx::query(
            r#"
            UPDATE reservations
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, customer_name, customer_phone, start_at, guests, notes, status,
                      created_at, updated_at
            "#,
        )
        .bind(new_status.to_string())
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(ReservationError::ReservationNotFound(id))?;

        let mut tables = self.tables_for(&[id]).await?;
        let reservation = reservation_from_row(&row, tables.remove(&id).unwrap_or_default());
        info!("Reservation {} status -> {}", id, new_status);
        Ok(reservation)
    }

    /// Replace a reservation's fields and table set (staff only)
    ///
    /// Referenced tables must exist and be active. Window admission is NOT
    /// re-run here, mirroring `update_status`.
    pub async fn update(
        &self,
        caller: &Caller,
        id: ReservationId,
        request: UpdateReservation,
    ) -> ReservationResult<Reservation> {
        if !caller.can_manage() {
            return Err(ReservationError::StaffOnly);
        }
        validate_booking_fields(
            &request.customer_name,
            &request.customer_phone,
            request.guests,
            &request.table_ids,
        )?;
        let table_ids = normalize_table_ids(&request.table_ids);

        let mut tx = self.pool.begin().await?;

        let tables = lock_tables(&mut tx, &table_ids).await?;
        if let Some(inactive) = tables.iter().find(|t| !t.is_active) {
            return Err(ReservationError::TableConflict {
                table_ids: vec![inactive.id],
            });
        }

        let notes = request.notes.unwrap_or_default();
        let row = sqlx::query(
            r#"
            UPDATE reservations
            SET customer_name = $1, customer_phone = $2, start_at = $3, guests = $4,
                notes = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING id, customer_name, customer_phone, start_at, guests, notes, status,
                      created_at, updated_at
            "#,
        )
        .bind(request.customer_name.trim())
        .bind(request.customer_phone.trim())
        .bind(request.start_at.naive_utc())
        .bind(request.guests)
        .bind(&notes)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ReservationError::ReservationNotFound(id))?;

        sqlx::query("DELETE FROM reservation_tables WHERE reservation_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        attach_tables(&mut tx, id, &table_ids).await?;

        tx.commit().await?;

        Ok(reservation_from_row(&row, tables))
    }

    /// Delete a reservation permanently (staff only)
    ///
    /// Table associations go with it; there is no soft delete.
    pub async fn delete(&self, caller: &Caller, id: ReservationId) -> ReservationResult<()> {
        if !caller.can_manage() {
            return Err(ReservationError::StaffOnly);
        }

        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(ReservationError::ReservationNotFound(id));
        }
        info!("Deleted reservation {}", id);
        Ok(())
    }

    /// Fetch the table sets for a batch of reservations in one query
    async fn tables_for(
        &self,
        reservation_ids: &[ReservationId],
    ) -> ReservationResult<HashMap<ReservationId, Vec<Table>>> {
        if reservation_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT rt.reservation_id, t.id, t.table_number, t.seats, t.is_active
            FROM reservation_tables rt
            JOIN dining_tables t ON t.id = rt.table_id
            WHERE rt.reservation_id = ANY($1)
            ORDER BY t.table_number ASC
            "#,
        )
        .bind(reservation_ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut by_reservation: HashMap<ReservationId, Vec<Table>> = HashMap::new();
        for row in rows {
            by_reservation
                .entry(row.get("reservation_id"))
                .or_default()
                .push(Table {
                    id: row.get("id"),
                    number: row.get("table_number"),
                    seats: row.get("seats"),
                    is_active: row.get("is_active"),
                });
        }
        Ok(by_reservation)
    }
}

/// Lock the requested table rows and return them.
///
/// IDs must be pre-sorted; locking in a fixed order keeps concurrent
/// admissions with overlapping table sets from deadlocking.
async fn lock_tables(
    tx: &mut Transaction<'_, Postgres>,
    table_ids: &[TableId],
) -> ReservationResult<Vec<Table>> {
    let rows = sqlx::query(
        r#"
        SELECT id, table_number, seats, is_active
        FROM dining_tables
        WHERE id = ANY($1)
        ORDER BY id ASC
        FOR UPDATE
        "#,
    )
    .bind(table_ids)
    .fetch_all(&mut **tx)
    .await?;

    let tables: Vec<Table> = rows
        .iter()
        .map(|row| Table {
            id: row.get("id"),
            number: row.get("table_number"),
            seats: row.get("seats"),
            is_active: row.get("is_active"),
        })
        .collect();

    if tables.len() != table_ids.len() {
        let missing = table_ids
            .iter()
            .find(|id| !tables.iter().any(|t| t.id == **id))
            .copied()
            .unwrap_or_default();
        return Err(ReservationError::UnknownTable(missing));
    }
    Ok(tables)
}

/// Which of `table_ids` are held by a non-CANCELLED reservation whose fixed
/// window overlaps the one starting at `start`.
///
/// Both windows span the same fixed duration, so the half-open overlap test
/// collapses to two strict comparisons on the stored start time.
async fn occupied_among(
    tx: &mut Transaction<'_, Postgres>,
    table_ids: &[TableId],
    start: DateTime<Utc>,
) -> ReservationResult<Vec<TableId>> {
    let earliest = (start - reservation_duration()).naive_utc();
    let latest = (start + reservation_duration()).naive_utc();

    let rows = sqlx::query(
        r#"
        SELECT DISTINCT rt.table_id
        FROM reservation_tables rt
        JOIN reservations r ON r.id = rt.reservation_id
        WHERE rt.table_id = ANY($1)
          AND r.status <> 'CANCELLED'
          AND r.start_at > $2
          AND r.start_at < $3
        "#,
    )
    .bind(table_ids)
    .bind(earliest)
    .bind(latest)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.iter().map(|row| row.get("table_id")).collect())
}

async fn attach_tables(
    tx: &mut Transaction<'_, Postgres>,
    reservation_id: ReservationId,
    table_ids: &[TableId],
) -> ReservationResult<()> {
    sqlx::query(
        "INSERT INTO reservation_tables (reservation_id, table_id)
         SELECT $1, unnest($2::bigint[])",
    )
    .bind(reservation_id)
    .bind(table_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn normalize_table_ids(table_ids: &[TableId]) -> Vec<TableId> {
    let mut ids = table_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn validate_booking_fields(
    customer_name: &str,
    customer_phone: &str,
    guests: i32,
    table_ids: &[TableId],
) -> ReservationResult<()> {
    if customer_name.trim().is_empty() {
        return Err(ReservationError::EmptyCustomerName);
    }
    if customer_phone.trim().is_empty() {
        return Err(ReservationError::EmptyCustomerPhone);
    }
    if guests < 1 {
        return Err(ReservationError::InvalidGuests(guests));
    }
    if table_ids.is_empty() {
        return Err(ReservationError::NoTablesRequested);
    }
    Ok(())
}

fn reservation_from_row(row: &PgRow, tables: Vec<Table>) -> Reservation {
    let status: String = row.get("status");
    Reservation {
        id: row.get("id"),
        customer_name: row.get("customer_name"),
        customer_phone: row.get("customer_phone"),
        start_at: row.get::<chrono::NaiveDateTime, _>("start_at").and_utc(),
        guests: row.get("guests"),
        notes: row.get("notes"),
        status: status.parse().unwrap_or(ReservationStatus::Pending),
        tables,
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        updated_at: row.get::<chrono::NaiveDateTime, _>("updated_at").and_utc(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_customer_fields() {
        assert!(matches!(
            validate_booking_fields("", "555-0100", 2, &[1]),
            Err(ReservationError::EmptyCustomerName)
        ));
        assert!(matches!(
            validate_booking_fields("   ", "555-0100", 2, &[1]),
            Err(ReservationError::EmptyCustomerName)
        ));
        assert!(matches!(
            validate_booking_fields("Ada", "", 2, &[1]),
            Err(ReservationError::EmptyCustomerPhone)
        ));
    }

    #[test]
    fn rejects_zero_guests() {
        assert!(matches!(
            validate_booking_fields("Ada", "555-0100", 0, &[1]),
            Err(ReservationError::InvalidGuests(0))
        ));
    }

    #[test]
    fn rejects_empty_table_set() {
        assert!(matches!(
            validate_booking_fields("Ada", "555-0100", 2, &[]),
            Err(ReservationError::NoTablesRequested)
        ));
    }

    #[test]
    fn accepts_minimal_valid_request() {
        assert!(validate_booking_fields("Ada", "555-0100", 1, &[1]).is_ok());
    }

    #[test]
    fn normalize_sorts_and_dedupes() {
        assert_eq!(normalize_table_ids(&[3, 1, 3, 2]), vec![1, 2, 3]);
    }
}
