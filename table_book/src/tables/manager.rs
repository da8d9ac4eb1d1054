//! Table registry manager implementation.

use super::{
    errors::{TableError, TableResult},
    models::{CreateTable, Table, TableId, UpdateTable},
};
use crate::identity::Caller;
use log::info;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::sync::Arc;

/// Table registry manager
#[derive(Clone)]
pub struct TableManager {
    pool: Arc<PgPool>,
}

impl TableManager {
    /// Create a new table registry manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Register a new table
    ///
    /// # Arguments
    ///
    /// * `caller` - Caller identity (staff only)
    /// * `request` - Table number, seat count, active flag
    ///
    /// # Returns
    ///
    /// * `TableResult<Table>` - Created table or error
    ///
    /// # Errors
    ///
    /// * `TableError::StaffOnly` - Caller is not staff
    /// * `TableError::DuplicateNumber` - Number already used by an active table
    /// * `TableError::InvalidSeats` - Seat count is not positive
    pub async fn create(&self, caller: &Caller, request: CreateTable) -> TableResult<Table> {
        if !caller.can_manage() {
            return Err(TableError::StaffOnly);
        }
        validate_table_fields(request.number, request.seats)?;

        if request.is_active {
            self.check_number_free(request.number, None).await?;
        }

        let row = sqlx::query(
            r#"
            INSERT INTO dining_tables (table_number, seats, is_active)
            VALUES ($1, $2, $3)
            RETURNING id, table_number, seats, is_active
            "#,
        )
        .bind(request.number)
        .bind(request.seats)
        .bind(request.is_active)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_unique_violation(request.number))?;

        let table = table_from_row(&row);
        info!("Registered table {} ({} seats)", table.number, table.seats);
        Ok(table)
    }

    /// List tables visible to the caller
    ///
    /// Staff see the full registry including inactive tables; everyone else
    /// sees active tables only.
    pub async fn list(&self, caller: &Caller) -> TableResult<Vec<Table>> {
        let query = if caller.can_manage() {
            "SELECT id, table_number, seats, is_active FROM dining_tables ORDER BY table_number ASC"
        } else {
            "SELECT id, table_number, seats, is_active FROM dining_tables
             WHERE is_active = TRUE ORDER BY table_number ASC"
        };

        let rows = sqlx::query(query).fetch_all(self.pool.as_ref()).await?;
        Ok(rows.iter().map(table_from_row).collect())
    }

    /// Get a single table by ID (staff only)
    pub async fn get(&self, caller: &Caller, id: TableId) -> TableResult<Table> {
        if !caller.can_manage() {
            return Err(TableError::StaffOnly);
        }

        let row = sqlx::query(
            "SELECT id, table_number, seats, is_active FROM dining_tables WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(TableError::TableNotFound(id))?;

        Ok(table_from_row(&row))
    }

    /// Update a table's number, seat count, and active flag
    ///
    /// # Errors
    ///
    /// * `TableError::TableNotFound` - No table with this ID
    /// * `TableError::DuplicateNumber` - Another active table has the number
    pub async fn update(
        &self,
        caller: &Caller,
        id: TableId,
        request: UpdateTable,
    ) -> TableResult<Table> {
        if !caller.can_manage() {
            return Err(TableError::StaffOnly);
        }
        validate_table_fields(request.number, request.seats)?;

        if request.is_active {
            self.check_number_free(request.number, Some(id)).await?;
        }

        let row = sqlx::query(
            r#"
            UPDATE dining_tables
            SET table_number = $1, seats = $2, is_active = $3
            WHERE id = $4
            RETURNING id, table_number, seats, is_active
            "#,
        )
        .bind(request.number)
        .bind(request.seats)
        .bind(request.is_active)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_unique_violation(request.number))?
        .ok_or(TableError::TableNotFound(id))?;

        Ok(table_from_row(&row))
    }

    /// Toggle a table's active flag
    ///
    /// Deactivation only removes the table from future availability results;
    /// existing reservations are untouched.
    pub async fn set_active(
        &self,
        caller: &Caller,
        id: TableId,
        is_active: bool,
    ) -> TableResult<Table> {
        if !caller.can_manage() {
            return Err(TableError::StaffOnly);
        }

        let row = sqlx::query(
            r#"
            UPDATE dining_tables
            SET is_active = $1
            WHERE id = $2
            RETURNING id, table_number, seats, is_active
            "#,
        )
        .bind(is_active)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(TableError::TableNotFound(id))?;

        let table = table_from_row(&row);
        info!("Table {} set_active={}", table.number, is_active);
        Ok(table)
    }

    /// Delete a table permanently
    ///
    /// Refused while any reservation still references the table, so a delete
    /// can never corrupt a reservation's table set.
    ///
    /// # Errors
    ///
    /// * `TableError::TableInUse` - Reservations reference this table
    /// * `TableError::TableNotFound` - No table with this ID
    pub async fn delete(&self, caller: &Caller, id: TableId) -> TableResult<()> {
        if !caller.can_manage() {
            return Err(TableError::StaffOnly);
        }

        let mut tx = self.pool.begin().await?;

        let referenced =
            sqlx::query("SELECT 1 FROM reservation_tables WHERE table_id = $1 LIMIT 1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if referenced.is_some() {
            return Err(TableError::TableInUse(id));
        }

        let result = sqlx::query("DELETE FROM dining_tables WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TableError::TableNotFound(id));
        }

        tx.commit().await?;
        info!("Deleted table {}", id);
        Ok(())
    }

    /// Check that no other active table carries `number`
    async fn check_number_free(&self, number: i32, exclude: Option<TableId>) -> TableResult<()> {
        let taken = sqlx::query(
            r#"
            SELECT id FROM dining_tables
            WHERE table_number = $1 AND is_active = TRUE AND id IS DISTINCT FROM $2
            "#,
        )
        .bind(number)
        .bind(exclude)
        .fetch_optional(self.pool.as_ref())
        .await?;

        if taken.is_some() {
            return Err(TableError::DuplicateNumber(number));
        }
        Ok(())
    }
}

fn validate_table_fields(number: i32, seats: i32) -> TableResult<()> {
    if number <= 0 {
        return Err(TableError::InvalidNumber(number));
    }
    if seats <= 0 {
        return Err(TableError::InvalidSeats(seats));
    }
    Ok(())
}

fn table_from_row(row: &PgRow) -> Table {
    Table {
        id: row.get("id"),
        number: row.get("table_number"),
        seats: row.get("seats"),
        is_active: row.get("is_active"),
    }
}

/// Map the partial unique index on active table numbers to a friendly error.
///
/// The pre-check in `check_number_free` races with concurrent writers; the
/// index is what actually holds the invariant.
fn map_unique_violation(number: i32) -> impl FnOnce(sqlx::Error) -> TableError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            TableError::DuplicateNumber(number)
        }
        _ => TableError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nonpositive_fields() {
        assert!(matches!(
            validate_table_fields(0, 4),
            Err(TableError::InvalidNumber(0))
        ));
        assert!(matches!(
            validate_table_fields(7, 0),
            Err(TableError::InvalidSeats(0))
        ));
        assert!(matches!(
            validate_table_fields(7, -2),
            Err(TableError::InvalidSeats(-2))
        ));
        assert!(validate_table_fields(7, 4).is_ok());
    }

    #[test]
    fn non_unique_errors_stay_database_errors() {
        let err = map_unique_violation(12)(sqlx::Error::RowNotFound);
        assert!(matches!(err, TableError::Database(_)));
    }
}
