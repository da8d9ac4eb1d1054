//! Table registry error types.

use thiserror::Error;

use super::models::TableId;

/// Table registry errors
#[derive(Debug, Error)]
pub enum TableError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Table not found
    #[error("Table {0} not found")]
    TableNotFound(TableId),

    /// Another active table already carries this number
    #[error("Table number {0} is already in use by an active table")]
    DuplicateNumber(i32),

    /// Seat count must be positive
    #[error("Invalid seat count: {0}")]
    InvalidSeats(i32),

    /// Table number must be positive
    #[error("Invalid table number: {0}")]
    InvalidNumber(i32),

    /// Table is referenced by one or more reservations
    #[error("Table {0} is referenced by existing reservations and cannot be deleted")]
    TableInUse(TableId),

    /// Caller lacks staff privileges
    #[error("Staff privileges required")]
    StaffOnly,
}

impl TableError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            // Sanitize database errors - don't expose SQL details
            TableError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for table registry operations
pub type TableResult<T> = Result<T, TableError>;
