//! Reservation error types.

use thiserror::Error;

use super::models::ReservationId;
use crate::tables::TableId;

/// Reservation errors
#[derive(Debug, Error)]
pub enum ReservationError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reservation not found
    #[error("Reservation {0} not found")]
    ReservationNotFound(ReservationId),

    /// A requested table was claimed for an overlapping window
    #[error("Tables no longer available for the requested time: {table_ids:?}")]
    TableConflict { table_ids: Vec<TableId> },

    /// A requested table ID does not exist in the registry
    #[error("Unknown table {0}")]
    UnknownTable(TableId),

    /// Customer name is required
    #[error("Customer name must not be empty")]
    EmptyCustomerName,

    /// Customer phone is required
    #[error("Customer phone must not be empty")]
    EmptyCustomerPhone,

    /// Party size must be at least one
    #[error("Invalid guest count: {0}")]
    InvalidGuests(i32),

    /// At least one table must be selected
    #[error("A reservation requires at least one table")]
    NoTablesRequested,

    /// Unrecognized status value
    #[error("Invalid status value: {0}")]
    InvalidStatus(String),

    /// Caller lacks staff privileges
    #[error("Staff privileges required")]
    StaffOnly,
}

impl ReservationError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            // Sanitize database errors - don't expose SQL details
            ReservationError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the error is a rejection of caller input rather than a fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ReservationError::EmptyCustomerName
                | ReservationError::EmptyCustomerPhone
                | ReservationError::InvalidGuests(_)
                | ReservationError::NoTablesRequested
                | ReservationError::UnknownTable(_)
                | ReservationError::InvalidStatus(_)
        )
    }
}

/// Result type for reservation operations
pub type ReservationResult<T> = Result<T, ReservationError>;
