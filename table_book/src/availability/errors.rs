//! Availability error types.

use thiserror::Error;

/// Availability errors
///
/// An empty free-table set is a valid answer, not an error; the only failure
/// mode here is the backing store.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AvailabilityError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            AvailabilityError::Database(_) => "Internal server error".to_string(),
        }
    }
}

/// Result type for availability operations
pub type AvailabilityResult<T> = Result<T, AvailabilityError>;
