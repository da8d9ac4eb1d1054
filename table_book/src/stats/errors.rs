//! Statistics error types.

use thiserror::Error;

/// Statistics errors
#[derive(Debug, Error)]
pub enum StatsError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Caller lacks staff privileges
    #[error("Staff privileges required")]
    StaffOnly,
}

impl StatsError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            StatsError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;
