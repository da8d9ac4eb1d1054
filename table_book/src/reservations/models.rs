//! Reservation data models.

use crate::tables::{Table, TableId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reservation ID type
pub type ReservationId = i64;

/// Every reservation occupies a fixed window of this many hours starting at
/// `start_at`; the end time is always derived, never stored.
pub const RESERVATION_DURATION_HOURS: i64 = 2;

/// The fixed occupancy window as a `chrono` duration.
pub fn reservation_duration() -> Duration {
    Duration::hours(RESERVATION_DURATION_HOURS)
}

/// Reservation lifecycle status.
///
/// Created PENDING; staff move reservations freely among the three states,
/// so none of them is terminal. CANCELLED reservations release their tables
/// but are kept for history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "PENDING"),
            ReservationStatus::Confirmed => write!(f, "CONFIRMED"),
            ReservationStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ReservationStatus::Pending),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            other => Err(other.to_string()),
        }
    }
}

/// Reservation model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub customer_name: String,
    pub customer_phone: String,
    pub start_at: DateTime<Utc>,
    pub guests: i32,
    pub notes: String,
    pub status: ReservationStatus,
    pub tables: Vec<Table>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Derived end of the occupancy window (half-open).
    pub fn end_at(&self) -> DateTime<Utc> {
        self.start_at + reservation_duration()
    }

    /// Combined seat capacity of the reserved tables.
    pub fn seat_capacity(&self) -> i32 {
        self.tables.iter().map(|t| t.seats).sum()
    }
}

/// Request to create a reservation (customer booking form or staff entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservation {
    pub customer_name: String,
    pub customer_phone: String,
    pub start_at: DateTime<Utc>,
    pub guests: i32,
    #[serde(default)]
    pub notes: Option<String>,
    pub table_ids: Vec<TableId>,
}

/// Request to edit an existing reservation (staff PUT).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReservation {
    pub customer_name: String,
    pub customer_phone: String,
    pub start_at: DateTime<Utc>,
    pub guests: i32,
    #[serde(default)]
    pub notes: Option<String>,
    pub table_ids: Vec<TableId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
        ] {
            let parsed: ReservationStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_rejects_unknown_strings() {
        assert!("pending".parse::<ReservationStatus>().is_err());
        assert!("DONE".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn end_is_two_hours_after_start() {
        let start = "2024-01-01T19:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let reservation = Reservation {
            id: 1,
            customer_name: "Ada".to_string(),
            customer_phone: "555-0100".to_string(),
            start_at: start,
            guests: 2,
            notes: String::new(),
            status: ReservationStatus::Pending,
            tables: vec![],
            created_at: start,
            updated_at: start,
        };
        assert_eq!(
            reservation.end_at(),
            "2024-01-01T21:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }
}
