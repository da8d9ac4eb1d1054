//! Availability data models.

use crate::reservations::reservation_duration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open occupancy window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The fixed-length reservation window beginning at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start + reservation_duration(),
        }
    }

    /// Half-open interval intersection: `[s1,e1)` and `[s2,e2)` overlap iff
    /// `s1 < e2 AND s2 < e1`.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `instant` falls inside the window.
    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let dinner = TimeWindow::starting_at(at("2024-01-01T19:00:00Z"));
        let late = TimeWindow::starting_at(at("2024-01-01T21:00:00Z"));
        assert!(!dinner.overlaps(&late));
        assert!(!late.overlaps(&dinner));
    }

    #[test]
    fn partially_shifted_windows_overlap() {
        let dinner = TimeWindow::starting_at(at("2024-01-01T19:00:00Z"));
        let shifted = TimeWindow::starting_at(at("2024-01-01T20:00:00Z"));
        assert!(dinner.overlaps(&shifted));
        assert!(shifted.overlaps(&dinner));
    }

    #[test]
    fn covers_is_half_open() {
        let window = TimeWindow::starting_at(at("2024-01-01T19:00:00Z"));
        assert!(window.covers(at("2024-01-01T19:00:00Z")));
        assert!(window.covers(at("2024-01-01T20:59:59Z")));
        assert!(!window.covers(at("2024-01-01T21:00:00Z")));
    }
}
