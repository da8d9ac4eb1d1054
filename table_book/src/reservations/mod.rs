//! Reservation module governing the booking lifecycle.
//!
//! This module implements:
//! - Admission control: a reservation is only created after re-checking, in
//!   the same transaction that claims the tables, that every requested table
//!   is still free for the fixed 2-hour window
//! - The PENDING / CONFIRMED / CANCELLED status machine (staff-driven, no
//!   terminal state)
//! - Staff CRUD over reservation records and their table associations

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ReservationError, ReservationResult};
pub use manager::ReservationManager;
pub use models::{
    CreateReservation, RESERVATION_DURATION_HOURS, Reservation, ReservationId, ReservationStatus,
    UpdateReservation, reservation_duration,
};
