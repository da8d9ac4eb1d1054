//! Reservation API handlers.
//!
//! Creation is open to walk-in customers; everything else is staff-gated by
//! the engine. The PATCH endpoint carries only the status transition, the
//! way the legacy dashboard drove it.
//!
//! # Examples
//!
//! Book a table:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/reservations \
//!   -H "Content-Type: application/json" \
//!   -d '{"customer_name": "Ada", "customer_phone": "555-0100",
//!        "start_at": "2024-01-01T19:00:00Z", "guests": 4, "table_ids": [1]}'
//! ```
//!
//! Confirm it:
//! ```bash
//! curl -X PATCH http://localhost:8000/api/v1/reservations/1 \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"status": "CONFIRMED"}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use table_book::identity::Caller;
use table_book::reservations::{
    CreateReservation, Reservation, ReservationError, ReservationId, ReservationStatus,
    UpdateReservation,
};
use table_book::stats::{DailyStats, StatsError};

use super::{AppState, ErrorResponse, staff_gate_status};

#[derive(Debug, Deserialize)]
pub struct ReservationListQuery {
    /// Optional status filter (`PENDING`, `CONFIRMED`, `CANCELLED`)
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Create a reservation (public).
///
/// Availability is re-checked at commit time inside the engine; a stale
/// booking form gets `409 Conflict` listing the contested tables and should
/// re-query availability before retrying.
///
/// # Errors
///
/// - `400 Bad Request`: missing/invalid fields
/// - `409 Conflict`: a requested table is no longer free
pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<CreateReservation>,
) -> Result<(StatusCode, Json<Reservation>), (StatusCode, Json<ErrorResponse>)> {
    match state.reservations.create(request).await {
        Ok(reservation) => {
            crate::metrics::reservations_created_total();
            Ok((StatusCode::CREATED, Json(reservation)))
        }
        Err(e) => {
            if matches!(e, ReservationError::TableConflict { .. }) {
                crate::metrics::table_conflicts_total();
            }
            Err(error_response(&caller, e))
        }
    }
}

/// List reservations, optionally filtered by status (staff only).
pub async fn list_reservations(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ReservationListQuery>,
) -> Result<Json<Vec<Reservation>>, (StatusCode, Json<ErrorResponse>)> {
    let status = query
        .status
        .as_deref()
        .map(|raw| {
            raw.parse::<ReservationStatus>()
                .map_err(ReservationError::InvalidStatus)
        })
        .transpose()
        .map_err(|e| error_response(&caller, e))?;

    state
        .reservations
        .list(&caller, status)
        .await
        .map(Json)
        .map_err(|e| error_response(&caller, e))
}

/// Get a single reservation (staff only).
pub async fn get_reservation(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(reservation_id): Path<ReservationId>,
) -> Result<Json<Reservation>, (StatusCode, Json<ErrorResponse>)> {
    state
        .reservations
        .get(&caller, reservation_id)
        .await
        .map(Json)
        .map_err(|e| error_response(&caller, e))
}

/// Replace a reservation's fields and table set (staff only).
pub async fn update_reservation(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(reservation_id): Path<ReservationId>,
    Json(request): Json<UpdateReservation>,
) -> Result<Json<Reservation>, (StatusCode, Json<ErrorResponse>)> {
    state
        .reservations
        .update(&caller, reservation_id, request)
        .await
        .map(Json)
        .map_err(|e| error_response(&caller, e))
}

/// Move a reservation to a new status (staff only).
pub async fn update_reservation_status(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(reservation_id): Path<ReservationId>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Reservation>, (StatusCode, Json<ErrorResponse>)> {
    let new_status = request
        .status
        .parse::<ReservationStatus>()
        .map_err(|raw| error_response(&caller, ReservationError::InvalidStatus(raw)))?;

    state
        .reservations
        .update_status(&caller, reservation_id, new_status)
        .await
        .map(|reservation| {
            crate::metrics::status_transitions_total(&new_status.to_string());
            Json(reservation)
        })
        .map_err(|e| error_response(&caller, e))
}

/// Delete a reservation permanently (staff only).
pub async fn delete_reservation(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(reservation_id): Path<ReservationId>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .reservations
        .delete(&caller, reservation_id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| error_response(&caller, e))
}

/// Today's dashboard statistics (staff only).
pub async fn daily_stats(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<DailyStats>, (StatusCode, Json<ErrorResponse>)> {
    let today = chrono::Utc::now().date_naive();
    state
        .stats
        .daily_stats(&caller, today)
        .await
        .map(Json)
        .map_err(|e| stats_error_response(&caller, e))
}

fn error_response(caller: &Caller, err: ReservationError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        ReservationError::StaffOnly => staff_gate_status(caller),
        ReservationError::ReservationNotFound(_) => StatusCode::NOT_FOUND,
        ReservationError::TableConflict { .. } => StatusCode::CONFLICT,
        ReservationError::Database(e) => {
            tracing::error!("reservation store error: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
}

fn stats_error_response(caller: &Caller, err: StatsError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        StatsError::StaffOnly => staff_gate_status(caller),
        StatsError::Database(e) => {
            tracing::error!("stats query failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
}
