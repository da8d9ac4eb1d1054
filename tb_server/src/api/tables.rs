//! Table registry API handlers.
//!
//! One endpoint doubles as the availability query: `GET /api/v1/tables`
//! without parameters lists the registry, while `?datetime=` asks which
//! tables are free for the fixed reservation window starting then — the
//! booking form calls it on every date change.
//!
//! # Examples
//!
//! Free tables for a dinner slot:
//! ```bash
//! curl 'http://localhost:8000/api/v1/tables?datetime=2024-01-01T19:00:00Z&guests=4'
//! ```
//!
//! Register a table:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/tables \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"number": 7, "seats": 4}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use table_book::identity::Caller;
use table_book::tables::{CreateTable, Table, TableError, TableId, UpdateTable};

use super::{AppState, ErrorResponse, staff_gate_status};

#[derive(Debug, Deserialize)]
pub struct TableListQuery {
    /// Desired reservation start; presence switches the endpoint to
    /// availability mode
    pub datetime: Option<String>,
    /// Optional party size hint forwarded to the resolver
    pub guests: Option<i32>,
}

/// List tables, or resolve availability when `datetime` is given.
///
/// Availability mode is public and returns free tables ordered by number.
/// Registry mode shows staff the full registry and everyone else only the
/// active tables.
///
/// # Errors
///
/// - `400 Bad Request`: unparseable `datetime`
/// - `500 Internal Server Error`: store failure
pub async fn list_tables(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<TableListQuery>,
) -> Result<Json<Vec<Table>>, (StatusCode, Json<ErrorResponse>)> {
    if let Some(raw) = query.datetime.as_deref() {
        let requested_start = parse_start_time(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Invalid datetime format".to_string(),
                }),
            )
        })?;

        let free = state
            .availability
            .find_available_tables(requested_start, query.guests)
            .await
            .map_err(|e| {
                tracing::error!("availability query failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: e.client_message(),
                    }),
                )
            })?;

        crate::metrics::available_tables_returned(free.len());
        return Ok(Json(free));
    }

    state
        .tables
        .list(&caller)
        .await
        .map(Json)
        .map_err(|e| error_response(&caller, e))
}

/// Register a new table (staff only).
///
/// Returns `201 Created` with the stored table.
pub async fn create_table(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<CreateTable>,
) -> Result<(StatusCode, Json<Table>), (StatusCode, Json<ErrorResponse>)> {
    state
        .tables
        .create(&caller, request)
        .await
        .map(|table| (StatusCode::CREATED, Json(table)))
        .map_err(|e| error_response(&caller, e))
}

/// Get a single table (staff only).
pub async fn get_table(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(table_id): Path<TableId>,
) -> Result<Json<Table>, (StatusCode, Json<ErrorResponse>)> {
    state
        .tables
        .get(&caller, table_id)
        .await
        .map(Json)
        .map_err(|e| error_response(&caller, e))
}

/// Update a table's number, seats, and active flag (staff only).
pub async fn update_table(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(table_id): Path<TableId>,
    Json(request): Json<UpdateTable>,
) -> Result<Json<Table>, (StatusCode, Json<ErrorResponse>)> {
    state
        .tables
        .update(&caller, table_id, request)
        .await
        .map(Json)
        .map_err(|e| error_response(&caller, e))
}

/// Delete a table (staff only).
///
/// Refused with `409 Conflict` while reservations still reference it.
pub async fn delete_table(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(table_id): Path<TableId>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .tables
        .delete(&caller, table_id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| error_response(&caller, e))
}

/// Accept RFC 3339 stamps as well as the timezone-less form booking widgets
/// emit; the latter is taken as UTC.
fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = raw.parse::<DateTime<Utc>>() {
        return Some(parsed);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn error_response(caller: &Caller, err: TableError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        TableError::StaffOnly => staff_gate_status(caller),
        TableError::TableNotFound(_) => StatusCode::NOT_FOUND,
        TableError::TableInUse(_) => StatusCode::CONFLICT,
        TableError::Database(e) => {
            tracing::error!("table registry error: {e}");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_zulu_suffix() {
        let parsed = parse_start_time("2024-01-01T19:00:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T19:00:00+00:00");
    }

    #[test]
    fn parses_offset_stamps() {
        let parsed = parse_start_time("2024-01-01T20:00:00+01:00").unwrap();
        assert_eq!(parsed, parse_start_time("2024-01-01T19:00:00Z").unwrap());
    }

    #[test]
    fn parses_timezone_less_form_values_as_utc() {
        let parsed = parse_start_time("2024-01-01T19:00").unwrap();
        assert_eq!(parsed, parse_start_time("2024-01-01T19:00:00Z").unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_start_time("next friday").is_none());
        assert!(parse_start_time("").is_none());
    }
}
