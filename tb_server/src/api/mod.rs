//! HTTP API for the reservation server.
//!
//! # Architecture
//!
//! - **Axum**: async web framework for the REST surface
//! - **Identity middleware**: verifies the external provider's JWT and
//!   attaches a request-scoped [`Caller`] (anonymous when absent) — the
//!   engine operations themselves decide what staff may do
//! - **Tower / tower-http**: CORS and middleware plumbing
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                           - Health check (public)
//! GET    /api/v1/tables                    - List tables; ?datetime= resolves availability (public)
//! POST   /api/v1/tables                    - Register table (staff)
//! GET    /api/v1/tables/{id}               - Get table (staff)
//! PUT    /api/v1/tables/{id}               - Update table (staff)
//! DELETE /api/v1/tables/{id}               - Delete table (staff)
//! GET    /api/v1/reservations              - List reservations, ?status= filter (staff)
//! POST   /api/v1/reservations              - Create reservation (public, rate limited)
//! GET    /api/v1/reservations/stats        - Today's statistics (staff)
//! GET    /api/v1/reservations/{id}         - Get reservation (staff)
//! PUT    /api/v1/reservations/{id}         - Edit reservation (staff)
//! PATCH  /api/v1/reservations/{id}         - Change status (staff)
//! DELETE /api/v1/reservations/{id}         - Delete reservation (staff)
//! ```

pub mod identity;
pub mod rate_limiter;
pub mod request_id;
pub mod reservations;
pub mod tables;

use axum::{
    Json, Router,
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use table_book::{
    availability::AvailabilityResolver, identity::Caller, reservations::ReservationManager,
    stats::StatsAggregator, tables::TableManager,
};
use tower_http::cors::CorsLayer;

use rate_limiter::SharedRateLimiter;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request (cheap, everything is behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<TableManager>,
    pub reservations: Arc<ReservationManager>,
    pub availability: Arc<AvailabilityResolver>,
    pub stats: Arc<StatsAggregator>,
    pub pool: Arc<PgPool>,
    /// Shared secret for verifying identity-provider tokens
    pub identity_jwt_secret: String,
    /// Per-client limiter for the public booking endpoint
    pub booking_limiter: Arc<SharedRateLimiter>,
}

/// JSON error payload returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(track_metrics))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            identity::identity_middleware,
        ))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router(state: AppState) -> Router<AppState> {
    // The booking collection carries the public create endpoint; its POSTs
    // are rate limited per client.
    let booking_routes = Router::new()
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            booking_rate_limit,
        ));

    Router::new()
        .route(
            "/tables",
            get(tables::list_tables).post(tables::create_table),
        )
        .route(
            "/tables/{table_id}",
            get(tables::get_table)
                .put(tables::update_table)
                .delete(tables::delete_table),
        )
        .route("/reservations/stats", get(reservations::daily_stats))
        .route(
            "/reservations/{reservation_id}",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .patch(reservations::update_reservation_status)
                .delete(reservations::delete_reservation),
        )
        .merge(booking_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the database answers, `503 Service Unavailable`
/// otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&*state.pool)
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

/// Record per-request HTTP metrics, labelled by route pattern.
async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;
    crate::metrics::http_requests_total(&method, &path, response.status().as_u16());
    response
}

/// Rate-limit POSTs to the public booking endpoint.
async fn booking_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    if request.method() == Method::POST {
        let key = client_key(request.headers());
        if !state.booking_limiter.check(&key) {
            crate::metrics::rate_limit_hits_total("/api/v1/reservations");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse {
                    error: "Too many booking attempts, please try again later".to_string(),
                }),
            ));
        }
    }
    Ok(next.run(request).await)
}

/// Client key for rate limiting: first hop of `x-forwarded-for`, or a shared
/// bucket for direct connections.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "direct".to_string())
}

/// 401 for anonymous callers, 403 for authenticated callers without the
/// staff role.
pub(crate) fn staff_gate_status(caller: &Caller) -> StatusCode {
    if caller.is_authenticated() {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::UNAUTHORIZED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_key_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_key(&headers), "203.0.113.9");
    }

    #[test]
    fn client_key_falls_back_to_shared_bucket() {
        assert_eq!(client_key(&HeaderMap::new()), "direct");
    }

    #[test]
    fn staff_gate_distinguishes_anonymous() {
        assert_eq!(
            staff_gate_status(&Caller::anonymous()),
            StatusCode::UNAUTHORIZED
        );
        let mut caller = Caller::staff(1, "host", false);
        caller.is_staff = false;
        assert_eq!(staff_gate_status(&caller), StatusCode::FORBIDDEN);
    }
}
