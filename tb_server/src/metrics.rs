//! Prometheus metrics for monitoring the reservation server.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener for
//! scraping by monitoring systems.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Booking Metrics
// ============================================================================

/// Increment admitted reservations counter.
pub fn reservations_created_total() {
    metrics::counter!("reservations_created_total").increment(1);
}

/// Increment rejected admissions counter (table already claimed).
pub fn table_conflicts_total() {
    metrics::counter!("table_conflicts_total").increment(1);
}

/// Increment status transition counter, labelled by target status.
pub fn status_transitions_total(to: &str) {
    metrics::counter!("status_transitions_total",
        "to" => to.to_string()
    )
    .increment(1);
}

/// Record free tables returned by an availability query.
pub fn available_tables_returned(count: usize) {
    metrics::histogram!("available_tables_returned").record(count as f64);
}

// ============================================================================
// Rate Limiting Metrics
// ============================================================================

/// Increment rate limit hits counter.
pub fn rate_limit_hits_total(endpoint: &str) {
    metrics::counter!("rate_limit_hits_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}
