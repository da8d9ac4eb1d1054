//! Structured logging configuration.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var; the default keeps
/// sqlx and hyper quiet.
///
/// # Example
///
/// ```no_run
/// use tb_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a rejected staff-only attempt with structured data
pub fn log_authorization_event(path: &str, user_id: Option<i64>, message: &str) {
    tracing::warn!(
        path = path,
        user_id = user_id,
        "AUTHORIZATION: {}",
        message
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_authorization_event() {
        // Just ensure it doesn't panic
        log_authorization_event("/api/v1/reservations", Some(1), "anonymous delete attempt");
    }
}
