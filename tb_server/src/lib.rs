//! # tb_server
//!
//! HTTP server for the table reservation engine: REST endpoints over the
//! [`table_book`] managers, identity-provider JWT verification, request
//! correlation, rate limiting, and Prometheus metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
