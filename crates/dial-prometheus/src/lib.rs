//! Prometheus metrics backend for the dial control plane.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of
//! [`dial_core::MetricsBackend`] that exposes control-command metrics in
//! Prometheus format.
//!
//! ## Metrics
//! - `dial_commands_total{command, outcome}` - Counter
//! - `dial_command_task_errors_total{command, error_kind}` - Counter
//! - `dial_prefetch_adjustments_total{direction}` - Counter of applied deltas
//!
//! ## HTTP server
//! This crate does NOT serve the `/metrics` endpoint itself; expose
//! [`PrometheusMetrics::gather`] through the application's HTTP framework:
//!
//! ```rust,ignore
//! async fn metrics_handler(State(metrics): State<Arc<PrometheusMetrics>>) -> Response {
//!     let families = metrics.gather();
//!     let encoder = prometheus::TextEncoder::new();
//!     let mut buffer = vec![];
//!     encoder.encode(&families, &mut buffer).unwrap();
//!     // ... build the response from buffer
//! }
//! ```

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
