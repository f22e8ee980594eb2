//! Metrics collection abstraction for the control panel.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are
//! injected into [`crate::ControlPanel`]; the panel records one outcome per
//! command plus per-task error kinds and prefetch adjustments.
mod backend;
pub use backend::{CommandOutcome, MetricsBackend, MetricsHandle};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
