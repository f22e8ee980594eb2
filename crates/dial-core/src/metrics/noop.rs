use crate::metrics::backend::{CommandOutcome, MetricsBackend};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_command(&self, _: &str, _: CommandOutcome) {}

    #[inline(always)]
    fn record_task_error(&self, _: &str, _: &str) {}

    #[inline(always)]
    fn record_prefetch_adjust(&self, _: &str, _: u32) {}
}
