use std::sync::Arc;

use prometheus::{CounterVec, Opts, Registry, proto::MetricFamily};

use dial_core::{CommandOutcome, MetricsBackend};

/// Prometheus metrics backend for the control panel.
///
/// ## Label cardinality
/// All labels are bounded (low cardinality):
/// - `command`: the fixed control-handler set ("update_tasks_settings", ...)
/// - `outcome`: "ok", "error"
/// - `error_kind`: "task_not_found", "attribute_not_found", "mutation",
///   "counter_adjust", "aggregate"
/// - `direction`: "increment", "decrement"
#[derive(Clone)]
pub struct PrometheusMetrics {
    commands: CounterVec,
    task_errors: CounterVec,
    prefetch_adjustments: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a new prometheus metrics backend with custom registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let commands = CounterVec::new(
            Opts::new("commands_total", "Total control commands handled").namespace("dial"),
            &["command", "outcome"],
        )?;
        registry.register(Box::new(commands.clone()))?;

        let task_errors = CounterVec::new(
            Opts::new(
                "command_task_errors_total",
                "Per-task errors collected inside control commands",
            )
            .namespace("dial"),
            &["command", "error_kind"],
        )?;
        registry.register(Box::new(task_errors.clone()))?;

        let prefetch_adjustments = CounterVec::new(
            Opts::new(
                "prefetch_adjustments_total",
                "Sum of applied prefetch deltas",
            )
            .namespace("dial"),
            &["direction"],
        )?;
        registry.register(Box::new(prefetch_adjustments.clone()))?;

        Ok(Self {
            commands,
            task_errors,
            prefetch_adjustments,
            registry,
        })
    }

    /// Create a new prometheus metrics backend with default registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    ///
    /// Use this to implement the `/metrics` HTTP endpoint.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Get reference to underlying prometheus registry.
    ///
    /// Useful for registering custom metrics alongside the dial metrics.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_command(&self, command: &str, outcome: CommandOutcome) {
        self.commands
            .with_label_values(&[command, outcome.as_label()])
            .inc();
    }

    fn record_task_error(&self, command: &str, error_kind: &str) {
        self.task_errors
            .with_label_values(&[command, error_kind])
            .inc();
    }

    fn record_prefetch_adjust(&self, direction: &str, n: u32) {
        self.prefetch_adjustments
            .with_label_values(&[direction])
            .inc_by(n as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_create_prometheus_metrics() {
        let _metrics = PrometheusMetrics::new().expect("failed to create metrics");
    }

    #[test]
    fn record_command_increments_counter_per_label_pair() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_command("update_tasks_settings", CommandOutcome::Ok);
        metrics.record_command("update_tasks_settings", CommandOutcome::Ok);
        metrics.record_command("get_task_settings", CommandOutcome::Error);

        let families = metrics.gather();
        let commands = families
            .iter()
            .find(|f| f.name() == "dial_commands_total")
            .expect("commands counter not found");

        assert_eq!(commands.get_metric().len(), 2);
    }

    #[test]
    fn record_task_error_increments_counter() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_task_error("update_tasks_settings", "task_not_found");
        metrics.record_task_error("update_tasks_settings", "task_not_found");
        metrics.record_task_error("restore_task_settings", "mutation");

        let families = metrics.gather();
        let errors = families
            .iter()
            .find(|f| f.name() == "dial_command_task_errors_total")
            .expect("task errors counter not found");

        assert_eq!(errors.get_metric().len(), 2);
    }

    #[test]
    fn prefetch_adjustments_accumulate_deltas() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_prefetch_adjust("increment", 5);
        metrics.record_prefetch_adjust("increment", 2);

        let families = metrics.gather();
        let adjustments = families
            .iter()
            .find(|f| f.name() == "dial_prefetch_adjustments_total")
            .expect("adjustments counter not found");

        let metric = &adjustments.get_metric()[0];
        assert_eq!(metric.get_counter().value(), 7.0);
    }

    #[test]
    fn can_use_custom_registry() {
        let registry = Arc::new(Registry::new());
        let metrics = PrometheusMetrics::new_with_registry(registry.clone()).unwrap();

        metrics.record_command("prefetch_increment", CommandOutcome::Ok);
        assert!(!registry.gather().is_empty());
    }
}
