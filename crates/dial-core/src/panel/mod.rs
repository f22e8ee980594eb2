//! Control panel: the remote-invocable handler set for task settings and
//! prefetch.
//!
//! Each operation is a single stateless transaction over the registry (one
//! lock acquisition, no cross-call ordering). The failure mode differs per
//! operation and callers depend on it:
//! - `update`, `restore` and `get_task_settings` collect per-task errors,
//!   keep processing the remaining tasks and report one aggregate error;
//! - `get_all_task_settings` aborts the whole call on the first failure;
//! - the single-attribute operations short-circuit immediately.
//!
//! Full failure detail is written to the worker log; callers only ever see
//! the fixed wire strings or an opaque summary.
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, instrument, warn};

use dial_model::{AttrValue, RestorePatch, SettingsPatch, SettingsReport};

use crate::{
    error::{ControlError, ControlResult},
    metrics::{CommandOutcome, MetricsHandle, noop_metrics},
    qos::QosHandle,
    registry::TaskRegistry,
};

/// How a bulk read reacts to a task that fails to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailMode {
    /// Collect the failure, keep going, report one aggregate error.
    Aggregate,
    /// Abort the whole call on the first failure.
    Abort,
}

/// Remote-control handler set of one worker process.
///
/// Holds the shared task registry and the worker's QoS handle. The panel
/// introduces no locking beyond the registry mutex; the host dispatcher is
/// expected to service one remote command at a time.
pub struct ControlPanel {
    registry: Arc<Mutex<TaskRegistry>>,
    qos: QosHandle,
    metrics: MetricsHandle,
}

impl ControlPanel {
    /// Create a panel over the given registry and QoS handle, with metrics
    /// disabled.
    pub fn new(registry: Arc<Mutex<TaskRegistry>>, qos: QosHandle) -> Self {
        Self {
            registry,
            qos,
            metrics: noop_metrics(),
        }
    }

    /// Attach a metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Get a clone of the shared registry handle.
    pub fn registry(&self) -> Arc<Mutex<TaskRegistry>> {
        Arc::clone(&self.registry)
    }

    fn lock_registry(&self) -> MutexGuard<'_, TaskRegistry> {
        // A poisoned lock only means another handler panicked mid-call; the
        // map itself is still a consistent BTreeMap.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish<T>(&self, command: &'static str, result: ControlResult<T>) -> ControlResult<T> {
        let outcome = match &result {
            Ok(_) => CommandOutcome::Ok,
            Err(_) => CommandOutcome::Error,
        };
        self.metrics.record_command(command, outcome);
        result
    }

    /// Apply a settings patch across task types.
    ///
    /// Per-task failures (unknown task, attribute mutation failure) are
    /// collected and the remaining tasks are still processed; there is no
    /// rollback for attributes already set.
    #[instrument(level = "debug", skip(self, patch), fields(tasks = patch.0.len()))]
    pub fn update_tasks_settings(&self, patch: &SettingsPatch) -> ControlResult<()> {
        debug!("update_tasks_settings()");
        let mut errors: Vec<(String, String)> = Vec::new();

        {
            let mut registry = self.lock_registry();
            for (task, attrs) in patch.iter() {
                let result = registry.resolve_mut(task).and_then(|desc| {
                    for (attr, value) in attrs.iter() {
                        desc.set(attr, value.clone())?;
                    }
                    Ok(())
                });
                if let Err(err) = result {
                    self.metrics.record_task_error("update_tasks_settings", err.kind());
                    errors.push((task.to_string(), format!("settings: {attrs:?}\n{err}")));
                }
            }
        }

        let result = if errors.is_empty() {
            Ok(())
        } else {
            self.log_aggregate("updating task settings", &errors);
            Err(ControlError::Aggregate {
                context: "updating task settings",
            })
        };
        self.finish("update_tasks_settings", result)
    }

    /// Read the requested settings for the given tasks (default: all
    /// registered tasks).
    ///
    /// Only attributes physically present on each descriptor are reported;
    /// inherited defaults never leak through. The call succeeds only if no
    /// task failed to resolve.
    #[instrument(level = "debug", skip(self, tasknames, setting_names))]
    pub fn get_task_settings(
        &self,
        tasknames: Option<Vec<String>>,
        setting_names: &[String],
    ) -> ControlResult<SettingsReport> {
        debug!("get_task_settings()");
        let registry = self.lock_registry();
        let names = tasknames.unwrap_or_else(|| registry.task_names());

        let result = self.collect_settings(
            &registry,
            &names,
            setting_names,
            FailMode::Aggregate,
            "get_task_settings",
            "retrieving task settings",
        );
        drop(registry);
        self.finish("get_task_settings", result)
    }

    /// Read the requested settings for every registered task.
    ///
    /// Unlike [`get_task_settings`](Self::get_task_settings), a resolution
    /// failure aborts the whole call; no partial report is returned.
    #[instrument(level = "debug", skip(self, setting_names))]
    pub fn get_all_task_settings(&self, setting_names: &[String]) -> ControlResult<SettingsReport> {
        debug!("get_all_task_settings()");
        let registry = self.lock_registry();
        let names = registry.task_names();

        let result = self.collect_settings(
            &registry,
            &names,
            setting_names,
            FailMode::Abort,
            "get_all_task_settings",
            "retrieving all task settings",
        );
        drop(registry);
        self.finish("get_all_task_settings", result)
    }

    fn collect_settings(
        &self,
        registry: &TaskRegistry,
        tasknames: &[String],
        setting_names: &[String],
        mode: FailMode,
        command: &'static str,
        context: &'static str,
    ) -> ControlResult<SettingsReport> {
        let mut report = SettingsReport::new();
        let mut errors: Vec<(String, String)> = Vec::new();

        for task in tasknames {
            match registry.resolve(task) {
                Ok(desc) => {
                    report.insert(task.clone(), desc.own_subset(setting_names));
                }
                Err(err) => {
                    self.metrics.record_task_error(command, err.kind());
                    match mode {
                        FailMode::Abort => {
                            error!(task = %task, error = %err, "aborting {context}");
                            return Err(err);
                        }
                        FailMode::Aggregate => errors.push((task.clone(), err.to_string())),
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(report)
        } else {
            self.log_aggregate(context, &errors);
            Err(ControlError::Aggregate { context })
        }
    }

    /// Restore task settings from a captured state.
    ///
    /// Per task: write back every attribute in `set`, then erase every name
    /// in `erase`. Erasing a never-set attribute is a warning, not an
    /// error. Unknown tasks are collected; the rest are still processed.
    #[instrument(level = "debug", skip(self, patch), fields(tasks = patch.0.len()))]
    pub fn restore_task_settings(&self, patch: &RestorePatch) -> ControlResult<()> {
        debug!(restore = ?patch, "restore_task_settings()");
        let mut errors: Vec<(String, String)> = Vec::new();

        {
            let mut registry = self.lock_registry();
            for (task, entry) in patch.iter() {
                let desc = match registry.resolve_mut(task) {
                    Ok(desc) => desc,
                    Err(err) => {
                        self.metrics.record_task_error("restore_task_settings", err.kind());
                        errors.push((task.to_string(), err.to_string()));
                        continue;
                    }
                };

                for (attr, value) in entry.set.iter() {
                    debug!(task = %task, attr = %attr, value = %value, "restoring attribute");
                    if let Err(err) = desc.set(attr, value.clone()) {
                        self.metrics.record_task_error("restore_task_settings", err.kind());
                        errors.push((task.to_string(), err.to_string()));
                    }
                }
                for attr in &entry.erase {
                    debug!(task = %task, attr = %attr, "erasing attribute");
                    match desc.remove(attr) {
                        Ok(true) => {}
                        Ok(false) => {
                            warn!(task = %task, attr = %attr, "could not erase attribute: not set");
                        }
                        Err(err) => {
                            self.metrics.record_task_error("restore_task_settings", err.kind());
                            errors.push((task.to_string(), err.to_string()));
                        }
                    }
                }
            }
        }

        let result = if errors.is_empty() {
            Ok(())
        } else {
            self.log_aggregate("restoring task settings", &errors);
            Err(ControlError::Aggregate {
                context: "restoring task settings",
            })
        };
        self.finish("restore_task_settings", result)
    }

    /// Read one attribute of one task.
    ///
    /// Fail-fast: unknown task and unknown attribute each produce an
    /// immediate error. Unlike the bulk reads, the attribute is looked up
    /// through the fallback chain, so inherited defaults are visible here.
    #[instrument(level = "debug", skip(self))]
    pub fn get_task_attribute(&self, taskname: &str, attrname: &str) -> ControlResult<AttrValue> {
        debug!("get_task_attribute()");
        let registry = self.lock_registry();

        let result = match registry.resolve(taskname) {
            Ok(desc) => match desc.get(attrname) {
                Some(value) => Ok(value.clone()),
                None => {
                    error!(task = %taskname, attr = %attrname, "attempted to get an unknown attribute");
                    Err(ControlError::AttributeNotFound {
                        task: taskname.to_string(),
                        attr: attrname.to_string(),
                    })
                }
            },
            Err(err) => {
                error!(task = %taskname, attr = %attrname, error = %err, "attempted to get an attribute for an unknown task");
                Err(err)
            }
        };
        drop(registry);
        self.finish("get_task_attribute", result)
    }

    /// Set one attribute across one or more tasks.
    ///
    /// Short-circuits on the first unknown task or unknown attribute,
    /// leaving the remaining tasks untouched. The existence check is the
    /// broad one: an attribute only present in the inherited defaults may
    /// still be set (the write lands on the descriptor itself).
    #[instrument(level = "debug", skip(self, tasknames, value), fields(tasks = tasknames.len()))]
    pub fn set_task_attribute(
        &self,
        tasknames: &[String],
        attrname: &str,
        value: AttrValue,
    ) -> ControlResult<()> {
        debug!("set_task_attribute()");
        let mut registry = self.lock_registry();

        let mut result = Ok(());
        for task in tasknames {
            let desc = match registry.resolve_mut(task) {
                Ok(desc) => desc,
                Err(err) => {
                    error!(task = %task, attr = %attrname, error = %err, "attempted to set an attribute for an unknown task");
                    result = Err(err);
                    break;
                }
            };

            if !desc.has(attrname) {
                error!(task = %task, attr = %attrname, "attempted to set an unknown attribute");
                result = Err(ControlError::AttributeNotFound {
                    task: task.clone(),
                    attr: attrname.to_string(),
                });
                break;
            }

            if let Err(err) = desc.set(attrname, value.clone()) {
                error!(task = %task, attr = %attrname, error = %err, "attribute mutation failed");
                result = Err(err);
                break;
            }
        }
        drop(registry);
        self.finish("set_task_attribute", result)
    }

    /// Raise the worker's prefetch count by `n`.
    ///
    /// Returns the new prefetch count. Any counter failure is logged in
    /// full and reported as a generic adjust error.
    #[instrument(level = "debug", skip(self))]
    pub fn prefetch_increment(&self, n: u32) -> ControlResult<u32> {
        debug!("prefetch_increment()");
        let result = match self.qos.increment(n) {
            Ok(value) => {
                self.metrics.record_prefetch_adjust("increment", n);
                Ok(value)
            }
            Err(err) => {
                error!(n, error = %err, "failed to increment the worker prefetch");
                Err(ControlError::CounterAdjust(
                    "incrementing the worker prefetch failed; see the worker log for details"
                        .to_string(),
                ))
            }
        };
        self.finish("prefetch_increment", result)
    }

    /// Lower the worker's prefetch count by `n`.
    ///
    /// Returns the new prefetch count. Any counter failure is logged in
    /// full and reported as a generic adjust error.
    #[instrument(level = "debug", skip(self))]
    pub fn prefetch_decrement(&self, n: u32) -> ControlResult<u32> {
        debug!("prefetch_decrement()");
        let result = match self.qos.decrement(n) {
            Ok(value) => {
                self.metrics.record_prefetch_adjust("decrement", n);
                Ok(value)
            }
            Err(err) => {
                error!(n, error = %err, "failed to decrement the worker prefetch");
                Err(ControlError::CounterAdjust(
                    "decrementing the worker prefetch failed; see the worker log for details"
                        .to_string(),
                ))
            }
        };
        self.finish("prefetch_decrement", result)
    }

    fn log_aggregate(&self, context: &str, errors: &[(String, String)]) {
        let mut detail = format!("errors occurred while {context}:\n");
        for (task, err) in errors {
            let _ = writeln!(detail, "task: {task}\n{err}\n");
        }
        error!("{detail}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::{ControlPanel, FailMode};
    use crate::{
        error::ControlError,
        metrics::{CommandOutcome, MetricsBackend},
        qos::{PrefetchCounter, QosControl},
        registry::{TaskDescriptor, TaskRegistry},
    };
    use dial_model::{AttrMap, RestoreEntry, RestorePatch, SettingsPatch};

    fn seeded_registry() -> Arc<Mutex<TaskRegistry>> {
        let mut defaults = AttrMap::new();
        defaults.insert("rate_limit", json!("100/m"));
        defaults.insert("retries", json!(3));
        let defaults = Arc::new(defaults);

        let mut registry = TaskRegistry::new();
        for name in ["tasks.send_email", "tasks.resize", "tasks.cleanup"] {
            registry.register(TaskDescriptor::with_defaults(name, Arc::clone(&defaults)));
        }
        Arc::new(Mutex::new(registry))
    }

    fn panel() -> ControlPanel {
        ControlPanel::new(seeded_registry(), Arc::new(PrefetchCounter::new(0)))
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn update_applies_settings_to_all_tasks_in_patch() {
        let panel = panel();

        let mut attrs = AttrMap::new();
        attrs.insert("rate_limit", json!("5/m"));
        let mut patch = SettingsPatch::new();
        patch.insert("tasks.send_email", attrs.clone());
        patch.insert("tasks.resize", attrs);

        panel.update_tasks_settings(&patch).unwrap();

        let report = panel
            .get_task_settings(None, &names(&["rate_limit"]))
            .unwrap();
        assert_eq!(report.get("tasks.send_email").unwrap().get("rate_limit"), Some(&json!("5/m")));
        assert_eq!(report.get("tasks.resize").unwrap().get("rate_limit"), Some(&json!("5/m")));
    }

    #[test]
    fn update_with_one_bad_task_still_applies_the_good_ones() {
        let panel = panel();

        let mut attrs = AttrMap::new();
        attrs.insert("retries", json!(9));
        let mut patch = SettingsPatch::new();
        patch.insert("tasks.send_email", attrs.clone());
        patch.insert("tasks.ghost", attrs.clone());
        patch.insert("tasks.resize", attrs);

        let err = panel.update_tasks_settings(&patch).unwrap_err();
        assert!(matches!(err, ControlError::Aggregate { .. }));

        let report = panel
            .get_task_settings(
                Some(names(&["tasks.send_email", "tasks.resize"])),
                &names(&["retries"]),
            )
            .unwrap();
        assert_eq!(report.get("tasks.send_email").unwrap().get("retries"), Some(&json!(9)));
        assert_eq!(report.get("tasks.resize").unwrap().get("retries"), Some(&json!(9)));
    }

    #[test]
    fn get_task_settings_does_not_leak_inherited_defaults() {
        let panel = panel();

        // rate_limit exists only in the shared defaults.
        let report = panel
            .get_task_settings(Some(names(&["tasks.cleanup"])), &names(&["rate_limit"]))
            .unwrap();
        assert!(report.get("tasks.cleanup").unwrap().is_empty());
    }

    #[test]
    fn get_task_settings_fails_whole_call_when_any_task_is_unknown() {
        let panel = panel();

        let err = panel
            .get_task_settings(
                Some(names(&["tasks.send_email", "tasks.ghost"])),
                &names(&["retries"]),
            )
            .unwrap_err();
        assert!(matches!(err, ControlError::Aggregate { .. }));
    }

    #[test]
    fn get_all_task_settings_covers_every_registered_task() {
        let panel = panel();
        panel
            .set_task_attribute(&names(&["tasks.resize"]), "retries", json!(1))
            .unwrap();

        let report = panel.get_all_task_settings(&names(&["retries"])).unwrap();
        assert_eq!(report.len(), 3);
        assert_eq!(report.get("tasks.resize").unwrap().get("retries"), Some(&json!(1)));
        assert!(report.get("tasks.cleanup").unwrap().is_empty());
    }

    #[test]
    fn abort_mode_returns_no_partial_report() {
        let panel = panel();
        let registry = panel.registry();
        let registry = registry.lock().unwrap();

        let result = panel.collect_settings(
            &registry,
            &names(&["tasks.send_email", "tasks.ghost", "tasks.resize"]),
            &names(&["retries"]),
            FailMode::Abort,
            "get_all_task_settings",
            "retrieving all task settings",
        );

        match result {
            Err(ControlError::TaskNotFound(name)) => assert_eq!(name, "tasks.ghost"),
            other => panic!("expected TaskNotFound, got {other:?}"),
        }
    }

    #[test]
    fn restore_sets_then_erases() {
        let panel = panel();
        panel
            .set_task_attribute(&names(&["tasks.send_email"]), "rate_limit", json!("1/s"))
            .unwrap();

        let mut set = AttrMap::new();
        set.insert("retries", json!(2));
        let mut patch = RestorePatch::new();
        patch.insert(
            "tasks.send_email",
            RestoreEntry {
                set,
                erase: ["rate_limit".to_string()].into(),
            },
        );

        panel.restore_task_settings(&patch).unwrap();

        let report = panel
            .get_task_settings(
                Some(names(&["tasks.send_email"])),
                &names(&["retries", "rate_limit"]),
            )
            .unwrap();
        let attrs = report.get("tasks.send_email").unwrap();
        assert_eq!(attrs.get("retries"), Some(&json!(2)));
        assert!(attrs.get("rate_limit").is_none());
    }

    #[test]
    fn restore_erase_of_never_set_attribute_is_not_an_error() {
        let panel = panel();

        let mut patch = RestorePatch::new();
        patch.insert(
            "tasks.cleanup",
            RestoreEntry {
                set: AttrMap::new(),
                erase: ["never_set".to_string()].into(),
            },
        );

        assert!(panel.restore_task_settings(&patch).is_ok());
    }

    #[test]
    fn restore_with_unknown_task_still_processes_the_rest() {
        let panel = panel();

        let mut set = AttrMap::new();
        set.insert("retries", json!(4));
        let mut patch = RestorePatch::new();
        patch.insert("tasks.ghost", RestoreEntry::default());
        patch.insert(
            "tasks.resize",
            RestoreEntry {
                set,
                erase: Default::default(),
            },
        );

        let err = panel.restore_task_settings(&patch).unwrap_err();
        assert!(matches!(err, ControlError::Aggregate { .. }));

        let report = panel
            .get_task_settings(Some(names(&["tasks.resize"])), &names(&["retries"]))
            .unwrap();
        assert_eq!(report.get("tasks.resize").unwrap().get("retries"), Some(&json!(4)));
    }

    #[test]
    fn set_then_get_attribute_roundtrips() {
        let panel = panel();

        panel
            .set_task_attribute(&names(&["tasks.send_email"]), "retries", json!(6))
            .unwrap();
        let value = panel.get_task_attribute("tasks.send_email", "retries").unwrap();
        assert_eq!(value, json!(6));
    }

    #[test]
    fn get_attribute_sees_inherited_defaults() {
        let panel = panel();

        // Broad lookup: rate_limit is only in the defaults store.
        let value = panel.get_task_attribute("tasks.cleanup", "rate_limit").unwrap();
        assert_eq!(value, json!("100/m"));
    }

    #[test]
    fn get_attribute_unknown_task_and_attribute() {
        let panel = panel();

        assert!(matches!(
            panel.get_task_attribute("tasks.ghost", "retries"),
            Err(ControlError::TaskNotFound(_))
        ));
        assert!(matches!(
            panel.get_task_attribute("tasks.cleanup", "no_such_attr"),
            Err(ControlError::AttributeNotFound { .. })
        ));
    }

    #[test]
    fn set_attribute_requires_broad_existence() {
        let panel = panel();

        // Known through the defaults: allowed, lands on the descriptor.
        panel
            .set_task_attribute(&names(&["tasks.resize"]), "rate_limit", json!("2/s"))
            .unwrap();
        let report = panel
            .get_task_settings(Some(names(&["tasks.resize"])), &names(&["rate_limit"]))
            .unwrap();
        assert_eq!(report.get("tasks.resize").unwrap().get("rate_limit"), Some(&json!("2/s")));

        // Completely unknown attribute: rejected.
        assert!(matches!(
            panel.set_task_attribute(&names(&["tasks.resize"]), "bogus", json!(1)),
            Err(ControlError::AttributeNotFound { .. })
        ));
    }

    #[test]
    fn set_attribute_short_circuits_on_first_unknown_task() {
        let panel = panel();

        let err = panel
            .set_task_attribute(
                &names(&["tasks.ghost", "tasks.resize"]),
                "retries",
                json!(8),
            )
            .unwrap_err();
        assert!(matches!(err, ControlError::TaskNotFound(_)));

        // The task after the failure was never touched.
        let report = panel
            .get_task_settings(Some(names(&["tasks.resize"])), &names(&["retries"]))
            .unwrap();
        assert!(report.get("tasks.resize").unwrap().is_empty());
    }

    #[test]
    fn prefetch_increment_then_decrement_is_neutral() {
        let panel = panel();

        assert_eq!(panel.prefetch_increment(5).unwrap(), 5);
        assert_eq!(panel.prefetch_decrement(5).unwrap(), 0);
    }

    #[test]
    fn prefetch_failure_is_reported_as_generic_adjust_error() {
        let panel = panel();

        match panel.prefetch_decrement(1) {
            Err(ControlError::CounterAdjust(msg)) => {
                assert!(msg.contains("see the worker log"));
            }
            other => panic!("expected CounterAdjust, got {other:?}"),
        }
    }

    struct RecordingMetrics {
        commands: Mutex<Vec<(String, CommandOutcome)>>,
        task_errors: Mutex<Vec<(String, String)>>,
    }

    impl MetricsBackend for RecordingMetrics {
        fn record_command(&self, command: &str, outcome: CommandOutcome) {
            self.commands.lock().unwrap().push((command.to_string(), outcome));
        }

        fn record_task_error(&self, command: &str, error_kind: &str) {
            self.task_errors
                .lock()
                .unwrap()
                .push((command.to_string(), error_kind.to_string()));
        }

        fn record_prefetch_adjust(&self, _: &str, _: u32) {}
    }

    #[test]
    fn metrics_see_command_outcome_and_per_task_errors() {
        let metrics = Arc::new(RecordingMetrics {
            commands: Mutex::new(Vec::new()),
            task_errors: Mutex::new(Vec::new()),
        });
        let panel = ControlPanel::new(seeded_registry(), Arc::new(PrefetchCounter::new(0)))
            .with_metrics(metrics.clone());

        let mut patch = SettingsPatch::new();
        patch.insert("tasks.ghost", AttrMap::new());
        let _ = panel.update_tasks_settings(&patch);

        let commands = metrics.commands.lock().unwrap();
        assert_eq!(
            commands.as_slice(),
            &[("update_tasks_settings".to_string(), CommandOutcome::Error)]
        );
        let task_errors = metrics.task_errors.lock().unwrap();
        assert_eq!(
            task_errors.as_slice(),
            &[("update_tasks_settings".to_string(), "task_not_found".to_string())]
        );
    }

    #[test]
    fn qos_counter_is_shared_with_the_runtime() {
        let counter = Arc::new(PrefetchCounter::new(10));
        let panel = ControlPanel::new(seeded_registry(), counter.clone());

        panel.prefetch_increment(2).unwrap();
        assert_eq!(counter.prefetch(), 12);
    }
}
