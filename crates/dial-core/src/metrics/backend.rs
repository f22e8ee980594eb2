use std::sync::Arc;

/// Outcome of one control command, for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Command returned an ok reply or a result record.
    Ok,
    /// Command returned an error reply.
    Error,
}

impl CommandOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandOutcome::Ok => "ok",
            CommandOutcome::Error => "error",
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are injected into the control panel and record what the
/// remote-control surface is being used for. All label values are bounded:
/// command names are the fixed handler set, error kinds come from
/// `ControlError::kind`, directions are "increment"/"decrement".
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record that a command finished with the given outcome.
    fn record_command(&self, command: &str, outcome: CommandOutcome);

    /// Record one collected per-task failure inside a command.
    ///
    /// A single aggregate-mode command may record several of these while
    /// still being counted once by `record_command`.
    fn record_task_error(&self, command: &str, error_kind: &str);

    /// Record an applied prefetch adjustment.
    fn record_prefetch_adjust(&self, direction: &str, n: u32);
}

/// Shared handle to a metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
