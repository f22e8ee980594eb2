use thiserror::Error;

/// Failures raised by the control handlers.
///
/// `TaskNotFound` and `AttributeNotFound` map to the fixed wire strings the
/// single-attribute commands return. `Mutation` and `CounterAdjust` wrap
/// unexpected failures; their detail is logged server-side and never sent
/// verbatim to the caller. `Aggregate` is the opaque summary returned when a
/// per-task operation collected one or more errors.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("task is not registered: {0}")]
    TaskNotFound(String),

    #[error("unknown attribute {attr} for task {task}")]
    AttributeNotFound { task: String, attr: String },

    #[error("attribute mutation failed: {0}")]
    Mutation(String),

    #[error("prefetch adjust failed: {0}")]
    CounterAdjust(String),

    #[error("errors occurred while {context}; see the worker log for details")]
    Aggregate { context: &'static str },
}

impl ControlError {
    /// Stable label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ControlError::TaskNotFound(_) => "task_not_found",
            ControlError::AttributeNotFound { .. } => "attribute_not_found",
            ControlError::Mutation(_) => "mutation",
            ControlError::CounterAdjust(_) => "counter_adjust",
            ControlError::Aggregate { .. } => "aggregate",
        }
    }
}

pub type ControlResult<T> = Result<T, ControlError>;
