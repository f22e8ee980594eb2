pub mod error;
pub mod metrics;
pub mod panel;
pub mod qos;
pub mod registry;

pub use error::ControlError;
pub use metrics::{CommandOutcome, MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use panel::ControlPanel;
pub use qos::{MAX_PREFETCH_DELTA, PrefetchCounter, QosControl, QosHandle};
pub use registry::{TaskDescriptor, TaskRegistry};

pub mod prelude {
    pub use crate::error::ControlError;
    pub use crate::metrics::{MetricsBackend, MetricsHandle};
    pub use crate::panel::ControlPanel;
    pub use crate::qos::{PrefetchCounter, QosControl, QosHandle};
    pub use crate::registry::{TaskDescriptor, TaskRegistry};
}
