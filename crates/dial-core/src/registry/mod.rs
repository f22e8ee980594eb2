//! Task-type registry: the slice of the worker runtime the control plane
//! reads and mutates.
//!
//! The registry maps task names to [`TaskDescriptor`]s. It is populated once
//! at worker startup, when the runtime registers its task types, and torn
//! down with the process. Lookup failure is a typed
//! [`ControlError::TaskNotFound`], not a panic.
mod descriptor;
pub use descriptor::TaskDescriptor;

use std::collections::BTreeMap;

use crate::error::{ControlError, ControlResult};

/// Process-wide map of registered task types.
#[derive(Default, Debug)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, TaskDescriptor>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
        }
    }

    /// Register a task type, replacing any previous descriptor of that name.
    pub fn register(&mut self, descriptor: TaskDescriptor) {
        self.tasks.insert(descriptor.name().to_string(), descriptor);
    }

    /// Returns `true` if a task of this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Number of registered task types.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no task types are registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Names of all registered task types, in registry order.
    pub fn task_names(&self) -> Vec<String> {
        self.tasks.keys().cloned().collect()
    }

    /// Look up a descriptor by name.
    pub fn resolve(&self, name: &str) -> ControlResult<&TaskDescriptor> {
        self.tasks
            .get(name)
            .ok_or_else(|| ControlError::TaskNotFound(name.to_string()))
    }

    /// Look up a descriptor by name for mutation.
    pub fn resolve_mut(&mut self, name: &str) -> ControlResult<&mut TaskDescriptor> {
        self.tasks
            .get_mut(name)
            .ok_or_else(|| ControlError::TaskNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskDescriptor, TaskRegistry};
    use crate::error::ControlError;

    #[test]
    fn register_then_resolve() {
        let mut registry = TaskRegistry::new();
        registry.register(TaskDescriptor::new("tasks.send_email"));

        assert!(registry.contains("tasks.send_email"));
        assert_eq!(registry.len(), 1);

        let desc = registry.resolve("tasks.send_email").unwrap();
        assert_eq!(desc.name(), "tasks.send_email");
    }

    #[test]
    fn resolve_unknown_is_task_not_found() {
        let registry = TaskRegistry::new();

        match registry.resolve("tasks.ghost") {
            Err(ControlError::TaskNotFound(name)) => assert_eq!(name, "tasks.ghost"),
            other => panic!("expected TaskNotFound, got {other:?}"),
        }
    }

    #[test]
    fn register_replaces_existing_descriptor() {
        let mut registry = TaskRegistry::new();
        registry.register(TaskDescriptor::new("tasks.cleanup"));

        let mut replacement = TaskDescriptor::new("tasks.cleanup");
        replacement
            .set("retries", serde_json::json!(7))
            .expect("valid attribute name");
        registry.register(replacement);

        assert_eq!(registry.len(), 1);
        let desc = registry.resolve("tasks.cleanup").unwrap();
        assert_eq!(desc.get_own("retries"), Some(&serde_json::json!(7)));
    }

    #[test]
    fn task_names_lists_all_registered() {
        let mut registry = TaskRegistry::new();
        registry.register(TaskDescriptor::new("tasks.b"));
        registry.register(TaskDescriptor::new("tasks.a"));

        assert_eq!(registry.task_names(), vec!["tasks.a", "tasks.b"]);
    }
}
