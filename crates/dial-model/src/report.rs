use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{AttrMap, TaskName};

/// Successful result of a bulk settings read.
///
/// Maps task name to the requested attributes that were physically present
/// on that task's descriptor. Tasks for which none of the requested
/// attributes are set still appear, with an empty map.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsReport(pub BTreeMap<TaskName, AttrMap>);

impl SettingsReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` if no tasks are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of tasks in the report.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Add the settings found for one task.
    pub fn insert(&mut self, task: impl Into<TaskName>, attrs: AttrMap) -> &mut Self {
        self.0.insert(task.into(), attrs);
        self
    }

    /// Settings reported for a task, if the task was covered by the call.
    pub fn get(&self, task: &str) -> Option<&AttrMap> {
        self.0.get(task)
    }

    /// Iterate through `(task name, attributes)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrMap)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
