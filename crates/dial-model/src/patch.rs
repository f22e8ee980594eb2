use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{AttrMap, TaskName};

/// Settings update for one or more task types.
///
/// Maps task name to the attributes that should be set on that task's
/// descriptor. Transient: a patch only exists for the duration of a single
/// `update_tasks_settings` call.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsPatch(pub BTreeMap<TaskName, AttrMap>);

impl SettingsPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` if the patch touches no tasks.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add or replace the attribute set for a task.
    pub fn insert(&mut self, task: impl Into<TaskName>, attrs: AttrMap) -> &mut Self {
        self.0.insert(task.into(), attrs);
        self
    }

    /// Iterate through `(task name, attributes)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrMap)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Per-task restore instruction: attributes to set back, names to erase.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreEntry {
    /// Attributes to write back onto the descriptor.
    #[serde(default)]
    pub set: AttrMap,
    /// Attribute names to remove from the descriptor.
    ///
    /// Erasing a name that was never set is a warning, not an error.
    #[serde(default)]
    pub erase: BTreeSet<String>,
}

/// Restore patch for one or more task types.
///
/// Transient, like [`SettingsPatch`]; used by `restore_task_settings` to put
/// descriptors back into a previously captured state.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestorePatch(pub BTreeMap<TaskName, RestoreEntry>);

impl RestorePatch {
    /// Create an empty restore patch.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` if the patch touches no tasks.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add or replace the restore entry for a task.
    pub fn insert(&mut self, task: impl Into<TaskName>, entry: RestoreEntry) -> &mut Self {
        self.0.insert(task.into(), entry);
        self
    }

    /// Iterate through `(task name, restore entry)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RestoreEntry)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{RestoreEntry, RestorePatch, SettingsPatch};
    use crate::domain::AttrMap;

    #[test]
    fn settings_patch_serializes_as_nested_object() {
        let mut attrs = AttrMap::new();
        attrs.insert("rate_limit", json!("10/m"));

        let mut patch = SettingsPatch::new();
        patch.insert("tasks.send_email", attrs);

        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"tasks.send_email":{"rate_limit":"10/m"}}"#);
    }

    #[test]
    fn settings_patch_roundtrip() {
        let json = r#"{"tasks.resize":{"retries":5,"acks_late":true}}"#;
        let patch: SettingsPatch = serde_json::from_str(json).unwrap();

        let (task, attrs) = patch.iter().next().unwrap();
        assert_eq!(task, "tasks.resize");
        assert_eq!(attrs.get("retries"), Some(&json!(5)));
        assert_eq!(attrs.get("acks_late"), Some(&json!(true)));
    }

    #[test]
    fn restore_entry_fields_default_when_missing() {
        let entry: RestoreEntry = serde_json::from_str(r#"{}"#).unwrap();
        assert!(entry.set.is_empty());
        assert!(entry.erase.is_empty());
    }

    #[test]
    fn restore_patch_roundtrip() {
        let json = r#"{"tasks.cleanup":{"set":{"retries":1},"erase":["rate_limit"]}}"#;
        let patch: RestorePatch = serde_json::from_str(json).unwrap();

        let (task, entry) = patch.iter().next().unwrap();
        assert_eq!(task, "tasks.cleanup");
        assert_eq!(entry.set.get("retries"), Some(&json!(1)));
        assert!(entry.erase.contains("rate_limit"));

        let back = serde_json::to_string(&patch).unwrap();
        let reparsed: RestorePatch = serde_json::from_str(&back).unwrap();
        assert_eq!(reparsed, patch);
    }
}
