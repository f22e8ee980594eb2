use async_trait::async_trait;

use dial_model::{AttrValue, ControlReply, RestorePatch, SettingsPatch, SettingsReport, TaskName};

use crate::error::ApiError;

/// Remote-control API handler.
///
/// This trait abstracts the backend implementation, allowing users to:
/// - Use the provided `ControlPanelAdapter`
/// - Implement custom handlers with additional logic (auth, rate limiting, etc.)
#[async_trait]
pub trait ControlHandler: Send + Sync + 'static {
    /// Apply a settings patch across task types (per-task error collection,
    /// no rollback).
    async fn update_tasks_settings(&self, patch: SettingsPatch) -> Result<ControlReply, ApiError>;

    /// Read the requested settings for the given tasks (default: all
    /// registered). Succeeds only if every task resolved.
    async fn get_task_settings(
        &self,
        tasknames: Option<Vec<TaskName>>,
        setting_names: Vec<String>,
    ) -> Result<SettingsReport, ApiError>;

    /// Read the requested settings for every registered task; aborts on the
    /// first failure.
    async fn get_all_task_settings(
        &self,
        setting_names: Vec<String>,
    ) -> Result<SettingsReport, ApiError>;

    /// Restore task settings from a captured state.
    async fn restore_task_settings(&self, patch: RestorePatch) -> Result<ControlReply, ApiError>;

    /// Read one attribute of one task (fallback chain included).
    async fn get_task_attribute(&self, taskname: &str, attrname: &str)
    -> Result<AttrValue, ApiError>;

    /// Set one attribute across one or more tasks (short-circuits on the
    /// first unknown task or attribute).
    async fn set_task_attribute(
        &self,
        tasknames: Vec<TaskName>,
        attrname: &str,
        value: AttrValue,
    ) -> Result<ControlReply, ApiError>;

    /// Raise the worker's prefetch count by `n`.
    async fn prefetch_increment(&self, n: u32) -> Result<ControlReply, ApiError>;

    /// Lower the worker's prefetch count by `n`.
    async fn prefetch_decrement(&self, n: u32) -> Result<ControlReply, ApiError>;
}
