use std::sync::Arc;

use async_trait::async_trait;

use dial_core::ControlPanel;
use dial_model::{AttrValue, ControlReply, RestorePatch, SettingsPatch, SettingsReport, TaskName};

use crate::error::ApiError;
use crate::handler::ControlHandler;

/// Adapter that bridges `ControlPanel` to `ControlHandler`.
///
/// This is a ready-to-use implementation that directly delegates to the
/// panel and composes the fixed success messages of the wire protocol.
pub struct ControlPanelAdapter {
    panel: Arc<ControlPanel>,
}

impl ControlPanelAdapter {
    /// Create a new adapter wrapping the given panel.
    pub fn new(panel: Arc<ControlPanel>) -> Self {
        Self { panel }
    }
}

#[async_trait]
impl ControlHandler for ControlPanelAdapter {
    async fn update_tasks_settings(&self, patch: SettingsPatch) -> Result<ControlReply, ApiError> {
        self.panel.update_tasks_settings(&patch)?;
        Ok(ControlReply::ok("task settings updated"))
    }

    async fn get_task_settings(
        &self,
        tasknames: Option<Vec<TaskName>>,
        setting_names: Vec<String>,
    ) -> Result<SettingsReport, ApiError> {
        Ok(self.panel.get_task_settings(tasknames, &setting_names)?)
    }

    async fn get_all_task_settings(
        &self,
        setting_names: Vec<String>,
    ) -> Result<SettingsReport, ApiError> {
        Ok(self.panel.get_all_task_settings(&setting_names)?)
    }

    async fn restore_task_settings(&self, patch: RestorePatch) -> Result<ControlReply, ApiError> {
        self.panel.restore_task_settings(&patch)?;
        Ok(ControlReply::ok("task settings restored"))
    }

    async fn get_task_attribute(
        &self,
        taskname: &str,
        attrname: &str,
    ) -> Result<AttrValue, ApiError> {
        Ok(self.panel.get_task_attribute(taskname, attrname)?)
    }

    async fn set_task_attribute(
        &self,
        tasknames: Vec<TaskName>,
        attrname: &str,
        value: AttrValue,
    ) -> Result<ControlReply, ApiError> {
        self.panel.set_task_attribute(&tasknames, attrname, value)?;
        Ok(ControlReply::ok(format!("new {attrname} set successfully")))
    }

    async fn prefetch_increment(&self, n: u32) -> Result<ControlReply, ApiError> {
        let value = self.panel.prefetch_increment(n)?;
        Ok(ControlReply::ok(format!(
            "incremented prefetch by {n} (now {value})"
        )))
    }

    async fn prefetch_decrement(&self, n: u32) -> Result<ControlReply, ApiError> {
        let value = self.panel.prefetch_decrement(n)?;
        Ok(ControlReply::ok(format!(
            "decremented prefetch by {n} (now {value})"
        )))
    }
}
