use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use serde::Deserialize;

use dial_model::{AttrValue, RestorePatch, SettingsPatch, TaskName};

use crate::{error::ApiError, handler::ControlHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ControlHandler,
{
    /// Create new HTTP API with the given handler.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - PATCH /api/v1/tasks/settings - Update task settings
    /// - POST /api/v1/tasks/settings/query - Read settings for selected tasks
    /// - POST /api/v1/tasks/settings/query-all - Read settings for all tasks
    /// - POST /api/v1/tasks/settings/restore - Restore captured settings
    /// - GET /api/v1/tasks/{task}/attributes/{attr} - Read one attribute
    /// - PUT /api/v1/tasks/attributes/{attr} - Set one attribute on tasks
    /// - POST /api/v1/prefetch/increment - Raise the prefetch count
    /// - POST /api/v1/prefetch/decrement - Lower the prefetch count
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/v1/tasks/settings", patch(update_tasks_settings::<H>))
            .route("/api/v1/tasks/settings/query", post(get_task_settings::<H>))
            .route(
                "/api/v1/tasks/settings/query-all",
                post(get_all_task_settings::<H>),
            )
            .route(
                "/api/v1/tasks/settings/restore",
                post(restore_task_settings::<H>),
            )
            .route(
                "/api/v1/tasks/{task}/attributes/{attr}",
                get(get_task_attribute::<H>),
            )
            .route(
                "/api/v1/tasks/attributes/{attr}",
                put(set_task_attribute::<H>),
            )
            .route("/api/v1/prefetch/increment", post(prefetch_increment::<H>))
            .route("/api/v1/prefetch/decrement", post(prefetch_decrement::<H>))
            .with_state(self.handler)
    }
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuerySettingsRequest {
    /// Tasks to read; all registered tasks when omitted.
    tasknames: Option<Vec<TaskName>>,
    setting_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryAllSettingsRequest {
    setting_names: Vec<String>,
}

/// One task name or a list of them, matching the original command input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskSelector {
    One(TaskName),
    Many(Vec<TaskName>),
}

impl TaskSelector {
    fn into_vec(self) -> Vec<TaskName> {
        match self {
            TaskSelector::One(name) => vec![name],
            TaskSelector::Many(names) => names,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetAttributeRequest {
    tasknames: TaskSelector,
    value: AttrValue,
}

#[derive(Debug, Deserialize)]
struct PrefetchAdjustRequest {
    n: u32,
}

// ============================================================================
// Handlers
// ============================================================================

/// PATCH /api/v1/tasks/settings
async fn update_tasks_settings<H>(
    State(handler): State<Arc<H>>,
    Json(patch): Json<SettingsPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ControlHandler,
{
    let reply = handler.update_tasks_settings(patch).await?;
    Ok(Json(reply))
}

/// POST /api/v1/tasks/settings/query
async fn get_task_settings<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<QuerySettingsRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ControlHandler,
{
    let report = handler
        .get_task_settings(req.tasknames, req.setting_names)
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/tasks/settings/query-all
async fn get_all_task_settings<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<QueryAllSettingsRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ControlHandler,
{
    let report = handler.get_all_task_settings(req.setting_names).await?;
    Ok(Json(report))
}

/// POST /api/v1/tasks/settings/restore
async fn restore_task_settings<H>(
    State(handler): State<Arc<H>>,
    Json(patch): Json<RestorePatch>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ControlHandler,
{
    let reply = handler.restore_task_settings(patch).await?;
    Ok(Json(reply))
}

/// GET /api/v1/tasks/{task}/attributes/{attr}
async fn get_task_attribute<H>(
    State(handler): State<Arc<H>>,
    Path((task, attr)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ControlHandler,
{
    let value = handler.get_task_attribute(&task, &attr).await?;
    Ok(Json(value))
}

/// PUT /api/v1/tasks/attributes/{attr}
async fn set_task_attribute<H>(
    State(handler): State<Arc<H>>,
    Path(attr): Path<String>,
    Json(req): Json<SetAttributeRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ControlHandler,
{
    let tasknames = req.tasknames.into_vec();
    if tasknames.is_empty() {
        return Err(ApiError::InvalidRequest("tasknames cannot be empty".into()));
    }

    let reply = handler.set_task_attribute(tasknames, &attr, req.value).await?;
    Ok(Json(reply))
}

/// POST /api/v1/prefetch/increment
async fn prefetch_increment<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<PrefetchAdjustRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ControlHandler,
{
    let reply = handler.prefetch_increment(req.n).await?;
    Ok(Json(reply))
}

/// POST /api/v1/prefetch/decrement
async fn prefetch_decrement<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<PrefetchAdjustRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ControlHandler,
{
    let reply = handler.prefetch_decrement(req.n).await?;
    Ok(Json(reply))
}
