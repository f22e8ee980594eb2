use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use thiserror::Error;

use dial_core::ControlError;
use dial_model::ControlReply;

/// API-level error returned to control-plane clients.
///
/// The `Display` strings are the wire contract: `unknown task` and
/// `unknown attribute` are fixed, everything else is an opaque summary that
/// points at the worker log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown task")]
    UnknownTask,

    #[error("unknown attribute")]
    UnknownAttribute,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Control(String),
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::TaskNotFound(_) => ApiError::UnknownTask,
            ControlError::AttributeNotFound { .. } => ApiError::UnknownAttribute,
            other => ApiError::Control(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnknownTask | ApiError::UnknownAttribute => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Control(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ControlReply::error(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use dial_core::ControlError;

    #[test]
    fn task_not_found_maps_to_fixed_wire_string() {
        let err = ApiError::from(ControlError::TaskNotFound("tasks.ghost".to_string()));
        assert_eq!(err.to_string(), "unknown task");
    }

    #[test]
    fn attribute_not_found_maps_to_fixed_wire_string() {
        let err = ApiError::from(ControlError::AttributeNotFound {
            task: "tasks.ghost".to_string(),
            attr: "retries".to_string(),
        });
        assert_eq!(err.to_string(), "unknown attribute");
    }

    #[test]
    fn aggregate_keeps_only_the_opaque_summary() {
        let err = ApiError::from(ControlError::Aggregate {
            context: "updating task settings",
        });
        let msg = err.to_string();
        assert!(msg.contains("see the worker log"));
        assert!(!msg.contains("tasks."));
    }
}
