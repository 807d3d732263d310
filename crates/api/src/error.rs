use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use workcell_core::SchedulerError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("resource not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type) = match &self {
            ApiError::Scheduler(SchedulerError::DuplicateBlockName(name)) => (
                StatusCode::BAD_REQUEST,
                format!("block name '{name}' already queued"),
                "DUPLICATE_BLOCK_NAME",
            ),
            ApiError::Scheduler(SchedulerError::InvalidInstruction(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("invalid instruction: {msg}"),
                "INVALID_INSTRUCTION",
            ),
            ApiError::Scheduler(SchedulerError::RegistryUnavailable(msg)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("registry unavailable: {msg}"),
                "REGISTRY_UNAVAILABLE",
            ),
            ApiError::Scheduler(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                "INTERNAL_ERROR",
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "resource not found".to_string(),
                "NOT_FOUND",
            ),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), "BAD_REQUEST")
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "INTERNAL_ERROR",
            ),
        };

        let body = Json(json!({
            "status": "ERROR",
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
