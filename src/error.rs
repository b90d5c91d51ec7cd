use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::services::controller::ControllerError;
use crate::services::studio::StudioError;

/// Error type for HTTP handlers, rendered as `{"error": {"code", "message"}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Studio(#[from] StudioError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Studio(StudioError::Validation(report)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                report.to_string(),
            ),
            ApiError::Studio(StudioError::Controller(ControllerError::InvalidConfiguration(msg))) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_CONFIGURATION", msg.clone())
            }
            ApiError::Studio(StudioError::Controller(ControllerError::NoActiveJob(id))) => (
                StatusCode::NOT_FOUND,
                "NO_ACTIVE_JOB",
                format!("No job with id {}", id),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        };

        if status.is_client_error() {
            tracing::debug!(code, message = %message, "Request rejected");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
