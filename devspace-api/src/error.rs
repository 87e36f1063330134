use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Forbidden(String),
    QuotaExceeded(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::QuotaExceeded(msg) => {
                (StatusCode::PAYMENT_REQUIRED, "QUOTA_EXCEEDED", msg)
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}

impl From<devspace_orchestrator::OrchestratorError> for ApiError {
    fn from(err: devspace_orchestrator::OrchestratorError) -> Self {
        use devspace_orchestrator::OrchestratorError;

        match err {
            OrchestratorError::NotFound(msg) => ApiError::NotFound(msg),
            OrchestratorError::Validation(msg) => ApiError::BadRequest(msg),
            OrchestratorError::Forbidden(msg) => ApiError::Forbidden(msg),
            err @ OrchestratorError::InvalidTransition { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            err @ OrchestratorError::QuotaExceeded { .. } => {
                ApiError::QuotaExceeded(err.to_string())
            }
            err @ OrchestratorError::Conflict(_) => ApiError::Conflict(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
