//! HTTP error type for the dashboard backend

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shelf_client::WorkerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// List worker failed or timed out
    #[error("List processing failed: {0}")]
    Worker(#[from] WorkerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Worker(WorkerError::Timeout) => (StatusCode::SERVICE_UNAVAILABLE, "WORKER_TIMEOUT"),
            ApiError::Worker(WorkerError::Disconnected) => {
                (StatusCode::SERVICE_UNAVAILABLE, "WORKER_UNAVAILABLE")
            }
            ApiError::Worker(WorkerError::Processing(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PROCESSING_ERROR")
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
