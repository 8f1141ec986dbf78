//! API error types and HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ServerError;
use dagflow_core::WorkflowError;

/// Error payload returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
}

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        match err {
            // A rejected document or compile failure is the client's to fix.
            ServerError::Workflow(WorkflowError::Compile(message)) => ApiError::BadRequest(message),
            ServerError::Workflow(WorkflowError::Yaml(yaml_err)) => {
                ApiError::BadRequest(yaml_err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal"),
        };
        let body = ApiErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
