use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use openbooks_core::OpenbooksError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to API clients as `{"detail": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Book not found in cache")]
    BookNotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<OpenbooksError> for ApiError {
    fn from(err: OpenbooksError) -> Self {
        match err {
            OpenbooksError::BookNotFound(_) => Self::BookNotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BookNotFound => StatusCode::NOT_FOUND,
            Self::Internal(message) => {
                error!(%message, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let detail = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
