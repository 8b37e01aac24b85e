//! Error handling
//!
//! Body luôn có dạng `{error, kind, status}`.
//! Input at fault → 422, everything else → 500.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use churn_core::ChurnError;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Request body could not be read as JSON of the right shape
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },

    // Schema validation
    #[error("{0}")]
    ValidationError(String),

    // Pipeline / inference errors
    #[error(transparent)]
    Churn(#[from] ChurnError),

    // Blocking task panicked or was cancelled
    #[error("{0}")]
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidBody { status, .. } => *status,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Churn(e) if e.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Churn(_) | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidBody { .. } => "InvalidBodyError",
            AppError::ValidationError(_) => "ValidationError",
            AppError::Churn(e) => e.kind(),
            AppError::InternalError(_) => "InternalError",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "Request failed: {}", self);
        } else {
            tracing::debug!(kind = self.kind(), "Request rejected: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("inference task failed: {}", err))
    }
}
