use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{access::LOGIN_PATH, repository::RepoError};

/// ApiError
///
/// The error type every handler returns. Each variant maps to one HTTP status;
/// internal details are logged, never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session, an unreadable session, or a role outside the section's allowed set.
    /// All three produce the same redirect to the login page.
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// The record changed since the caller read it.
    #[error("version conflict: expected {expected}, found {actual}")]
    Conflict { expected: i32, actual: i32 },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// The external identity provider refused or failed the request.
    #[error("identity provider error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => ApiError::NotFound,
            RepoError::VersionConflict { expected, actual } => {
                ApiError::Conflict { expected, actual }
            }
            RepoError::Invalid(msg) => ApiError::Validation(msg),
            RepoError::Database(e) => ApiError::Internal(e.to_string()),
            RepoError::Corrupt(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Unauthorized => {
                return (
                    status,
                    [(header::LOCATION, LOGIN_PATH)],
                    Json(json!({ "error": "unauthorized", "redirect": LOGIN_PATH })),
                )
                    .into_response();
            }
            ApiError::Storage(_) | ApiError::Internal(_) | ApiError::Upstream(_) => {
                tracing::error!(error = %self, "request failed");
            }
            _ => tracing::debug!(error = %self, "request rejected"),
        }

        let message = match &self {
            ApiError::Storage(_) | ApiError::Internal(_) => "internal server error".to_string(),
            ApiError::Upstream(_) => "identity provider unavailable".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
