use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::models::question::QuestionStatus;

/// Application error type.
///
/// Every variant except `Internal` is an expected, recoverable-by-caller
/// condition and maps to a 4xx status. `Internal` wraps unexpected
/// failures, is logged, and maps to 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or incomplete entity, with field-level detail.
    #[error("validation failed on `{field}`: {message}")]
    Validation { field: &'static str, message: String },

    /// Entity lookup by id failed.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Question paper claim is held by a different maker.
    #[error("question paper {paper} is already claimed by another maker")]
    AlreadyClaimed { paper: Uuid },

    /// State machine precondition failed; nothing was mutated.
    #[error("cannot {action} a question in state {from}")]
    InvalidTransition {
        from: QuestionStatus,
        action: &'static str,
    },

    /// Missing or invalid credentials / token.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated, but the role does not permit the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Concurrent write lost the race, or the operation is no longer
    /// possible in the current state (e.g. exhausted paper).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected failure; never surfaced with internals to the caller.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error with field-level detail.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a not-found error for an entity id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a forbidden error with a reason.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        AppError::Forbidden(reason.into())
    }

    /// Stable machine-readable tag, used in response bodies and in
    /// per-item bulk reports.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation",
            AppError::NotFound { .. } => "not_found",
            AppError::AlreadyClaimed { .. } => "already_claimed",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AlreadyClaimed { .. }
            | AppError::InvalidTransition { .. }
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details are logged, not leaked to the caller.
        let message = match &self {
            AppError::Internal(source) => {
                tracing::error!("internal error: {source:#}");
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "kind": self.kind(),
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;
