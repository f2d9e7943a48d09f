//! Unified error handling for the job board API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Duplicate-key errors raised by the store when a unique index is hit
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: status.as_u16(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error_type, message) = match &self {
            AppError::NotFound(msg) => ("not_found", msg.clone()),
            AppError::BadRequest(msg) => ("bad_request", msg.clone()),
            AppError::Unauthorized(msg) => ("unauthorized", msg.clone()),
            AppError::Forbidden(msg) => ("forbidden", msg.clone()),
            AppError::Conflict(msg) => ("conflict", msg.clone()),
            AppError::Validation(msg) => ("validation", msg.clone()),
            AppError::Database(e) if is_unique_violation(e) => {
                tracing::warn!("Unique constraint violated: {:?}", e);
                ("conflict", "Duplicate value entered".to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("database_error", "A database error occurred".to_string())
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                ("unauthorized", "Authentication invalid".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    "internal_error",
                    "Something went wrong, try again later".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(status, error_type, message))).into_response()
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: invalid value ({})", field, e.code),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join(", "))
    }
}
