use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::database::models::{ShiftEntry, SwapStatus};
use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Another entry already holds this (date, employee) pair. The caller may
    /// retry with replacement or abort.
    #[error(
        "Conflict: {} already has a shift on {}",
        .existing.employee_name,
        .existing.date
    )]
    DuplicateShift { existing: Box<ShiftEntry> },

    #[error("Swap request is already {0}")]
    InvalidTransition(SwapStatus),

}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DuplicateShift { .. } => StatusCode::CONFLICT,
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        if status_code.is_server_error() {
            log::error!("Request failed with status {}: {}", status_code, error_message);
        } else {
            log::debug!("Request rejected with status {}: {}", status_code, error_message);
        }

        match self {
            AppError::DuplicateShift { existing } => HttpResponse::build(status_code)
                .json(ApiResponse::error_with_data(existing.as_ref(), &error_message)),
            _ => HttpResponse::build(status_code).json(ApiResponse::<()>::error(&error_message)),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::DatabaseError(error)
    }
}

impl AppError {
    pub fn duplicate_shift(existing: &ShiftEntry) -> Self {
        AppError::DuplicateShift {
            existing: Box::new(existing.clone()),
        }
    }

    /// Optimistic-concurrency failure on a workspace write.
    pub fn stale_workspace(workspace_id: &str) -> Self {
        AppError::Conflict(format!(
            "Workspace {} was modified by someone else; reload and try again",
            workspace_id
        ))
    }
}
