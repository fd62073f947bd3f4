use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

/// AppError
///
/// The single error type flowing out of the repository, identity and storage layers
/// and into handlers. Each variant maps to exactly one HTTP status in `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient role for this resource")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Order limit of {limit} reached")]
    OrderLimitReached { limit: i32 },

    #[error("Ordering window closed at {expired_at}")]
    OrderWindowExpired { expired_at: DateTime<Utc> },

    #[error("Product is out of stock")]
    OutOfStock,

    #[error("Registrations are currently closed")]
    RegistrationsClosed,

    #[error("Ordering is paused for maintenance")]
    Maintenance,

    #[error("Auth provider error: {0}")]
    Identity(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::RegistrationsClosed => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_)
            | AppError::OrderLimitReached { .. }
            | AppError::OrderWindowExpired { .. }
            | AppError::OutOfStock => StatusCode::CONFLICT,
            AppError::Maintenance => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Identity(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the logs.
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
            if matches!(self, AppError::Maintenance | AppError::Identity(_)) {
                self.to_string()
            } else {
                "Internal server error".to_string()
            }
        } else {
            tracing::debug!(error = %self, "request rejected");
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
