//! Unified Error Handling
//!
//! Application-level error type and response envelope. Every handler returns
//! [`AppResult`]; the [`IntoResponse`] impl maps each variant onto an HTTP
//! status and a stable error code.
//!
//! Code families:
//!
//! | Prefix | Category        | Example                      |
//! |--------|-----------------|------------------------------|
//! | E2xxx  | authorization   | E2001 permission denied      |
//! | E3xxx  | authentication  | E3002 invalid token          |
//! | E4xxx  | order errors    | E4002 invalid transition     |
//! | E6xxx  | catalog errors  | E6001 unknown product        |
//! | E9xxx  | system errors   | E9002 database error         |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::models::OrderStatus;
use tracing::error;

use crate::db::repository::RepoError;
use crate::orders::draft::DraftError;

/// Unified API response structure
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code ("E0000" on success)
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication Errors (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    // ========== Authorization Errors (403) ==========
    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business Logic Errors (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] DraftError),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Invalid request: {0}")]
    Invalid(String),

    // ========== System Errors (5xx) ==========
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Uniform message that avoids email enumeration during login
    pub fn invalid_credentials() -> Self {
        Self::Invalid("Invalid email or password".to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::UnknownProduct(product_id) => {
                AppError::Validation(DraftError::UnknownProduct { product_id })
            }
            RepoError::OutOfStock {
                product_id,
                requested,
                available,
            } => AppError::Validation(DraftError::InsufficientStock {
                product_id,
                requested,
                available,
            }),
            RepoError::InvalidTransition { from, to } => AppError::InvalidTransition { from, to },
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Invalid(e.to_string())
    }
}

const fn validation_code(err: &DraftError) -> &'static str {
    match err {
        DraftError::EmptyOrder => "E4007",
        DraftError::InvalidQuantity { .. } => "E4008",
        DraftError::UnknownProduct { .. } => "E6001",
        DraftError::InsufficientStock { .. } => "E6003",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "E3001", "Please login first".to_string())
            }
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "E3003", "Token expired".to_string())
            }
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "E3002", "Invalid token".to_string())
            }

            // Authorization errors (403)
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.clone()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),

            // Order draft rejections (400), code identifies the subtype
            AppError::Validation(err) => {
                (StatusCode::BAD_REQUEST, validation_code(err), err.to_string())
            }

            // Rejected state transition (409)
            AppError::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, "E4002", self.to_string())
            }

            // Invalid request (400)
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, "E0006", msg.clone()),

            // Storage timeout (503), safe for the caller to retry
            AppError::StorageUnavailable(msg) => {
                error!(target: "database", error = %msg, "Storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "E9004",
                    "Storage unavailable, please retry".to_string(),
                )
            }

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type AppResult<T> = Result<T, AppError>;
