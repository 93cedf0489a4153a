//! Error handling for Church Admin
//!
//! This module defines the main error type used throughout the application,
//! its HTTP mapping and the unified error response body.

use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// Main error type for the Church Admin application
#[derive(Error, Debug)]
pub enum ChurchAdminError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),

    #[error("Invalid or expired token")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Not Found - {0}")]
    RouteNotFound(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Church Admin operations
pub type Result<T> = std::result::Result<T, ChurchAdminError>;

impl ChurchAdminError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        ChurchAdminError::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ChurchAdminError::Validation(message.into())
    }

    /// HTTP status the error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChurchAdminError::Validation(_) => StatusCode::BAD_REQUEST,
            ChurchAdminError::Authentication(_) | ChurchAdminError::Jwt(_) => StatusCode::UNAUTHORIZED,
            ChurchAdminError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ChurchAdminError::NotFound { .. } | ChurchAdminError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ChurchAdminError::Database(_)
            | ChurchAdminError::Migration(_)
            | ChurchAdminError::Config(_)
            | ChurchAdminError::PasswordHash(_)
            | ChurchAdminError::Csv(_)
            | ChurchAdminError::Serialization(_)
            | ChurchAdminError::Io(_)
            | ChurchAdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ChurchAdminError::Database(_) => ErrorSeverity::Critical,
            ChurchAdminError::Migration(_) => ErrorSeverity::Critical,
            ChurchAdminError::Config(_) => ErrorSeverity::Critical,
            ChurchAdminError::PermissionDenied(_) => ErrorSeverity::Warning,
            ChurchAdminError::Authentication(_) => ErrorSeverity::Warning,
            ChurchAdminError::Jwt(_) => ErrorSeverity::Warning,
            ChurchAdminError::Validation(_) => ErrorSeverity::Info,
            ChurchAdminError::NotFound { .. } => ErrorSeverity::Info,
            ChurchAdminError::RouteNotFound(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

/// Decide once per process whether error bodies carry the debug rendering.
/// Left unset, details are exposed.
pub fn configure_error_details(environment: &str) {
    let _ = EXPOSE_DETAILS.set(!environment.eq_ignore_ascii_case("production"));
}

fn expose_details() -> bool {
    *EXPOSE_DETAILS.get().unwrap_or(&true)
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl IntoResponse for ChurchAdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self.severity() {
            ErrorSeverity::Info => info!(status = status.as_u16(), error = %self, "Request rejected"),
            ErrorSeverity::Warning => warn!(status = status.as_u16(), error = %self, "Request refused"),
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                error!(status = status.as_u16(), severity = %self.severity(), error = ?self, "Request failed")
            }
        }

        let body = ErrorBody {
            message: self.to_string(),
            stack: expose_details().then(|| format!("{:?}", self)),
        };

        (status, Json(body)).into_response()
    }
}
