//! Unified error types and result handling.
//!
//! Every error variant maps to exactly one HTTP status code via the
//! `IntoResponse` impl, so route handlers can bubble errors with `?` and get
//! the right JSON `{error}` body. Database and I/O faults surface a generic
//! message to clients; the full detail is logged server-side only.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Unified application error
#[derive(Debug, Error)]
pub enum Error {
    /// Startup or environment misconfiguration; fatal, never per-request
    #[error("Configuration error: {message}")]
    Config {
        /// What is misconfigured
        message: String,
    },

    /// Persistence fault; not locally recovered
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Missing or malformed required field in a request
    #[error("{message}")]
    Validation {
        /// Client-facing description of the problem
        message: String,
    },

    /// Entity absent or not owned by the caller
    #[error("{entity} not found")]
    NotFound {
        /// Which kind of entity was looked up
        entity: &'static str,
    },

    /// No verified identity on the request
    #[error("{message}")]
    Unauthorized {
        /// Client-facing description
        message: String,
    },

    /// Extraction model call failed or returned an unusable response
    #[error("Failed to parse brain dump: {message}")]
    Extraction {
        /// Underlying failure detail
        message: String,
    },

    /// Reminders integration failed; best-effort, never rolls back card state
    #[error("Reminder sync error: {message}")]
    ReminderSync {
        /// Underlying failure detail
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            Error::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message.clone()),
            Error::NotFound { entity } => (StatusCode::NOT_FOUND, format!("{entity} not found")),
            Error::Extraction { .. } | Error::ReminderSync { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            Error::Database(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            other => {
                tracing::error!(error = %other, "unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
