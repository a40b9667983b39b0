//! Error types for the Book Library client

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network failure: {0}")]
    Network(String),

    /// `status` is `None` when the request was refused before being sent
    #[error("Unauthorized: {message}")]
    Unauthorized { status: Option<u16>, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error ({status}): {message}")]
    Validation { status: u16, message: String },

    #[error("Unexpected response ({status}): {message}")]
    Unknown { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Error body sent by the catalog API on failure
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AppError {
    /// Map a non-success HTTP status and its raw body into the failure taxonomy.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized {
                status: Some(status.as_u16()),
                message,
            },
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::Validation {
                    status: status.as_u16(),
                    message,
                }
            }
            _ => AppError::Unknown {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Ordinary failures a page reports to the user. Everything else is a hard failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Network(_)
                | AppError::Unauthorized { .. }
                | AppError::NotFound(_)
                | AppError::Validation { .. }
                | AppError::Unknown { .. }
        )
    }

    /// HTTP status carried by the failure, when there is one
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Unauthorized { status, .. } => *status,
            AppError::NotFound(_) => Some(404),
            AppError::Validation { status, .. } | AppError::Unknown { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn server_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty()),
        // Plain text bodies are passed through as-is
        Err(_) if !body.starts_with('{') => Some(body.to_string()),
        Err(_) => None,
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
