//! Dashboard error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::index::IndexError;

/// Errors that can occur while starting or running the dashboard.
#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    /// Failed to bind to address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Server error.
    #[error("Server error: {0}")]
    ServerError(String),
}

/// A request failure rendered as a plain-text response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The `file` query parameter was absent or empty.
    #[must_use]
    pub fn missing_file() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "File path is required")
    }

    /// Reading an already validated file failed.
    #[must_use]
    pub fn read_failed() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Error reading log file")
    }
}

impl From<IndexError> for ApiError {
    fn from(error: IndexError) -> Self {
        match error {
            IndexError::NotIndexed(_) => Self::new(StatusCode::NOT_FOUND, "File not found"),
            IndexError::OutOfScope(_) => {
                Self::new(StatusCode::FORBIDDEN, "Access denied - not a log file")
            }
            IndexError::NotAFile(_) => Self::new(StatusCode::BAD_REQUEST, "Not a file"),
            IndexError::Io { path, source } => {
                tracing::warn!(path = %path.display(), error = %source, "Failed to resolve file");
                Self::read_failed()
            }
            IndexError::InvalidPattern(e) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
