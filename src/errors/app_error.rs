//! Application error taxonomy and its HTTP mapping.
//!
//! Every failure in the upload pipeline ends up as one of the [`AppError`]
//! variants. Validation failures are user-correctable and map to `400`;
//! everything else is a downstream failure and maps to `500` with the
//! underlying message surfaced in the `error` field.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::core::staging::StagingError;
use crate::core::tts::TTSError;
use crate::storage::StorageError;

/// Fixed message returned alongside every downstream failure.
pub const REQUEST_FAILED_MESSAGE: &str = "Error processing the request.";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request input.
    #[error("{0}")]
    Validation(String),

    /// Object store upload/delete failure (network, auth, quota, key collision, timeout).
    #[error("{0}")]
    Storage(String),

    /// Speech synthesis or voice cloning failure, including stream errors and timeouts.
    #[error("{0}")]
    Synthesis(String),

    /// Staging directory or staged file failure.
    #[error("{0}")]
    Filesystem(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Synthesis(_) | Self::Filesystem(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for downstream failures.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Validation(_) => None,
            Self::Storage(_) => Some("STORAGE_ERROR"),
            Self::Synthesis(_) => Some("SYNTHESIS_ERROR"),
            Self::Filesystem(_) => Some("FILESYSTEM_ERROR"),
        }
    }
}

/// JSON body for error responses.
///
/// Validation errors only carry `message`; downstream failures also carry the
/// underlying `error` string and a `code`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Validation(message) => Self {
                message: message.clone(),
                error: None,
                code: None,
            },
            other => Self {
                message: REQUEST_FAILED_MESSAGE.to_string(),
                error: Some(other.to_string()),
                code: other.code().map(str::to_string),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Error processing the request: {}", self);
        }
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<TTSError> for AppError {
    fn from(err: TTSError) -> Self {
        Self::Synthesis(err.to_string())
    }
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        Self::Filesystem(err.to_string())
    }
}
