use std::time::Duration;

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use files_listing::ListingError;
use files_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("page_size must be a positive integer, got {0}")]
    InvalidPageSize(i64),

    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    #[error("multipart field `file` is missing")]
    MissingFile,

    #[error("multipart error: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

/// JSON body of every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Listing(ListingError::InvalidPageToken(_)) => StatusCode::BAD_REQUEST,
            Self::Listing(ListingError::BackendUnavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::InvalidKey { .. }) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::InvalidCursor(_)) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidPageSize(_) | Self::InvalidQuery(_) | Self::MissingFile => {
                StatusCode::BAD_REQUEST
            }
            Self::Multipart { status, .. } => *status,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-side failures are not described to the
    /// client; they are logged instead.
    fn detail(&self) -> String {
        match self {
            Self::Store(StoreError::NotFound { .. }) => "File not found".to_string(),
            Self::Store(StoreError::InvalidKey { key, reason }) => {
                format!("invalid file path {key:?}: {reason}")
            }
            Self::Listing(ListingError::InvalidPageToken(_)) | Self::Store(StoreError::InvalidCursor(_)) => {
                "Invalid page token".to_string()
            }
            Self::Timeout(_) => "Request timed out".to_string(),
            _ if self.status_code().is_server_error() => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(ErrorBody { detail: self.detail() })).into_response()
    }
}
