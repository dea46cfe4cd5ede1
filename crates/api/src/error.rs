//! API Error Mapping
//!
//! Component errors are converted here and only here into HTTP statuses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use report_builder::ExportError;
use serde::Serialize;
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};
use weather_fetcher::{FetchError, UpstreamError};

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Upstream(#[from] UpstreamError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Validation(e) => ApiError::Validation(e),
            FetchError::Upstream(e) => ApiError::Upstream(e),
        }
    }
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Export(ExportError::NoData) => StatusCode::NOT_FOUND,
            ApiError::Export(ExportError::Render { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }

        let body = ErrorBody {
            status: "error",
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
