//! Fetcher Error Types

use data_validator::ValidationError;
use thiserror::Error;

/// Failures attributable to the upstream provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network failure, including the client-side timeout
    #[error("Failed to fetch weather data: {0}")]
    Request(String),

    /// Provider answered with a non-success status
    #[error("Weather provider returned HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Body did not match the expected schema
    #[error("Invalid API response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Request(format!("request timed out: {}", err))
        } else {
            UpstreamError::Request(err.to_string())
        }
    }
}

/// Errors returned by [`crate::WeatherClient::fetch`]
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
