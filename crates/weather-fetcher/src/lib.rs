//! Weather Fetcher
//!
//! Calls the Open-Meteo forecast API for a coordinate and a trailing window
//! of days, and normalizes the hourly series into [`storage::Observation`]
//! rows.

mod client;
mod error;
mod response;

pub use client::{FetchOutcome, FetcherConfig, WeatherClient};
pub use error::{FetchError, UpstreamError};
pub use response::{ForecastResponse, HourlySeries, MISSING_READING};

/// Hourly variables requested from the provider
pub const HOURLY_VARIABLES: &str = "temperature_2m,relative_humidity_2m";

/// Default Open-Meteo forecast endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
