//! Range Validator for Coordinates and Request Parameters

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Latitude valid range (decimal degrees)
    pub latitude_range: (f64, f64),
    /// Longitude valid range (decimal degrees)
    pub longitude_range: (f64, f64),
    /// Trailing days the provider can serve
    pub days_back_range: (u32, u32),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            latitude_range: (-90.0, 90.0),
            longitude_range: (-180.0, 180.0),
            // Open-Meteo accepts past_days up to 92
            days_back_range: (1, 92),
        }
    }
}

/// A validated coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Validator for weather request parameters
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against an inclusive range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if !(range.0..=range.1).contains(&value) {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            });
        }
        Ok(())
    }

    /// Validate latitude
    pub fn validate_latitude(&self, latitude: f64) -> Result<(), ValidationError> {
        self.validate_range("latitude", latitude, self.config.latitude_range)
    }

    /// Validate longitude
    pub fn validate_longitude(&self, longitude: f64) -> Result<(), ValidationError> {
        self.validate_range("longitude", longitude, self.config.longitude_range)
    }

    /// Validate a latitude/longitude pair
    pub fn validate_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Coordinates, ValidationError> {
        self.validate_latitude(latitude)?;
        self.validate_longitude(longitude)?;
        Ok(Coordinates {
            latitude,
            longitude,
        })
    }

    /// Validate the trailing-days window requested from the provider
    pub fn validate_days_back(&self, days_back: u32) -> Result<(), ValidationError> {
        let (min, max) = self.config.days_back_range;
        if !(min..=max).contains(&days_back) {
            return Err(ValidationError::OutOfRange {
                field: "days_back",
                value: f64::from(days_back),
                min: f64::from(min),
                max: f64::from(max),
            });
        }
        Ok(())
    }

    /// Parse and validate raw query-string coordinates.
    ///
    /// Both values must be present before either is parsed, so a request
    /// missing `lon` reports the missing field rather than a parse error.
    pub fn parse_coordinates(
        &self,
        latitude: Option<&str>,
        longitude: Option<&str>,
    ) -> Result<Coordinates, ValidationError> {
        let raw_lat = present("lat", latitude)?;
        let raw_lon = present("lon", longitude)?;

        let latitude = parse_number("lat", raw_lat)?;
        let longitude = parse_number("lon", raw_lon)?;
        debug!("Parsed coordinates lat={} lon={}", latitude, longitude);

        self.validate_coordinates(latitude, longitude)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

fn present<'a>(field: &'static str, raw: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    raw.parse::<f64>().map_err(|_| ValidationError::NotANumber {
        field,
        raw: raw.to_string(),
    })
}
