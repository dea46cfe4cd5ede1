//! Observation Records

use data_validator::{ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// One hourly temperature + humidity reading at a coordinate, ready for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// ISO-8601 timestamp as reported by the provider
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Air temperature at 2 m (°C)
    pub temperature_2m: f64,
    /// Relative humidity at 2 m (%)
    pub relative_humidity_2m: f64,
}

impl Observation {
    /// Build an observation, rejecting out-of-range coordinates and non-finite readings
    pub fn new(
        timestamp: impl Into<String>,
        latitude: f64,
        longitude: f64,
        temperature_2m: f64,
        relative_humidity_2m: f64,
    ) -> Result<Self, ValidationError> {
        Validator::default().validate_coordinates(latitude, longitude)?;
        if !temperature_2m.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "temperature_2m",
            });
        }
        if !relative_humidity_2m.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "relative_humidity_2m",
            });
        }

        Ok(Self {
            timestamp: timestamp.into(),
            latitude,
            longitude,
            temperature_2m,
            relative_humidity_2m,
        })
    }
}

/// A stored observation row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ObservationRecord {
    pub id: i64,
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    /// Insertion time assigned by the database
    pub created_at: String,
}

impl ObservationRecord {
    /// Strip the storage-assigned fields
    pub fn observation(&self) -> Observation {
        Observation {
            timestamp: self.timestamp.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            temperature_2m: self.temperature_2m,
            relative_humidity_2m: self.relative_humidity_2m,
        }
    }
}
