//! Open-Meteo Response Schema

use crate::error::UpstreamError;
use chrono::NaiveDateTime;
use data_validator::Coordinates;
use serde::Deserialize;
use storage::Observation;
use tracing::warn;

/// Top-level forecast response
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    /// Zone the provider resolved `timezone=auto` to
    pub timezone: Option<String>,
    pub hourly: Option<HourlySeries>,
}

/// Reading stored for an hour the provider reports as `null`
pub const MISSING_READING: f64 = 0.0;

/// Parallel hourly arrays; the provider reports gaps as `null`
#[derive(Debug, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
}

/// Error body Open-Meteo returns with 4xx statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ProviderErrorBody {
    pub reason: String,
}

impl ForecastResponse {
    /// Decode a response body
    pub fn from_slice(body: &[u8]) -> Result<Self, UpstreamError> {
        serde_json::from_slice(body).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }

    /// Map the hourly series into rows stamped with the requested coordinates.
    ///
    /// Every provider hour becomes one row, in provider order. A `null`
    /// reading is stored as [`MISSING_READING`]; the second value counts the
    /// hours where that happened.
    pub fn into_observations(
        self,
        coords: Coordinates,
    ) -> Result<(Vec<Observation>, usize), UpstreamError> {
        let hourly = self
            .hourly
            .ok_or_else(|| UpstreamError::Malformed("missing hourly data".to_string()))?;

        let expected = hourly.time.len();
        if expected == 0 {
            return Err(UpstreamError::Malformed(
                "hourly series contains no entries".to_string(),
            ));
        }
        if hourly.temperature_2m.len() != expected || hourly.relative_humidity_2m.len() != expected
        {
            return Err(UpstreamError::Malformed(format!(
                "hourly arrays differ in length (time={}, temperature_2m={}, relative_humidity_2m={})",
                expected,
                hourly.temperature_2m.len(),
                hourly.relative_humidity_2m.len()
            )));
        }

        let mut rows = Vec::with_capacity(expected);
        let mut filled = 0;

        let readings = hourly
            .temperature_2m
            .into_iter()
            .zip(hourly.relative_humidity_2m);
        for (time, (temperature, humidity)) in hourly.time.into_iter().zip(readings) {
            check_timestamp(&time)?;

            if temperature.is_none() || humidity.is_none() {
                filled += 1;
            }
            let temperature = temperature.unwrap_or(MISSING_READING);
            let humidity = humidity.unwrap_or(MISSING_READING);

            let row = Observation::new(
                time,
                coords.latitude,
                coords.longitude,
                temperature,
                humidity,
            )
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;
            rows.push(row);
        }

        if filled > 0 {
            warn!(
                "{} hourly entries had missing readings, stored as {}",
                filled, MISSING_READING
            );
        }

        Ok((rows, filled))
    }
}

fn check_timestamp(raw: &str) -> Result<(), UpstreamError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map(|_| ())
        .map_err(|_| UpstreamError::Malformed(format!("unparseable timestamp '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZURICH: Coordinates = Coordinates {
        latitude: 47.37,
        longitude: 8.55,
    };

    #[test]
    fn test_maps_hourly_entries() {
        let body = r#"{
            "latitude": 47.38, "longitude": 8.56, "timezone": "Europe/Zurich",
            "hourly_units": {"time": "iso8601", "temperature_2m": "°C"},
            "hourly": {
                "time": ["2024-05-01T00:00", "2024-05-01T01:00"],
                "temperature_2m": [11.2, 10.8],
                "relative_humidity_2m": [80, 83]
            }
        }"#;

        let response = ForecastResponse::from_slice(body.as_bytes()).unwrap();
        assert_eq!(response.timezone.as_deref(), Some("Europe/Zurich"));
        let (rows, filled) = response.into_observations(ZURICH).unwrap();

        assert_eq!(filled, 0);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].timestamp, "2024-05-01T01:00");
        assert_eq!(rows[1].temperature_2m, 10.8);
        assert_eq!(rows[1].relative_humidity_2m, 83.0);
        // Requested coordinates win over the provider's snapped grid cell
        assert_eq!(rows[0].latitude, 47.37);
        assert_eq!(rows[0].longitude, 8.55);
    }

    #[test]
    fn test_null_readings_keep_their_hour() {
        let body = br#"{"hourly": {
            "time": ["2024-05-01T00:00", "2024-05-01T01:00", "2024-05-01T02:00"],
            "temperature_2m": [11.2, null, 10.1],
            "relative_humidity_2m": [80, 81, null]
        }}"#;

        let (rows, filled) = ForecastResponse::from_slice(body)
            .unwrap()
            .into_observations(ZURICH)
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(filled, 2);
        assert_eq!(rows[1].timestamp, "2024-05-01T01:00");
        assert_eq!(rows[1].temperature_2m, MISSING_READING);
        assert_eq!(rows[1].relative_humidity_2m, 81.0);
        assert_eq!(rows[2].temperature_2m, 10.1);
        assert_eq!(rows[2].relative_humidity_2m, MISSING_READING);
    }

    #[test]
    fn test_missing_hourly_block() {
        let body = br#"{"latitude": 47.38, "longitude": 8.56}"#;
        let err = ForecastResponse::from_slice(body)
            .unwrap()
            .into_observations(ZURICH)
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[test]
    fn test_missing_variable_is_malformed() {
        let body = br#"{"hourly": {"time": ["2024-05-01T00:00"], "temperature_2m": [1.0]}}"#;
        assert!(matches!(
            ForecastResponse::from_slice(body),
            Err(UpstreamError::Malformed(_))
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let body = br#"{"hourly": {
            "time": ["2024-05-01T00:00", "2024-05-01T01:00"],
            "temperature_2m": [11.2],
            "relative_humidity_2m": [80, 81]
        }}"#;
        let err = ForecastResponse::from_slice(body)
            .unwrap()
            .into_observations(ZURICH)
            .unwrap_err();
        assert!(err.to_string().contains("differ in length"));
    }

    #[test]
    fn test_empty_series() {
        let body = br#"{"hourly": {"time": [], "temperature_2m": [], "relative_humidity_2m": []}}"#;
        assert!(ForecastResponse::from_slice(body)
            .unwrap()
            .into_observations(ZURICH)
            .is_err());
    }

    #[test]
    fn test_bad_timestamp() {
        let body = br#"{"hourly": {
            "time": ["yesterday"],
            "temperature_2m": [11.2],
            "relative_humidity_2m": [80]
        }}"#;
        let err = ForecastResponse::from_slice(body)
            .unwrap()
            .into_observations(ZURICH)
            .unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }
}
