//! Open-Meteo Client
//!
//! One GET per fetch, no retry: a transient provider failure surfaces
//! immediately to the caller as an [`UpstreamError`].

use crate::error::{FetchError, UpstreamError};
use crate::response::{ForecastResponse, ProviderErrorBody};
use crate::{DEFAULT_BASE_URL, HOURLY_VARIABLES};
use data_validator::Validator;
use reqwest::Client;
use std::time::Duration;
use storage::Observation;
use tracing::{debug, info, warn};

/// Default timeout for provider calls
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest provider error body echoed back in an error message
const MAX_REASON_LEN: usize = 200;

/// Fetcher configuration
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Forecast endpoint URL
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Rows produced by one fetch
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Observations in time order
    pub observations: Vec<Observation>,
    /// Hours where the provider had no reading for at least one variable
    pub filled: usize,
}

impl FetchOutcome {
    /// Number of rows, one per provider hour
    pub fn count(&self) -> usize {
        self.observations.len()
    }
}

/// Client for the Open-Meteo forecast API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    config: FetcherConfig,
    validator: Validator,
}

impl WeatherClient {
    /// Create a new client with a fixed request timeout
    pub fn new(config: FetcherConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("weather-service/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(
            "Created weather client for {} (timeout {:?})",
            config.base_url, config.timeout
        );

        Ok(Self {
            http,
            config,
            validator: Validator::default(),
        })
    }

    /// Fetch hourly temperature and humidity for the trailing `days_back` days
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        days_back: u32,
    ) -> Result<FetchOutcome, FetchError> {
        let coords = self.validator.validate_coordinates(latitude, longitude)?;
        self.validator.validate_days_back(days_back)?;

        debug!(
            "Requesting {} days of hourly data for lat={} lon={}",
            days_back, latitude, longitude
        );

        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("past_days", days_back.to_string()),
                ("forecast_days", "0".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(UpstreamError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = error_reason(&body);
            warn!("Weather provider returned {}: {}", status, reason);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                reason,
            }
            .into());
        }

        let body = response.bytes().await.map_err(UpstreamError::from)?;
        let forecast = ForecastResponse::from_slice(&body)?;
        let timezone = forecast
            .timezone
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        let (observations, filled) = forecast.into_observations(coords)?;

        info!(
            "Fetched {} hourly observations for lat={} lon={} (timezone {})",
            observations.len(),
            latitude,
            longitude,
            timezone
        );

        Ok(FetchOutcome {
            observations,
            filled,
        })
    }
}

fn error_reason(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ProviderErrorBody>(body) {
        return parsed.reason;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no response body".to_string();
    }
    trimmed.chars().take(MAX_REASON_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_validator::ValidationError;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forecast_body(hours: usize) -> serde_json::Value {
        let time: Vec<String> = (0..hours)
            .map(|i| format!("2024-05-{:02}T{:02}:00", 1 + i / 24, i % 24))
            .collect();
        let temperature: Vec<f64> = (0..hours).map(|i| 10.0 + i as f64 * 0.25).collect();
        let humidity: Vec<f64> = (0..hours).map(|i| 50.0 + (i % 40) as f64).collect();
        json!({
            "latitude": 47.38,
            "longitude": 8.56,
            "timezone": "Europe/Zurich",
            "hourly_units": {"time": "iso8601"},
            "hourly": {
                "time": time,
                "temperature_2m": temperature,
                "relative_humidity_2m": humidity
            }
        })
    }

    fn client_for(server: &MockServer, timeout: Duration) -> WeatherClient {
        WeatherClient::new(FetcherConfig {
            base_url: format!("{}/v1/forecast", server.uri()),
            timeout,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_maps_every_hour() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "47.37"))
            .and(query_param("longitude", "8.55"))
            .and(query_param("hourly", HOURLY_VARIABLES))
            .and(query_param("past_days", "2"))
            .and(query_param("forecast_days", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(48)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let outcome = client.fetch(47.37, 8.55, 2).await.unwrap();

        assert_eq!(outcome.count(), 48);
        assert_eq!(outcome.filled, 0);
        assert_eq!(outcome.observations[0].timestamp, "2024-05-01T00:00");
        assert_eq!(outcome.observations[47].timestamp, "2024-05-02T23:00");
        assert!(outcome
            .observations
            .iter()
            .all(|o| o.latitude == 47.37 && o.longitude == 8.55));
    }

    #[tokio::test]
    async fn test_invalid_coordinates_skip_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(1)))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        assert!(matches!(
            client.fetch(95.0, 8.55, 2).await,
            Err(FetchError::Validation(ValidationError::OutOfRange { field: "latitude", .. }))
        ));
        assert!(matches!(
            client.fetch(47.37, -190.0, 2).await,
            Err(FetchError::Validation(_))
        ));
        assert!(matches!(
            client.fetch(47.37, 8.55, 0).await,
            Err(FetchError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_provider_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": true, "reason": "Latitude must be in range"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        match client.fetch(47.37, 8.55, 2).await {
            Err(FetchError::Upstream(UpstreamError::Status { status, reason })) => {
                assert_eq!(status, 400);
                assert_eq!(reason, "Latitude must be in range");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_plain_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream maintenance"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.fetch(47.37, 8.55, 2).await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("upstream maintenance"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        assert!(matches!(
            client.fetch(47.37, 8.55, 2).await,
            Err(FetchError::Upstream(UpstreamError::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(forecast_body(48))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(100));
        assert!(matches!(
            client.fetch(47.37, 8.55, 2).await,
            Err(FetchError::Upstream(UpstreamError::Request(_)))
        ));
    }

    #[test]
    fn test_error_reason_truncates() {
        let long = "x".repeat(1000);
        assert_eq!(error_reason(&long).len(), MAX_REASON_LEN);
        assert_eq!(error_reason("  "), "no response body");
    }
}
