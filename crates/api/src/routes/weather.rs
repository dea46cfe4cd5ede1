//! Weather Report Route

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::SharedState;

/// Raw query parameters; parsed by the validator so every failure gets a JSON body
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// Response for the weather report endpoint
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub status: &'static str,
    pub message: String,
    pub records_added: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub date_range: String,
}

/// Fetch the trailing window for a coordinate and store it
pub async fn weather_report(
    State(state): State<SharedState>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, ApiError> {
    let coords = state
        .validator
        .parse_coordinates(params.lat.as_deref(), params.lon.as_deref())?;

    let outcome = state
        .weather
        .fetch(coords.latitude, coords.longitude, state.days_back)
        .await?;
    let records_added = state.repository.insert_batch(&outcome.observations).await?;

    info!(
        "Stored {} weather records for lat={} lon={}",
        records_added, coords.latitude, coords.longitude
    );

    Ok(Json(ReportResponse {
        status: "success",
        message: format!("Successfully stored {} weather records", records_added),
        records_added,
        latitude: coords.latitude,
        longitude: coords.longitude,
        date_range: format!("{} days", state.days_back),
    }))
}
