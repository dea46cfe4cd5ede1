//! Export Routes

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
};
use report_builder::{build_excel, build_pdf, ExportError, PDF_CONTENT_TYPE, XLSX_CONTENT_TYPE};
use serde::Deserialize;
use storage::ObservationRecord;
use tracing::info;

use crate::error::ApiError;
use crate::SharedState;

pub const EXCEL_FILENAME: &str = "weather_data.xlsx";
pub const PDF_FILENAME: &str = "weather_report.pdf";

/// Optional location filter; both or neither must be given.
/// Without one the export covers the most recently saved location.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

async fn recent_rows(
    state: &SharedState,
    params: &ExportQuery,
) -> Result<Vec<ObservationRecord>, ApiError> {
    let location = match (params.lat.as_deref(), params.lon.as_deref()) {
        (None, None) => state.repository.latest_location().await?,
        (lat, lon) => {
            let coords = state.validator.parse_coordinates(lat, lon)?;
            Some((coords.latitude, coords.longitude))
        }
    };

    let Some((latitude, longitude)) = location else {
        return Ok(Vec::new());
    };
    let rows = state
        .repository
        .query_recent_at(latitude, longitude, state.export_window_hours)
        .await?;
    Ok(rows)
}

async fn render<F>(rows: Vec<ObservationRecord>, build: F) -> Result<Vec<u8>, ApiError>
where
    F: FnOnce(&[ObservationRecord]) -> Result<Vec<u8>, ExportError> + Send + 'static,
{
    let bytes = tokio::task::spawn_blocking(move || build(&rows))
        .await
        .map_err(|e| ApiError::Internal(format!("export task failed: {}", e)))??;
    Ok(bytes)
}

fn attachment(
    bytes: Vec<u8>,
    content_type: &'static str,
    filename: &'static str,
    kind: &'static str,
) -> Result<Response, ApiError> {
    let size = bytes.len();
    info!("Serving {} export {} ({} bytes)", kind, filename, size);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .header(header::CONTENT_LENGTH, size)
        .header("x-export-status", "success")
        .header("x-export-type", kind)
        .header("x-file-size", size)
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Download the recent window as an Excel workbook
pub async fn export_excel(
    State(state): State<SharedState>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let rows = recent_rows(&state, &params).await?;
    let bytes = render(rows, build_excel).await?;
    attachment(bytes, XLSX_CONTENT_TYPE, EXCEL_FILENAME, "excel")
}

/// Download the recent window as a PDF report with charts
pub async fn export_pdf(
    State(state): State<SharedState>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let rows = recent_rows(&state, &params).await?;
    let window = state.export_window_hours;
    let bytes = render(rows, move |rows| build_pdf(rows, window)).await?;
    attachment(bytes, PDF_CONTENT_TYPE, PDF_FILENAME, "pdf")
}
