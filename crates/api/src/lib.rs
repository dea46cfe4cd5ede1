//! Weather Report API Server
//!
//! HTTP surface for fetching hourly weather into storage and exporting the
//! most recent window as Excel or PDF.

use axum::{extract::State, routing::get, Json, Router};
use data_validator::Validator;
use serde::Serialize;
use std::sync::Arc;
use storage::Repository;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use weather_fetcher::WeatherClient;

mod config;
mod error;
mod routes;

pub use config::{LogSettings, Settings, SettingsError};
pub use error::{ApiError, ErrorBody};

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "weather-api";

/// Application state shared across handlers.
///
/// Immutable after startup; all mutable state lives in the database.
pub struct AppState {
    /// Storage repository (pool handle)
    pub repository: Repository,
    /// Upstream weather client
    pub weather: WeatherClient,
    /// Query parameter validator
    pub validator: Validator,
    /// Trailing days fetched per report
    pub days_back: u32,
    /// Trailing hours exported
    pub export_window_hours: u32,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(repository: Repository, weather: WeatherClient, settings: &Settings) -> Self {
        Self {
            repository,
            weather,
            validator: Validator::default(),
            days_back: settings.upstream.days_back,
            export_window_hours: settings.export.window_hours,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Handle passed to every handler
pub type SharedState = Arc<AppState>;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
}

/// Service information
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub version: String,
    pub uptime_seconds: u64,
    pub stored_records: u64,
    pub latest_location: Option<Location>,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub health_check: &'static str,
    pub weather_report: &'static str,
    pub export_excel: &'static str,
    pub export_pdf: &'static str,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/weather-report", get(routes::weather::weather_report))
        .route("/export/excel", get(routes::export::export_excel))
        .route("/export/pdf", get(routes::export::export_pdf))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler; no dependency checks
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME,
        status: "healthy",
    })
}

async fn index_handler(State(state): State<SharedState>) -> Result<Json<InfoResponse>, ApiError> {
    let stored_records = state.repository.count().await?;
    let latest_location = state
        .repository
        .latest_location()
        .await?
        .map(|(latitude, longitude)| Location {
            latitude,
            longitude,
        });

    Ok(Json(InfoResponse {
        message: "Weather API backend server is running",
        status: "operational",
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        stored_records,
        latest_location,
        endpoints: Endpoints {
            health_check: "/health",
            weather_report: "/weather-report?lat=LAT&lon=LON",
            export_excel: "/export/excel (downloads Excel file)",
            export_pdf: "/export/pdf (downloads PDF file)",
        },
    }))
}

/// Initialize logging; a second call leaves the first subscriber in place
pub fn init_logging(settings: &LogSettings) {
    let level = settings.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let installed = if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if installed.is_err() {
        debug!("Tracing subscriber already installed");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the server
pub async fn run_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let repository = Repository::connect_with_retry(&settings.storage_config()).await?;
    repository.ping().await?;
    info!("Database ready at {}", settings.database.url);
    let weather = WeatherClient::new(settings.fetcher_config())?;

    let state = Arc::new(AppState::new(repository, weather, &settings));
    let app = create_router(state);

    info!("Starting API server on {}", settings.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}
