//! Weather Report Service - Main Entry Point

use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_logging(&settings.log);

    info!("=== Weather Report Service v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(settings).await?;

    Ok(())
}
