//! Report Builder
//!
//! Renders a time-ordered set of stored observations as an Excel workbook or
//! a one-page PDF report with summary statistics and line charts. Both paths
//! work entirely in memory and never touch storage.

mod chart;
mod excel;
mod pdf;
mod statistics;
mod summary;

pub use chart::{render_line_chart, ChartStyle, CHART_HEIGHT_PX, CHART_WIDTH_PX};
pub use excel::{build_excel, COLUMNS, SHEET_NAME};
pub use pdf::build_pdf;
pub use statistics::SeriesStats;
pub use summary::{summarize, ReportSummary};

use thiserror::Error;

/// MIME type of [`build_excel`] output
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type of [`build_pdf`] output
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing stored in the requested window
    #[error("No weather data available for export")]
    NoData,

    /// The artifact could not be produced
    #[error("Failed to render {artifact}: {reason}")]
    Render {
        artifact: &'static str,
        reason: String,
    },
}

impl ExportError {
    pub(crate) fn render(artifact: &'static str, reason: impl std::fmt::Display) -> Self {
        ExportError::Render {
            artifact,
            reason: reason.to_string(),
        }
    }
}
