//! Excel Export

use crate::summary::time_ordered;
use crate::ExportError;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use storage::ObservationRecord;
use tracing::debug;

/// Worksheet holding the observations
pub const SHEET_NAME: &str = "Weather Data";

/// Fixed column order of the export
pub const COLUMNS: [&str; 5] = [
    "timestamp",
    "latitude",
    "longitude",
    "temperature_2m",
    "relative_humidity_2m",
];

const MAX_COLUMN_WIDTH: usize = 50;

fn xlsx_err(err: XlsxError) -> ExportError {
    ExportError::render("excel workbook", err)
}

/// Serialize records as a single-sheet workbook, header row first
pub fn build_excel(records: &[ObservationRecord]) -> Result<Vec<u8>, ExportError> {
    let timed = time_ordered(records)?;

    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.len()).collect();
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(xlsx_err)?;

    for (col, name) in (0u16..).zip(COLUMNS) {
        sheet
            .write_string_with_format(0, col, name, &header)
            .map_err(xlsx_err)?;
    }

    for (row, timed_record) in (1u32..).zip(&timed) {
        let record = timed_record.record;
        let numbers = [
            record.latitude,
            record.longitude,
            record.temperature_2m,
            record.relative_humidity_2m,
        ];

        sheet
            .write_string(row, 0, record.timestamp.as_str())
            .map_err(xlsx_err)?;
        widths[0] = widths[0].max(record.timestamp.len());

        for (col, value) in (1u16..).zip(numbers) {
            sheet.write_number(row, col, value).map_err(xlsx_err)?;
            let idx = usize::from(col);
            widths[idx] = widths[idx].max(value.to_string().len());
        }
    }

    for (col, width) in (0u16..).zip(&widths) {
        let width = (width + 2).min(MAX_COLUMN_WIDTH);
        sheet
            .set_column_width(col, width as f64)
            .map_err(xlsx_err)?;
    }
    sheet.set_freeze_panes(1, 0).map_err(xlsx_err)?;

    let bytes = workbook.save_to_buffer().map_err(xlsx_err)?;
    debug!(
        "Built Excel export with {} rows ({} bytes)",
        timed.len(),
        bytes.len()
    );
    Ok(bytes)
}
