//! PDF Report
//!
//! A single A4 page: header, location and report metadata, summary
//! statistics, then temperature and humidity charts stacked vertically.

use crate::chart::{render_line_chart, ChartStyle, CHART_HEIGHT_PX, CHART_WIDTH_PX};
use crate::statistics::SeriesStats;
use crate::summary::{summarize_ordered, time_ordered, ReportSummary, TimedRecord};
use crate::ExportError;
use chrono::Utc;
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfLayerReference, Rgb,
};
use storage::ObservationRecord;
use tracing::debug;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const LEFT: f32 = 20.0;
const RIGHT_COLUMN: f32 = 110.0;
const CHART_DPI: f32 = 150.0;
const DATA_SOURCE: &str = "Open-Meteo API";

fn pdf_err<E: std::fmt::Display>(err: E) -> ExportError {
    ExportError::render("pdf report", err)
}

struct Page {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Page {
    fn text(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.regular);
    }

    fn heading(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.bold);
    }

    fn color(&self, r: f32, g: f32, b: f32) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }

    fn chart(&self, pixels: Vec<u8>, bottom: f32) -> Result<(), ExportError> {
        let rgb = RgbImage::from_raw(CHART_WIDTH_PX, CHART_HEIGHT_PX, pixels)
            .ok_or_else(|| pdf_err("chart buffer does not match its dimensions"))?;
        let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(rgb));
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(LEFT)),
                translate_y: Some(Mm(bottom)),
                dpi: Some(CHART_DPI),
                ..Default::default()
            },
        );
        Ok(())
    }
}

/// Height in millimetres a chart occupies on the page
fn chart_height_mm() -> f32 {
    CHART_HEIGHT_PX as f32 / CHART_DPI * 25.4
}

/// Width in millimetres a chart occupies on the page
fn chart_width_mm() -> f32 {
    CHART_WIDTH_PX as f32 / CHART_DPI * 25.4
}

fn series(timed: &[TimedRecord<'_>], value: fn(&ObservationRecord) -> f64) -> Vec<(f64, f64)> {
    let start = timed[0].at;
    timed
        .iter()
        .map(|t| {
            let hours = (t.at - start).num_minutes() as f64 / 60.0;
            (hours, value(t.record))
        })
        .collect()
}

fn stats_row(page: &Page, label: &str, stats: &SeriesStats, y: f32) {
    page.text(label, 10.0, LEFT, y);
    page.text(&format!("{:.1}", stats.min), 10.0, 80.0, y);
    page.text(&format!("{:.1}", stats.max), 10.0, 105.0, y);
    page.text(&format!("{:.1}", stats.mean), 10.0, 130.0, y);
    page.text(&format!("{:.2}", stats.std_dev), 10.0, 155.0, y);
}

fn chart_block(
    page: &Page,
    title: &str,
    points: &[(f64, f64)],
    style: ChartStyle,
    summary: &ReportSummary,
    top: f32,
) -> Result<(), ExportError> {
    let pixels = render_line_chart(points, style, CHART_WIDTH_PX, CHART_HEIGHT_PX)?;
    let (y_min, y_max) = {
        let values: Vec<f64> = points.iter().map(|p| p.1).collect();
        SeriesStats::compute(&values).padded_range()
    };

    page.heading(title, 12.0, LEFT, top);
    page.text(
        &format!("axis {:.1} to {:.1}", y_min, y_max),
        8.0,
        LEFT + chart_width_mm() - 35.0,
        top,
    );

    let bottom = top - 3.0 - chart_height_mm();
    page.chart(pixels, bottom)?;

    page.text(&summary.first.format("%m-%d %H:%M").to_string(), 8.0, LEFT, bottom - 4.0);
    page.text(
        &summary.last.format("%m-%d %H:%M").to_string(),
        8.0,
        LEFT + chart_width_mm() - 18.0,
        bottom - 4.0,
    );
    Ok(())
}

/// Render the one-page report for `records`, labelled with the query window
pub fn build_pdf(records: &[ObservationRecord], window_hours: u32) -> Result<Vec<u8>, ExportError> {
    let timed = time_ordered(records)?;
    let summary = summarize_ordered(&records[0], &timed);

    let (doc, page_index, layer_index) =
        PdfDocument::new("Weather Data Report", PAGE_WIDTH, PAGE_HEIGHT, "Report");
    let page = Page {
        layer: doc.get_page(page_index).get_layer(layer_index),
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?,
    };

    page.color(0.17, 0.24, 0.31);
    page.heading("Weather Data Report", 22.0, LEFT, 279.0);
    page.color(0.5, 0.55, 0.55);
    page.text("Meteorological Analysis and Trends", 11.0, LEFT, 272.0);
    page.color(0.17, 0.24, 0.31);

    page.heading("Location Details", 12.0, LEFT, 260.0);
    page.text(&format!("Latitude: {}", summary.latitude), 10.0, LEFT, 253.0);
    page.text(&format!("Longitude: {}", summary.longitude), 10.0, LEFT, 247.0);
    page.text(
        &format!("Data Points: {} records", summary.record_count),
        10.0,
        LEFT,
        241.0,
    );

    page.heading("Report Information", 12.0, RIGHT_COLUMN, 260.0);
    page.text(
        &format!("Time Period: {} hours", window_hours),
        10.0,
        RIGHT_COLUMN,
        253.0,
    );
    page.text(
        &format!("Date Range: {}", summary.date_range()),
        10.0,
        RIGHT_COLUMN,
        247.0,
    );
    page.text(
        &format!("Data Source: {}", DATA_SOURCE),
        10.0,
        RIGHT_COLUMN,
        241.0,
    );

    page.heading("Summary Statistics", 12.0, LEFT, 229.0);
    page.heading("Metric", 10.0, LEFT, 222.0);
    page.heading("Min", 10.0, 80.0, 222.0);
    page.heading("Max", 10.0, 105.0, 222.0);
    page.heading("Mean", 10.0, 130.0, 222.0);
    page.heading("Std Dev", 10.0, 155.0, 222.0);
    stats_row(&page, "Temperature (C)", &summary.temperature, 216.0);
    stats_row(&page, "Relative Humidity (%)", &summary.humidity, 210.0);

    let temperature = series(&timed, |r| r.temperature_2m);
    let humidity = series(&timed, |r| r.relative_humidity_2m);
    chart_block(
        &page,
        "Temperature Over Time (C)",
        &temperature,
        ChartStyle::TEMPERATURE,
        &summary,
        199.0,
    )?;
    chart_block(
        &page,
        "Humidity Over Time (%)",
        &humidity,
        ChartStyle::HUMIDITY,
        &summary,
        118.0,
    )?;

    page.color(0.42, 0.46, 0.49);
    page.text(
        "Weather Data Service API | Automated Report Generation",
        8.0,
        LEFT,
        24.0,
    );
    page.text("Data provided by Open-Meteo Weather Service", 8.0, LEFT, 19.0);
    page.text(
        &format!("Generated: {}", Utc::now().format("%Y-%m-%d %H:%M UTC")),
        8.0,
        LEFT,
        14.0,
    );

    let bytes = doc.save_to_bytes().map_err(pdf_err)?;
    debug!(
        "Built PDF report for {} records ({} bytes)",
        summary.record_count,
        bytes.len()
    );
    Ok(bytes)
}
