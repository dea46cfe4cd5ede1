//! Line Chart Rendering
//!
//! Charts are drawn into an in-memory RGB buffer so the PDF builder can embed
//! them as images. Only geometry is drawn here; titles and axis values are
//! set as PDF text next to the image.

use crate::statistics::SeriesStats;
use crate::ExportError;
use plotters::prelude::*;

pub const CHART_WIDTH_PX: u32 = 1000;
pub const CHART_HEIGHT_PX: u32 = 400;

const GRID_LINES: usize = 6;
const GRID_COLOR: RGBColor = RGBColor(225, 228, 232);
const AXIS_COLOR: RGBColor = RGBColor(52, 73, 94);

/// Colour and marker settings for one series
#[derive(Debug, Clone, Copy)]
pub struct ChartStyle {
    pub line: RGBColor,
    pub marker_radius: i32,
}

impl ChartStyle {
    /// Red line used for temperature
    pub const TEMPERATURE: ChartStyle = ChartStyle {
        line: RGBColor(231, 76, 60),
        marker_radius: 3,
    };

    /// Blue line used for humidity
    pub const HUMIDITY: ChartStyle = ChartStyle {
        line: RGBColor(52, 152, 219),
        marker_radius: 3,
    };
}

fn chart_err<E: std::fmt::Display>(err: E) -> ExportError {
    ExportError::render("chart", err)
}

/// Render `(hours since start, value)` points as a line chart.
///
/// Returns `width * height * 3` bytes of row-major RGB pixels.
pub fn render_line_chart(
    points: &[(f64, f64)],
    style: ChartStyle,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, ExportError> {
    if points.is_empty() {
        return Err(ExportError::NoData);
    }

    let values: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (y_min, y_max) = SeriesStats::compute(&values).padded_range();
    let x_max = points
        .iter()
        .map(|p| p.0)
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(16)
            .build_cartesian_2d(0.0..x_max, y_min..y_max)
            .map_err(chart_err)?;

        for i in 0..=GRID_LINES {
            let fraction = i as f64 / GRID_LINES as f64;
            let y = y_min + (y_max - y_min) * fraction;
            let x = x_max * fraction;
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0.0, y), (x_max, y)],
                    GRID_COLOR,
                )))
                .map_err(chart_err)?;
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(x, y_min), (x, y_max)],
                    GRID_COLOR,
                )))
                .map_err(chart_err)?;
        }

        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(0.0, y_max), (0.0, y_min), (x_max, y_min)],
                AXIS_COLOR.stroke_width(2),
            )))
            .map_err(chart_err)?;

        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                style.line.stroke_width(2),
            ))
            .map_err(chart_err)?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, style.marker_radius, style.line.filled())),
            )
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_full_buffer_with_series_colour() {
        let points: Vec<(f64, f64)> = (0..48).map(|h| (h as f64, 10.0 + (h % 12) as f64)).collect();
        let buffer = render_line_chart(&points, ChartStyle::TEMPERATURE, 400, 200).unwrap();

        assert_eq!(buffer.len(), 400 * 200 * 3);
        let has_line_pixel = buffer
            .chunks_exact(3)
            .any(|px| px == [231, 76, 60]);
        assert!(has_line_pixel);
    }

    #[test]
    fn test_single_point_renders() {
        let buffer = render_line_chart(&[(0.0, 55.0)], ChartStyle::HUMIDITY, 200, 100).unwrap();
        assert_eq!(buffer.len(), 200 * 100 * 3);
    }

    #[test]
    fn test_no_points() {
        assert!(matches!(
            render_line_chart(&[], ChartStyle::HUMIDITY, 200, 100),
            Err(ExportError::NoData)
        ));
    }
}
