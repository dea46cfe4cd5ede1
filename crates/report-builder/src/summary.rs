//! Report Summary

use crate::statistics::SeriesStats;
use crate::ExportError;
use chrono::NaiveDateTime;
use serde::Serialize;
use storage::ObservationRecord;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Metadata and statistics shown at the top of a report
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    /// Location of the first row
    pub latitude: f64,
    pub longitude: f64,
    pub record_count: usize,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
    pub temperature: SeriesStats,
    pub humidity: SeriesStats,
}

impl ReportSummary {
    /// Human-readable covered period
    pub fn date_range(&self) -> String {
        format!(
            "{} to {}",
            self.first.format(DISPLAY_FORMAT),
            self.last.format(DISPLAY_FORMAT)
        )
    }
}

/// A record paired with its parsed timestamp
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimedRecord<'a> {
    pub at: NaiveDateTime,
    pub record: &'a ObservationRecord,
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Records sorted by timestamp; rejects empty input
pub(crate) fn time_ordered(
    records: &[ObservationRecord],
) -> Result<Vec<TimedRecord<'_>>, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut timed = records
        .iter()
        .map(|record| {
            parse_timestamp(&record.timestamp)
                .map(|at| TimedRecord { at, record })
                .ok_or_else(|| {
                    ExportError::render(
                        "report",
                        format!("invalid timestamp '{}'", record.timestamp),
                    )
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    timed.sort_by_key(|t| t.at);
    Ok(timed)
}

/// Compute the summary for a set of records from one location; the first
/// row labels the report
pub fn summarize(records: &[ObservationRecord]) -> Result<ReportSummary, ExportError> {
    let timed = time_ordered(records)?;
    Ok(summarize_ordered(&records[0], &timed))
}

pub(crate) fn summarize_ordered(head: &ObservationRecord, timed: &[TimedRecord<'_>]) -> ReportSummary {
    let temperatures: Vec<f64> = timed.iter().map(|t| t.record.temperature_2m).collect();
    let humidities: Vec<f64> = timed
        .iter()
        .map(|t| t.record.relative_humidity_2m)
        .collect();

    ReportSummary {
        latitude: head.latitude,
        longitude: head.longitude,
        record_count: timed.len(),
        first: timed[0].at,
        last: timed[timed.len() - 1].at,
        temperature: SeriesStats::compute(&temperatures),
        humidity: SeriesStats::compute(&humidities),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(id: i64, timestamp: &str, temperature: f64, humidity: f64) -> ObservationRecord {
        ObservationRecord {
            id,
            timestamp: timestamp.to_string(),
            latitude: 47.37,
            longitude: 8.55,
            temperature_2m: temperature,
            relative_humidity_2m: humidity,
            created_at: "2024-05-03 00:00:00".to_string(),
        }
    }

    pub(crate) fn hourly_records(hours: u32) -> Vec<ObservationRecord> {
        (0..hours)
            .map(|i| {
                record(
                    i64::from(i) + 1,
                    &format!("2024-05-{:02}T{:02}:00", 1 + i / 24, i % 24),
                    8.0 + f64::from(i % 24) * 0.5,
                    90.0 - f64::from(i % 24),
                )
            })
            .collect()
    }

    #[test]
    fn test_summary_statistics() {
        let records = vec![
            record(1, "2024-05-01T00:00", 10.0, 80.0),
            record(2, "2024-05-01T01:00", 14.0, 60.0),
            record(3, "2024-05-01T02:00", 12.0, 70.0),
        ];

        let summary = summarize(&records).unwrap();
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.temperature.min, 10.0);
        assert_eq!(summary.temperature.max, 14.0);
        assert!((summary.temperature.mean - 12.0).abs() < 1e-9);
        assert_eq!(summary.humidity.min, 60.0);
        assert_eq!(summary.humidity.max, 80.0);
        assert_eq!(summary.date_range(), "2024-05-01 00:00 to 2024-05-01 02:00");
        assert_eq!((summary.latitude, summary.longitude), (47.37, 8.55));
    }

    #[test]
    fn test_unordered_input_is_sorted() {
        let records = vec![
            record(1, "2024-05-01T05:00", 10.0, 80.0),
            record(2, "2024-05-01T01:00", 14.0, 60.0),
        ];
        let summary = summarize(&records).unwrap();
        assert_eq!(summary.date_range(), "2024-05-01 01:00 to 2024-05-01 05:00");
    }

    #[test]
    fn test_empty_is_no_data() {
        assert!(matches!(summarize(&[]), Err(ExportError::NoData)));
    }

    #[test]
    fn test_bad_timestamp_is_render_error() {
        let records = vec![record(1, "soon", 10.0, 80.0)];
        assert!(matches!(
            summarize(&records),
            Err(ExportError::Render { .. })
        ));
    }
}
