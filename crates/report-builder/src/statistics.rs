//! Summary Statistics for a Series of Readings

use serde::Serialize;

/// Descriptive statistics for one variable
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeriesStats {
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl SeriesStats {
    /// Compute statistics from a slice of values; all zero when empty
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        let max = values.iter().copied().fold(f64::MIN, f64::max);

        let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std_dev = (m2 / n).sqrt();

        Self {
            min,
            max,
            mean,
            std_dev,
        }
    }

    /// Value span, padded so flat series still get a visible axis
    pub fn padded_range(&self) -> (f64, f64) {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            (self.min - 1.0, self.max + 1.0)
        } else {
            let pad = span * 0.05;
            (self.min - pad, self.max + pad)
        }
    }
}
