//! Validation Error Types

use thiserror::Error;

/// Errors during parameter validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value is NaN or infinite
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    /// Value could not be parsed as a number
    #[error("Invalid {field} value '{raw}' - must be a number")]
    NotANumber { field: &'static str, raw: String },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
