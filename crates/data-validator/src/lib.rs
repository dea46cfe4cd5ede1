//! Parameter Validation
//!
//! Range checking for geographic coordinates and weather request parameters.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Coordinates, ValidationConfig, Validator};
