//! Storage Layer
//!
//! Single-table SQLite persistence for weather observations, accessed
//! through an explicitly passed [`Repository`] handle.

mod model;
mod repository;

pub use model::{Observation, ObservationRecord};
pub use repository::{Repository, StorageConfig};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    Connection(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid query window: {0} hours")]
    InvalidWindow(u32),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::DatabaseError(err.to_string())
    }
}
