//! Error types for the weekgrid engine.

use thiserror::Error;

/// Errors that can occur in weekgrid operations.
#[derive(Error, Debug)]
pub enum WeekgridError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for weekgrid operations.
pub type WeekgridResult<T> = Result<T, WeekgridError>;
