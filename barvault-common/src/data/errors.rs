// data/errors.rs

use thiserror::Error;

/// Error types for datastore operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No data for key: {0}")]
    NotFound(String),

    #[error("Malformed record for key: {0}")]
    MalformedRecord(String),

    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    #[error("Invalid library name: {0}")]
    InvalidLibrary(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type DataResult<T> = Result<T, DataError>;
