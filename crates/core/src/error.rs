//! Error types for Ridgeline

use thiserror::Error;

/// Main error type for Ridgeline operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Missing parameter: base level control '{policy}' requires {name}")]
    MissingParameter {
        policy: &'static str,
        name: &'static str,
    },

    #[error("Stream network is empty: {0}")]
    EmptyNetwork(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error comes from configuration, i.e. it was raised
    /// before any raster was touched.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingParameter { .. } | Error::InvalidParameter { .. })
    }
}

/// Result type alias for Ridgeline operations
pub type Result<T> = std::result::Result<T, Error>;
