//! Error types for the faultmesh engine

use thiserror::Error;

/// Engine result type
pub type Result<T> = std::result::Result<T, FaultMeshError>;

/// Errors that can occur while loading inputs, initializing the world, or
/// running a migration strategy.
#[derive(Error, Debug)]
pub enum FaultMeshError {
    /// Input file could not be opened
    #[error("input file not found: {0}")]
    FileNotFound(String),

    /// IO error while reading an input file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required numeric token was not a number
    #[error("malformed numeric field on line {line}: {token:?}")]
    NotANumber { line: usize, token: String },

    /// Capacity or size was negative where a non-negative value is required
    #[error("negative value on line {line}: {value}")]
    NegativeValue { line: usize, value: f64 },

    /// JSON serialization of a result record failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No algorithm matched the requested name
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}
