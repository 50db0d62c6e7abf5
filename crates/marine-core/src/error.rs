//! Error types for the marine forecast cache.

use std::time::Duration;
use thiserror::Error;

/// Error raised while wiring sources together at startup.
#[derive(Error, Debug)]
pub enum MarineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Tide computation error: {0}")]
    Compute(#[from] ComputeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Upstream fetch errors. Contained within a single refresh cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("upstream failure: {0}")]
    Failure(String),

    #[error("tide model failure: {0}")]
    Compute(#[from] ComputeError),
}

impl FetchError {
    /// Short machine-friendly kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::Failure(_) => "failure",
            FetchError::Compute(_) => "compute",
        }
    }
}

/// Tide model errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("no usable harmonic constituents")]
    NoConstituents,

    #[error("invalid harmonic constants: {0}")]
    InvalidConstants(String),

    #[error("location ({lat:.4}, {lon:.4}) is outside the model extent: {reason}")]
    Extrapolation { lat: f64, lon: f64, reason: String },

    #[error("tide computation failed: {0}")]
    Internal(String),
}

/// Cache store errors.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("no snapshot has been committed yet")]
    ColdStart,

    #[error("failed to persist cache record to {path}: {reason}")]
    Persistence { path: String, reason: String },

    #[error("cache record serialization failed: {0}")]
    Serialization(String),

    #[error("cache record schema version {found} does not match {expected}")]
    SchemaMismatch { found: u32, expected: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Snapshot validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot has no series")]
    Empty,

    #[error("hourly field {field} has {actual} values, expected {expected}")]
    HourlyLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("daily field {field} has {actual} values, at most {max} allowed")]
    DailyLength {
        field: String,
        max: usize,
        actual: usize,
    },
}

/// Result type alias for startup wiring.
pub type MarineResult<T> = Result<T, MarineError>;
