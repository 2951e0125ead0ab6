//! Error types for Ontologica
//!
//! Every failure names the offending quantity so callers can fix the input
//! rather than guess at it.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Ontologica error types
#[derive(Error, Debug)]
pub enum Error {
    /// Vector length does not match the manifold (or its partner vector)
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected number of components
        expected: usize,
        /// Number of components supplied
        actual: usize,
    },

    /// Scalar or structural input outside its domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Metric tensor failed symmetry, invertibility or signature checks
    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    /// ODE integration could not make progress
    #[error("Integration failed: {0}\nTry a looser tolerance or a shorter time span")]
    Integration(String),

    /// Learning trajectory record failed validation
    #[error("Invalid trajectory: {0}")]
    InvalidTrajectory(String),

    /// Double-slit record failed validation
    #[error("Invalid experiment record: {0}")]
    InvalidExperiment(String),

    /// Analysis requested over an empty selection
    #[error("No data available: {0}")]
    NoData(String),

    /// Export format or method name not recognised
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// SIMD compute layer reported a failure
    #[error("Compute error: {0}")]
    Compute(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Tracing subscriber could not be installed
    #[error("Telemetry initialization failed: {0}")]
    TelemetryInit(String),
}
