//! Error types for the forecast_engine crate

use forecast_math::MathError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the forecasting pipeline.
///
/// Every stage converts the failures of the libraries it calls into one of
/// these variants before returning.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Input file is malformed or misses a required column
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Too little history to forecast at least one period
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The model could not be fitted to the series
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// Metrics could not be computed, e.g. no overlapping dates
    #[error("Metric computation error: {0}")]
    MetricComputation(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        ForecastError::MetricComputation(err.to_string())
    }
}
