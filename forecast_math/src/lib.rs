//! # Forecast Math
//!
//! Error metrics and summary statistics used to evaluate forecasts.
//! Everything here works on plain `f64` slices so the engine can call it
//! with aligned actual/predicted pairs from either forecasting strategy.

use thiserror::Error;

pub mod metrics;
pub mod summary;
pub mod trend;

pub use metrics::{mean_absolute_error, mean_squared_error, r_squared, root_mean_squared_error, RegressionMetrics};
pub use summary::Summary;
pub use trend::LinearTrend;

/// Errors that can occur in metric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Length mismatch: {actual} actual values vs {predicted} predicted values")]
    LengthMismatch { actual: usize, predicted: usize },
}

/// Result type for forecast math operations
pub type Result<T> = std::result::Result<T, MathError>;
