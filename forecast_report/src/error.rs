//! Error types for the forecast_report crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A chart could not be built or rendered
    #[error("Chart error: {0}")]
    Chart(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
