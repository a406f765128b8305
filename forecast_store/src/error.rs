//! Error types for the forecast_store crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// The results table could not be created
    #[error("Schema error: {0}")]
    Schema(String),

    /// A row could not be written; nothing was committed
    #[error("Insert error on row {row}: {message}")]
    Insert { row: usize, message: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
