//! # Forecast Store
//!
//! Append-only persistence of forecast tables. The store is write-only from
//! the pipeline's point of view: rows are never read back.

pub mod error;
pub mod sqlite;

use forecast_engine::table::ForecastTable;

pub use crate::error::{Result, StoreError};
pub use crate::sqlite::{CommitMode, SqliteStore, StoreConfig};

/// Outcome of one store call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreReport {
    pub inserted: usize,
    /// Indices of table rows that failed under [`CommitMode::BestEffort`]
    pub failed: Vec<usize>,
}

impl StoreReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Destination for forecast tables
pub trait ForecastSink {
    /// Append every row of `table`
    fn store(&self, table: &ForecastTable) -> Result<StoreReport>;
}
