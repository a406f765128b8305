//! SQLite-backed forecast sink

use crate::error::{Result, StoreError};
use crate::{ForecastSink, StoreReport};
use forecast_engine::table::ForecastTable;
use rusqlite::{params, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CREATE_RESULTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS ForecastResults (
    ForecastDate DATE,
    SupplyForecast FLOAT,
    DemandForecast FLOAT
)";

const INSERT_RESULT: &str =
    "INSERT INTO ForecastResults (ForecastDate, SupplyForecast, DemandForecast) VALUES (?1, ?2, ?3)";

/// What happens to the transaction when a row fails to insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Roll back every row of the call
    #[default]
    AllOrNothing,
    /// Commit the rows that succeeded and report the rest
    BestEffort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub commit: CommitMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("forecast_results.db"),
            commit: CommitMode::AllOrNothing,
        }
    }
}

/// Appends forecast rows to the `ForecastResults` table.
///
/// A connection is opened for each call and closed when the call returns.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    config: StoreConfig,
}

impl SqliteStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn open_path<P: AsRef<Path>>(path: P) -> Self {
        Self::new(StoreConfig {
            path: path.as_ref().to_path_buf(),
            ..StoreConfig::default()
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn connect(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.config.path, flags).map_err(|e| {
            StoreError::Connection(format!("{}: {}", self.config.path.display(), e))
        })?;

        conn.execute_batch(CREATE_RESULTS_TABLE)
            .map_err(|e| StoreError::Schema(e.to_string()))?;

        Ok(conn)
    }
}

impl ForecastSink for SqliteStore {
    fn store(&self, table: &ForecastTable) -> Result<StoreReport> {
        let mut conn = self.connect()?;
        debug!(path = %self.config.path.display(), "connected to forecast store");

        let tx = conn.transaction()?;
        let mut report = StoreReport::default();
        {
            let mut stmt = tx.prepare_cached(INSERT_RESULT)?;

            for (i, row) in table.rows().iter().enumerate() {
                match stmt.execute(params![row.date, row.supply, row.demand]) {
                    Ok(_) => report.inserted += 1,
                    Err(e) => match self.config.commit {
                        CommitMode::AllOrNothing => {
                            return Err(StoreError::Insert {
                                row: i,
                                message: e.to_string(),
                            });
                        }
                        CommitMode::BestEffort => {
                            warn!(row = i, error = %e, "skipping forecast row");
                            report.failed.push(i);
                        }
                    },
                }
            }
        }
        tx.commit()?;

        info!(
            inserted = report.inserted,
            failed = report.failed.len(),
            "forecast rows stored"
        );
        Ok(report)
    }
}
