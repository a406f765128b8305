//! # Supply and Demand
//!
//! Sessions for the two forecasting dashboards.
//!
//! A [`Session`] holds one loaded table. [`Session::forecast_seasonal`]
//! projects each target with a seasonal decomposition over a horizon
//! proportional to the history; [`Session::forecast_boosted`] regresses each
//! target on the vendor features over a user-chosen horizon. Both return a
//! [`ForecastRun`] that exports CSV, describes charts and stores its table.
//!
//! ```no_run
//! use supply_demand::{init_tracing, AppConfig, DataSource, Session};
//! use forecast_store::SqliteStore;
//!
//! # fn main() -> supply_demand::Result<()> {
//! init_tracing();
//! let session = Session::load(AppConfig::default(), DataSource::Sample)?;
//!
//! let run = session.forecast_seasonal()?;
//! for line in run.metrics_lines() {
//!     println!("{}", line);
//! }
//! run.store(&SqliteStore::open_path("forecast_results.db"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod sample;
pub mod session;

pub use crate::config::AppConfig;
pub use crate::error::{Error, Result};
pub use crate::logging::init_tracing;
pub use crate::session::{Dashboard, DataSource, ForecastRun, Session};
