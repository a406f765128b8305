//! # Forecast Engine
//!
//! Supply and demand forecasting from uploaded tables.
//!
//! ## Features
//!
//! - Loading delimited files and spreadsheets against a [`ColumnSchema`]
//! - Horizon selection proportional to the history length
//! - Seasonal decomposition forecasts with prediction intervals
//! - Gradient-boosted regression on exogenous features with k-fold
//!   cross-validation and early stopping
//! - MAE, RMSE and R² on date-aligned or held-out values
//!
//! ## Quick Start
//!
//! ```no_run
//! use forecast_engine::data::DataLoader;
//! use forecast_engine::horizon::HorizonSelector;
//! use forecast_engine::models::{ModelInput, SeasonalConfig, SeasonalDecomposition};
//! use forecast_engine::pipeline::run_series;
//! use forecast_engine::schema::{ColumnSchema, Target};
//!
//! # fn main() -> forecast_engine::error::Result<()> {
//! let dataset = DataLoader::from_csv("data.csv", &ColumnSchema::extraction())?;
//! let supply = dataset.series(Target::Supply)?;
//!
//! let horizon = HorizonSelector::proportional().select(supply.len())?;
//! let model = SeasonalDecomposition::new(SeasonalConfig::default())?;
//! let result = run_series(&model, Target::Supply, &ModelInput::univariate(&supply), horizon)?;
//!
//! println!("{}", result.metrics);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod evaluate;
pub mod horizon;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod series;
pub mod table;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{DataLoader, Dataset};
pub use crate::error::{ForecastError, Result};
pub use crate::evaluate::{align_on_dates, AlignedPairs, MetricsRecord};
pub use crate::horizon::{Horizon, HorizonSelector};
pub use crate::models::{ForecastModel, ForecastPoint, ForecastResult, ModelFit, ModelInput};
pub use crate::pipeline::{run_series, SeriesForecast};
pub use crate::schema::{ColumnSchema, Target};
pub use crate::series::{FeatureTable, HistoricalSeries};
pub use crate::table::{ForecastRow, ForecastTable};
pub use polars::prelude::DataFrame;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
