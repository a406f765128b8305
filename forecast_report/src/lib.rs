//! # Forecast Report
//!
//! Presentation of forecast runs: the CSV download of a
//! [`ForecastTable`](forecast_engine::table::ForecastTable) and chart
//! descriptions that any plotting front end can draw.

pub mod chart;
pub mod error;
pub mod export;
pub mod render;

pub use crate::chart::{ChartKind, ChartPoint, ChartSeries, ChartSpec};
pub use crate::error::{ReportError, Result};
pub use crate::export::{save_csv, to_csv_string, write_csv, BOOSTED_DOWNLOAD_NAME, SEASONAL_DOWNLOAD_NAME};
pub use crate::render::{ChartRenderer, JsonChartRenderer};
