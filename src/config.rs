//! Application configuration

use crate::error::{Error, Result};
use forecast_engine::horizon::HorizonSelector;
use forecast_engine::models::{BoostingConfig, SeasonalConfig};
use forecast_engine::schema::ColumnSchema;
use forecast_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Settings of both dashboards, read from a TOML file.
///
/// Every section is optional; missing keys take their defaults.
///
/// ```toml
/// [horizon]
/// hard_cap = 365
/// fraction = 0.7
///
/// [boosting]
/// cv_folds = 5
/// loss = "rmse"
///
/// [store]
/// path = "forecast_results.db"
/// commit = "all_or_nothing"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub horizon: HorizonSelector,
    pub seasonal: SeasonalConfig,
    pub boosting: BoostingConfig,
    pub store: StoreConfig,
    /// Columns expected in uploaded files
    pub schema: ColumnSchema,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.horizon.validate().map_err(config_error)?;
        self.seasonal.validate().map_err(config_error)?;
        self.boosting.validate().map_err(config_error)?;
        self.schema.validate().map_err(config_error)?;
        Ok(())
    }
}

fn config_error(err: forecast_engine::ForecastError) -> Error {
    Error::Config(err.to_string())
}
