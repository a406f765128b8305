//! One dashboard session: load a table, forecast both targets, present and
//! store the results

use crate::config::AppConfig;
use crate::error::Result;
use crate::sample;
use forecast_engine::data::{DataLoader, Dataset};
use forecast_engine::horizon::{Horizon, HorizonSelector};
use forecast_engine::models::{BoostedTrees, ForecastModel, ModelInput, SeasonalDecomposition};
use forecast_engine::pipeline::{run_series, SeriesForecast};
use forecast_engine::schema::{ColumnSchema, Target};
use forecast_engine::table::ForecastTable;
use forecast_engine::{DataFrame, ForecastError};
use forecast_report::chart::{actual_vs_predicted, forecast_bars, training_test_forecast};
use forecast_report::{ChartRenderer, ChartSpec, BOOSTED_DOWNLOAD_NAME, SEASONAL_DOWNLOAD_NAME};
use forecast_store::{ForecastSink, StoreReport};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Rows shown when previewing a dataset
pub const PREVIEW_ROWS: usize = 5;

/// Where the session's table comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Bundled sample table, read with the ledger schema
    Sample,
    /// Uploaded file; `.xlsx`, `.xls` and `.ods` are read as spreadsheets,
    /// anything else as delimited text
    Upload(PathBuf),
    /// Raw contents of an uploaded delimited file
    UploadBytes(Vec<u8>),
}

/// The two dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    /// Seasonal decomposition with a proportional horizon
    Seasonal,
    /// Boosted trees with a user-chosen horizon
    Boosted,
}

impl Dashboard {
    pub fn download_name(self) -> &'static str {
        match self {
            Dashboard::Seasonal => SEASONAL_DOWNLOAD_NAME,
            Dashboard::Boosted => BOOSTED_DOWNLOAD_NAME,
        }
    }
}

/// Loaded data plus the configuration it is forecast with
#[derive(Debug, Clone)]
pub struct Session {
    config: AppConfig,
    dataset: Dataset,
}

impl Session {
    pub fn load(config: AppConfig, source: DataSource) -> Result<Self> {
        config.validate()?;

        let dataset = match &source {
            DataSource::Sample => {
                info!("loading bundled sample data");
                DataLoader::from_csv_bytes(sample::SAMPLE_CSV.as_bytes(), &ColumnSchema::ledger())?
            }
            DataSource::Upload(path) if is_spreadsheet(path) => {
                DataLoader::from_spreadsheet(path, &config.schema)?
            }
            DataSource::Upload(path) => DataLoader::from_csv(path, &config.schema)?,
            DataSource::UploadBytes(bytes) => DataLoader::from_csv_bytes(bytes, &config.schema)?,
        };

        if dataset.dropped_rows() > 0 {
            warn!(rows = dataset.dropped_rows(), "rows without a valid date were removed");
        }

        Ok(Self { config, dataset })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// First rows of the loaded table
    pub fn preview(&self) -> DataFrame {
        self.dataset.preview(PREVIEW_ROWS)
    }

    /// Seasonal dashboard: horizon proportional to the supply history, one
    /// univariate fit per target
    pub fn forecast_seasonal(&self) -> Result<ForecastRun> {
        let supply = self.dataset.series(Target::Supply)?;
        let horizon = self.config.horizon.select(supply.len())?;
        info!(%horizon, "seasonal forecast horizon selected");

        let model = SeasonalDecomposition::new(self.config.seasonal.clone())?;
        let supply_run = run_series(
            &model,
            Target::Supply,
            &ModelInput::univariate(&supply),
            horizon,
        );
        let demand_run = self.dataset.series(Target::Demand).and_then(|demand| {
            run_series(
                &model,
                Target::Demand,
                &ModelInput::univariate(&demand),
                horizon,
            )
        });

        Ok(ForecastRun::new(Dashboard::Seasonal, horizon, supply_run, demand_run))
    }

    /// Boosted dashboard: user-chosen horizon in 1..=36 and fold count in
    /// 2..=10, regression on the schema's feature columns
    pub fn forecast_boosted(&self, periods: usize, cv_folds: usize) -> Result<ForecastRun> {
        let mut config = self.config.boosting.clone();
        config.cv_folds = cv_folds;
        let model = BoostedTrees::new(config)?;

        let horizon = HorizonSelector::user_chosen(periods)?.select(self.dataset.len())?;
        info!(%horizon, cv_folds, "boosted forecast horizon selected");

        let supply_run = self.run_boosted(&model, Target::Supply, horizon);
        let demand_run = self.run_boosted(&model, Target::Demand, horizon);

        Ok(ForecastRun::new(Dashboard::Boosted, horizon, supply_run, demand_run))
    }

    fn run_boosted(
        &self,
        model: &dyn ForecastModel,
        target: Target,
        horizon: Horizon,
    ) -> forecast_engine::Result<SeriesForecast> {
        let (series, features) = self.dataset.supervised(target)?;
        run_series(
            model,
            target,
            &ModelInput::with_features(&series, &features),
            horizon,
        )
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "xlsx" | "xls" | "xlsm" | "ods"))
        .unwrap_or(false)
}

/// Results of one dashboard run.
///
/// Each target keeps its own outcome: a failed fit skips presentation for
/// that target only. The table, CSV, charts and store all read the run
/// without changing it.
#[derive(Debug)]
pub struct ForecastRun {
    pub dashboard: Dashboard,
    pub horizon: Horizon,
    pub supply: forecast_engine::Result<SeriesForecast>,
    pub demand: forecast_engine::Result<SeriesForecast>,
    pub table: ForecastTable,
}

impl ForecastRun {
    fn new(
        dashboard: Dashboard,
        horizon: Horizon,
        supply: forecast_engine::Result<SeriesForecast>,
        demand: forecast_engine::Result<SeriesForecast>,
    ) -> Self {
        for (target, outcome) in [(Target::Supply, &supply), (Target::Demand, &demand)] {
            if let Err(e) = outcome {
                warn!(%target, error = %e, "forecast failed");
            }
        }

        let table = ForecastTable::from_forecasts(
            supply.as_ref().ok().map(|run| &run.fit.forecast),
            demand.as_ref().ok().map(|run| &run.fit.forecast),
        );

        Self {
            dashboard,
            horizon,
            supply,
            demand,
            table,
        }
    }

    pub fn outcome(&self, target: Target) -> std::result::Result<&SeriesForecast, &ForecastError> {
        match target {
            Target::Supply => self.supply.as_ref(),
            Target::Demand => self.demand.as_ref(),
        }
    }

    /// Successful runs, supply first
    pub fn succeeded(&self) -> impl Iterator<Item = &SeriesForecast> {
        Target::ALL
            .into_iter()
            .filter_map(move |target| self.outcome(target).ok())
    }

    /// One accuracy line per target, or the reason it has none
    pub fn metrics_lines(&self) -> Vec<String> {
        Target::ALL
            .into_iter()
            .map(|target| match self.outcome(target) {
                Ok(run) => format!("{} Forecast ({}) - {}", target, run.fit.forecast.model(), run.metrics),
                Err(e) => format!("{} Forecast - {}", target, e),
            })
            .collect()
    }

    pub fn download_name(&self) -> &'static str {
        self.dashboard.download_name()
    }

    pub fn csv(&self) -> Result<String> {
        Ok(forecast_report::to_csv_string(&self.table)?)
    }

    /// Write the CSV download into `dir` under the dashboard's file name
    pub fn save_csv<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(self.download_name());
        forecast_report::save_csv(&self.table, &path)?;
        Ok(path)
    }

    /// Chart descriptions of the successful targets
    pub fn charts(&self) -> Result<Vec<ChartSpec>> {
        let mut charts = Vec::new();
        match self.dashboard {
            Dashboard::Seasonal => {
                for run in self.succeeded() {
                    charts.push(actual_vs_predicted(run, &axis_title(run)));
                }
                for run in self.succeeded() {
                    charts.push(forecast_bars(&self.table, run.target, &axis_title(run)));
                }
            }
            Dashboard::Boosted => {
                for run in self.succeeded() {
                    charts.push(training_test_forecast(run, &axis_title(run))?);
                }
            }
        }
        Ok(charts)
    }

    pub fn render_charts(&self, renderer: &dyn ChartRenderer) -> Result<Vec<PathBuf>> {
        Ok(renderer.render_all(&self.charts()?)?)
    }

    /// Append the table to `sink`
    pub fn store(&self, sink: &dyn ForecastSink) -> Result<StoreReport> {
        Ok(sink.store(&self.table)?)
    }
}

/// Y-axis title such as `Debit EUR (Supply)`
fn axis_title(run: &SeriesForecast) -> String {
    format!("{} ({})", run.history.name(), run.target)
}
