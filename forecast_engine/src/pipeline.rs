//! Fit one strategy on one target series and score it

use crate::error::Result;
use crate::evaluate::{align_on_dates, AlignedPairs, MetricsRecord};
use crate::horizon::Horizon;
use crate::models::{ForecastModel, ModelFit, ModelInput};
use crate::schema::Target;
use crate::series::HistoricalSeries;
use tracing::info;

/// Forecast and accuracy of a single target
#[derive(Debug, Clone)]
pub struct SeriesForecast {
    pub target: Target,
    pub history: HistoricalSeries,
    pub fit: ModelFit,
    /// Pairs the metrics were computed on
    pub evaluated: AlignedPairs,
    pub metrics: MetricsRecord,
}

/// Fit `model`, then score it on its hold-out partition when it has one and
/// on the date-aligned history otherwise
pub fn run_series(
    model: &dyn ForecastModel,
    target: Target,
    input: &ModelInput<'_>,
    horizon: Horizon,
) -> Result<SeriesForecast> {
    let fit = model.fit_forecast(input, horizon)?;

    let evaluated = match &fit.holdout {
        Some(holdout) => holdout.pairs.clone(),
        None => align_on_dates(input.series, &fit.forecast),
    };
    let metrics = MetricsRecord::compute(&evaluated)?;

    info!(
        model = model.name(),
        target = %target,
        points = fit.forecast.len(),
        evaluated = evaluated.len(),
        %metrics,
        "forecast evaluated"
    );

    Ok(SeriesForecast {
        target,
        history: input.series.clone(),
        fit,
        evaluated,
        metrics,
    })
}
