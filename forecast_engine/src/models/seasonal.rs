//! Seasonal decomposition forecasting over an exponential smoothing trend

use crate::error::{ForecastError, Result};
use crate::horizon::Horizon;
use crate::models::{ForecastModel, ForecastPoint, ForecastResult, ModelFit, ModelInput};
use crate::utils::future_dates;
use augurs::ets::AutoETS;
use augurs::mstl::MSTLModel;
use augurs::{Fit, Forecast, Predict};
use forecast_math::LinearTrend;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Observations per weekly cycle of daily data
pub const WEEKLY_PERIOD: usize = 7;
/// Observations per yearly cycle of daily data
pub const YEARLY_PERIOD: usize = 365;
/// Shortest history AutoETS accepts; shorter ones get a linear trend
pub const MIN_ETS_OBSERVATIONS: usize = 7;

/// How the seasonal component combines with the trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    Additive,
    /// Fitted on the log scale; requires strictly positive values
    Multiplicative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalConfig {
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    pub seasonality_mode: SeasonalityMode,
    /// Coverage of the prediction interval
    pub interval_width: f64,
}

impl Default for SeasonalConfig {
    fn default() -> Self {
        Self {
            yearly_seasonality: true,
            weekly_seasonality: true,
            seasonality_mode: SeasonalityMode::Multiplicative,
            interval_width: 0.8,
        }
    }
}

impl SeasonalConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Interval width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        Ok(())
    }

    /// Seasonal periods enabled by the configuration, before checking the
    /// history length
    fn requested_periods(&self) -> Vec<usize> {
        let mut periods = Vec::new();
        if self.weekly_seasonality {
            periods.push(WEEKLY_PERIOD);
        }
        if self.yearly_seasonality {
            periods.push(YEARLY_PERIOD);
        }
        periods
    }
}

/// Trend plus seasonal components, fitted with MSTL when the history covers
/// at least two cycles of a period and with AutoETS alone otherwise.
/// Histories shorter than [`MIN_ETS_OBSERVATIONS`] get a linear trend.
#[derive(Debug, Clone)]
pub struct SeasonalDecomposition {
    name: String,
    config: SeasonalConfig,
}

impl SeasonalDecomposition {
    pub fn new(config: SeasonalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: "Seasonal Decomposition".to_string(),
            config,
        })
    }

    pub fn config(&self) -> &SeasonalConfig {
        &self.config
    }

    /// Periods the history is long enough to estimate
    pub fn usable_periods(&self, history_len: usize) -> Vec<usize> {
        self.config
            .requested_periods()
            .into_iter()
            .filter(|&period| {
                let usable = history_len >= 2 * period;
                if !usable {
                    debug!(period, history_len, "skipping seasonal period longer than half the history");
                }
                usable
            })
            .collect()
    }

    /// Transform the observations onto the scale the model is fitted on
    fn to_model_scale(&self, values: &[f64]) -> Result<Vec<f64>> {
        match self.config.seasonality_mode {
            SeasonalityMode::Additive => Ok(values.to_vec()),
            SeasonalityMode::Multiplicative => {
                if values.iter().any(|v| *v <= 0.0) {
                    return Err(ForecastError::ModelFit(
                        "Multiplicative seasonality requires strictly positive values".to_string(),
                    ));
                }
                Ok(values.iter().map(|v| v.ln()).collect())
            }
        }
    }

    fn from_model_scale(&self, value: f64) -> f64 {
        match self.config.seasonality_mode {
            SeasonalityMode::Additive => value,
            SeasonalityMode::Multiplicative => value.exp(),
        }
    }

    /// Fit and return the in-sample and out-of-sample projections
    fn fit_predict(&self, y: &[f64], horizon: Horizon) -> Result<(Projection, Projection)> {
        let level = Some(self.config.interval_width);
        let periods = self.usable_periods(y.len());

        if !periods.is_empty() {
            debug!(?periods, "fitting MSTL");
            let trend = AutoETS::non_seasonal().into_trend_model();
            let fitted = MSTLModel::new(periods, trend).fit(y).map_err(fit_error)?;
            let in_sample = fitted.predict_in_sample(level).map_err(fit_error)?;
            let future = fitted.predict(horizon.periods(), level).map_err(fit_error)?;
            Ok((in_sample.into(), future.into()))
        } else if y.len() >= MIN_ETS_OBSERVATIONS {
            debug!("no usable seasonal period, fitting trend only");
            let fitted = AutoETS::non_seasonal().fit(y).map_err(fit_error)?;
            let in_sample = fitted.predict_in_sample(level).map_err(fit_error)?;
            let future = fitted.predict(horizon.periods(), level).map_err(fit_error)?;
            Ok((in_sample.into(), future.into()))
        } else {
            debug!(observations = y.len(), "history too short for ETS, fitting a linear trend");
            let trend = LinearTrend::fit(y).map_err(fit_error)?;
            let half_width = trend
                .interval_half_width(self.config.interval_width)
                .map_err(fit_error)?;
            Ok((
                Projection::around(trend.fitted(), half_width),
                Projection::around(trend.project(horizon.periods()), half_width),
            ))
        }
    }

    /// Turn a model-scale projection into points, checking length and
    /// finiteness
    fn to_points(
        &self,
        projection: Projection,
        dates: &[chrono::NaiveDate],
    ) -> Result<Vec<ForecastPoint>> {
        if projection.point.len() != dates.len() {
            return Err(ForecastError::ModelFit(format!(
                "Model returned {} values for {} dates",
                projection.point.len(),
                dates.len()
            )));
        }

        let bounds = projection
            .bounds
            .filter(|(lower, upper)| lower.len() == dates.len() && upper.len() == dates.len());

        let points = dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let value = self.from_model_scale(projection.point[i]);
                let point = match &bounds {
                    Some((lower, upper)) => ForecastPoint::with_interval(
                        *date,
                        value,
                        self.from_model_scale(lower[i]),
                        self.from_model_scale(upper[i]),
                    ),
                    None => ForecastPoint::new(*date, value),
                };
                if point.value.is_finite() {
                    Ok(point)
                } else {
                    Err(ForecastError::ModelFit(format!(
                        "Non-finite prediction at {}",
                        date
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(points)
    }
}

/// Point predictions with optional lower and upper bounds, on the model scale
#[derive(Debug, Clone)]
struct Projection {
    point: Vec<f64>,
    bounds: Option<(Vec<f64>, Vec<f64>)>,
}

impl Projection {
    fn around(point: Vec<f64>, half_width: f64) -> Self {
        let lower = point.iter().map(|v| v - half_width).collect();
        let upper = point.iter().map(|v| v + half_width).collect();
        Self {
            point,
            bounds: Some((lower, upper)),
        }
    }
}

impl From<Forecast> for Projection {
    fn from(forecast: Forecast) -> Self {
        Self {
            point: forecast.point,
            bounds: forecast.intervals.map(|i| (i.lower, i.upper)),
        }
    }
}

fn fit_error<E: std::fmt::Display>(err: E) -> ForecastError {
    ForecastError::ModelFit(err.to_string())
}

impl ForecastModel for SeasonalDecomposition {
    fn name(&self) -> &str {
        &self.name
    }

    fn fit_forecast(&self, input: &ModelInput<'_>, horizon: Horizon) -> Result<ModelFit> {
        let series = input.series;
        if series.len() < 2 {
            return Err(ForecastError::ModelFit(format!(
                "Series '{}' needs at least 2 observations, got {}",
                series.name(),
                series.len()
            )));
        }
        if series.is_constant() {
            return Err(ForecastError::ModelFit(format!(
                "Series '{}' is constant",
                series.name()
            )));
        }
        let last = series.latest_date().ok_or_else(|| {
            ForecastError::ModelFit(format!("Series '{}' is empty", series.name()))
        })?;

        info!(
            series = %series.name(),
            observations = series.len(),
            horizon = horizon.periods(),
            mode = ?self.config.seasonality_mode,
            "fitting seasonal decomposition"
        );

        let y = self.to_model_scale(series.values())?;
        let (in_sample, future) = self.fit_predict(&y, horizon)?;

        let mut points = self.to_points(in_sample, series.dates())?;
        points.extend(self.to_points(future, &future_dates(last, horizon))?);

        let forecast = ForecastResult::new(self.name.clone(), points, series.len(), horizon)?;
        Ok(ModelFit::from_forecast(forecast))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_periods() {
        let model = SeasonalDecomposition::new(SeasonalConfig::default()).unwrap();
        assert!(model.usable_periods(8).is_empty());
        assert_eq!(model.usable_periods(14), vec![WEEKLY_PERIOD]);
        assert_eq!(model.usable_periods(730), vec![WEEKLY_PERIOD, YEARLY_PERIOD]);
    }

    #[test]
    fn test_multiplicative_rejects_non_positive() {
        let model = SeasonalDecomposition::new(SeasonalConfig::default()).unwrap();
        assert!(matches!(
            model.to_model_scale(&[1.0, 0.0, 2.0]),
            Err(ForecastError::ModelFit(_))
        ));
    }

    #[test]
    fn test_invalid_interval_width() {
        let config = SeasonalConfig {
            interval_width: 1.0,
            ..SeasonalConfig::default()
        };
        assert!(SeasonalDecomposition::new(config).is_err());
    }
}
