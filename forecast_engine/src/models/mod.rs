//! Forecasting strategies for supply and demand series

use crate::error::{ForecastError, Result};
use crate::evaluate::AlignedPairs;
use crate::horizon::Horizon;
use crate::series::{FeatureTable, HistoricalSeries};
use chrono::NaiveDate;
use std::fmt::Debug;

pub mod boosting;
pub mod cross_validation;
pub mod seasonal;

pub use boosting::{BoostedTrees, BoostingConfig, RegressionLoss};
pub use cross_validation::{CrossValidationReport, FoldScore};
pub use seasonal::{SeasonalConfig, SeasonalDecomposition, SeasonalityMode};

/// One forecast value, optionally with an uncertainty interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl ForecastPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            lower: None,
            upper: None,
        }
    }

    pub fn with_interval(date: NaiveDate, value: f64, lower: f64, upper: f64) -> Self {
        Self {
            date,
            value,
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

/// Fitted values over the history followed by `horizon` future values
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Name of the model that produced the forecast
    model: String,
    points: Vec<ForecastPoint>,
    history_len: usize,
    horizon: Horizon,
}

impl ForecastResult {
    /// Create a forecast result; `points` must hold exactly
    /// `history_len + horizon` entries
    pub fn new(
        model: impl Into<String>,
        points: Vec<ForecastPoint>,
        history_len: usize,
        horizon: Horizon,
    ) -> Result<Self> {
        let expected = history_len + horizon.periods();
        if points.len() != expected {
            return Err(ForecastError::ModelFit(format!(
                "Forecast has {} points, expected {} history + {} horizon",
                points.len(),
                history_len,
                horizon.periods()
            )));
        }

        Ok(Self {
            model: model.into(),
            points,
            history_len,
            horizon,
        })
    }

    /// Name of the model that produced the forecast
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Fitted values over the historical dates
    pub fn history(&self) -> &[ForecastPoint] {
        &self.points[..self.history_len]
    }

    /// Projected values beyond the last observed date
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.history_len..]
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Whether every point carries interval bounds
    pub fn has_intervals(&self) -> bool {
        self.points
            .iter()
            .all(|p| p.lower.is_some() && p.upper.is_some())
    }
}

/// Data handed to a strategy
#[derive(Debug, Clone, Copy)]
pub struct ModelInput<'a> {
    pub series: &'a HistoricalSeries,
    /// Exogenous features aligned row by row with `series`
    pub features: Option<&'a FeatureTable>,
    /// Explicit feature rows for the future periods
    pub future_features: Option<&'a FeatureTable>,
}

impl<'a> ModelInput<'a> {
    pub fn univariate(series: &'a HistoricalSeries) -> Self {
        Self {
            series,
            features: None,
            future_features: None,
        }
    }

    pub fn with_features(series: &'a HistoricalSeries, features: &'a FeatureTable) -> Self {
        Self {
            series,
            features: Some(features),
            future_features: None,
        }
    }

    pub fn future_features(mut self, future: &'a FeatureTable) -> Self {
        self.future_features = Some(future);
        self
    }
}

/// Chronological hold-out partition used to score a regression fit
#[derive(Debug, Clone, PartialEq)]
pub struct Holdout {
    /// Number of leading rows used for training
    pub train_len: usize,
    /// Actual and predicted values over the held-out rows
    pub pairs: AlignedPairs,
}

/// Output of one strategy run
#[derive(Debug, Clone)]
pub struct ModelFit {
    pub forecast: ForecastResult,
    /// Present when the strategy scored itself on a hold-out partition
    pub holdout: Option<Holdout>,
    pub cross_validation: Option<CrossValidationReport>,
    /// Iteration count kept by early stopping
    pub best_iteration: Option<usize>,
}

impl ModelFit {
    pub fn from_forecast(forecast: ForecastResult) -> Self {
        Self {
            forecast,
            holdout: None,
            cross_validation: None,
            best_iteration: None,
        }
    }
}

/// Trait for forecasting strategies
pub trait ForecastModel: Debug {
    /// Get the name of the model
    fn name(&self) -> &str;

    /// Fit on the input history and forecast `horizon` periods past it
    fn fit_forecast(&self, input: &ModelInput<'_>, horizon: Horizon) -> Result<ModelFit>;
}
