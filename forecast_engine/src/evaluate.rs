//! Alignment of actual and predicted values and accuracy metrics

use crate::error::{ForecastError, Result};
use crate::models::ForecastResult;
use crate::series::HistoricalSeries;
use chrono::NaiveDate;
use forecast_math::RegressionMetrics;
use std::collections::HashMap;
use std::fmt;

/// Actual and predicted values paired by position
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPairs {
    dates: Vec<NaiveDate>,
    actual: Vec<f64>,
    predicted: Vec<f64>,
}

impl AlignedPairs {
    pub fn new(dates: Vec<NaiveDate>, actual: Vec<f64>, predicted: Vec<f64>) -> Result<Self> {
        if dates.len() != actual.len() || actual.len() != predicted.len() {
            return Err(ForecastError::MetricComputation(format!(
                "Aligned vectors differ in length: {} dates, {} actual, {} predicted",
                dates.len(),
                actual.len(),
                predicted.len()
            )));
        }
        Ok(Self {
            dates,
            actual,
            predicted,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn actual(&self) -> &[f64] {
        &self.actual
    }

    pub fn predicted(&self) -> &[f64] {
        &self.predicted
    }

    pub fn len(&self) -> usize {
        self.actual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }
}

/// Left join of `actual` onto `forecast` by date, keeping matched rows only.
///
/// Forecast dates past the history never match; actual dates without a
/// prediction are dropped.
pub fn align_on_dates(actual: &HistoricalSeries, forecast: &ForecastResult) -> AlignedPairs {
    let predicted: HashMap<NaiveDate, f64> = forecast
        .points()
        .iter()
        .map(|p| (p.date, p.value))
        .collect();

    let mut dates = Vec::new();
    let mut actual_values = Vec::new();
    let mut predicted_values = Vec::new();
    for (date, value) in actual.points() {
        if let Some(prediction) = predicted.get(&date) {
            dates.push(date);
            actual_values.push(value);
            predicted_values.push(*prediction);
        }
    }

    AlignedPairs {
        dates,
        actual: actual_values,
        predicted: predicted_values,
    }
}

/// Accuracy of one forecast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsRecord {
    pub mae: f64,
    pub rmse: f64,
    /// Coefficient of determination, unbounded below
    pub r_squared: f64,
}

impl MetricsRecord {
    pub fn compute(pairs: &AlignedPairs) -> Result<Self> {
        if pairs.is_empty() {
            return Err(ForecastError::MetricComputation(
                "No overlapping dates between actual and predicted values".to_string(),
            ));
        }

        let metrics = RegressionMetrics::compute(pairs.actual(), pairs.predicted())?;
        Ok(Self {
            mae: metrics.mae,
            rmse: metrics.rmse,
            r_squared: metrics.r_squared,
        })
    }
}

impl fmt::Display for MetricsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE: {:.2}, RMSE: {:.2}, R²: {:.2}",
            self.mae, self.rmse, self.r_squared
        )
    }
}

/// Align by date and compute metrics in one step
pub fn evaluate(actual: &HistoricalSeries, forecast: &ForecastResult) -> Result<MetricsRecord> {
    MetricsRecord::compute(&align_on_dates(actual, forecast))
}
