//! Regression metrics over aligned actual/predicted pairs
//!
//! All functions expect both slices to have the same non-zero length and
//! return [`MathError`] otherwise. R² is deliberately left unbounded below:
//! a forecast worse than the mean of the actual values yields a negative
//! score.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

fn check_pairs(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(MathError::LengthMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(MathError::InsufficientData(
            "at least one actual/predicted pair is required".to_string(),
        ));
    }
    if actual.iter().chain(predicted.iter()).any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "actual and predicted values must be finite".to_string(),
        ));
    }
    Ok(())
}

/// Mean absolute error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pairs(actual, predicted)?;

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    Ok(sum / actual.len() as f64)
}

/// Mean squared error
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pairs(actual, predicted)?;

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    Ok(sum / actual.len() as f64)
}

/// Root mean squared error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    mean_squared_error(actual, predicted).map(f64::sqrt)
}

/// Coefficient of determination.
///
/// When the actual values have zero variance the score is `1.0` for an exact
/// prediction and `0.0` otherwise.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pairs(actual, predicted)?;

    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;

    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

/// All regression metrics for one set of aligned pairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination
    pub r_squared: f64,
}

impl RegressionMetrics {
    /// Compute every metric over the same pairs
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        let mse = mean_squared_error(actual, predicted)?;

        Ok(Self {
            mae: mean_absolute_error(actual, predicted)?,
            mse,
            rmse: mse.sqrt(),
            r_squared: r_squared(actual, predicted)?,
        })
    }
}
