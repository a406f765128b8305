//! Least-squares linear trend over equally spaced observations

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// `y = intercept + slope * x` fitted on `x = 0, 1, .., n - 1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub intercept: f64,
    pub slope: f64,
    /// Residual standard error with `n - 2` degrees of freedom; zero when
    /// the fit is exact or has no spare degree of freedom
    pub residual_std: f64,
    /// Number of observations the trend was fitted on
    pub observations: usize,
}

impl LinearTrend {
    /// Fit the trend to at least two finite values
    pub fn fit(values: &[f64]) -> Result<Self> {
        let n = values.len();
        if n < 2 {
            return Err(MathError::InsufficientData(format!(
                "a linear trend needs at least 2 values, got {}",
                n
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "trend values must be finite".to_string(),
            ));
        }

        let x_mean = (n - 1) as f64 / 2.0;
        let y_mean = values.iter().sum::<f64>() / n as f64;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            numerator += dx * (y - y_mean);
            denominator += dx * dx;
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        let residual_std = if n > 2 {
            let sse: f64 = values
                .iter()
                .enumerate()
                .map(|(i, y)| (y - (intercept + slope * i as f64)).powi(2))
                .sum();
            (sse / (n - 2) as f64).sqrt()
        } else {
            0.0
        };

        Ok(Self {
            intercept,
            slope,
            residual_std,
            observations: n,
        })
    }

    /// Trend value at position `x`
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Values at the fitted positions
    pub fn fitted(&self) -> Vec<f64> {
        (0..self.observations).map(|i| self.value_at(i as f64)).collect()
    }

    /// Values for the `steps` positions after the last observation
    pub fn project(&self, steps: usize) -> Vec<f64> {
        (self.observations..self.observations + steps)
            .map(|i| self.value_at(i as f64))
            .collect()
    }

    /// Half width of a two-sided normal prediction interval with the given
    /// coverage
    pub fn interval_half_width(&self, coverage: f64) -> Result<f64> {
        if !(coverage > 0.0 && coverage < 1.0) {
            return Err(MathError::InvalidInput(format!(
                "interval coverage must be in (0, 1), got {}",
                coverage
            )));
        }
        let normal = Normal::new(0.0, 1.0).map_err(|e| MathError::InvalidInput(e.to_string()))?;
        Ok(normal.inverse_cdf(0.5 + coverage / 2.0) * self.residual_std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_exact_line() {
        let trend = LinearTrend::fit(&[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert_approx_eq!(trend.slope, 2.0);
        assert_approx_eq!(trend.intercept, 1.0);
        assert_approx_eq!(trend.residual_std, 0.0);
        assert_eq!(trend.project(2).len(), 2);
        assert_approx_eq!(trend.project(1)[0], 9.0);
    }

    #[test]
    fn test_two_points() {
        let trend = LinearTrend::fit(&[10.0, 4.0]).unwrap();
        assert_approx_eq!(trend.slope, -6.0);
        assert_eq!(trend.fitted(), vec![10.0, 4.0]);
        assert_approx_eq!(trend.interval_half_width(0.8).unwrap(), 0.0);
    }

    #[test]
    fn test_rejects_single_value() {
        assert!(matches!(
            LinearTrend::fit(&[1.0]),
            Err(MathError::InsufficientData(_))
        ));
    }
}
