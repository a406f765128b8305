//! Summary statistics for repeated measurements such as fold scores

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Mean, spread and range of a set of values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (zero for a single value)
    pub std_dev: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
}

impl Summary {
    /// Summarise a non-empty slice of finite values
    pub fn of(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "cannot summarise an empty set of values".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "summary values must be finite".to_string(),
            ));
        }

        let std_dev = if values.len() > 1 {
            values.iter().std_dev()
        } else {
            0.0
        };

        Ok(Self {
            count: values.len(),
            mean: values.iter().mean(),
            std_dev,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_summary() {
        let summary = Summary::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();

        assert_eq!(summary.count, 8);
        assert_approx_eq!(summary.mean, 5.0);
        // sample standard deviation
        assert_approx_eq!(summary.std_dev, (32.0_f64 / 7.0).sqrt(), 1e-12);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
    }

    #[test]
    fn test_single_value() {
        let summary = Summary::of(&[3.5]).unwrap();
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.mean, 3.5);
    }

    #[test]
    fn test_empty() {
        assert!(Summary::of(&[]).is_err());
    }
}
