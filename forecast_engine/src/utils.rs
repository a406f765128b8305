//! Utility functions for the forecast_engine crate

use crate::error::{ForecastError, Result};
use crate::horizon::Horizon;
use chrono::{Duration, NaiveDate};

/// Consecutive calendar days following `last`
pub fn future_dates(last: NaiveDate, horizon: Horizon) -> Vec<NaiveDate> {
    (1..=horizon.periods() as i64)
        .map(|offset| last + Duration::days(offset))
        .collect()
}

/// Split `n` rows into a leading training part and a trailing test part.
///
/// Returns `(train_len, test_len)` with `test_len = ceil(n * test_fraction)`.
/// Both parts are non-empty.
pub fn chronological_split(n: usize, test_fraction: f64) -> Result<(usize, usize)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let test_len = (n as f64 * test_fraction).ceil() as usize;
    if n < 2 || test_len >= n {
        return Err(ForecastError::ModelFit(format!(
            "Cannot split {} rows into training and test partitions",
            n
        )));
    }

    Ok((n - test_len, test_len))
}
