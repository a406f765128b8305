//! Forecast horizon selection

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of future periods to forecast; never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Horizon(usize);

impl Horizon {
    /// Create a horizon of `periods` steps
    pub fn new(periods: usize) -> Result<Self> {
        if periods == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be at least one period".to_string(),
            ));
        }
        Ok(Self(periods))
    }

    /// Number of future periods
    pub fn periods(self) -> usize {
        self.0
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} periods", self.0)
    }
}

/// Chooses a horizon from the length of the history.
///
/// The horizon is `min(hard_cap, floor(history_len * fraction))`. A user
/// chosen horizon is the same rule with `fraction = 1.0`, so it still cannot
/// exceed the available history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonSelector {
    /// Upper bound on the horizon
    pub hard_cap: usize,
    /// Share of the history length that may be projected forward
    pub fraction: f64,
}

impl HorizonSelector {
    /// Default cap for the proportional policy
    pub const DEFAULT_HARD_CAP: usize = 365;
    /// Default fraction for the proportional policy
    pub const DEFAULT_FRACTION: f64 = 0.7;
    /// Added before flooring so products such as `90 * 0.7` that land just
    /// below an integer round to it
    const FLOOR_TOLERANCE: f64 = 1e-9;
    /// Bounds accepted for a user-chosen horizon
    pub const USER_RANGE: std::ops::RangeInclusive<usize> = 1..=36;

    /// Proportional policy: up to 70% of the history, at most a year
    pub fn proportional() -> Self {
        Self {
            hard_cap: Self::DEFAULT_HARD_CAP,
            fraction: Self::DEFAULT_FRACTION,
        }
    }

    /// User-chosen horizon, accepted within [`Self::USER_RANGE`]
    pub fn user_chosen(periods: usize) -> Result<Self> {
        if !Self::USER_RANGE.contains(&periods) {
            return Err(ForecastError::InvalidParameter(format!(
                "Forecast periods must be between {} and {}, got {}",
                Self::USER_RANGE.start(),
                Self::USER_RANGE.end(),
                periods
            )));
        }
        Ok(Self {
            hard_cap: periods,
            fraction: 1.0,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.hard_cap == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon hard cap must be positive".to_string(),
            ));
        }
        if !(self.fraction > 0.0 && self.fraction <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Horizon fraction must be in (0, 1], got {}",
                self.fraction
            )));
        }
        Ok(())
    }

    /// Select the horizon for a history of `history_len` observations
    pub fn select(&self, history_len: usize) -> Result<Horizon> {
        self.validate()?;

        let proportional =
            (history_len as f64 * self.fraction + Self::FLOOR_TOLERANCE).floor() as usize;
        let periods = self.hard_cap.min(proportional);
        if periods < 1 {
            return Err(ForecastError::InsufficientData(format!(
                "History of {} observations is too short to forecast",
                history_len
            )));
        }

        Horizon::new(periods)
    }
}

impl Default for HorizonSelector {
    fn default() -> Self {
        Self::proportional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_rejects_zero() {
        assert!(Horizon::new(0).is_err());
        assert_eq!(Horizon::new(3).unwrap().periods(), 3);
    }

    #[test]
    fn test_select_is_monotone() {
        let selector = HorizonSelector::proportional();
        let mut previous = 0;
        for len in 2..1000 {
            let h = selector.select(len).unwrap().periods();
            assert!(h >= previous);
            assert!(h <= HorizonSelector::DEFAULT_HARD_CAP);
            previous = h;
        }
    }

    #[test]
    fn test_invalid_fraction() {
        let selector = HorizonSelector {
            hard_cap: 10,
            fraction: 1.5,
        };
        assert!(matches!(
            selector.select(10),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
