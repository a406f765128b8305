//! Historical series and exogenous feature tables

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::ops::Range;

/// Observed values of one target, keyed by unique dates
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl HistoricalSeries {
    /// Create a series from `(date, value)` pairs.
    ///
    /// Dates must be unique and values finite. Order is kept as given.
    pub fn new(name: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        let (dates, values) = points.into_iter().unzip();
        Self::from_parts(name, dates, values)
    }

    /// Create a series from parallel date and value vectors
    pub fn from_parts(
        name: impl Into<String>,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(ForecastError::DataFormat(format!(
                "series '{}' has {} dates but {} values",
                name,
                dates.len(),
                values.len()
            )));
        }

        let mut seen = HashSet::with_capacity(dates.len());
        if let Some(duplicate) = dates.iter().find(|d| !seen.insert(**d)) {
            return Err(ForecastError::DataFormat(format!(
                "series '{}' contains duplicate date {}",
                name, duplicate
            )));
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::DataFormat(format!(
                "series '{}' contains non-finite values",
                name
            )));
        }

        Ok(Self {
            name,
            dates,
            values,
        })
    }

    /// Name of the series, usually the source column
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(date, value)` pairs
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Latest observed date, wherever it sits in the series
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.dates.iter().max().copied()
    }

    /// True when every value is the same
    pub fn is_constant(&self) -> bool {
        match self.values.first() {
            Some(first) => self.values.iter().all(|v| v == first),
            None => true,
        }
    }

    /// Sub-series over a row range
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end || range.end > self.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "range {:?} is out of bounds for series of length {}",
                range,
                self.len()
            )));
        }

        Ok(Self {
            name: self.name.clone(),
            dates: self.dates[range.clone()].to_vec(),
            values: self.values[range].to_vec(),
        })
    }
}

/// Fully observed exogenous features, one row per series observation
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    /// Create a feature table; every row must have one finite value per name
    pub fn new(names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if names.is_empty() {
            return Err(ForecastError::DataFormat(
                "feature table needs at least one column".to_string(),
            ));
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(ForecastError::DataFormat(format!(
                    "feature row {} has {} values, expected {}",
                    i,
                    row.len(),
                    names.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ForecastError::DataFormat(format!(
                    "feature row {} contains missing or non-finite values",
                    i
                )));
            }
        }

        Ok(Self { names, rows })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of feature columns
    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn last_row(&self) -> Option<&[f64]> {
        self.rows.last().map(Vec::as_slice)
    }

    /// True when no column varies across rows, i.e. no split is possible
    pub fn all_constant(&self) -> bool {
        let Some(first) = self.rows.first() else {
            return true;
        };
        self.rows.iter().all(|row| row == first)
    }
}
