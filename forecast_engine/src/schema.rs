//! Column schema for uploaded supply/demand tables
//!
//! Every column the pipeline reads is named here once, together with the
//! role it plays. The loader validates the schema against the file header
//! before anything else touches the data.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Which forecast target a column feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Supply,
    Demand,
}

impl Target {
    /// Both targets, in display order
    pub const ALL: [Target; 2] = [Target::Supply, Target::Demand];

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Target::Supply => "Supply",
            Target::Demand => "Demand",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Semantic role of a schema column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// Row key, parsed into a calendar date
    DateKey,
    /// Numeric value to forecast
    Target(Target),
    /// Exogenous numeric input for the regression strategy
    Feature,
}

/// Names and roles of the columns a dataset must provide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    /// Date column name
    pub date_column: String,
    /// `chrono` format of the date column
    pub date_format: String,
    /// Supply target column name
    pub supply_column: String,
    /// Demand target column name
    pub demand_column: String,
    /// Exogenous feature column names (may be empty)
    pub feature_columns: Vec<String>,
    /// Worksheet read from spreadsheet uploads
    pub sheet: String,
}

impl ColumnSchema {
    pub const DEFAULT_DATE_FORMAT: &'static str = "%d-%m-%Y";
    pub const DEFAULT_SHEET: &'static str = "Sheet1";

    /// Extraction-process workbook: cobalt market value as supply,
    /// recycled content as demand, no exogenous features.
    pub fn extraction() -> Self {
        Self {
            date_column: "Date of Extraction Process".to_string(),
            date_format: Self::DEFAULT_DATE_FORMAT.to_string(),
            supply_column: "Cobalt Market Value (USD)".to_string(),
            demand_column: "Recycled Content (%)".to_string(),
            feature_columns: Vec::new(),
            sheet: Self::DEFAULT_SHEET.to_string(),
        }
    }

    /// Vendor ledger: debits as supply, credits as demand, vendor scores as
    /// exogenous features.
    pub fn ledger() -> Self {
        Self {
            date_column: "Date".to_string(),
            date_format: Self::DEFAULT_DATE_FORMAT.to_string(),
            supply_column: "Debit EUR".to_string(),
            demand_column: "Credit EUR".to_string(),
            feature_columns: vec![
                "Vendor Quality History".to_string(),
                "Vendor Consistency".to_string(),
                "Processing Efficiency (%)".to_string(),
            ],
            sheet: Self::DEFAULT_SHEET.to_string(),
        }
    }

    /// Column that holds the given target
    pub fn target_column(&self, target: Target) -> &str {
        match target {
            Target::Supply => &self.supply_column,
            Target::Demand => &self.demand_column,
        }
    }

    /// Every required column with its role
    pub fn columns(&self) -> Vec<(&str, ColumnRole)> {
        let mut columns = vec![
            (self.date_column.as_str(), ColumnRole::DateKey),
            (self.supply_column.as_str(), ColumnRole::Target(Target::Supply)),
            (self.demand_column.as_str(), ColumnRole::Target(Target::Demand)),
        ];
        columns.extend(
            self.feature_columns
                .iter()
                .map(|name| (name.as_str(), ColumnRole::Feature)),
        );
        columns
    }

    /// Columns that must be coerced to floating point
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns()
            .into_iter()
            .filter(|(_, role)| *role != ColumnRole::DateKey)
            .map(|(name, _)| name)
            .collect()
    }

    /// Check the schema itself: non-empty names, one role per column
    pub fn validate(&self) -> Result<()> {
        if self.date_format.trim().is_empty() {
            return Err(ForecastError::InvalidParameter(
                "date format must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (name, role) in self.columns() {
            if name.trim().is_empty() {
                return Err(ForecastError::InvalidParameter(format!(
                    "column name for {:?} must not be empty",
                    role
                )));
            }
            if !seen.insert(name) {
                return Err(ForecastError::InvalidParameter(format!(
                    "column '{}' is assigned more than one role",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Required columns absent from `present`
    pub fn missing_columns<S: AsRef<str>>(&self, present: &[S]) -> Vec<String> {
        let present: HashSet<&str> = present.iter().map(|s| s.as_ref().trim()).collect();
        self.columns()
            .into_iter()
            .filter(|(name, _)| !present.contains(name))
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::extraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ColumnSchema::extraction().validate().is_ok());
        assert!(ColumnSchema::ledger().validate().is_ok());
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let mut schema = ColumnSchema::ledger();
        schema.demand_column = schema.supply_column.clone();
        assert!(matches!(
            schema.validate(),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_missing_columns() {
        let schema = ColumnSchema::extraction();
        let missing = schema.missing_columns(&["Date of Extraction Process", "Recycled Content (%)"]);
        assert_eq!(missing, vec!["Cobalt Market Value (USD)".to_string()]);
    }

    #[test]
    fn test_numeric_columns_skip_date() {
        let schema = ColumnSchema::ledger();
        let numeric = schema.numeric_columns();
        assert_eq!(numeric.len(), 5);
        assert!(!numeric.contains(&"Date"));
    }
}
