//! Supply and demand forecasts merged by date

use crate::models::ForecastResult;
use crate::schema::Target;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One output row; a missing side is `None`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub supply: Option<f64>,
    pub demand: Option<f64>,
}

impl ForecastRow {
    pub fn value(&self, target: Target) -> Option<f64> {
        match target {
            Target::Supply => self.supply,
            Target::Demand => self.demand,
        }
    }
}

/// Rows of `(Forecast Date, Supply Forecast, Demand Forecast)` ordered by date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Merge the two forecasts on their dates
    pub fn from_forecasts(supply: Option<&ForecastResult>, demand: Option<&ForecastResult>) -> Self {
        let mut merged: BTreeMap<NaiveDate, ForecastRow> = BTreeMap::new();

        for (target, forecast) in [(Target::Supply, supply), (Target::Demand, demand)] {
            let Some(forecast) = forecast else {
                continue;
            };
            for point in forecast.points() {
                let row = merged.entry(point.date).or_insert(ForecastRow {
                    date: point.date,
                    supply: None,
                    demand: None,
                });
                match target {
                    Target::Supply => row.supply = Some(point.value),
                    Target::Demand => row.demand = Some(point.value),
                }
            }
        }

        Self {
            rows: merged.into_values().collect(),
        }
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Date-keyed values of one side, skipping dates it does not cover
    pub fn column(&self, target: Target) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|row| row.value(target).map(|v| (row.date, v)))
            .collect()
    }
}
