//! Renderer-neutral chart descriptions

use crate::error::{ReportError, Result};
use chrono::NaiveDate;
use forecast_engine::pipeline::SeriesForecast;
use forecast_engine::schema::Target;
use forecast_engine::table::ForecastTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Area,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One labelled trace, ordered by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new<I>(label: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut points: Vec<ChartPoint> = points
            .into_iter()
            .map(|(date, value)| ChartPoint { date, value })
            .collect();
        points.sort_by_key(|p| p.date);
        Self {
            label: label.into(),
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub legend_title: String,
    pub series: Vec<ChartSeries>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            x_title: "Date".to_string(),
            y_title: String::new(),
            legend_title: String::new(),
            series: Vec::new(),
        }
    }

    pub fn y_title(mut self, title: impl Into<String>) -> Self {
        self.y_title = title.into();
        self
    }

    pub fn legend_title(mut self, title: impl Into<String>) -> Self {
        self.legend_title = title.into();
        self
    }

    pub fn with_series(mut self, series: ChartSeries) -> Self {
        self.series.push(series);
        self
    }

    /// Title turned into a file-system friendly name
    pub fn slug(&self) -> String {
        let slug: String = self
            .title
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        slug.split('_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Area chart of the evaluated actual and predicted values
pub fn actual_vs_predicted(run: &SeriesForecast, y_title: &str) -> ChartSpec {
    let label = run.target.label();
    let pairs = &run.evaluated;
    let dates = pairs.dates().iter().copied();

    ChartSpec::new(
        ChartKind::Area,
        format!("Actual vs Predicted {} (Area Plot)", label),
    )
    .y_title(y_title)
    .legend_title(label)
    .with_series(ChartSeries::new(
        format!("Actual {}", label),
        dates.clone().zip(pairs.actual().iter().copied()),
    ))
    .with_series(ChartSeries::new(
        format!("Predicted {}", label),
        dates.zip(pairs.predicted().iter().copied()),
    ))
}

/// Bar chart of one side of the forecast table
pub fn forecast_bars(table: &ForecastTable, target: Target, y_title: &str) -> ChartSpec {
    let label = target.label();
    ChartSpec::new(ChartKind::Bar, format!("Forecasted {}", label))
        .y_title(y_title)
        .legend_title("Forecasts")
        .with_series(ChartSeries::new(
            format!("{} Forecast", label),
            table.column(target),
        ))
}

/// Training history, held-out actual values and the projection of a
/// regression run
pub fn training_test_forecast(run: &SeriesForecast, y_title: &str) -> Result<ChartSpec> {
    let label = run.target.label();
    let holdout = run.fit.holdout.as_ref().ok_or_else(|| {
        ReportError::Chart(format!(
            "{} run has no hold-out partition to plot",
            label
        ))
    })?;

    let history: Vec<(NaiveDate, f64)> = run.history.points().collect();
    let (training, _) = history.split_at(holdout.train_len.min(history.len()));
    let test = holdout
        .pairs
        .dates()
        .iter()
        .copied()
        .zip(holdout.pairs.actual().iter().copied());
    let forecast = run.fit.forecast.future().iter().map(|p| (p.date, p.value));

    Ok(ChartSpec::new(ChartKind::Line, format!("{} Forecasting", label))
        .y_title(y_title)
        .legend_title("Legend")
        .with_series(ChartSeries::new("Training Data", training.iter().copied()))
        .with_series(ChartSeries::new(
            format!("Actual {} (Test Data)", label),
            test,
        ))
        .with_series(ChartSeries::new(format!("Forecasted {}", label), forecast)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        let spec = ChartSpec::new(ChartKind::Area, "Actual vs Predicted Supply (Area Plot)");
        assert_eq!(spec.slug(), "actual_vs_predicted_supply_area_plot");
    }

    #[test]
    fn test_series_sorted_by_date() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let series = ChartSeries::new("s", vec![(d(3), 3.0), (d(1), 1.0)]);
        assert_eq!(series.points[0].date, d(1));
    }
}
