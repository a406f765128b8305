//! Loading and cleaning uploaded supply/demand tables

use crate::error::{ForecastError, Result};
use crate::schema::{ColumnSchema, Target};
use crate::series::{FeatureTable, HistoricalSeries};
use calamine::{open_workbook_auto, Data, DataType as CellValue, Reader};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Rows scanned by the CSV reader to infer column types
const INFER_SCHEMA_ROWS: usize = 100;

/// `num_days_from_ce` of 1970-01-01, the epoch of polars `Date` columns
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Cleaned table with parsed dates as the row key
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Schema the table was validated against
    schema: ColumnSchema,
    /// Parsed row dates, parallel to the frame rows
    dates: Vec<NaiveDate>,
    /// Data frame with a `Date` key column and `Float64` value columns
    df: DataFrame,
    /// Rows removed because of a missing or unparseable date
    dropped_rows: usize,
    /// Unnamed or empty columns removed before validation
    dropped_columns: Vec<String>,
}

/// Data loader for uploaded tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a delimited text file
    pub fn from_csv<P: AsRef<Path>>(path: P, schema: &ColumnSchema) -> Result<Dataset> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading delimited file");

        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(Some(INFER_SCHEMA_ROWS))
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df, schema)
    }

    /// Load the raw contents of an uploaded delimited file
    pub fn from_csv_bytes(bytes: &[u8], schema: &ColumnSchema) -> Result<Dataset> {
        info!(bytes = bytes.len(), "loading uploaded delimited data");

        let df = CsvReader::new(Cursor::new(bytes.to_vec()))
            .infer_schema(Some(INFER_SCHEMA_ROWS))
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df, schema)
    }

    /// Load the schema's worksheet from a spreadsheet file.
    ///
    /// Date cells are rendered with the schema's date format so they go
    /// through the same parsing as text dates.
    pub fn from_spreadsheet<P: AsRef<Path>>(path: P, schema: &ColumnSchema) -> Result<Dataset> {
        let path = path.as_ref();
        info!(path = %path.display(), sheet = %schema.sheet, "loading spreadsheet");

        let mut workbook = open_workbook_auto(path).map_err(|e| {
            ForecastError::DataFormat(format!("cannot open spreadsheet: {}", e))
        })?;
        let range = workbook.worksheet_range(&schema.sheet).map_err(|e| {
            ForecastError::DataFormat(format!("cannot read sheet '{}': {}", schema.sheet, e))
        })?;

        let mut rows = range.rows();
        let header: Vec<String> = match rows.next() {
            Some(row) => row
                .iter()
                .map(|cell| cell_text(cell, &schema.date_format).unwrap_or_default())
                .collect(),
            None => {
                return Err(ForecastError::DataFormat(format!(
                    "sheet '{}' is empty",
                    schema.sheet
                )))
            }
        };

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
        for row in rows {
            for (i, column) in columns.iter_mut().enumerate() {
                column.push(
                    row.get(i)
                        .and_then(|cell| cell_text(cell, &schema.date_format)),
                );
            }
        }

        let series: Vec<Series> = header
            .iter()
            .zip(columns)
            .enumerate()
            .map(|(i, (name, values))| {
                let name = if name.trim().is_empty() {
                    format!("Unnamed: {}", i)
                } else {
                    name.trim().to_string()
                };
                Series::new(&name, values)
            })
            .collect();

        Self::from_dataframe(DataFrame::new(series)?, schema)
    }

    /// Clean and validate an existing DataFrame
    pub fn from_dataframe(df: DataFrame, schema: &ColumnSchema) -> Result<Dataset> {
        schema.validate()?;

        let (mut df, dropped_columns) = Self::drop_unnamed_columns(df)?;

        let present = df.get_column_names();
        let missing = schema.missing_columns(&present);
        if !missing.is_empty() {
            return Err(ForecastError::DataFormat(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        let (dates, keep) = Self::parse_dates(&df, schema)?;
        let dropped_rows = keep.iter().filter(|k| !**k).count();
        if dropped_rows > 0 {
            warn!(
                dropped_rows,
                column = %schema.date_column,
                "dropping rows with a missing or unparseable date"
            );
            let mask = BooleanChunked::from_slice("valid_date", &keep);
            df = df.filter(&mask)?;
        }

        let days: Vec<i32> = dates
            .iter()
            .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            .collect();
        let date_series = Series::new(&schema.date_column, days).cast(&DataType::Date)?;
        df.with_column(date_series)?;

        for name in schema.numeric_columns() {
            let numeric = Self::column_as_f64(&df, name)?;
            df.with_column(numeric)?;
        }

        info!(
            rows = df.height(),
            columns = df.width(),
            dropped_rows,
            "dataset loaded"
        );

        Ok(Dataset {
            schema: schema.clone(),
            dates,
            df,
            dropped_rows,
            dropped_columns,
        })
    }

    /// Drop columns with no header, a pandas-style `Unnamed` header, or no
    /// values at all
    fn drop_unnamed_columns(df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let dropped: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|s| {
                let name = s.name().trim();
                name.is_empty()
                    || name.starts_with("Unnamed")
                    || (!s.is_empty() && s.null_count() == s.len())
            })
            .map(|s| s.name().to_string())
            .collect();

        let mut df = df;
        for name in &dropped {
            debug!(column = %name, "dropping unnamed or empty column");
            df = df.drop(name)?;
        }

        Ok((df, dropped))
    }

    /// Parse the date column, returning the valid dates and a keep-mask
    fn parse_dates(df: &DataFrame, schema: &ColumnSchema) -> Result<(Vec<NaiveDate>, Vec<bool>)> {
        let raw = Self::column_as_text(df, &schema.date_column)?;
        let parsed: Vec<Option<NaiveDate>> = raw
            .iter()
            .map(|value| {
                value
                    .as_deref()
                    .and_then(|s| parse_date(s, &schema.date_format))
            })
            .collect();

        let non_empty = raw.iter().filter(|v| v.is_some()).count();
        let valid = parsed.iter().filter(|d| d.is_some()).count();
        if non_empty > 0 && valid == 0 {
            return Err(ForecastError::DataFormat(format!(
                "date column '{}' could not be parsed with format '{}'",
                schema.date_column, schema.date_format
            )));
        }

        let keep = parsed.iter().map(Option::is_some).collect();
        Ok((parsed.into_iter().flatten().collect(), keep))
    }

    /// Read a column as trimmed, non-empty text values
    fn column_as_text(df: &DataFrame, column_name: &str) -> Result<Vec<Option<String>>> {
        let col = df.column(column_name)?.cast(&DataType::Utf8)?;
        let values = col
            .utf8()?
            .into_iter()
            .map(|value| {
                value
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect();
        Ok(values)
    }

    /// Coerce a column to `Float64`; values that are not numbers become null
    fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Series> {
        let col = df.column(column_name)?;
        let observed = col.len() - col.null_count();

        let numeric = col.cast(&DataType::Float64)?;
        if observed > 0 && numeric.null_count() == numeric.len() {
            return Err(ForecastError::DataFormat(format!(
                "column '{}' holds no numeric values",
                column_name
            )));
        }

        let coerced = numeric.null_count() - col.null_count();
        if coerced > 0 {
            warn!(column = %column_name, values = coerced, "non-numeric values treated as missing");
        }

        Ok(numeric)
    }
}

/// Parse a date under `format`, also accepting a trailing time of day
fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, format).ok().or_else(|| {
        NaiveDateTime::parse_from_str(value, &format!("{} %H:%M:%S", format))
            .ok()
            .map(|dt| dt.date())
    })
}

/// Render a spreadsheet cell as text
fn cell_text(cell: &Data, date_format: &str) -> Option<String> {
    match cell {
        Data::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|date| date.format(date_format).to_string()),
        _ => None,
    }
}

impl Dataset {
    /// Schema the dataset was validated against
    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Parsed row dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Rows dropped for a missing or unparseable date
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Unnamed or empty columns dropped during loading
    pub fn dropped_columns(&self) -> &[String] {
        &self.dropped_columns
    }

    /// First `rows` rows, for previewing the upload
    pub fn preview(&self, rows: usize) -> DataFrame {
        self.df.head(Some(rows))
    }

    /// Historical series of one target; rows without a value are skipped
    pub fn series(&self, target: Target) -> Result<HistoricalSeries> {
        let name = self.schema.target_column(target);
        let values = self.float_values(name)?;

        let points: Vec<(NaiveDate, f64)> = self
            .dates
            .iter()
            .zip(values)
            .filter_map(|(date, value)| value.map(|v| (*date, v)))
            .collect();

        let skipped = self.len() - points.len();
        if skipped > 0 {
            debug!(column = %name, skipped, "skipping rows without a target value");
        }

        HistoricalSeries::new(name, points)
    }

    /// Target series and aligned exogenous features over fully observed rows
    pub fn supervised(&self, target: Target) -> Result<(HistoricalSeries, FeatureTable)> {
        if self.schema.feature_columns.is_empty() {
            return Err(ForecastError::DataFormat(
                "schema declares no exogenous feature columns".to_string(),
            ));
        }

        let name = self.schema.target_column(target);
        let target_values = self.float_values(name)?;
        let feature_values = self
            .schema
            .feature_columns
            .iter()
            .map(|feature| self.float_values(feature))
            .collect::<Result<Vec<_>>>()?;

        let mut points = Vec::with_capacity(self.len());
        let mut rows = Vec::with_capacity(self.len());
        for (i, date) in self.dates.iter().enumerate() {
            let Some(value) = target_values[i] else {
                continue;
            };
            let row: Option<Vec<f64>> = feature_values.iter().map(|column| column[i]).collect();
            if let Some(row) = row {
                points.push((*date, value));
                rows.push(row);
            }
        }

        let skipped = self.len() - rows.len();
        if skipped > 0 {
            debug!(column = %name, skipped, "skipping incomplete rows for regression");
        }

        Ok((
            HistoricalSeries::new(name, points)?,
            FeatureTable::new(self.schema.feature_columns.clone(), rows)?,
        ))
    }

    fn float_values(&self, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = self.df.column(column_name).map_err(|e| {
            ForecastError::DataFormat(format!("Column '{}' not found: {}", column_name, e))
        })?;
        Ok(col.f64()?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 12, 1);
        assert_eq!(parse_date("01-12-2024", "%d-%m-%Y"), expected);
        assert_eq!(parse_date("01-12-2024 00:00:00", "%d-%m-%Y"), expected);
        assert_eq!(parse_date("2024-12-01", "%d-%m-%Y"), None);
        assert_eq!(parse_date("not a date", "%d-%m-%Y"), None);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty, "%d-%m-%Y"), None);
        assert_eq!(
            cell_text(&Data::String("  x ".to_string()), "%d-%m-%Y"),
            Some("x".to_string())
        );
        assert_eq!(cell_text(&Data::Float(1.5), "%d-%m-%Y"), Some("1.5".to_string()));
        assert_eq!(cell_text(&Data::Int(3), "%d-%m-%Y"), Some("3".to_string()));
    }

    #[test]
    fn test_epoch_offset() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(epoch.num_days_from_ce(), UNIX_EPOCH_DAYS_FROM_CE);
    }
}
