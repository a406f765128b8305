//! CSV download of forecast tables

use crate::error::{ReportError, Result};
use forecast_engine::table::ForecastTable;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Download name of the seasonal dashboard's table
pub const SEASONAL_DOWNLOAD_NAME: &str = "forecasted_supply_demand.csv";
/// Download name of the boosted dashboard's table
pub const BOOSTED_DOWNLOAD_NAME: &str = "forecast_values_catboost.csv";

pub const HEADER: [&str; 3] = ["Forecast Date", "Supply Forecast", "Demand Forecast"];

/// Write the table as CSV; missing values are empty cells
pub fn write_csv<W: Write>(table: &ForecastTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for row in table.rows() {
        wtr.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.supply.map(|v| v.to_string()).unwrap_or_default(),
            row.demand.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(table: &ForecastTable) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| ReportError::Encoding(e.to_string()))
}

pub fn save_csv<P: AsRef<Path>>(table: &ForecastTable, path: P) -> Result<()> {
    let path = path.as_ref();
    write_csv(table, File::create(path)?)?;
    info!(path = %path.display(), rows = table.len(), "forecast table exported");
    Ok(())
}
