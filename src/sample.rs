//! Bundled sample table for trying the dashboards without an upload

/// Ninety days of vendor ledger data in the ledger column layout, with an
/// empty trailing `Unnamed` column as spreadsheet exports often have
pub const SAMPLE_CSV: &str = include_str!("../data/sample_supply_demand.csv");
