use forecast_engine::schema::Target;
use forecast_engine::ForecastError;
use forecast_report::JsonChartRenderer;
use forecast_store::{ForecastSink, SqliteStore, StoreError};
use std::io::Write;
use supply_demand::{AppConfig, Dashboard, DataSource, Error, Session};
use tempfile::{tempdir, NamedTempFile};

/// Small boosting budget so the regression tests stay fast
fn quick_config() -> AppConfig {
    AppConfig::from_toml_str(
        r#"
        [boosting]
        iterations = 50
        depth = 3
        eval_period = 10
        early_stopping_rounds = 20
        "#,
    )
    .unwrap()
}

#[test]
fn test_sample_session_loads() {
    let session = Session::load(AppConfig::default(), DataSource::Sample).unwrap();

    assert_eq!(session.dataset().len(), 90);
    assert_eq!(session.dataset().dropped_columns(), &["Unnamed: 6".to_string()]);
    assert_eq!(session.preview().height(), 5);
}

#[test]
fn test_seasonal_dashboard() {
    let session = Session::load(AppConfig::default(), DataSource::Sample).unwrap();
    let run = session.forecast_seasonal().unwrap();

    assert_eq!(run.dashboard, Dashboard::Seasonal);
    assert_eq!(run.horizon.periods(), 63);

    let supply = run.outcome(Target::Supply).unwrap();
    assert_eq!(supply.fit.forecast.len(), 90 + 63);
    assert_eq!(supply.evaluated.len(), 90);
    assert!(run.outcome(Target::Demand).is_ok());

    assert_eq!(run.table.len(), 153);
    let csv = run.csv().unwrap();
    assert_eq!(csv.lines().count(), 154);
    assert!(csv.starts_with("Forecast Date,Supply Forecast,Demand Forecast"));

    let lines = run.metrics_lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Supply Forecast (Seasonal Decomposition) - MAE:"));

    let charts = run.charts().unwrap();
    assert_eq!(charts.len(), 4);
}

#[test]
fn test_boosted_dashboard() {
    let session = Session::load(quick_config(), DataSource::Sample).unwrap();
    let run = session.forecast_boosted(12, 3).unwrap();

    assert_eq!(run.horizon.periods(), 12);
    assert_eq!(run.download_name(), "forecast_values_catboost.csv");

    let supply = run.outcome(Target::Supply).unwrap();
    assert_eq!(supply.fit.forecast.len(), 90 + 12);
    assert_eq!(supply.evaluated.len(), 18);
    assert_eq!(supply.fit.cross_validation.as_ref().unwrap().fold_count(), 3);

    let charts = run.charts().unwrap();
    assert_eq!(charts.len(), 2);
    assert_eq!(charts[0].series.len(), 3);
}

#[test]
fn test_boosted_dashboard_bounds() {
    let session = Session::load(quick_config(), DataSource::Sample).unwrap();

    assert!(matches!(
        session.forecast_boosted(37, 5),
        Err(Error::Forecast(ForecastError::InvalidParameter(_)))
    ));
    assert!(matches!(
        session.forecast_boosted(12, 11),
        Err(Error::Forecast(ForecastError::InvalidParameter(_)))
    ));
}

#[test]
fn test_store_failure_leaves_results_intact() {
    let session = Session::load(AppConfig::default(), DataSource::Sample).unwrap();
    let run = session.forecast_seasonal().unwrap();
    let csv_before = run.csv().unwrap();

    let dir = tempdir().unwrap();
    let broken = SqliteStore::open_path(dir.path().join("missing").join("results.db"));
    assert!(matches!(
        run.store(&broken),
        Err(Error::Store(StoreError::Connection(_)))
    ));

    assert_eq!(run.csv().unwrap(), csv_before);
    assert_eq!(run.table.len(), 153);

    let store = SqliteStore::open_path(dir.path().join("results.db"));
    let report = run.store(&store).unwrap();
    assert_eq!(report.inserted, 153);
    let report = store.store(&run.table).unwrap();
    assert_eq!(report.inserted, 153);
}

#[test]
fn test_exports_to_disk() {
    let session = Session::load(AppConfig::default(), DataSource::Sample).unwrap();
    let run = session.forecast_seasonal().unwrap();
    let dir = tempdir().unwrap();

    let csv_path = run.save_csv(dir.path()).unwrap();
    assert!(csv_path.ends_with("forecasted_supply_demand.csv"));

    let renderer = JsonChartRenderer::new(dir.path().join("charts"));
    let charts = run.render_charts(&renderer).unwrap();
    assert_eq!(charts.len(), 4);
    assert!(charts.iter().all(|p| p.exists()));
}

#[test]
fn test_uploaded_extraction_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Date of Extraction Process,Cobalt Market Value (USD),Recycled Content (%)"
    )
    .unwrap();
    for (date, supply, demand) in [
        ("01-12-2024", 71835.71, 93.12),
        ("12-12-2024", 86449.29, 97.43),
        ("15-12-2024", 70005.61, 89.89),
        ("18-12-2024", 86409.22, 87.67),
        ("21-12-2024", 81835.71, 94.34),
        ("22-12-2024", 86949.29, 88.45),
        ("25-12-2024", 51835.71, 90.30),
        ("26-12-2024", 87449.29, 97.23),
    ] {
        writeln!(file, "{},{},{}", date, supply, demand).unwrap();
    }

    let session = Session::load(
        AppConfig::default(),
        DataSource::Upload(file.path().to_path_buf()),
    )
    .unwrap();
    let run = session.forecast_seasonal().unwrap();

    assert_eq!(run.horizon.periods(), 5);
    assert_eq!(run.outcome(Target::Supply).unwrap().fit.forecast.len(), 13);

    // No feature columns: the boosted dashboard fails per target, not overall
    let boosted = session.forecast_boosted(3, 2).unwrap();
    assert!(boosted.outcome(Target::Supply).is_err());
    assert!(boosted.outcome(Target::Demand).is_err());
    assert!(boosted.table.is_empty());
}
