use forecast_report::JsonChartRenderer;
use forecast_store::SqliteStore;
use std::path::PathBuf;
use supply_demand::{init_tracing, AppConfig, DataSource, Session};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // An optional config path as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let out_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target").join("demo");
    std::fs::create_dir_all(&out_dir)?;

    let session = Session::load(config, DataSource::Sample)?;
    println!("{}", session.preview());

    // Seasonal dashboard
    let seasonal = session.forecast_seasonal()?;
    println!("Forecast horizon: {}", seasonal.horizon);
    for line in seasonal.metrics_lines() {
        println!("{}", line);
    }
    println!("CSV written to {}", seasonal.save_csv(&out_dir)?.display());

    let renderer = JsonChartRenderer::new(out_dir.join("charts"));
    for path in seasonal.render_charts(&renderer)? {
        println!("Chart: {}", path.display());
    }

    // Boosted dashboard: 12 periods, 5 folds
    let boosted = session.forecast_boosted(12, 5)?;
    for line in boosted.metrics_lines() {
        println!("{}", line);
    }
    if let Ok(run) = &boosted.supply {
        if let Some(report) = &run.fit.cross_validation {
            println!("{}", report);
        }
    }
    println!("CSV written to {}", boosted.save_csv(&out_dir)?.display());

    let store = SqliteStore::open_path(out_dir.join("forecast_results.db"));
    let report = boosted.store(&store)?;
    println!("Stored {} forecast rows", report.inserted);

    Ok(())
}
