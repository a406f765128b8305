//! Chart rendering seam

use crate::chart::ChartSpec;
use crate::error::Result;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Turns chart descriptions into something a viewer can display
pub trait ChartRenderer {
    /// Render one chart and return where it went
    fn render(&self, chart: &ChartSpec) -> Result<PathBuf>;

    fn render_all(&self, charts: &[ChartSpec]) -> Result<Vec<PathBuf>> {
        charts.iter().map(|chart| self.render(chart)).collect()
    }
}

/// Writes each chart as `<slug>.json` under a directory
#[derive(Debug, Clone)]
pub struct JsonChartRenderer {
    dir: PathBuf,
}

impl JsonChartRenderer {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ChartRenderer for JsonChartRenderer {
    fn render(&self, chart: &ChartSpec) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", chart.slug()));

        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, chart)?;

        debug!(path = %path.display(), series = chart.series.len(), "chart rendered");
        Ok(path)
    }
}
