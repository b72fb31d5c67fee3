//! Render the report charts into a scratch directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::chart::{ChartRenderer, ChartSpec};
use crate::error::{AnalysisError, Result};

/// The four report charts, each optional.
#[derive(Debug, Clone, Default)]
pub struct ReportCharts {
    pub production_share: Option<ChartSpec>,
    pub status_share: Option<ChartSpec>,
    pub hourly_solar: Option<ChartSpec>,
    pub day_power: Option<ChartSpec>,
}

/// Image files of the report charts.
///
/// A slot is `None` when the chart was not requested or failed to render.
/// The files live in a temporary directory removed when this value drops.
#[derive(Debug)]
pub struct ChartImages {
    pub production_share: Option<PathBuf>,
    pub status_share: Option<PathBuf>,
    pub hourly_solar: Option<PathBuf>,
    pub day_power: Option<PathBuf>,
    dir: Option<TempDir>,
}

impl ChartImages {
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }

    pub fn count(&self) -> usize {
        [
            &self.production_share,
            &self.status_share,
            &self.hourly_solar,
            &self.day_power,
        ]
        .iter()
        .filter(|p| p.is_some())
        .count()
    }
}

/// Render every present chart and write it into a fresh temporary directory.
///
/// Only creating the directory is fatal; a chart that fails to render or
/// write is logged and left out.
pub fn materialize_charts(renderer: &dyn ChartRenderer, charts: &ReportCharts) -> Result<ChartImages> {
    let dir = tempfile::Builder::new()
        .prefix("site-analyzer-charts-")
        .tempdir()
        .map_err(|e| AnalysisError::io(std::env::temp_dir(), e))?;
    debug!(dir = %dir.path().display(), "materializing charts");

    let write = |name: &str, spec: &Option<ChartSpec>| -> Option<PathBuf> {
        let spec = spec.as_ref()?;
        let path = dir.path().join(format!("{name}.{}", renderer.extension()));
        match renderer.render_to_image(spec).and_then(|bytes| {
            fs::write(&path, bytes).map_err(|e| AnalysisError::io(&path, e))
        }) {
            Ok(()) => Some(path),
            Err(err) => {
                warn!(chart = name, error = %err, "chart left out of the report");
                None
            }
        }
    };

    let production_share = write("production_share", &charts.production_share);
    let status_share = write("status_share", &charts.status_share);
    let hourly_solar = write("hourly_solar", &charts.hourly_solar);
    let day_power = write("day_power", &charts.day_power);

    Ok(ChartImages {
        production_share,
        status_share,
        hourly_solar,
        day_power,
        dir: Some(dir),
    })
}
