//! Shared analysis pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> select period -> aggregate -> tables -> charts -> report
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::aggregate::{
    Aggregates, DayPowerSeries, HourlyEnergy, aggregate, day_power_series, hourly_solar_energy,
};
use crate::chart::{
    ChartRenderer, ReportCharts, day_power_chart, hourly_solar_chart, materialize_charts,
    production_share_chart, status_share_chart,
};
use crate::domain::{Dataset, Period, PeriodView, ReportConfig, StatusSynonyms};
use crate::error::{AnalysisError, Result};
use crate::io::ingest::{IngestOptions, IngestedData, load_dataset};
use crate::report::{
    ReportInput, SummaryTable, default_report_name, dominant_status_table, synthesis_table,
    write_report,
};

/// Session state shared by the front-ends. A new load replaces the data wholly.
#[derive(Debug, Clone)]
pub struct AppState {
    pub site: String,
    pub synonyms: StatusSynonyms,
    pub data: Option<IngestedData>,
}

impl AppState {
    pub fn new(site: impl Into<String>, synonyms: StatusSynonyms) -> Self {
        Self {
            site: site.into(),
            synonyms,
            data: None,
        }
    }

    /// Load a file; on failure the previously loaded data is kept.
    pub fn load(&mut self, path: &Path) -> Result<&IngestedData> {
        let options = IngestOptions {
            synonyms: self.synonyms.clone(),
        };
        let ingest = load_dataset(path, &options)?;
        Ok(self.data.insert(ingest))
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.data.as_ref().map(|d| &d.dataset)
    }
}

/// All computed outputs for one selected period.
#[derive(Debug, Clone)]
pub struct PeriodAnalysis {
    pub period: Period,
    /// Day shown by the same-day power chart; `None` when the period is empty.
    pub day: Option<NaiveDate>,
    pub days: Vec<NaiveDate>,
    pub aggregates: Aggregates,
    pub hourly: Vec<HourlyEnergy>,
    pub day_series: Option<DayPowerSeries>,
    pub synthesis: SummaryTable,
    pub dominant: SummaryTable,
}

/// Validate the period and compute everything the outputs need.
///
/// A reversed period fails before anything is computed.
pub fn analyze(
    dataset: &Dataset,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    day: Option<NaiveDate>,
) -> Result<PeriodAnalysis> {
    let period = dataset.select_period(start, end)?;
    let view = dataset.view(&period);
    info!(
        start = %period.start(),
        end = %period.end(),
        rows = view.len(),
        "period selected"
    );

    let aggregates = aggregate(&view);
    let day = resolve_day(&view, day);
    let day_series = day.map(|d| day_power_series(&view, d));

    Ok(PeriodAnalysis {
        period,
        day,
        days: view.days(),
        hourly: hourly_solar_energy(&view),
        day_series,
        synthesis: synthesis_table(&aggregates),
        dominant: dominant_status_table(&aggregates),
        aggregates,
    })
}

/// The requested day when the view has readings on it, else the first day.
pub fn resolve_day(view: &PeriodView<'_>, requested: Option<NaiveDate>) -> Option<NaiveDate> {
    let days = view.days();
    match requested {
        Some(day) if days.contains(&day) => Some(day),
        Some(day) => {
            warn!(%day, "no readings on the requested day; using the first day of the period");
            days.first().copied()
        }
        None => days.first().copied(),
    }
}

/// Chart specifications for the report elements enabled in `config`.
pub fn build_charts(analysis: &PeriodAnalysis, config: &ReportConfig) -> ReportCharts {
    ReportCharts {
        production_share: (config.production && config.production_chart)
            .then(|| production_share_chart(&analysis.aggregates)),
        status_share: (config.operating_status && config.status_chart)
            .then(|| status_share_chart(&analysis.aggregates.distribution)),
        hourly_solar: (config.evolution && config.solar_chart)
            .then(|| hourly_solar_chart(&analysis.hourly)),
        day_power: (config.evolution && config.day_chart)
            .then_some(analysis.day_series.as_ref())
            .flatten()
            .map(day_power_chart),
    }
}

/// Options of a report run that are not part of the analysis itself.
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub site: String,
    pub logo: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub config: ReportConfig,
}

/// Render the charts, assemble the document and write it. Returns the path written.
///
/// Chart failures only degrade the document; the temporary images are removed
/// once the report is on disk.
pub fn generate_report(
    analysis: &PeriodAnalysis,
    request: &ReportRequest,
    renderer: &dyn ChartRenderer,
) -> Result<PathBuf> {
    let charts = build_charts(analysis, &request.config);
    let images = materialize_charts(renderer, &charts)?;

    let path = request
        .out
        .clone()
        .unwrap_or_else(|| default_report_name(&analysis.period));

    if let Some(logo) = &request.logo
        && !logo.is_file()
    {
        warn!(path = %logo.display(), "logo not found; it will be marked as missing");
    }

    let input = ReportInput {
        site: &request.site,
        period: analysis.period,
        day: analysis.day,
        synthesis: &analysis.synthesis,
        dominant: &analysis.dominant,
        production_chart: images.production_share.as_deref(),
        status_chart: images.status_share.as_deref(),
        solar_chart: images.hourly_solar.as_deref(),
        day_chart: images.day_power.as_deref(),
        logo: request.logo.as_deref(),
        config: request.config,
    };
    write_report(&path, &input)?;
    info!(path = %path.display(), charts = images.count(), "report generated");
    Ok(path)
}

/// Convenience for front-ends holding an [`AppState`].
pub fn require_dataset(state: &AppState) -> Result<&Dataset> {
    state.dataset().ok_or(AnalysisError::EmptyDataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::SvgChartRenderer;
    use crate::data::example_csv;
    use crate::io::ingest::{SourceFormat, parse_bytes};

    fn example() -> IngestedData {
        let csv = example_csv().unwrap();
        parse_bytes(csv.as_bytes(), SourceFormat::Delimited, &IngestOptions::default()).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn reversed_period_produces_no_analysis() {
        let data = example();
        let err = analyze(&data.dataset, Some(date("2025-10-01")), Some(date("2025-08-01")), None)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Period { .. }));
    }

    #[test]
    fn day_falls_back_to_first_day_of_period() {
        let data = example();
        let analysis = analyze(&data.dataset, None, None, Some(date("2025-07-11"))).unwrap();
        assert_eq!(analysis.day, Some(date("2025-07-10")));
        let analysis = analyze(&data.dataset, None, None, Some(date("2025-10-10"))).unwrap();
        assert_eq!(analysis.day, Some(date("2025-10-10")));
        assert_eq!(analysis.days.len(), 4);
    }

    #[test]
    fn disabled_sections_skip_their_charts() {
        let data = example();
        let analysis = analyze(&data.dataset, None, None, None).unwrap();
        let config = ReportConfig {
            evolution: false,
            status_chart: false,
            ..ReportConfig::default()
        };
        let charts = build_charts(&analysis, &config);
        assert!(charts.production_share.is_some());
        assert!(charts.status_share.is_none());
        assert!(charts.hourly_solar.is_none());
        assert!(charts.day_power.is_none());
    }

    #[test]
    fn report_embeds_rendered_charts() {
        let data = example();
        let analysis = analyze(&data.dataset, None, None, None).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let request = ReportRequest {
            site: "Test site".into(),
            out: Some(dir.path().join("report.html")),
            ..ReportRequest::default()
        };
        let path = generate_report(&analysis, &request, &SvgChartRenderer::default()).unwrap();
        let html = std::fs::read_to_string(path).unwrap();
        assert_eq!(html.matches("data:image/svg+xml;base64,").count(), 4);
        assert!(html.contains("Analysis report Test site"));
    }
}
