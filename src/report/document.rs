//! Report assembly: tables and chart images → one self-contained HTML file.
//!
//! The layout lives in `templates/report.html`; askama escapes every value.
//! Images are embedded as data URIs so the document can be mailed or
//! archived on its own. Anything that cannot be embedded is replaced by a
//! visible marker instead of failing the whole report.

use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::{Period, ReportConfig};
use crate::error::{AnalysisError, Result};
use crate::report::table::{MISSING_CELL, SummaryTable};

pub const MISSING_FIGURE: &str = "[Error: figure missing]";

/// Everything the assembler needs; the caller decides what is computed.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub site: &'a str,
    pub period: Period,
    /// Date shown by the same-day power chart.
    pub day: Option<NaiveDate>,
    pub synthesis: &'a SummaryTable,
    pub dominant: &'a SummaryTable,
    pub production_chart: Option<&'a Path>,
    pub status_chart: Option<&'a Path>,
    pub solar_chart: Option<&'a Path>,
    pub day_chart: Option<&'a Path>,
    pub logo: Option<&'a Path>,
    pub config: ReportConfig,
}

/// Default output name: `analysis_report_<start>_<end>.html`.
pub fn default_report_name(period: &Period) -> PathBuf {
    PathBuf::from(format!(
        "analysis_report_{}_{}.html",
        period.start(),
        period.end()
    ))
}

/// An image slot in the report: embedded, or a visible error marker.
struct Figure {
    caption: Option<String>,
    uri: String,
    alt: &'static str,
    class: Option<&'static str>,
    error: Option<String>,
}

impl Figure {
    fn load(path: Option<&Path>, alt: &'static str) -> Self {
        let mut figure = Figure {
            caption: None,
            uri: String::new(),
            alt,
            class: None,
            error: None,
        };
        let Some(path) = path else {
            figure.error = Some(MISSING_FIGURE.to_string());
            return figure;
        };
        match data_uri(path) {
            Ok(uri) => figure.uri = uri,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot embed image");
                figure.error = Some(format!("[Error: unable to embed chart – {err}]"));
            }
        }
        figure
    }
}

struct Section<'a> {
    heading: &'static str,
    table: Option<&'a SummaryTable>,
    figures: Vec<Figure>,
    page_break: bool,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    site: &'a str,
    start: NaiveDate,
    end: NaiveDate,
    logo: Option<Figure>,
    sections: Vec<Section<'a>>,
}

impl<'a> ReportTemplate<'a> {
    fn new(input: &ReportInput<'a>) -> Self {
        let cfg = &input.config;
        let mut sections = Vec::new();

        if cfg.production {
            sections.push(Section {
                heading: "1. Energy production",
                table: cfg.synthesis_table.then_some(input.synthesis),
                figures: cfg
                    .production_chart
                    .then(|| Figure::load(input.production_chart, "Energy production share"))
                    .into_iter()
                    .collect(),
                page_break: true,
            });
        }

        if cfg.operating_status {
            sections.push(Section {
                heading: "2. Operating status",
                table: cfg.dominant_table.then_some(input.dominant),
                figures: cfg
                    .status_chart
                    .then(|| Figure::load(input.status_chart, "Installation status distribution"))
                    .into_iter()
                    .collect(),
                page_break: true,
            });
        }

        if cfg.evolution {
            let mut figures = Vec::new();
            if cfg.solar_chart {
                figures.push(Figure::load(input.solar_chart, "Solar energy: actual vs theoretical"));
            }
            if cfg.day_chart {
                let day = input.day.map_or_else(|| MISSING_CELL.to_string(), |d| d.to_string());
                let mut figure = Figure::load(input.day_chart, "Power by source");
                figure.caption = Some(format!("Results for {day}"));
                figures.push(figure);
            }
            sections.push(Section {
                heading: "3. Time evolution",
                table: None,
                figures,
                page_break: false,
            });
        }

        let logo = input.logo.map(|path| Figure {
            class: Some("logo"),
            ..Figure::load(Some(path), "logo")
        });

        ReportTemplate {
            site: input.site,
            start: input.period.start(),
            end: input.period.end(),
            logo,
            sections,
        }
    }
}

/// Build the HTML document.
pub fn assemble_report(input: &ReportInput<'_>) -> Result<String> {
    Ok(ReportTemplate::new(input).render()?)
}

/// Assemble the report and write it to `path`.
pub fn write_report(path: &Path, input: &ReportInput<'_>) -> Result<()> {
    let html = assemble_report(input)?;
    fs::write(path, html).map_err(|e| AnalysisError::io(path, e))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

fn data_uri(path: &Path) -> Result<String> {
    let mime = image_mime(path).ok_or_else(|| {
        AnalysisError::ChartExport(format!("unsupported image type '{}'", path.display()))
    })?;
    let bytes = fs::read(path).map_err(|e| AnalysisError::io(path, e))?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(mime)
}
