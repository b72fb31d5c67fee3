//! Command-line parsing for the site analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the ingest/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::ReportConfig;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "site-analyzer",
    version,
    about = "Energy monitoring analysis: grid, genset and solar summaries, charts and reports"
)]
pub struct Cli {
    /// Extra status synonyms (JSON object: spelling -> canonical value).
    #[arg(long, global = true, value_name = "JSON", env = "SITE_ANALYZER_SYNONYMS")]
    pub synonyms: Option<PathBuf>,

    /// Log debug details to stderr (or to the log file in the TUI).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the summary tables for a period, optionally with a day plot and CSV export.
    Summary(SummaryArgs),
    /// Generate the HTML analysis report.
    Report(ReportArgs),
    /// Describe the expected input file and show the example dataset.
    Guide(GuideArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `site-analyzer report`, but
    /// renders results in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

/// Input file and period selection shared by the batch commands.
#[derive(Debug, Args, Clone)]
pub struct DatasetArgs {
    /// Input file (.csv, .xlsx, .xlsm, .xls, .ods).
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: PathBuf,

    /// First day of the analysis period (YYYY-MM-DD); defaults to the first day in the file.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last day of the analysis period (YYYY-MM-DD); defaults to the last day in the file.
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Day shown by the same-day power chart; defaults to the first day of the period.
    #[arg(long, value_name = "DATE")]
    pub day: Option<NaiveDate>,

    /// Site name shown in titles.
    #[arg(long, env = "SITE_ANALYZER_SITE", default_value = "Site")]
    pub site: String,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Render an ASCII plot of the selected day's power.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the production summary table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Maximum number of import warnings to print.
    #[arg(long, default_value_t = 10)]
    pub max_warnings: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Logo image placed at the top of the report.
    #[arg(long, value_name = "IMAGE")]
    pub logo: Option<PathBuf>,

    /// Output path; defaults to `analysis_report_<start>_<end>.html`.
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Leave out section 1 (energy production).
    #[arg(long)]
    pub no_production: bool,
    /// Leave out section 2 (operating status).
    #[arg(long)]
    pub no_status: bool,
    /// Leave out section 3 (time evolution).
    #[arg(long)]
    pub no_evolution: bool,
    /// Leave out the production summary table.
    #[arg(long)]
    pub no_synthesis_table: bool,
    /// Leave out the production share chart.
    #[arg(long)]
    pub no_production_chart: bool,
    /// Leave out the dominant status table.
    #[arg(long)]
    pub no_dominant_table: bool,
    /// Leave out the installation status chart.
    #[arg(long)]
    pub no_status_chart: bool,
    /// Leave out the solar actual vs theoretical chart.
    #[arg(long)]
    pub no_solar_chart: bool,
    /// Leave out the same-day power chart.
    #[arg(long)]
    pub no_day_chart: bool,
}

impl ReportArgs {
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            production: !self.no_production,
            synthesis_table: !self.no_synthesis_table,
            production_chart: !self.no_production_chart,
            operating_status: !self.no_status,
            dominant_table: !self.no_dominant_table,
            status_chart: !self.no_status_chart,
            evolution: !self.no_evolution,
            solar_chart: !self.no_solar_chart,
            day_chart: !self.no_day_chart,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct GuideArgs {
    /// Also write the example dataset to this CSV file.
    #[arg(long, value_name = "CSV")]
    pub write: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Input file; without it an interactive picker lists candidates.
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Site name shown in titles.
    #[arg(long, env = "SITE_ANALYZER_SITE", default_value = "Site")]
    pub site: String,

    /// Logo image used for reports generated from the TUI.
    #[arg(long, value_name = "IMAGE")]
    pub logo: Option<PathBuf>,
}
