//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - loads the dataset and runs the analysis pipeline
//! - prints tables/plots or writes the report
//! - writes optional exports

use clap::Parser;

use crate::chart::SvgChartRenderer;
use crate::cli::{Command, DatasetArgs, GuideArgs, ReportArgs, SummaryArgs, TuiArgs};
use crate::domain::StatusSynonyms;
use crate::error::AppError;
use crate::logging::{LogTarget, TUI_LOG_FILE, init_tracing};

pub mod pipeline;

use pipeline::{AppState, PeriodAnalysis, ReportRequest};

/// Entry point for the `site-analyzer` binary.
pub fn run() -> Result<(), AppError> {
    // Settings such as SITE_ANALYZER_SITE may come from a local `.env` file.
    dotenvy::dotenv().ok();

    // We want `site-analyzer` and `site-analyzer -f data.csv` to behave like
    // `site-analyzer tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let target = match cli.command {
        Command::Tui(_) => LogTarget::File(TUI_LOG_FILE.into()),
        _ => LogTarget::Stderr,
    };
    init_tracing(cli.verbose, &target);

    let synonyms = match &cli.synonyms {
        Some(path) => StatusSynonyms::from_json_file(path)?,
        None => StatusSynonyms::default(),
    };

    match cli.command {
        Command::Summary(args) => handle_summary(args, synonyms),
        Command::Report(args) => handle_report(args, synonyms),
        Command::Guide(args) => handle_guide(args),
        Command::Tui(args) => handle_tui(args, synonyms),
    }
}

/// Load the file and analyze the requested period.
fn load_and_analyze(args: &DatasetArgs, synonyms: StatusSynonyms) -> Result<(AppState, PeriodAnalysis), AppError> {
    let mut state = AppState::new(args.site.clone(), synonyms);
    state.load(&args.file)?;
    let dataset = pipeline::require_dataset(&state)?;
    let analysis = pipeline::analyze(dataset, args.start, args.end, args.day)?;
    Ok((state, analysis))
}

fn handle_summary(args: SummaryArgs, synonyms: StatusSynonyms) -> Result<(), AppError> {
    let (state, analysis) = load_and_analyze(&args.dataset, synonyms)?;
    let Some(ingest) = &state.data else {
        return Err(AppError::new(2, "No dataset loaded."));
    };

    // Print terminal output.
    println!(
        "{}",
        crate::report::format_run_header(&state.site, ingest, &analysis.period, analysis.aggregates.rows)
    );
    print!("{}", crate::report::format_warnings(ingest, args.max_warnings));
    print!("{}", crate::report::format_table("Energy production", &analysis.synthesis));
    print!("{}", crate::report::format_table("Dominant status", &analysis.dominant));
    print!("{}", crate::report::format_distribution(&analysis.aggregates.distribution));
    print!("{}", crate::report::format_hourly(&analysis.hourly));

    if args.plot {
        match &analysis.day_series {
            Some(series) => {
                let plot = crate::plot::render_day_power_plot(series, args.width, args.height);
                println!("{plot}");
            }
            None => println!("No readings to plot in this period."),
        }
    }

    // Optional export.
    if let Some(path) = &args.export {
        crate::io::export::write_table_csv(path, &analysis.synthesis)?;
        println!("Production summary exported to {}", path.display());
    }

    Ok(())
}

fn handle_report(args: ReportArgs, synonyms: StatusSynonyms) -> Result<(), AppError> {
    let (state, analysis) = load_and_analyze(&args.dataset, synonyms)?;
    let request = ReportRequest {
        site: state.site.clone(),
        logo: args.logo.clone(),
        out: args.out.clone(),
        config: args.report_config(),
    };
    let path = pipeline::generate_report(&analysis, &request, &SvgChartRenderer::default())?;
    println!("Report written to {}", path.display());
    Ok(())
}

fn handle_guide(args: GuideArgs) -> Result<(), AppError> {
    print!("{}", crate::data::format_guide());
    if let Some(path) = &args.write {
        crate::data::write_example_csv(path)?;
        println!("\nExample dataset written to {}", path.display());
    }
    Ok(())
}

fn handle_tui(args: TuiArgs, synonyms: StatusSynonyms) -> Result<(), AppError> {
    crate::tui::run(args, synonyms)
}

/// Rewrite argv so `site-analyzer` defaults to `site-analyzer tui`.
///
/// Rules:
/// - `site-analyzer`                      -> `site-analyzer tui`
/// - `site-analyzer -f data.csv ...`      -> `site-analyzer tui -f data.csv ...`
/// - `site-analyzer -v summary ...`       -> unchanged (global flags may precede the subcommand)
/// - `site-analyzer --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let names_a_command = argv.iter().skip(1).any(|arg| {
        matches!(
            arg.as_str(),
            "summary" | "report" | "guide" | "tui" | "help" | "-h" | "--help" | "-V" | "--version"
        )
    });
    if names_a_command {
        return argv;
    }

    // Nothing but flags: they belong to the TUI.
    if argv.get(1).is_none_or(|arg| arg.starts_with('-')) {
        argv.insert(1, "tui".to_string());
    }
    argv
}
