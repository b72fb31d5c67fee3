//! End-to-end runs over files on disk: ingest, period selection, report.

use std::fs;

use chrono::NaiveDate;
use site_analyzer::app::pipeline::{AppState, ReportRequest, analyze, generate_report, require_dataset};
use site_analyzer::chart::SvgChartRenderer;
use site_analyzer::data::write_example_csv;
use site_analyzer::domain::{Channel, ReportConfig, Status, StatusSynonyms};
use site_analyzer::error::AnalysisError;
use site_analyzer::io::ingest::{IngestOptions, load_dataset};
use site_analyzer::report::table::{Cell, ROW_ENERGY_LOSSES, ROW_OPERATING_HOURS, ROW_THEORETICAL_ENERGY};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn example_file_loads_without_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example.csv");
    write_example_csv(&path).unwrap();

    let ingest = load_dataset(&path, &IngestOptions::default()).unwrap();
    assert_eq!(ingest.rows_read, 4);
    assert!(ingest.warnings.is_empty());
    for reading in ingest.dataset.readings() {
        for channel in Channel::ALL {
            assert!(channel.power(reading).is_some());
        }
    }
}

#[test]
fn example_file_analysis_fills_every_applicable_cell() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example.csv");
    write_example_csv(&path).unwrap();

    let mut state = AppState::new("Site", StatusSynonyms::default());
    state.load(&path).unwrap();
    let analysis = analyze(require_dataset(&state).unwrap(), None, None, None).unwrap();

    // Only the cells that never apply are blank: load operating hours, and
    // theoretical energy and losses outside the solar column.
    let missing: Vec<(&str, &str)> = analysis
        .synthesis
        .rows
        .iter()
        .flat_map(|row| {
            row.cells
                .iter()
                .zip(&analysis.synthesis.columns)
                .filter(|(cell, _)| cell.is_missing())
                .map(move |(_, column)| (row.label.as_str(), column.as_str()))
        })
        .collect();
    assert_eq!(
        missing,
        vec![
            (ROW_OPERATING_HOURS, "Installation"),
            (ROW_THEORETICAL_ENERGY, "Grid"),
            (ROW_THEORETICAL_ENERGY, "Genset"),
            (ROW_THEORETICAL_ENERGY, "Installation"),
            (ROW_ENERGY_LOSSES, "Grid"),
            (ROW_ENERGY_LOSSES, "Genset"),
            (ROW_ENERGY_LOSSES, "Installation"),
        ]
    );
    assert!(matches!(
        analysis.synthesis.cell(ROW_THEORETICAL_ENERGY, "Solar"),
        Some(Cell::Number(_))
    ));

    let dominant: Vec<&str> = Channel::ALL
        .iter()
        .map(|&channel| analysis.aggregates.dominant(channel).as_str())
        .collect();
    assert_eq!(dominant, ["on", "normal", "excellent", "client-curtailment"]);
}

#[test]
fn production_only_report_has_one_section() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("example.csv");
    write_example_csv(&data).unwrap();

    let mut state = AppState::new("North plant", StatusSynonyms::default());
    state.load(&data).unwrap();
    let analysis = analyze(require_dataset(&state).unwrap(), None, None, None).unwrap();

    let request = ReportRequest {
        site: state.site.clone(),
        logo: None,
        out: Some(dir.path().join("report.html")),
        config: ReportConfig {
            operating_status: false,
            evolution: false,
            ..ReportConfig::default()
        },
    };
    let path = generate_report(&analysis, &request, &SvgChartRenderer::default()).unwrap();
    let html = fs::read_to_string(path).unwrap();

    assert_eq!(html.matches("<section").count(), 1);
    assert!(html.contains("Analysis report North plant"));
    assert!(html.contains("Analysis period: 2025-07-10 → 2025-12-03"));
    assert_eq!(html.matches("data:image/svg+xml;base64,").count(), 1);
}

#[test]
fn wrong_column_count_is_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.csv");
    fs::write(&path, "date,time,grid\n2025-07-10,08:00,1.0\n").unwrap();

    let err = load_dataset(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::Schema { found: 3, .. }));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.txt");
    fs::write(&path, "irrelevant").unwrap();

    let err = load_dataset(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedFormat { .. }));
}

#[test]
fn reversed_period_keeps_the_loaded_data() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("example.csv");
    write_example_csv(&data).unwrap();

    let mut state = AppState::new("Site", StatusSynonyms::default());
    state.load(&data).unwrap();
    let err = analyze(
        require_dataset(&state).unwrap(),
        Some(date("2025-11-01")),
        Some(date("2025-08-01")),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, AnalysisError::Period { .. }));
    assert_eq!(state.dataset().map(|d| d.len()), Some(4));

    // A failed load leaves the previous data in place too.
    assert!(state.load(&dir.path().join("missing.csv")).is_err());
    assert_eq!(state.dataset().map(|d| d.len()), Some(4));
}

#[test]
fn synonyms_file_extends_status_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    let synonyms_path = dir.path().join("synonyms.json");
    fs::write(&synonyms_path, r#"{"Délestage client": "client-curtailment"}"#).unwrap();
    let synonyms = StatusSynonyms::from_json_file(&synonyms_path).unwrap();

    assert_eq!(
        synonyms.normalize(Some("DELESTAGE CLIENT")),
        Status::known("client-curtailment")
    );
}
