//! Formatted terminal output for the `summary` command.
//!
//! Formatting lives here so the aggregation code stays free of presentation
//! and output changes stay localized.

use crate::aggregate::{HourlyEnergy, StatusDistribution};
use crate::domain::Period;
use crate::io::ingest::IngestedData;
use crate::report::table::SummaryTable;

/// Header describing the loaded file and the selected period.
pub fn format_run_header(site: &str, ingest: &IngestedData, period: &Period, rows: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== site-analyzer - Analysis report {site} ===\n"));
    out.push_str(&format!("Source: {}\n", ingest.source));
    out.push_str(&format!(
        "Rows: {} read | {} in period | {} coercion warning(s)\n",
        ingest.rows_read,
        rows,
        ingest.warnings.len()
    ));
    out.push_str(&format!(
        "Analysis period: {} → {}\n",
        period.start(),
        period.end()
    ));
    out.push('\n');
    out
}

/// First `limit` coercion warnings, one per line.
pub fn format_warnings(ingest: &IngestedData, limit: usize) -> String {
    let mut out = String::new();
    if ingest.warnings.is_empty() {
        return out;
    }
    out.push_str("Values ignored during import:\n");
    for w in ingest.warnings.iter().take(limit) {
        out.push_str(&format!("  line {:>5} {:<26} '{}'\n", w.line, w.column, w.value));
    }
    if ingest.warnings.len() > limit {
        out.push_str(&format!("  ... and {} more\n", ingest.warnings.len() - limit));
    }
    out.push('\n');
    out
}

pub fn format_table(title: &str, table: &SummaryTable) -> String {
    let mut out = String::new();
    out.push_str(&format!("{title}:\n"));

    let mut header = String::new();
    if table.show_index {
        header.push_str(&format!("{:<26} ", table.index_label));
    }
    for column in &table.columns {
        header.push_str(&format!("{column:>14} "));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let width = header.trim_end().chars().count();
    out.push_str(&"-".repeat(width));
    out.push('\n');

    for row in &table.rows {
        let mut line = String::new();
        if table.show_index {
            line.push_str(&format!("{:<26} ", truncate(&row.label, 26)));
        }
        for cell in &row.cells {
            line.push_str(&format!("{:>14} ", truncate(&cell.display(), 14)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push('\n');
    out
}

pub fn format_distribution(distribution: &StatusDistribution) -> String {
    let mut out = String::from("Installation status distribution:\n");
    if distribution.is_empty() {
        out.push_str("  (no readings)\n\n");
        return out;
    }
    let total = distribution.total() as f64;
    for (status, count) in distribution.entries() {
        out.push_str(&format!(
            "  {:<24} {:>6} {:>6.1}%\n",
            truncate(status.as_str(), 24),
            count,
            *count as f64 / total * 100.0
        ));
    }
    out.push('\n');
    out
}

pub fn format_hourly(hours: &[HourlyEnergy]) -> String {
    let mut out = String::from("Solar energy by hour (kWh):\n");
    out.push_str(&format!("{:<6} {:>12} {:>12}\n", "hour", "actual", "theoretical"));
    out.push_str(&format!("{:-<6} {:-<12} {:-<12}\n", "", "", ""));
    for h in hours {
        out.push_str(&format!(
            "{:<6} {:>12.2} {:>12.2}\n",
            h.label(),
            h.actual,
            h.theoretical
        ));
    }
    out.push('\n');
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;
    use crate::report::table::{Cell, TableRow};

    #[test]
    fn tables_align_and_show_placeholders() {
        let table = SummaryTable {
            index_label: "Figure".into(),
            columns: vec!["Grid".into(), "Solar".into()],
            rows: vec![TableRow {
                label: "Peak power (kW)".into(),
                cells: vec![Cell::Number(3.5), Cell::Missing],
            }],
            show_index: true,
        };
        let text = format_table("Production", &table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Production:");
        assert!(lines[1].starts_with("Figure"));
        assert!(lines[2].chars().all(|c| c == '-'));
        assert!(lines[3].starts_with("Peak power (kW)"));
        assert!(lines[3].contains("3.50"));
        assert!(lines[3].ends_with('—'));
        assert_eq!(lines[1].chars().count(), lines[3].chars().count());
    }

    #[test]
    fn distribution_lists_percentages() {
        let statuses = vec![Status::known("normal"), Status::known("normal"), Status::Unknown];
        let text = format_distribution(&StatusDistribution::from_statuses(&statuses));
        assert!(text.contains("normal"));
        assert!(text.contains("66.7%"));
        assert!(text.contains("unknown"));
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
