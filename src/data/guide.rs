//! Input format guide and example dataset.

use std::path::Path;

use crate::domain::{CANONICAL_COLUMNS, COLUMN_COUNT};
use crate::error::{AnalysisError, Result};

/// A small dataset covering every column and several status values.
pub const EXAMPLE_ROWS: [[&str; COLUMN_COUNT]; 4] = [
    [
        "2025-07-10", "08:00", "5.2", "1.3", "3.4", "9.9", "1.1", "0.5", "2.8", "3.0", "4.5",
        "on", "normal", "excellent", "normal",
    ],
    [
        "2025-08-18", "08:10", "5.3", "1.4", "3.6", "10.1", "1.2", "0.6", "2.9", "3.2", "4.7",
        "on", "under-regime", "critical", "grid-fault",
    ],
    [
        "2025-10-10", "13:20", "5.4", "1.2", "3.7", "10.3", "1.3", "0.4", "3.0", "3.3", "4.8",
        "off", "off", "poor", "client-curtailment",
    ],
    [
        "2025-12-03", "18:00", "5.4", "1.2", "3.7", "10.3", "1.3", "0.4", "3.0", "3.3", "4.8",
        "off", "off", "tolerable", "client-curtailment",
    ],
];

/// The example dataset as CSV text (header + rows).
pub fn example_csv() -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CANONICAL_COLUMNS)?;
    for row in &EXAMPLE_ROWS {
        wtr.write_record(row)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AnalysisError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn write_example_csv(path: &Path) -> Result<()> {
    let text = example_csv()?;
    std::fs::write(path, text).map_err(|e| AnalysisError::io(path, e))
}

/// Human-readable description of the expected input file.
pub fn format_guide() -> String {
    let mut out = String::new();
    out.push_str("Expected file format\n");
    out.push_str("====================\n\n");
    out.push_str(&format!(
        "A .csv (comma or semicolon separated) or spreadsheet (.xlsx, .xlsm, .xls, .ods)\n\
         file with a header row and exactly {COLUMN_COUNT} columns, in this order.\n\
         Header names are ignored; columns are read by position.\n\n"
    ));
    for (i, name) in CANONICAL_COLUMNS.iter().enumerate() {
        out.push_str(&format!("{:>3}. {name}\n", i + 1));
    }
    out.push_str(
        "\nColumn details:\n\
         - date: YYYY-MM-DD\n\
         - time: HH:MM (one reading every 10 minutes)\n\
         - power_*: power in kW\n\
         - energy_*: energy in kWh\n\
         - status_grid: on | off\n\
         - status_genset: off | normal | under-regime\n\
         - status_solar: critical | poor | tolerable | excellent\n\
         - status_installation: grid-fault | client-curtailment | normal | (empty)\n\
         \n\
         Status text is case and accent insensitive; empty cells count as 'unknown'.\n\
         Numeric cells that cannot be read are ignored and reported as warnings.\n\n",
    );
    out.push_str("Example:\n");
    out.push_str(&CANONICAL_COLUMNS.join(","));
    out.push('\n');
    for row in &EXAMPLE_ROWS {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
