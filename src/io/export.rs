//! Export summary tables to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::report::table::{Cell, SummaryTable};

/// Write a summary table as CSV. Missing cells are left empty; numbers keep
/// their two-decimal rounding.
pub fn write_table_csv(path: &Path, table: &SummaryTable) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| AnalysisError::io(path, e))?;
    write_table(file, table)?;
    tracing::info!(path = %path.display(), rows = table.rows.len(), "table exported");
    Ok(())
}

/// Write a summary table as CSV into any writer.
pub fn write_table<W: std::io::Write>(writer: W, table: &SummaryTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    if table.show_index {
        header.push(table.index_label.clone());
    }
    header.extend(table.columns.iter().cloned());
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.cells.len() + 1);
        if table.show_index {
            record.push(row.label.clone());
        }
        record.extend(row.cells.iter().map(|cell| match cell {
            Cell::Number(v) => format!("{v:.2}"),
            Cell::Text(s) => s.clone(),
            Cell::Missing => String::new(),
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(|e| AnalysisError::Csv(e.into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::table::TableRow;

    #[test]
    fn exports_header_and_blank_missing_cells() {
        let table = SummaryTable {
            index_label: "Figure".into(),
            columns: vec!["Grid".into(), "Solar".into()],
            rows: vec![TableRow {
                label: "Energy losses (kWh)".into(),
                cells: vec![Cell::Missing, Cell::Number(-1.5)],
            }],
            show_index: true,
        };
        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Figure,Grid,Solar\nEnergy losses (kWh),,-1.50\n");
    }
}
