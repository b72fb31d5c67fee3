//! File ingest and normalization.
//!
//! This module turns an uploaded CSV or spreadsheet into a [`Dataset`]:
//!
//! - **Strict schema**: exactly 15 positional columns; header names are ignored
//! - **Strict timestamps**: `date + " " + time + ":00"` must parse as
//!   `YYYY-MM-DD HH:MM:SS`, otherwise the whole load fails
//! - **Lenient numbers**: unparseable numeric cells become missing values and
//!   are reported as [`CoercionWarning`]s
//! - **Folded statuses**: see [`crate::domain::status`]
//!
//! No partial state is produced on error; callers either get a complete
//! [`IngestedData`] or an [`AnalysisError`].

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::{CANONICAL_COLUMNS, COLUMN_COUNT, Dataset, Reading, StatusSynonyms};
use crate::error::{AnalysisError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Supported input containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text (`.csv`); comma or semicolon separated.
    Delimited,
    /// Workbook (`.xlsx`, `.xlsm`, `.xls`, `.ods`); the first sheet is read.
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(SourceFormat::Delimited),
            Some("xlsx" | "xlsm" | "xls" | "ods") => Ok(SourceFormat::Spreadsheet),
            _ => Err(AnalysisError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Options applied while normalizing rows.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub synonyms: StatusSynonyms,
}

/// A numeric cell that could not be coerced and was replaced by a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionWarning {
    pub line: usize,
    pub column: &'static str,
    pub value: String,
}

/// Ingest output: the dataset plus what happened while building it.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: Dataset,
    pub warnings: Vec<CoercionWarning>,
    pub rows_read: usize,
    /// Human-readable origin (file path) for headers and logs.
    pub source: String,
}

/// Raw cells of one data row, with the 1-based line it came from.
#[derive(Debug, Clone)]
struct RawRow {
    line: usize,
    cells: Vec<String>,
}

/// Read and normalize a file, picking the reader from its extension.
pub fn load_dataset(path: &Path, options: &IngestOptions) -> Result<IngestedData> {
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|e| AnalysisError::io(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), ?format, "read input file");

    let mut data = parse_bytes(&bytes, format, options)?;
    data.source = path.display().to_string();
    info!(
        source = %data.source,
        rows = data.rows_read,
        warnings = data.warnings.len(),
        "dataset loaded"
    );
    Ok(data)
}

/// Normalize an in-memory byte stream.
pub fn parse_bytes(bytes: &[u8], format: SourceFormat, options: &IngestOptions) -> Result<IngestedData> {
    let rows = match format {
        SourceFormat::Delimited => read_delimited(bytes)?,
        SourceFormat::Spreadsheet => read_spreadsheet(bytes)?,
    };
    normalize_rows(rows, options)
}

fn read_delimited(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let delimiter = sniff_delimiter(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let found = reader.headers()?.len();
    if found != COLUMN_COUNT {
        return Err(AnalysisError::Schema {
            expected: COLUMN_COUNT,
            found,
            line: None,
        });
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // +2: header is line 1 and records are 1-based.
        let line = record
            .position()
            .map_or(idx + 2, |pos| pos.line() as usize);
        if record.len() != COLUMN_COUNT {
            return Err(AnalysisError::Schema {
                expected: COLUMN_COUNT,
                found: record.len(),
                line: Some(line),
            });
        }
        rows.push(RawRow {
            line,
            cells: record.iter().map(str::to_string).collect(),
        });
    }
    Ok(rows)
}

/// Semicolon-separated exports are common with European locales; pick
/// whichever separator dominates the header line.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    let commas = header.iter().filter(|&&b| b == b',').count();
    let semicolons = header.iter().filter(|&&b| b == b';').count();
    if semicolons > commas { b';' } else { b',' }
}

fn read_spreadsheet(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| AnalysisError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalysisError::Spreadsheet("the workbook has no sheets".to_string()))?
        .map_err(|e| AnalysisError::Spreadsheet(e.to_string()))?;

    let mut rows_iter = range.rows();
    if rows_iter.next().is_none() {
        return Err(AnalysisError::EmptyDataset);
    }
    let found = range.width();
    if found != COLUMN_COUNT {
        return Err(AnalysisError::Schema {
            expected: COLUMN_COUNT,
            found,
            line: None,
        });
    }

    let rows = rows_iter
        .enumerate()
        .map(|(idx, cells)| RawRow {
            line: idx + 2,
            cells: cells.iter().map(cell_text).collect(),
        })
        .filter(|row| row.cells.iter().any(|c| !c.is_empty()))
        .collect();
    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::DateTimeIso(s) => iso_datetime_text(s.trim()),
        Data::Float(v) => format_number(*v),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(dt) => excel_serial_text(dt.as_f64()),
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Render a date/time cell the way the text columns expect it:
/// whole days as `YYYY-MM-DD`, pure times as `HH:MM`.
fn excel_serial_text(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return serial.to_string();
    };
    let total_secs = (serial * 86_400.0).round() as i64;
    let Some(dt) = epoch.checked_add_signed(Duration::seconds(total_secs)) else {
        return serial.to_string();
    };
    format_cell_datetime(dt, total_secs < 86_400, total_secs % 86_400 == 0)
}

fn iso_datetime_text(s: &str) -> String {
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            let midnight = dt.time() == chrono::NaiveTime::MIN;
            return format_cell_datetime(dt, false, midnight);
        }
    }
    s.to_string()
}

fn format_cell_datetime(dt: NaiveDateTime, time_only: bool, date_only: bool) -> String {
    if time_only {
        dt.format("%H:%M").to_string()
    } else if date_only {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M").to_string()
    }
}

fn normalize_rows(rows: Vec<RawRow>, options: &IngestOptions) -> Result<IngestedData> {
    if rows.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    let rows_read = rows.len();
    let mut warnings = Vec::new();
    let mut readings = Vec::with_capacity(rows_read);

    for row in &rows {
        readings.push(normalize_row(row, options, &mut warnings)?);
    }

    if !warnings.is_empty() {
        warn!(
            count = warnings.len(),
            first_line = warnings[0].line,
            "non-numeric values replaced by missing values"
        );
    }

    Ok(IngestedData {
        dataset: Dataset::new(readings),
        warnings,
        rows_read,
        source: String::from("<memory>"),
    })
}

fn normalize_row(row: &RawRow, options: &IngestOptions, warnings: &mut Vec<CoercionWarning>) -> Result<Reading> {
    let cells = &row.cells;
    let timestamp = parse_timestamp(&cells[0], &cells[1]).ok_or_else(|| AnalysisError::Parse {
        line: row.line,
        value: format!("{} {}", cells[0], cells[1]),
    })?;

    let mut number = |idx: usize| coerce_numeric(row, idx, warnings);
    let power_grid = number(2);
    let power_genset = number(3);
    let power_solar = number(4);
    let power_load = number(5);
    let energy_grid = number(6);
    let energy_genset = number(7);
    let energy_solar = number(8);
    let energy_solar_theoretical = number(9);
    let energy_load = number(10);

    let status = |idx: usize| {
        let cell = cells[idx].as_str();
        options.synonyms.normalize((!cell.is_empty()).then_some(cell))
    };

    Ok(Reading {
        timestamp,
        power_grid,
        power_genset,
        power_solar,
        power_load,
        energy_grid,
        energy_genset,
        energy_solar,
        energy_solar_theoretical,
        energy_load,
        status_grid: status(11),
        status_genset: status(12),
        status_solar: status(13),
        status_installation: status(14),
    })
}

/// Merge a `YYYY-MM-DD` date and an `HH:MM` time.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let merged = format!("{} {}:00", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&merged, TIMESTAMP_FORMAT).ok()
}

fn coerce_numeric(row: &RawRow, idx: usize, warnings: &mut Vec<CoercionWarning>) -> Option<f64> {
    let raw = row.cells[idx].trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            warnings.push(CoercionWarning {
                line: row.line,
                column: CANONICAL_COLUMNS[idx],
                value: raw.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;

    const HEADER: &str = "date,heure,p1,p2,p3,p4,e1,e2,e3,e4,e5,s1,s2,s3,s4\n";

    fn parse(body: &str) -> Result<IngestedData> {
        let text = format!("{HEADER}{body}");
        parse_bytes(text.as_bytes(), SourceFormat::Delimited, &IngestOptions::default())
    }

    #[test]
    fn merges_date_and_time() {
        let ts = parse_timestamp("2025-07-10", "08:10").unwrap();
        assert_eq!(
            ts,
            NaiveDateTime::parse_from_str("2025-07-10 08:10:00", TIMESTAMP_FORMAT).unwrap()
        );
        assert!(parse_timestamp("10/07/2025", "08:10").is_none());
        assert!(parse_timestamp("2025-07-10", "08:10:00").is_none());
        assert!(parse_timestamp("2025-07-10", "8h10").is_none());
    }

    #[test]
    fn rejects_wrong_column_count() {
        let text = "a,b,c\n1,2,3\n";
        let err = parse_bytes(text.as_bytes(), SourceFormat::Delimited, &IngestOptions::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Schema { found: 3, line: None, .. }));
    }

    #[test]
    fn rejects_short_rows() {
        let err = parse("2025-07-10,08:00,1,2,3\n").unwrap_err();
        assert!(matches!(err, AnalysisError::Schema { found: 5, line: Some(2), .. }));
    }

    #[test]
    fn bad_time_fails_the_whole_load() {
        let body = concat!(
            "2025-07-10,08:00,1,1,1,1,1,1,1,1,1,on,normal,excellent,normal\n",
            "2025-07-10,8h10,1,1,1,1,1,1,1,1,1,on,normal,excellent,normal\n",
        );
        let err = parse(body).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { line: 3, .. }));
    }

    #[test]
    fn non_numeric_cells_become_missing_with_warning() {
        let body = "2025-07-10,08:00,n/a,1,,1,1,1,1,1,1,on,normal,excellent,normal\n";
        let data = parse(body).unwrap();
        let r = &data.dataset.readings()[0];
        assert_eq!(r.power_grid, None);
        assert_eq!(r.power_solar, None);
        assert_eq!(r.power_genset, Some(1.0));
        assert_eq!(
            data.warnings,
            vec![CoercionWarning {
                line: 2,
                column: "power_grid",
                value: "n/a".to_string(),
            }]
        );
    }

    #[test]
    fn statuses_are_normalized_and_rows_sorted() {
        let body = concat!(
            "2025-07-10,08:10,1,1,1,1,1,1,1,1,1,ON,Éteint,Mauvaise,\n",
            "2025-07-10,08:00,1,1,1,1,1,1,1,1,1,off,normal,critique,RAS\n",
        );
        let data = parse(body).unwrap();
        let rows = data.dataset.readings();
        assert_eq!(data.rows_read, 2);
        assert_eq!(rows[0].status_grid, Status::known("off"));
        assert_eq!(rows[0].status_installation, Status::known("normal"));
        assert_eq!(rows[1].status_grid, Status::known("on"));
        assert_eq!(rows[1].status_genset, Status::known("off"));
        assert_eq!(rows[1].status_solar, Status::known("poor"));
        assert_eq!(rows[1].status_installation, Status::Unknown);
    }

    #[test]
    fn accepts_semicolon_separated_files() {
        let text = concat!(
            "date;heure;p1;p2;p3;p4;e1;e2;e3;e4;e5;s1;s2;s3;s4\n",
            "2025-07-10;08:00;5.2;1.3;3.4;9.9;1.1;0.5;2.8;3.0;4.5;on;normal;excellent;normal\n",
        );
        let data = parse_bytes(text.as_bytes(), SourceFormat::Delimited, &IngestOptions::default())
            .unwrap();
        assert_eq!(data.dataset.readings()[0].power_solar, Some(3.4));
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyDataset));
    }

    #[test]
    fn spreadsheet_serials_render_as_text_columns() {
        assert_eq!(excel_serial_text(45848.0), "2025-07-10");
        assert_eq!(excel_serial_text(1.0 / 3.0), "08:00");
        assert_eq!(iso_datetime_text("2025-07-10T00:00:00"), "2025-07-10");
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(5.25), "5.25");
    }

    /// An xlsx workbook with one sheet; numeric-looking cells become numbers
    /// and empty cells are left unwritten.
    fn workbook(rows: &[&[&str]]) -> Vec<u8> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let sheet = book.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                if cell.is_empty() {
                    continue;
                }
                match cell.parse::<f64>() {
                    Ok(v) => sheet.write_number(r, c, v).unwrap(),
                    Err(_) => sheet.write_string(r, c, *cell).unwrap(),
                };
            }
        }
        book.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_a_workbook_sheet() {
        let header: Vec<&str> = HEADER.trim_end().split(',').collect();
        let bytes = workbook(&[
            &header,
            &[
                "2025-07-10", "08:10", "1.5", "0", "3.25", "4", "1", "0", "2", "2.5", "3", "ON",
                "Éteint", "excellent", "",
            ],
            &[
                "2025-07-10", "08:00", "2", "0", "3", "4", "1", "0", "2", "2.5", "3", "on", "off",
                "excellent", "normal",
            ],
        ]);

        let data = parse_bytes(&bytes, SourceFormat::Spreadsheet, &IngestOptions::default()).unwrap();
        assert_eq!(data.rows_read, 2);
        assert!(data.warnings.is_empty());

        let later = &data.dataset.readings()[1];
        assert_eq!(
            later.timestamp,
            NaiveDateTime::parse_from_str("2025-07-10 08:10:00", TIMESTAMP_FORMAT).unwrap()
        );
        assert_eq!(later.power_grid, Some(1.5));
        assert_eq!(later.power_solar, Some(3.25));
        assert_eq!(later.status_grid, Status::known("on"));
        assert_eq!(later.status_genset, Status::known("off"));
        assert_eq!(later.status_installation, Status::Unknown);
    }

    #[test]
    fn workbook_with_fourteen_columns_is_a_schema_error() {
        let header: Vec<&str> = HEADER.trim_end().split(',').take(14).collect();
        let row = [
            "2025-07-10", "08:00", "1", "1", "1", "1", "1", "1", "1", "1", "1", "on", "normal",
            "excellent",
        ];
        let bytes = workbook(&[&header, &row]);

        let err = parse_bytes(&bytes, SourceFormat::Spreadsheet, &IngestOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Schema { expected: COLUMN_COUNT, found: 14, line: None }
        ));
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("data/site.CSV")).unwrap(),
            SourceFormat::Delimited
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("site.xlsx")).unwrap(),
            SourceFormat::Spreadsheet
        );
        assert!(SourceFormat::from_path(Path::new("site.txt")).is_err());
    }
}
