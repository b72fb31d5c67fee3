//! Error types.
//!
//! Library code returns [`AnalysisError`]; the binary converts it into an
//! [`AppError`] carrying a process exit code.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Failures raised by the ingest → aggregate → report pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("expected {expected} columns, found {found}{}", at_line(.line))]
    Schema {
        expected: usize,
        found: usize,
        line: Option<usize>,
    },
    #[error("line {line}: cannot parse timestamp '{value}' (expected YYYY-MM-DD and HH:MM)")]
    Parse { line: usize, value: String },
    #[error("the file contains no data rows")]
    EmptyDataset,
    #[error("the end date ({end}) must be on or after the start date ({start})")]
    Period { start: NaiveDate, end: NaiveDate },
    #[error("chart export failed: {0}")]
    ChartExport(String),
    #[error("report template error: {0}")]
    Template(#[from] askama::Error),
    #[error("unsupported file type '{}' (expected .csv, .xlsx, .xlsm, .xls or .ods)", .path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("cannot access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("invalid status synonyms: {0}")]
    Synonyms(String),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Exit code used when the error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalysisError::Period { .. } => 3,
            AnalysisError::ChartExport(_) | AnalysisError::Template(_) => 4,
            _ => 2,
        }
    }
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" on line {line}"),
        None => String::new(),
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_message_mentions_line_when_known() {
        let err = AnalysisError::Schema {
            expected: 15,
            found: 14,
            line: Some(7),
        };
        assert_eq!(err.to_string(), "expected 15 columns, found 14 on line 7");

        let err = AnalysisError::Schema {
            expected: 15,
            found: 16,
            line: None,
        };
        assert_eq!(err.to_string(), "expected 15 columns, found 16");
    }

    #[test]
    fn period_errors_map_to_their_own_exit_code() {
        let start = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 7, 9).unwrap();
        let app: AppError = AnalysisError::Period { start, end }.into();
        assert_eq!(app.exit_code(), 3);
        assert!(app.to_string().contains("2025-07-09"));
    }
}
