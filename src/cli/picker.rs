//! Interactive data file picker.
//!
//! Used when the TUI starts without `-f`. Every candidate under the working
//! directory is test-loaded, so the list shows which files are usable (rows,
//! date range) and why the others are not, before the terminal UI takes over.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::AppError;
use crate::io::ingest::{IngestOptions, SourceFormat, load_dataset};

/// Directory recursion depth for finding data files.
const SEARCH_DEPTH: usize = 4;

/// Directories never worth descending into.
const SKIPPED_DIRS: [&str; 3] = [".git", "target", "node_modules"];

/// What a test load of a candidate file found.
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    Ready {
        rows: usize,
        warnings: usize,
        first: Option<NaiveDate>,
        last: Option<NaiveDate>,
    },
    Unusable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub path: PathBuf,
    pub readiness: Readiness,
}

impl Candidate {
    pub fn check(path: PathBuf, options: &IngestOptions) -> Self {
        let readiness = match load_dataset(&path, options) {
            Ok(ingest) => Readiness::Ready {
                rows: ingest.rows_read,
                warnings: ingest.warnings.len(),
                first: ingest.dataset.min_date(),
                last: ingest.dataset.max_date(),
            },
            Err(err) => Readiness::Unusable(err.to_string()),
        };
        Self { path, readiness }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.readiness, Readiness::Ready { .. })
    }

    /// One line of the selection list.
    pub fn describe(&self) -> String {
        let name = display_path(&self.path);
        match &self.readiness {
            Readiness::Ready {
                rows,
                warnings,
                first,
                last,
            } => {
                let range = match (first, last) {
                    (Some(first), Some(last)) => format!("{first} → {last}"),
                    _ => "no dates".to_string(),
                };
                let mut line = format!("{name}  ({rows} rows, {range}");
                if *warnings > 0 {
                    line.push_str(&format!(", {warnings} import warnings"));
                }
                line.push(')');
                line
            }
            Readiness::Unusable(reason) => format!("{name}  [not usable: {reason}]"),
        }
    }
}

/// List data files under the working directory and let the user choose one.
pub fn prompt_for_data_path(options: &IngestOptions) -> Result<PathBuf, AppError> {
    let candidates: Vec<Candidate> = find_data_files(Path::new("."), SEARCH_DEPTH)
        .into_iter()
        .map(|path| Candidate::check(path, options))
        .collect();
    if candidates.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv or spreadsheet files found. Provide one with `site-analyzer tui -f <file>`.",
        ));
    }

    let stdin = io::stdin();
    choose(&candidates, options, &mut stdin.lock(), &mut io::stdout())
}

/// The selection dialogue over arbitrary input/output streams.
///
/// Accepts a list number or a path; `q` cancels. Unusable files are refused
/// with their load error and the question is asked again.
fn choose<R: BufRead, W: Write>(
    candidates: &[Candidate],
    options: &IngestOptions,
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf, AppError> {
    let io_err = |e: io::Error| AppError::new(2, format!("Terminal I/O failed: {e}"));

    writeln!(output, "Found {} data file(s):", candidates.len()).map_err(io_err)?;
    for (idx, candidate) in candidates.iter().enumerate() {
        writeln!(output, "{:>3}) {}", idx + 1, candidate.describe()).map_err(io_err)?;
    }

    loop {
        write!(
            output,
            "Select a file by number (1-{}) or type a path (q to quit): ",
            candidates.len()
        )
        .map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(AppError::new(
                2,
                "No input received. Provide a file with `site-analyzer tui -f <file>`.",
            ));
        }

        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        let picked = match answer.parse::<usize>() {
            Ok(n) if (1..=candidates.len()).contains(&n) => candidates[n - 1].clone(),
            Ok(n) => {
                writeln!(output, "Invalid choice: {n}.").map_err(io_err)?;
                continue;
            }
            Err(_) => Candidate::check(PathBuf::from(answer), options),
        };

        match picked.readiness {
            Readiness::Ready { .. } => return Ok(picked.path),
            Readiness::Unusable(reason) => {
                writeln!(output, "{}: {reason}", display_path(&picked.path)).map_err(io_err)?;
            }
        }
    }
}

/// Files with a readable extension, sorted by displayed path.
fn find_data_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![(root.to_path_buf(), 0usize)];

    while let Some((dir, depth)) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(kind) = entry.file_type() else {
                continue;
            };
            if kind.is_dir() {
                let skipped = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| SKIPPED_DIRS.contains(&n));
                if !skipped && depth < max_depth {
                    pending.push((path, depth + 1));
                }
            } else if kind.is_file() && SourceFormat::from_path(&path).is_ok() {
                found.push(path);
            }
        }
    }

    found.sort_by_key(|p| display_path(p));
    found
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::write_example_csv;

    fn answer(candidates: &[Candidate], typed: &str) -> (Result<PathBuf, AppError>, String) {
        let mut out = Vec::new();
        let result = choose(candidates, &IngestOptions::default(), &mut typed.as_bytes(), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn finds_csv_and_spreadsheets_but_skips_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.csv", "b.XLSX", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target").join("c.csv"), "").unwrap();

        let found = find_data_files(dir.path(), SEARCH_DEPTH);
        let names: Vec<_> = found
            .iter()
            .filter_map(|p| p.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.XLSX"]);
    }

    #[test]
    fn candidates_report_rows_or_the_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("site.csv");
        write_example_csv(&good).unwrap();
        let bad = dir.path().join("short.csv");
        fs::write(&bad, "date,time\n2025-07-10,08:00\n").unwrap();

        let good = Candidate::check(good, &IngestOptions::default());
        assert!(good.is_ready());
        assert!(good.describe().ends_with("(4 rows, 2025-07-10 → 2025-12-03)"));

        let bad = Candidate::check(bad, &IngestOptions::default());
        assert!(!bad.is_ready());
        assert!(bad.describe().contains("[not usable: expected 15 columns, found 2"));
    }

    #[test]
    fn unusable_choice_is_refused_until_a_ready_one_is_picked() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("site.csv");
        write_example_csv(&good).unwrap();
        let bad = dir.path().join("short.csv");
        fs::write(&bad, "date,time\n2025-07-10,08:00\n").unwrap();
        let candidates = vec![
            Candidate::check(bad, &IngestOptions::default()),
            Candidate::check(good.clone(), &IngestOptions::default()),
        ];

        let (result, transcript) = answer(&candidates, "1\n7\n2\n");
        assert_eq!(result.unwrap(), good);
        assert!(transcript.contains("expected 15 columns"));
        assert!(transcript.contains("Invalid choice: 7."));
    }

    #[test]
    fn typed_paths_and_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("typed.csv");
        write_example_csv(&good).unwrap();

        let typed = format!("{}\n", good.display());
        assert_eq!(answer(&[], &typed).0.unwrap(), good);

        let (result, _) = answer(&[], "notes.txt\nq\n");
        assert_eq!(result.unwrap_err().to_string(), "Canceled.");
        assert!(answer(&[], "").0.is_err());
    }
}
