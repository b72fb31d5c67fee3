//! Tracing subscriber setup.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SITE_ANALYZER_LOG";

/// Log file used while the TUI owns the terminal.
pub const TUI_LOG_FILE: &str = "site-analyzer.log";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to a file; nothing is installed unless a filter was asked for.
    File(PathBuf),
}

/// Filter directive: `SITE_ANALYZER_LOG`, then `RUST_LOG`, then the default.
///
/// `verbose` turns the default into `debug`. Returns `None` when nothing was
/// requested explicitly and `quiet_default` is set.
fn filter_from_env(verbose: bool, quiet_default: bool) -> Option<EnvFilter> {
    if let Ok(directive) = std::env::var(LOG_ENV) {
        return Some(EnvFilter::try_new(&directive).unwrap_or_else(|err| {
            eprintln!("invalid {LOG_ENV} directive ({err}); defaulting to warn");
            EnvFilter::new("warn")
        }));
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Some(filter);
    }
    match (verbose, quiet_default) {
        (true, _) => Some(EnvFilter::new("site_analyzer=debug")),
        (false, true) => None,
        (false, false) => Some(EnvFilter::new("warn")),
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init_tracing(verbose: bool, target: &LogTarget) {
    match target {
        LogTarget::Stderr => {
            let Some(filter) = filter_from_env(verbose, false) else {
                return;
            };
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init()
                .ok();
        }
        LogTarget::File(path) => {
            let Some(filter) = filter_from_env(verbose, true) else {
                return;
            };
            let Some(file) = open_log_file(path) else {
                return;
            };
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .ok();
            debug!(path = %path.display(), "tracing initialised");
        }
    }
}

fn open_log_file(path: &Path) -> Option<File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()
}
