//! Status normalization.
//!
//! Raw status cells are folded to plain lowercase ASCII (accents stripped via
//! NFKD), then mapped through a [`StatusSynonyms`] table so that spelling
//! variants and the French vocabulary used by older exports land on one
//! canonical value per state.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{AnalysisError, Result};

/// Text used when the unknown sentinel is displayed.
pub const UNKNOWN_LABEL: &str = "unknown";

/// A normalized status value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Known(String),
    /// Empty, missing or unparseable cell.
    Unknown,
}

impl Status {
    pub fn known(value: impl Into<String>) -> Self {
        Status::Known(value.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Known(value) => value,
            Status::Unknown => UNKNOWN_LABEL,
        }
    }

    /// `true` when this is the known value `value`.
    pub fn is(&self, value: &str) -> bool {
        matches!(self, Status::Known(v) if v == value)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fold raw text: NFKD, drop non-ASCII, trim, lowercase.
pub fn fold_status_text(raw: &str) -> String {
    let ascii: String = raw.nfkd().filter(char::is_ascii).collect();
    ascii.trim().to_ascii_lowercase()
}

/// Map of folded spellings to canonical status values.
///
/// Targets are never keys themselves, which keeps [`StatusSynonyms::normalize`]
/// idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSynonyms {
    map: HashMap<String, String>,
}

const DEFAULT_SYNONYMS: [(&str, &str); 8] = [
    ("mauvaise", "poor"),
    ("mauvais", "poor"),
    ("critique", "critical"),
    ("eteint", "off"),
    ("sous-regime", "under-regime"),
    ("panne nea", "grid-fault"),
    ("ecretage client", "client-curtailment"),
    ("ras", "normal"),
];

impl Default for StatusSynonyms {
    fn default() -> Self {
        let mut synonyms = Self::empty();
        for (from, to) in DEFAULT_SYNONYMS {
            synonyms.map.insert(from.to_string(), to.to_string());
        }
        synonyms
    }
}

impl StatusSynonyms {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Add a synonym. Both sides are folded first.
    pub fn insert(&mut self, from: &str, to: &str) -> Result<()> {
        let from = fold_status_text(from);
        let to = fold_status_text(to);
        if from.is_empty() || to.is_empty() {
            return Err(AnalysisError::Synonyms(
                "synonym entries must not be empty".to_string(),
            ));
        }
        if from == to {
            return Ok(());
        }
        if self.map.contains_key(&to) {
            return Err(AnalysisError::Synonyms(format!(
                "'{to}' is both a synonym and a target"
            )));
        }
        if self.map.values().any(|target| *target == from) {
            return Err(AnalysisError::Synonyms(format!(
                "'{from}' is already a synonym target"
            )));
        }
        self.map.insert(from, to);
        Ok(())
    }

    /// Load a JSON object (`{"spelling": "canonical", ...}`) on top of the defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
        let extra: HashMap<String, String> = serde_json::from_reader(file)
            .map_err(|e| AnalysisError::Synonyms(format!("{}: {e}", path.display())))?;

        let mut synonyms = Self::default();
        let mut entries: Vec<_> = extra.into_iter().collect();
        entries.sort();
        for (from, to) in entries {
            synonyms.insert(&from, &to)?;
        }
        Ok(synonyms)
    }

    /// Normalize one raw cell.
    pub fn normalize(&self, raw: Option<&str>) -> Status {
        let Some(raw) = raw else {
            return Status::Unknown;
        };
        let folded = fold_status_text(raw);
        let canonical = self.map.get(&folded).cloned().unwrap_or(folded);
        if canonical.is_empty() || canonical == UNKNOWN_LABEL {
            Status::Unknown
        } else {
            Status::Known(canonical)
        }
    }
}
