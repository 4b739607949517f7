use serde::{Serialize, Serializer};
use std::fmt::Write as _;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

use crate::errors::{ScanError, ScanResult};
use crate::frequency::WordCount;
use crate::metrics::ScanStats;

/// Outcome of a finished scan
#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// Most frequent words, by count descending then word ascending
    pub top: Vec<WordCount>,
    /// Number of distinct words seen
    pub distinct_words: usize,
    /// Number of words seen, duplicates included
    pub total_words: u64,
    pub stats: ScanStats,
    /// Recoverable problems met along the way
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<ScanError>,
}

fn serialize_errors<S: Serializer>(errors: &[ScanError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

impl Report {
    /// One `<word> <count>` line per ranked word
    pub fn render_plain(&self) -> String {
        let mut out = String::new();
        for entry in &self.top {
            let _ = writeln!(out, "{} {}", entry.word, entry.count);
        }
        out
    }

    pub fn to_json(&self) -> ScanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Collects recoverable errors from concurrent tasks.
#[derive(Debug, Default)]
pub struct ErrorLog {
    errors: Mutex<Vec<ScanError>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `err` and keeps it for the report.
    pub fn push(&self, err: ScanError) {
        warn!("{}", err);
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err);
    }

    pub fn len(&self) -> usize {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_inner(self) -> Vec<ScanError> {
        self.errors
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
