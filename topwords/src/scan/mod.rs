//! The concurrent walk-and-count pipeline.
//!
//! A [`Coordinator`] owns one [`ScanState`] per run and hands references to it
//! to a [`TreeWalker`] running on a dedicated rayon pool. The walker spawns a
//! scope task per subdirectory and per eligible file; file tasks run a
//! [`FileScanner`], which feeds every word into the shared
//! [`FrequencyTable`] and [`TopKSelector`]. The rayon scope only returns once
//! every task it spawned, transitively, has finished, so when the walk
//! returns the shared state is final and the coordinator reads out the
//! ranking.
pub mod coordinator;
pub mod scanner;
pub mod walker;

pub use coordinator::{scan, Coordinator, CoordinatorState};
pub use scanner::FileScanner;
pub use walker::TreeWalker;

use crate::cancel::CancellationToken;
use crate::frequency::FrequencyTable;
use crate::metrics::ScanMetrics;
use crate::ranking::TopKSelector;
use crate::results::{ErrorLog, Report};

/// Everything tasks of a single run share
#[derive(Debug)]
pub struct ScanState {
    pub table: FrequencyTable,
    pub ranking: TopKSelector,
    pub metrics: ScanMetrics,
    pub errors: ErrorLog,
    pub cancel: CancellationToken,
}

impl ScanState {
    /// Creates state sized for `threads` concurrent writers.
    pub fn new(threads: usize, cancel: CancellationToken) -> Self {
        let shards = TopKSelector::shards_for(threads);
        Self {
            table: FrequencyTable::with_shards(shards),
            ranking: TopKSelector::with_shards(shards),
            metrics: ScanMetrics::new(),
            errors: ErrorLog::new(),
            cancel,
        }
    }

    /// Records one occurrence of an already normalized word.
    pub fn record(&self, word: &str) {
        self.record_n(word, 1);
    }

    /// Records `n` occurrences of an already normalized word.
    pub fn record_n(&self, word: &str, n: u64) {
        self.table.increment_by(word, n);
        self.ranking.record_n(word, n);
    }

    /// Freezes the state into a report with the `top` most frequent words.
    ///
    /// Must only be called after every writer has finished.
    pub fn into_report(self, top: usize) -> Report {
        let stats = self.metrics.get_stats();
        let distinct_words = self.table.len();
        let total_words = self.table.total();
        debug_assert_eq!(total_words, stats.tokens);

        let ranked = self.ranking.into_top_k(top);
        debug_assert!(ranked
            .iter()
            .all(|entry| self.table.get(&entry.word) == Some(entry.count)));

        Report {
            top: ranked,
            distinct_words,
            total_words,
            stats,
            errors: self.errors.into_inner(),
        }
    }
}
