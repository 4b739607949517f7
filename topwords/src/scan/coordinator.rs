use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{FileScanner, ScanState, TreeWalker};
use crate::cancel::CancellationToken;
use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};
use crate::results::Report;

/// Lifecycle of a [`Coordinator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Walking,
    Draining,
    Reporting,
    Done,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Walking => "walking",
            Self::Draining => "draining",
            Self::Reporting => "reporting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Runs one scan from root validation to the final ranking.
///
/// The shared table and ranking live only for the duration of [`run`]; a
/// coordinator runs at most once.
///
/// [`run`]: Coordinator::run
#[derive(Debug)]
pub struct Coordinator {
    config: ScanConfig,
    state: CoordinatorState,
    cancel: CancellationToken,
}

impl Coordinator {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            state: CoordinatorState::Idle,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Token that stops the run at the next directory, file or read boundary
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn transition(&mut self, next: CoordinatorState) {
        debug!("Coordinator {} -> {}", self.state, next);
        self.state = next;
    }

    /// Validates the root, walks it on a worker pool and returns the report.
    pub fn run(&mut self) -> ScanResult<Report> {
        if self.state != CoordinatorState::Idle {
            return Err(ScanError::config_error(format!(
                "coordinator already {}",
                self.state
            )));
        }

        self.config.validate()?;
        let root = validate_root(&self.config.root_path)?;
        let threads = self.config.thread_count.get();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("topwords-worker-{}", i))
            .build()
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;

        info!(
            "Scanning {} for *{} files with {} threads",
            root.display(),
            self.config.file_suffix,
            threads
        );

        let shared = ScanState::new(threads, self.cancel.clone());
        self.transition(CoordinatorState::Walking);
        {
            let scanner = FileScanner::with_buffer_capacity(&shared, self.config.buffer_capacity);
            let walker = TreeWalker::new(&shared, scanner, &self.config.file_suffix);
            pool.install(|| walker.walk(&root));
        }

        // Every task has joined; nothing writes to the shared state any more.
        self.transition(CoordinatorState::Draining);
        if self.cancel.is_cancelled() {
            self.transition(CoordinatorState::Done);
            return Err(ScanError::Cancelled);
        }

        self.transition(CoordinatorState::Reporting);
        shared.metrics.log_stats();
        let report = shared.into_report(self.config.top);
        info!(
            "Scan complete: {} words, {} distinct, {} problems",
            report.total_words,
            report.distinct_words,
            report.errors.len()
        );

        self.transition(CoordinatorState::Done);
        Ok(report)
    }
}

/// Checks that `path` exists and is a directory.
pub fn validate_root(path: &Path) -> ScanResult<PathBuf> {
    let metadata = fs::metadata(path).map_err(|e| ScanError::invalid_root(path, e.to_string()))?;
    if !metadata.is_dir() {
        return Err(ScanError::invalid_root(path, "not a directory"));
    }
    Ok(path.to_path_buf())
}

/// Scans the tree described by `config` and returns its report
pub fn scan(config: &ScanConfig) -> ScanResult<Report> {
    Coordinator::new(config.clone()).run()
}
