use rayon::Scope;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::{FileScanner, ScanState};
use crate::errors::ScanError;
use crate::filters::is_eligible_file;

/// Walks a directory tree, one task per directory and per eligible file.
///
/// A directory task lists its own directory only. Every subdirectory it finds
/// is handed to a fresh task instead of being recursed into, so each
/// directory is read exactly once.
#[derive(Debug)]
pub struct TreeWalker<'a> {
    state: &'a ScanState,
    scanner: FileScanner<'a>,
    file_suffix: &'a str,
}

impl<'a> TreeWalker<'a> {
    pub fn new(state: &'a ScanState, scanner: FileScanner<'a>, file_suffix: &'a str) -> Self {
        Self {
            state,
            scanner,
            file_suffix,
        }
    }

    /// Walks `root` and blocks until every directory and file task spawned
    /// beneath it, however deep, has completed.
    ///
    /// Must run inside the thread pool the work should use (see
    /// [`rayon::ThreadPool::install`]).
    pub fn walk(&self, root: &Path) {
        rayon::scope(|scope| self.walk_dir(scope, root.to_path_buf()));
    }

    fn walk_dir<'s>(&'s self, scope: &Scope<'s>, dir: PathBuf) {
        if self.state.cancel.is_cancelled() {
            return;
        }

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.state.metrics.record_directory_failure();
                self.state.errors.push(ScanError::directory_access(&dir, e));
                return;
            }
        };
        self.state.metrics.record_directory();
        debug!("Walking directory: {}", dir.display());

        for entry in entries {
            if self.state.cancel.is_cancelled() {
                return;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.state.errors.push(ScanError::directory_access(&dir, e));
                    continue;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    self.state.errors.push(ScanError::directory_access(&path, e));
                    continue;
                }
            };

            if file_type.is_dir() {
                trace!("Spawning walk of {}", path.display());
                scope.spawn(move |scope| self.walk_dir(scope, path));
            } else if is_eligible_file(&path, file_type, self.file_suffix) {
                scope.spawn(move |_| self.scan_file(&path));
            } else {
                trace!("Skipping {}", path.display());
                self.state.metrics.record_skipped();
            }
        }
    }

    fn scan_file(&self, path: &Path) {
        match self.scanner.scan_file(path) {
            Ok(words) => {
                trace!("{} words in {}", words, path.display());
                self.state.metrics.record_file();
            }
            Err(ScanError::Cancelled) => {}
            Err(e) => {
                self.state.metrics.record_file_failure();
                self.state.errors.push(e);
            }
        }
    }
}
