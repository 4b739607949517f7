use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Counters updated by walker and scanner tasks.
///
/// Cloning shares the underlying counters.
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    // Walk metrics
    directories_walked: Arc<AtomicU64>,
    directories_failed: Arc<AtomicU64>,
    entries_skipped: Arc<AtomicU64>,

    // File metrics
    files_scanned: Arc<AtomicU64>,
    files_failed: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,

    // Token metrics
    tokens: Arc<AtomicU64>,
    malformed_sequences: Arc<AtomicU64>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            directories_walked: Arc::new(AtomicU64::new(0)),
            directories_failed: Arc::new(AtomicU64::new(0)),
            entries_skipped: Arc::new(AtomicU64::new(0)),
            files_scanned: Arc::new(AtomicU64::new(0)),
            files_failed: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            tokens: Arc::new(AtomicU64::new(0)),
            malformed_sequences: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_directory(&self) {
        self.directories_walked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_directory_failure(&self) {
        self.directories_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an entry that is neither a directory nor an eligible file
    pub fn record_skipped(&self) {
        self.entries_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a fully scanned file
    pub fn record_file(&self) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
    }

    /// Records words counted from one file, whether or not it was read to the end
    pub fn record_tokens(&self, tokens: u64) {
        let total = self.tokens.fetch_add(tokens, Ordering::Relaxed) + tokens;
        debug!("Counted {} words, {} so far", tokens, total);
    }

    pub fn record_file_failure(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bytes(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_malformed(&self, sequences: u64) {
        self.malformed_sequences
            .fetch_add(sequences, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            directories_walked: self.directories_walked.load(Ordering::Relaxed),
            directories_failed: self.directories_failed.load(Ordering::Relaxed),
            entries_skipped: self.entries_skipped.load(Ordering::Relaxed),
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            tokens: self.tokens.load(Ordering::Relaxed),
            malformed_sequences: self.malformed_sequences.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Directories walked/failed: {}/{}\n\
             Files scanned/failed/skipped: {}/{}/{}\n\
             Bytes read: {}\n\
             Words: {}\n\
             Malformed UTF-8 sequences: {}",
            stats.directories_walked,
            stats.directories_failed,
            stats.files_scanned,
            stats.files_failed,
            stats.entries_skipped,
            stats.bytes_read,
            stats.tokens,
            stats.malformed_sequences
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub directories_walked: u64,
    pub directories_failed: u64,
    pub entries_skipped: u64,
    pub files_scanned: u64,
    pub files_failed: u64,
    pub bytes_read: u64,
    pub tokens: u64,
    pub malformed_sequences: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_tracking() {
        let metrics = ScanMetrics::new();
        metrics.record_directory();
        metrics.record_directory();
        metrics.record_directory_failure();
        metrics.record_skipped();

        let stats = metrics.get_stats();
        assert_eq!(stats.directories_walked, 2);
        assert_eq!(stats.directories_failed, 1);
        assert_eq!(stats.entries_skipped, 1);
    }

    #[test]
    fn test_file_tracking() {
        let metrics = ScanMetrics::new();
        metrics.record_file();
        metrics.record_tokens(10);
        metrics.record_file();
        metrics.record_tokens(5);
        metrics.record_file_failure();
        metrics.record_bytes(4096);
        metrics.record_malformed(3);

        let stats = metrics.get_stats();
        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.tokens, 15);
        assert_eq!(stats.bytes_read, 4096);
        assert_eq!(stats.malformed_sequences, 3);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = ScanMetrics::new();
        let clone = metrics.clone();
        clone.record_file();
        assert_eq!(metrics.get_stats().files_scanned, 1);
    }
}
