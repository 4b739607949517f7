use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::errors::{ScanError, ScanResult};

/// Suffix a file name must end with to be scanned
pub const DEFAULT_FILE_SUFFIX: &str = ".txt";
/// Number of words reported by default
pub const DEFAULT_TOP: usize = 10;
/// Read buffer size per file
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Settings for one scan run.
///
/// Values come from the command line only; there is no configuration file and
/// nothing is read from the environment. Every field has a serde default so a
/// partially filled value (for example from JSON in a test harness) is still a
/// complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory to scan
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// How many of the most frequent words to report
    #[serde(default = "default_top")]
    pub top: usize,

    /// Worker threads for walking and scanning.
    /// Defaults to the number of CPU cores
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Only regular files whose name ends with this suffix are scanned.
    /// Compared literally, case included
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,

    /// Size of the read buffer used per file
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_top() -> usize {
    DEFAULT_TOP
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_file_suffix() -> String {
    DEFAULT_FILE_SUFFIX.to_string()
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            top: default_top(),
            thread_count: default_thread_count(),
            file_suffix: default_file_suffix(),
            buffer_capacity: default_buffer_capacity(),
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Self::default()
        }
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    pub fn with_thread_count(mut self, thread_count: NonZeroUsize) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn with_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Checks the settings that cannot be expressed in the types.
    pub fn validate(&self) -> ScanResult<()> {
        if self.buffer_capacity == 0 {
            return Err(ScanError::config_error("buffer capacity must be non-zero"));
        }
        if self.file_suffix.is_empty() {
            return Err(ScanError::config_error("file suffix must not be empty"));
        }
        Ok(())
    }
}
