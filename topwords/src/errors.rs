//! Error types for a scan run.
//!
//! Only a handful of these stop a run outright: a bad root, a thread pool that
//! cannot be built, an invalid configuration or a cancellation. Everything that
//! goes wrong below the root (an unreadable directory, a file that vanished
//! between listing and opening, malformed UTF-8) is recoverable: it is logged,
//! collected into the final report and the walk carries on with its siblings.
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while walking and scanning a tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },
    #[error("Cannot read directory {path}: {source}")]
    DirectoryAccess {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot read file {path}: {source}")]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid UTF-8 in file {path} at byte {offset}")]
    Encoding { path: PathBuf, offset: u64 },
    #[error("Scan cancelled")]
    Cancelled,
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    pub fn invalid_root(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn directory_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryAccess {
            path: path.into(),
            source,
        }
    }

    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub fn encoding(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self::Encoding {
            path: path.into(),
            offset,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error aborts the whole run rather than one subtree or file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidRoot { .. } | Self::Cancelled | Self::ThreadPool(_) | Self::Config(_)
        )
    }

    /// The path this error is about, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::InvalidRoot { path, .. }
            | Self::DirectoryAccess { path, .. }
            | Self::FileAccess { path, .. }
            | Self::Encoding { path, .. } => Some(path),
            _ => None,
        }
    }
}
