use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, trace};

use super::ScanState;
use crate::config::DEFAULT_BUFFER_CAPACITY;
use crate::errors::{ScanError, ScanResult};
use crate::tokenizer::{next_token, normalize};

/// Reads one file at a time and feeds its words into the shared state
#[derive(Debug, Clone, Copy)]
pub struct FileScanner<'a> {
    state: &'a ScanState,
    buffer_capacity: usize,
}

impl<'a> FileScanner<'a> {
    pub fn new(state: &'a ScanState) -> Self {
        Self::with_buffer_capacity(state, DEFAULT_BUFFER_CAPACITY)
    }

    /// Uses a read buffer of `capacity` bytes (at least one).
    ///
    /// The buffer only grows past this when a single word is longer than it.
    pub fn with_buffer_capacity(state: &'a ScanState, capacity: usize) -> Self {
        Self {
            state,
            buffer_capacity: capacity.max(1),
        }
    }

    /// Scans the file at `path`, returning the number of words found.
    pub fn scan_file(&self, path: &Path) -> ScanResult<u64> {
        if self.state.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        trace!("Scanning file: {}", path.display());
        let file = File::open(path).map_err(|e| ScanError::file_access(path, e))?;
        let words = self.scan_reader(path, file)?;
        debug!("Scanned {} words in {}", words, path.display());
        Ok(words)
    }

    /// Scans everything `reader` yields; `path` is only used for diagnostics.
    ///
    /// Words are tallied per file and merged into the shared state only once
    /// the reader is exhausted. A read error or cancellation leaves the shared
    /// counts untouched.
    pub fn scan_reader<R: Read>(&self, path: &Path, mut reader: R) -> ScanResult<u64> {
        let mut buffer = vec![0u8; self.buffer_capacity];
        // Unconsumed input is buffer[start..end]
        let mut start = 0;
        let mut end = 0;
        // File offset of buffer[start]
        let mut offset = 0u64;
        let mut at_eof = false;

        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut words = 0u64;
        let mut malformed = 0u64;
        let mut first_malformed = None;

        loop {
            if self.state.cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            loop {
                let window = &buffer[start..end];
                let scan = next_token(window, at_eof);
                if let Some(m) = scan.malformed {
                    malformed += m.count as u64;
                    first_malformed.get_or_insert(offset + m.first_offset as u64);
                }
                let found = scan.token.is_some();
                if let Some(span) = scan.token {
                    *counts.entry(normalize(&window[span])).or_insert(0) += 1;
                    words += 1;
                }
                start += scan.advance;
                offset += scan.advance as u64;
                if !found {
                    break;
                }
            }

            if at_eof {
                break;
            }

            if start > 0 {
                buffer.copy_within(start..end, 0);
                end -= start;
                start = 0;
            }
            if end == buffer.len() {
                // A single word fills the whole buffer
                let grown = buffer.len() * 2;
                trace!("Growing read buffer to {} bytes for {}", grown, path.display());
                buffer.resize(grown, 0);
            }

            match reader.read(&mut buffer[end..]) {
                Ok(0) => at_eof = true,
                Ok(n) => {
                    end += n;
                    self.state.metrics.record_bytes(n as u64);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(ScanError::file_access(path, e)),
            }
        }

        trace!("Merging {} distinct words from {}", counts.len(), path.display());
        for (word, n) in &counts {
            self.state.record_n(word, *n);
        }
        self.state.metrics.record_tokens(words);

        if let Some(first) = first_malformed {
            self.state.metrics.record_malformed(malformed);
            self.state.errors.push(ScanError::encoding(path, first));
        }

        Ok(words)
    }
}
