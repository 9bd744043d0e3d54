//! Append-only pool log with bounded retention
//!
//! Each entry is one JSON line written with a single append. Retention is a
//! read-then-rewrite of the whole file and can lose entries appended by other
//! instances in between; that race is accepted.

use crate::entry::PoolEntry;
use crate::error::{PoolError, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone)]
pub struct PoolLog {
    path: PathBuf,
    max_entries: usize,
}

impl PoolLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    fn io_error(&self, source: std::io::Error) -> PoolError {
        PoolError::Io {
            path: self.path.clone(),
            source,
        }
    }

    pub fn append(&self, entry: &PoolEntry) -> Result<()> {
        attune_telemetry::append_jsonl(&self.path, entry).map_err(|e| self.io_error(e))
    }

    /// Append each entry independently; failures are logged and skipped.
    /// Returns how many were written.
    pub fn append_all(&self, entries: &[PoolEntry]) -> usize {
        let mut written = 0;
        for entry in entries {
            match self.append(entry) {
                Ok(()) => written += 1,
                Err(e) => tracing::warn!(error = %e, topic = %entry.topic, "failed to save pool entry"),
            }
        }
        written
    }

    /// Keep only the newest `max_entries` lines. Returns how many were dropped.
    pub fn enforce_retention(&self) -> Result<usize> {
        let lines = attune_telemetry::read_lines(&self.path).map_err(|e| self.io_error(e))?;
        if lines.len() <= self.max_entries {
            return Ok(0);
        }

        let dropped = lines.len() - self.max_entries;
        attune_telemetry::rewrite_lines(&self.path, &lines[dropped..])
            .map_err(|e| self.io_error(e))?;
        tracing::debug!(dropped, kept = self.max_entries, "pool log truncated");
        Ok(dropped)
    }

    /// All parseable entries in file order; unreadable lines are skipped
    pub fn entries(&self) -> Result<Vec<PoolEntry>> {
        attune_telemetry::read_jsonl(&self.path).map_err(|e| self.io_error(e))
    }
}
