//! Persistence boundary for attention state
//!
//! Load and save are whole-state operations with no locking. Two turns
//! racing on the same file resolve as last-writer-wins.

use crate::types::AttentionState;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed state in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait StateStore {
    /// Load the state; an absent store yields the empty state
    fn load(&self) -> Result<AttentionState, StoreError>;

    fn save(&self, state: &AttentionState) -> Result<(), StoreError>;

    /// Load, falling back to the empty state on any error
    fn load_or_default(&self) -> AttentionState {
        self.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding unreadable attention state");
            AttentionState::new()
        })
    }
}

/// `attn_state.json`, pretty-printed and replaced atomically on save
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<AttentionState, StoreError> {
        if !self.path.exists() {
            return Ok(AttentionState::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let mut state: AttentionState =
            serde_json::from_str(&content).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        state.normalize();
        Ok(state)
    }

    fn save(&self, state: &AttentionState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        attune_telemetry::atomic_write(&self.path, json.as_bytes()).map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_state() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = JsonStateStore::new(temp.path().join("attn_state.json"));
        assert_eq!(store.load().unwrap(), AttentionState::new());
    }

    #[test]
    fn test_save_then_load() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = JsonStateStore::new(temp.path().join("attn_state.json"));

        let mut state = AttentionState::new();
        state.scores.insert("b.md", 0.4);
        state.scores.insert("a.md", 0.8);
        state.turn_count = 7;
        store.save(&state).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.turn_count, 7);
        let docs: Vec<_> = loaded.scores.keys().collect();
        assert_eq!(docs, vec!["b.md", "a.md"]);
    }

    #[test]
    fn test_malformed_state_errors_then_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("attn_state.json");
        std::fs::write(&path, r#"{"scores": ["not", "a", "map"]}"#).unwrap();
        let store = JsonStateStore::new(&path);

        assert!(matches!(store.load(), Err(StoreError::Json { .. })));
        assert_eq!(store.load_or_default(), AttentionState::new());
    }

    #[test]
    fn test_load_clamps_out_of_range_scores() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("attn_state.json");
        std::fs::write(&path, r#"{"scores": {"a.md": 2.5, "b.md": -0.5}, "turn_count": 1}"#)
            .unwrap();

        let state = JsonStateStore::new(&path).load().unwrap();
        assert_eq!(state.score("a.md"), 1.0);
        assert_eq!(state.score("b.md"), 0.0);
    }
}
