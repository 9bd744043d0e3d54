//! Per-turn attention history (`attention_history.jsonl`)

use crate::ordered::OrderedMap;
use crate::types::{AttentionState, TierPartition};
use attune_telemetry::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const PROMPT_PREVIEW_CHARS: usize = 100;
const SNAPSHOT_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub turn: u64,
    #[serde(with = "timestamp::lenient")]
    pub timestamp: DateTime<Utc>,
    pub prompt_preview: String,
    pub hot: Vec<String>,
    pub warm: Vec<String>,
    /// First few scores in map order, rounded to two decimals
    pub scores_snapshot: OrderedMap<f64>,
}

impl HistoryRecord {
    pub fn new(state: &AttentionState, partition: &TierPartition, prompt: &str) -> Self {
        Self {
            turn: state.turn_count,
            timestamp: Utc::now(),
            prompt_preview: prompt.chars().take(PROMPT_PREVIEW_CHARS).collect(),
            hot: partition.hot.clone(),
            warm: partition.warm.clone(),
            scores_snapshot: state
                .scores
                .iter()
                .take(SNAPSHOT_SIZE)
                .map(|(doc, score)| (doc, (score * 100.0).round() / 100.0))
                .collect(),
        }
    }
}

/// Best-effort append; failures are logged and dropped
pub fn record_turn(path: &Path, record: &HistoryRecord) {
    if let Err(e) = attune_telemetry::append_jsonl(path, record) {
        tracing::warn!(path = %path.display(), error = %e, "failed to append attention history");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_snapshot_and_preview() {
        let mut state = AttentionState::new();
        for i in 0..12 {
            state.scores.insert(format!("doc{i}.md"), 0.123 * (i as f64 % 8.0));
        }
        state.turn_count = 4;
        let partition = TierPartition::default();
        let prompt = "p".repeat(150);

        let record = HistoryRecord::new(&state, &partition, &prompt);

        assert_eq!(record.turn, 4);
        assert_eq!(record.prompt_preview.len(), 100);
        assert_eq!(record.scores_snapshot.len(), 10);
        assert_eq!(record.scores_snapshot.get("doc2.md"), Some(&0.25));
        assert_eq!(record.scores_snapshot.keys().next(), Some("doc0.md"));
    }

    #[test]
    fn test_record_turn_appends() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("attention_history.jsonl");
        let record = HistoryRecord::new(&AttentionState::new(), &TierPartition::default(), "hi");

        record_turn(&path, &record);
        record_turn(&path, &record);

        let records: Vec<HistoryRecord> = attune_telemetry::read_jsonl(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].prompt_preview, "hi");
    }
}
