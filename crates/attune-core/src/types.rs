//! Core types for attention routing

use crate::ordered::OrderedMap;
use attune_telemetry::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attention tier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// Full document injection
    #[serde(rename = "HOT")]
    Hot,
    /// First lines only
    #[serde(rename = "WARM")]
    Warm,
    /// Evicted
    #[serde(rename = "COLD")]
    Cold,
}

/// Clamp a score into [0, 1]; anything non-finite becomes 0.0
pub fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Attention state persisted in `attn_state.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionState {
    /// Relevance score per document
    #[serde(default)]
    pub scores: OrderedMap<f64>,
    /// Total turn count
    #[serde(default)]
    pub turn_count: u64,
    #[serde(default, with = "timestamp::lenient_option")]
    pub last_update: Option<DateTime<Utc>>,
}

impl AttentionState {
    pub fn new() -> Self {
        Self {
            scores: OrderedMap::new(),
            turn_count: 0,
            last_update: None,
        }
    }

    pub fn score(&self, doc: &str) -> f64 {
        self.scores.get(doc).copied().unwrap_or(0.0)
    }

    /// Force every stored score back into [0, 1]
    pub fn normalize(&mut self) {
        for score in self.scores.values_mut() {
            *score = clamp_score(*score);
        }
    }
}

impl Default for AttentionState {
    fn default() -> Self {
        Self::new()
    }
}

/// HOT/WARM/COLD split of all known documents, each tier score-descending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierPartition {
    pub hot: Vec<String>,
    pub warm: Vec<String>,
    pub cold: Vec<String>,
}

impl TierPartition {
    /// Documents in `tier`, best first
    pub fn docs(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Hot => &self.hot,
            Tier::Warm => &self.warm,
            Tier::Cold => &self.cold,
        }
    }

    /// Nothing worth injecting
    pub fn is_idle(&self) -> bool {
        self.hot.is_empty() && self.warm.is_empty()
    }
}
