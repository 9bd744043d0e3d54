//! Rule configuration for attention routing

use crate::ordered::OrderedMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DECAY: f64 = 0.75;
pub const DEFAULT_COACTIVATION_BOOST: f64 = 0.35;
/// Added to the WARM threshold to form the floor for pinned documents
pub const PINNED_FLOOR_MARGIN: f64 = 0.1;

/// Tier cutoffs and output limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// HOT threshold (>= this = full document injection)
    pub hot: f64,
    /// WARM threshold (>= this = header injection)
    pub warm: f64,
    pub max_hot_files: usize,
    pub max_warm_files: usize,
    /// Hard cap on rendered injection size, in characters
    pub max_chars: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hot: 0.8,
            warm: 0.25,
            max_hot_files: 4,
            max_warm_files: 8,
            max_chars: 25000,
        }
    }
}

/// Router configuration, read from `keywords.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Trigger keywords per document
    pub keywords: OrderedMap<Vec<String>>,

    /// Co-activation graph (document -> related documents)
    pub co_activation: OrderedMap<Vec<String>>,

    /// Pinned documents (always at least WARM)
    pub pinned: Vec<String>,

    /// Per-document decay overrides
    pub decay_rates: OrderedMap<f64>,

    pub thresholds: Thresholds,

    /// Decay for documents without an override
    pub default_decay: f64,

    /// Boost applied to each co-activated neighbor
    pub coactivation_boost: f64,
}

impl RuleConfig {
    pub fn new() -> Self {
        Self {
            keywords: OrderedMap::new(),
            co_activation: OrderedMap::new(),
            pinned: Vec::new(),
            decay_rates: OrderedMap::new(),
            thresholds: Thresholds::default(),
            default_decay: DEFAULT_DECAY,
            coactivation_boost: DEFAULT_COACTIVATION_BOOST,
        }
    }

    /// Load from disk. A missing file is the empty config; an unreadable or
    /// malformed one is logged and also treated as empty.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::new();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read rule config, using defaults");
                return Self::new();
            }
        };

        match serde_json::from_str::<RuleConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed rule config, using defaults");
                Self::new()
            }
        }
    }

    /// Decay multiplier for a document, clamped into [0, 1]
    pub fn decay_rate(&self, doc: &str) -> f64 {
        let rate = self
            .decay_rates
            .get(doc)
            .copied()
            .unwrap_or(self.default_decay);
        if rate.is_finite() {
            rate.clamp(0.0, 1.0)
        } else {
            self.default_decay.clamp(0.0, 1.0)
        }
    }

    pub fn pinned_floor(&self) -> f64 {
        (self.thresholds.warm + PINNED_FLOOR_MARGIN).clamp(0.0, 1.0)
    }

    /// Every document the config mentions, in first-seen order
    pub fn documents(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut docs = Vec::new();

        let mentioned = self
            .keywords
            .keys()
            .chain(self.co_activation.keys())
            .chain(
                self.co_activation
                    .iter()
                    .flat_map(|(_, related)| related.iter().map(String::as_str)),
            )
            .chain(self.pinned.iter().map(String::as_str))
            .chain(self.decay_rates.keys());

        for doc in mentioned {
            if seen.insert(doc) {
                docs.push(doc);
            }
        }
        docs
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::new()
    }
}
