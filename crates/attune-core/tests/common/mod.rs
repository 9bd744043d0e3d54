#![allow(dead_code)]

use attune_core::{AttentionState, RuleConfig, Tier, TierPartition};

/// Three agent documents, one co-activation edge, one pin
pub fn sample_config() -> RuleConfig {
    serde_json::from_value(serde_json::json!({
        "keywords": {
            "agents/auth.md": ["login", "oauth", "session"],
            "agents/billing.md": ["invoice", "stripe"],
            "agents/deploy.md": ["deploy", "release"]
        },
        "co_activation": {
            "agents/auth.md": ["agents/security.md"]
        },
        "pinned": ["agents/conventions.md"]
    }))
    .unwrap()
}

pub fn state_with(scores: &[(&str, f64)]) -> AttentionState {
    let mut state = AttentionState::new();
    for (doc, score) in scores {
        state.scores.insert(*doc, *score);
    }
    state
}

pub fn tier_of(partition: &TierPartition, doc: &str) -> Option<Tier> {
    [Tier::Hot, Tier::Warm, Tier::Cold]
        .into_iter()
        .find(|&tier| partition.docs(tier).iter().any(|d| d == doc))
}
