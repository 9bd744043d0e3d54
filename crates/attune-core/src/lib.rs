//! Attention scoring, tiering and context injection

mod config;
mod history;
mod inject;
mod ordered;
mod router;
mod store;
mod types;

pub use config::{RuleConfig, Thresholds, DEFAULT_COACTIVATION_BOOST, DEFAULT_DECAY};
pub use history::{record_turn, HistoryRecord};
pub use inject::{build_injection, warm_preview, DocumentSource, FsDocuments, Injection, WARM_PREVIEW_LINES};
pub use ordered::OrderedMap;
pub use router::{apply_activation, apply_decay, apply_pin_floor, partition_scores, Router};
pub use store::{JsonStateStore, StateStore, StoreError};
pub use types::{clamp_score, AttentionState, Tier, TierPartition};
