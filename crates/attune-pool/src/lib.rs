//! Coordination pool: status signals shared between concurrent instances
//!
//! Instances never talk to each other directly. Each one appends entries to a
//! shared JSONL log and reads the others' entries back at session start.

mod entry;
mod error;
mod extract;
mod log;
mod reader;

pub use entry::{
    Action, CandidateEntry, Identity, PoolEntry, DEFAULT_INSTANCE, INSTANCE_ENV, SESSION_ENV,
};
pub use error::PoolError;
pub use extract::{
    extract_pool_blocks, parse_pool_block, Extractor, ImplicitSignals, SignalDetector,
    MAX_IMPLICIT_SIGNALS,
};
pub use log::{PoolLog, DEFAULT_MAX_ENTRIES};
pub use reader::{
    format_entry, parse_window, relevant_entries, render_digest, PoolQuery, PoolReader,
    DIGEST_LIMIT, QUERY_LIMIT,
};
