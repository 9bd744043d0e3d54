//! Signal extraction from a turn's transcript
//!
//! Explicit ```` ```pool ```` blocks win. Only when a transcript has none does
//! the implicit detector get to look at it.

use crate::entry::{Action, CandidateEntry};
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_IMPLICIT_SIGNALS: usize = 3;
const TOPIC_CHARS: usize = 80;
const SUMMARY_CHARS: usize = 100;

static POOL_BLOCK_RE: OnceLock<Regex> = OnceLock::new();
static COMPLETION_RES: OnceLock<Vec<Regex>> = OnceLock::new();
static BLOCKER_RES: OnceLock<Vec<Regex>> = OnceLock::new();

fn pool_block_re() -> &'static Regex {
    POOL_BLOCK_RE.get_or_init(|| Regex::new(r"(?is)```pool\s*(.*?)```").unwrap())
}

fn completion_res() -> &'static [Regex] {
    COMPLETION_RES.get_or_init(|| {
        [
            r"(?i)(?:successfully|finished|completed|done)\s+(?:implementing|creating|setting up|configuring|deploying)\s+(.{10,80})",
            r"(?i)(?:the|this)\s+(.{10,50})\s+(?:is now|has been)\s+(?:complete|ready|deployed|configured)",
            r"(?i)i've\s+(?:finished|completed|done)\s+(.{10,80})",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn blocker_res() -> &'static [Regex] {
    BLOCKER_RES.get_or_init(|| {
        [
            r"(?i)(?:blocked|waiting|cannot proceed)\s+(?:by|on|until)\s+(.{10,80})",
            r"(?i)(?:needs|requires|depends on)\s+(.{10,80})\s+(?:first|before)",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Pluggable heuristic for transcripts without explicit blocks
pub trait SignalDetector {
    fn detect(&self, text: &str) -> Vec<CandidateEntry>;
}

/// Recognized `Key: value` lines inside a pool block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKey {
    Instance,
    Action,
    Topic,
    Summary,
    Affects,
    Blocks,
}

impl BlockKey {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "instance" => Some(BlockKey::Instance),
            "action" => Some(BlockKey::Action),
            "topic" => Some(BlockKey::Topic),
            "summary" => Some(BlockKey::Summary),
            "affects" => Some(BlockKey::Affects),
            "blocks" => Some(BlockKey::Blocks),
            _ => None,
        }
    }
}

/// Every well-formed pool block in `text`, in order of appearance
pub fn extract_pool_blocks(text: &str) -> Vec<CandidateEntry> {
    pool_block_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|body| parse_pool_block(body.as_str()))
        .collect()
}

/// Parse one block body. Unknown keys are ignored, later duplicates win, and
/// a block missing either the action or the topic key is rejected. Empty
/// values are kept.
pub fn parse_pool_block(body: &str) -> Option<CandidateEntry> {
    let mut source_instance = None;
    let mut action = None;
    let mut topic = None;
    let mut summary = None;
    let mut affects = None;
    let mut blocks = None;

    for line in body.trim().lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match BlockKey::parse(key) {
            Some(BlockKey::Instance) => source_instance = Some(value),
            Some(BlockKey::Action) => action = Some(value),
            Some(BlockKey::Topic) => topic = Some(value),
            Some(BlockKey::Summary) => summary = Some(value),
            Some(BlockKey::Affects) => affects = Some(value),
            Some(BlockKey::Blocks) => blocks = Some(value),
            None => {}
        }
    }

    let action = action?;
    let topic = topic?;

    Some(CandidateEntry {
        source_instance,
        action: Action::from(action),
        topic,
        summary,
        affects,
        blocks,
    })
}

/// Regex detector for completion and blocker phrasing
#[derive(Debug, Default, Clone, Copy)]
pub struct ImplicitSignals;

impl SignalDetector for ImplicitSignals {
    fn detect(&self, text: &str) -> Vec<CandidateEntry> {
        let completions = completion_res()
            .iter()
            .flat_map(|re| captured_phrases(re, text))
            .map(|phrase| implicit_entry(Action::Completed, "completion", &phrase));
        let blockers = blocker_res()
            .iter()
            .flat_map(|re| captured_phrases(re, text))
            .map(|phrase| implicit_entry(Action::Blocked, "blocker", &phrase));

        completions
            .chain(blockers)
            .take(MAX_IMPLICIT_SIGNALS)
            .collect()
    }
}

fn captured_phrases(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

fn implicit_entry(action: Action, label: &str, phrase: &str) -> CandidateEntry {
    let mut entry = CandidateEntry::new(action, truncate_chars(phrase, TOPIC_CHARS));
    entry.summary = Some(format!(
        "Detected {label}: {}",
        truncate_chars(phrase, SUMMARY_CHARS)
    ));
    entry
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Turns a transcript into candidate entries. Does no I/O.
pub struct Extractor {
    implicit: Option<Box<dyn SignalDetector>>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::with_detector(Box::new(ImplicitSignals))
    }

    pub fn with_detector(detector: Box<dyn SignalDetector>) -> Self {
        Self {
            implicit: Some(detector),
        }
    }

    /// Explicit blocks only
    pub fn explicit_only() -> Self {
        Self { implicit: None }
    }

    pub fn extract(&self, text: &str) -> Vec<CandidateEntry> {
        let explicit = extract_pool_blocks(text);
        if !explicit.is_empty() {
            tracing::debug!(count = explicit.len(), "explicit pool blocks found");
            return explicit;
        }

        match &self.implicit {
            Some(detector) => {
                let signals = detector.detect(text);
                tracing::debug!(count = signals.len(), "implicit pool signals detected");
                signals
            }
            None => Vec::new(),
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
