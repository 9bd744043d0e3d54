//! Budgeted rendering of the tier partition into injectable context

use crate::types::{AttentionState, Tier, TierPartition};
use attune_telemetry::Paths;

/// WARM documents contribute only this many leading lines
pub const WARM_PREVIEW_LINES: usize = 25;

const HEADER: &str = "## 🧠 Active Agent Context\n\n";
const HOT_HEADER: &str = "### 🔥 HOT (Full Context)\n\n";
const WARM_HEADER: &str = "### 🌡️ WARM (Headers Only)\n\n";

/// Access to document bodies. `None` renders as an empty section.
pub trait DocumentSource {
    fn read(&self, doc: &str) -> Option<String>;
}

/// Documents stored as files under the docs root
#[derive(Debug, Clone)]
pub struct FsDocuments {
    paths: Paths,
}

impl FsDocuments {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }
}

impl DocumentSource for FsDocuments {
    fn read(&self, doc: &str) -> Option<String> {
        let path = self.paths.document(doc);
        match std::fs::read_to_string(&path) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "document unavailable");
                None
            }
        }
    }
}

/// Rendered context plus what actually made it under the budget
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Injection {
    pub text: String,
    pub hot_included: Vec<String>,
    pub warm_included: Vec<String>,
    /// Characters before the footer
    pub body_chars: usize,
}

impl Injection {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Leading `WARM_PREVIEW_LINES` lines, line endings kept
pub fn warm_preview(body: &str) -> &str {
    let cut: usize = body
        .split_inclusive('\n')
        .take(WARM_PREVIEW_LINES)
        .map(str::len)
        .sum();
    &body[..cut]
}

fn tier_header(tier: Tier) -> &'static str {
    match tier {
        Tier::Hot => HOT_HEADER,
        Tier::Warm => WARM_HEADER,
        Tier::Cold => "",
    }
}

fn section(doc: &str, score: f64, content: &str) -> String {
    format!("#### {doc} (score: {score:.2})\n\n{content}\n\n---\n\n")
}

fn footer(hot: usize, warm: usize, chars: usize) -> String {
    format!("\n*Context Router: {hot} HOT, {warm} WARM, {chars} chars*\n")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Greedy, order-preserving accumulation: HOT sections with full bodies, then
/// WARM sections with previews. A section that does not fit is skipped and
/// later ones are still tried. Header, tier headers and footer all count
/// toward `max_chars`, so the result never exceeds it.
///
/// An idle partition renders as the empty string.
pub fn build_injection(
    partition: &TierPartition,
    state: &AttentionState,
    docs: &dyn DocumentSource,
    max_chars: usize,
) -> Injection {
    if partition.is_idle() {
        return Injection::default();
    }

    // Included counts never exceed the tier sizes and the body never exceeds
    // max_chars, so this footer is at least as long as the real one.
    let footer_reserve = char_len(&footer(
        partition.hot.len(),
        partition.warm.len(),
        max_chars,
    ));
    let Some(budget) = max_chars.checked_sub(footer_reserve) else {
        return Injection::default();
    };
    if char_len(HEADER) > budget {
        return Injection::default();
    }

    let mut out = String::from(HEADER);
    let mut total = char_len(HEADER);

    let mut hot_included = Vec::new();
    let mut warm_included = Vec::new();
    for tier in [Tier::Hot, Tier::Warm] {
        let included = match tier {
            Tier::Hot => &mut hot_included,
            _ => &mut warm_included,
        };
        let mut tier_started = false;
        for doc in partition.docs(tier) {
            let body = docs.read(doc).unwrap_or_default();
            let content = match tier {
                Tier::Hot => body.as_str(),
                _ => warm_preview(&body),
            };
            let candidate = section(doc, state.score(doc), content);
            let header = tier_header(tier);
            if push_section(&mut out, &mut total, budget, &mut tier_started, header, &candidate) {
                included.push(doc.clone());
            }
        }
    }

    out.push_str(&footer(hot_included.len(), warm_included.len(), total));

    tracing::debug!(
        hot = hot_included.len(),
        warm = warm_included.len(),
        chars = total,
        "context injection built"
    );

    Injection {
        text: out,
        hot_included,
        warm_included,
        body_chars: total,
    }
}

/// Append `candidate`, preceded by the tier header if it opens the tier
fn push_section(
    out: &mut String,
    total: &mut usize,
    budget: usize,
    tier_started: &mut bool,
    tier_header: &str,
    candidate: &str,
) -> bool {
    let header_cost = if *tier_started { 0 } else { char_len(tier_header) };
    let cost = header_cost + char_len(candidate);
    if *total + cost > budget {
        return false;
    }

    if !*tier_started {
        out.push_str(tier_header);
        *tier_started = true;
    }
    out.push_str(candidate);
    *total += cost;
    true
}
