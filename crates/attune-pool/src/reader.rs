//! Windowed retrieval and rendering of pool activity

use crate::entry::{Action, PoolEntry};
use crate::log::PoolLog;
use chrono::{DateTime, Local, TimeDelta, Utc};

/// Entries shown in the session-start digest
pub const DIGEST_LIMIT: usize = 10;
/// Entries rendered by a text query
pub const QUERY_LIMIT: usize = 20;

fn default_window() -> TimeDelta {
    TimeDelta::hours(24)
}

/// Parse `<n>h`, `<n>m` or `<n>d`. Anything else is 24 hours.
pub fn parse_window(raw: &str) -> TimeDelta {
    let raw = raw.trim();
    let Some(unit) = raw.chars().last() else {
        return default_window();
    };
    let Ok(value) = raw[..raw.len() - unit.len_utf8()].parse::<u32>() else {
        return default_window();
    };
    let value = i64::from(value);

    let window = match unit.to_ascii_lowercase() {
        'h' => TimeDelta::try_hours(value),
        'm' => TimeDelta::try_minutes(value),
        'd' => TimeDelta::try_days(value),
        _ => None,
    };
    window.unwrap_or_else(default_window)
}

/// Start of the window ending at `now`. A window reaching past the
/// representable range has no cutoff.
fn window_start(now: DateTime<Utc>, window: TimeDelta) -> DateTime<Utc> {
    now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Entries newer than `cutoff` that came from another instance, plus the
/// consumer's own `signaling` broadcasts. Newest first, at most `limit`.
pub fn relevant_entries(
    entries: Vec<PoolEntry>,
    consumer: &str,
    cutoff: DateTime<Utc>,
    limit: usize,
) -> Vec<PoolEntry> {
    let mut relevant: Vec<PoolEntry> = entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .filter(|e| e.source_instance != consumer || e.action == Action::Signaling)
        .collect();
    relevant.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    relevant.truncate(limit);
    relevant
}

/// Reads recent activity on behalf of one instance
#[derive(Debug, Clone)]
pub struct PoolReader<'a> {
    log: &'a PoolLog,
    window: TimeDelta,
    limit: usize,
}

impl<'a> PoolReader<'a> {
    pub fn new(log: &'a PoolLog) -> Self {
        Self {
            log,
            window: default_window(),
            limit: DIGEST_LIMIT,
        }
    }

    pub fn with_window(mut self, window: TimeDelta) -> Self {
        self.window = window;
        self
    }

    /// An unreadable log reads as empty
    pub fn recent_for(&self, consumer: &str, now: DateTime<Utc>) -> Vec<PoolEntry> {
        let entries = self.log.entries().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "cannot read pool log");
            Vec::new()
        });
        relevant_entries(entries, consumer, window_start(now, self.window), self.limit)
    }
}

fn source_label(entry: &PoolEntry) -> &str {
    if entry.source_instance.is_empty() {
        "?"
    } else {
        &entry.source_instance
    }
}

/// Markdown digest for session start; empty when there is nothing to show
pub fn render_digest(entries: &[PoolEntry], consumer: &str) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut out = String::from("## 🔄 Recent Instance Activity\n\n");
    out.push_str(&format!("*Current instance: {consumer}*\n\n"));

    for entry in entries {
        out.push_str(&format!(
            "### {} [{}] {}: {}\n",
            entry.action.emoji(),
            source_label(entry),
            entry.action.as_str().to_uppercase(),
            entry.topic
        ));
        let local = entry.timestamp.with_timezone(&Local);
        out.push_str(&format!("*{}*\n\n", local.format("%H:%M")));
        if let Some(summary) = entry.summary.as_deref().filter(|s| !s.is_empty()) {
            out.push_str(&format!("{summary}\n\n"));
        }
        if let Some(affects) = entry.affects.as_deref().filter(|s| !s.is_empty()) {
            out.push_str(&format!("**Affects:** {affects}\n\n"));
        }
        out.push_str("---\n\n");
    }

    out.push_str("*Pool Coordinator: Use this context to avoid duplicating work*\n");
    out
}

/// Filters for ad-hoc inspection of the log
#[derive(Debug, Clone)]
pub struct PoolQuery {
    pub since: TimeDelta,
    pub instance: Option<String>,
    pub action: Option<String>,
}

impl Default for PoolQuery {
    fn default() -> Self {
        Self {
            since: default_window(),
            instance: None,
            action: None,
        }
    }
}

impl PoolQuery {
    /// Matching entries, newest first. Instance and action compare
    /// case-insensitively.
    pub fn apply(&self, entries: Vec<PoolEntry>, now: DateTime<Utc>) -> Vec<PoolEntry> {
        let cutoff = window_start(now, self.since);
        let mut matched: Vec<PoolEntry> = entries
            .into_iter()
            .filter(|e| e.timestamp >= cutoff)
            .filter(|e| {
                self.instance
                    .as_deref()
                    .map_or(true, |i| e.source_instance.eq_ignore_ascii_case(i))
            })
            .filter(|e| {
                self.action
                    .as_deref()
                    .map_or(true, |a| e.action.as_str().eq_ignore_ascii_case(a))
            })
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched
    }
}

/// Compact multi-line rendering used by the query command
pub fn format_entry(entry: &PoolEntry) -> String {
    let mut lines = vec![
        format!(
            "{} [{}] {}: {}",
            entry.action.emoji(),
            source_label(entry),
            entry.action.as_str().to_uppercase(),
            entry.topic
        ),
        format!(
            "   Time: {}",
            entry.timestamp.with_timezone(&Local).format("%Y-%m-%dT%H:%M:%S")
        ),
    ];
    if let Some(summary) = entry.summary.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("   Summary: {summary}"));
    }
    if let Some(affects) = entry.affects.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("   Affects: {affects}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{CandidateEntry, Identity};

    fn entry_at(instance: &str, action: &str, topic: &str, minutes_ago: i64) -> PoolEntry {
        let identity = Identity::resolve(Some(instance.into()), Some("sess".into()));
        CandidateEntry::new(Action::from(action), topic)
            .stamp(&identity, Utc::now() - TimeDelta::minutes(minutes_ago))
    }

    #[test]
    fn test_parse_window_units() {
        assert_eq!(parse_window("1h"), TimeDelta::hours(1));
        assert_eq!(parse_window("30m"), TimeDelta::minutes(30));
        assert_eq!(parse_window("2d"), TimeDelta::days(2));
        assert_eq!(parse_window("2D"), TimeDelta::days(2));
    }

    #[test]
    fn test_parse_window_fallbacks() {
        for raw in ["", "h", "abc", "5x", "-3h", "1.5h", "10"] {
            assert_eq!(parse_window(raw), TimeDelta::hours(24), "input {raw:?}");
        }
    }

    #[test]
    fn test_huge_window_means_no_cutoff() {
        let window = parse_window("4000000000h");
        let old = entry_at("B", "completed", "ancient", 60 * 24 * 365 * 50);
        let query = PoolQuery {
            since: window,
            ..PoolQuery::default()
        };

        let matched = query.apply(vec![old.clone()], Utc::now());
        assert_eq!(matched.len(), 1);
        assert_eq!(window_start(Utc::now(), window), DateTime::<Utc>::MIN_UTC);

        let temp = tempfile::TempDir::new().unwrap();
        let log = PoolLog::new(temp.path().join("instance_state.jsonl"));
        log.append(&old).unwrap();
        let recent = PoolReader::new(&log).with_window(window).recent_for("A", Utc::now());
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_relevance_filter() {
        let entries = vec![
            entry_at("A", "completed", "mine", 5),
            entry_at("A", "signaling", "my broadcast", 4),
            entry_at("B", "blocked", "theirs", 3),
            entry_at("C", "completed", "stale", 60 * 30),
        ];

        let relevant = relevant_entries(entries, "A", Utc::now() - TimeDelta::hours(24), 10);
        let topics: Vec<_> = relevant.iter().map(|e| e.topic.as_str()).collect();
        assert_eq!(topics, vec!["theirs", "my broadcast"]);
    }

    #[test]
    fn test_relevance_limit_keeps_newest() {
        let entries: Vec<_> = (0..15)
            .map(|i| entry_at("B", "completed", &format!("t{i}"), 100 - i))
            .collect();

        let relevant = relevant_entries(entries, "A", Utc::now() - TimeDelta::hours(24), DIGEST_LIMIT);
        assert_eq!(relevant.len(), DIGEST_LIMIT);
        assert_eq!(relevant[0].topic, "t14");
        assert_eq!(relevant[9].topic, "t5");
    }

    #[test]
    fn test_render_digest() {
        let mut entry = entry_at("B", "completed", "auth", 1);
        entry.summary = Some("JWT with refresh".into());
        entry.affects = Some("auth.rs".into());
        let other = entry_at("C", "handoff", "docs", 2);

        let digest = render_digest(&[entry, other], "A");

        assert!(digest.starts_with("## 🔄 Recent Instance Activity"));
        assert!(digest.contains("*Current instance: A*"));
        assert!(digest.contains("### ✅ [B] COMPLETED: auth\n"));
        assert!(digest.contains("JWT with refresh\n\n"));
        assert!(digest.contains("**Affects:** auth.rs"));
        assert!(digest.contains("### 📝 [C] HANDOFF: docs"));
        assert!(digest.ends_with("*Pool Coordinator: Use this context to avoid duplicating work*\n"));
    }

    #[test]
    fn test_render_digest_empty() {
        assert!(render_digest(&[], "A").is_empty());
    }

    #[test]
    fn test_query_filters() {
        let entries = vec![
            entry_at("A", "completed", "one", 10),
            entry_at("b", "Completed", "two", 5),
            entry_at("B", "blocked", "three", 1),
        ];
        let query = PoolQuery {
            instance: Some("B".into()),
            action: Some("completed".into()),
            ..PoolQuery::default()
        };

        let matched = query.apply(entries, Utc::now());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].topic, "two");
    }

    #[test]
    fn test_query_window_and_order() {
        let entries = vec![
            entry_at("A", "completed", "old", 90),
            entry_at("A", "completed", "new", 10),
            entry_at("A", "completed", "newer", 5),
        ];
        let query = PoolQuery {
            since: parse_window("1h"),
            ..PoolQuery::default()
        };

        let topics: Vec<_> = query
            .apply(entries, Utc::now())
            .into_iter()
            .map(|e| e.topic)
            .collect();
        assert_eq!(topics, vec!["newer", "new"]);
    }

    #[test]
    fn test_format_entry() {
        let mut entry = entry_at("A", "in_progress", "migration", 0);
        entry.summary = Some("halfway".into());
        let text = format_entry(&entry);
        assert!(text.starts_with("🔄 [A] IN_PROGRESS: migration"));
        assert!(text.contains("   Summary: halfway"));
        assert!(!text.contains("Affects"));
    }
}
