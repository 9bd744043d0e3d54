//! Pool entry model

use attune_telemetry::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const INSTANCE_ENV: &str = "CLAUDE_INSTANCE";
pub const SESSION_ENV: &str = "CLAUDE_SESSION_ID";
pub const DEFAULT_INSTANCE: &str = "default";

/// What an entry announces. Free-text actions survive as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Completed,
    Blocked,
    Signaling,
    InProgress,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Completed => "completed",
            Action::Blocked => "blocked",
            Action::Signaling => "signaling",
            Action::InProgress => "in_progress",
            Action::Other(raw) => raw,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Action::Completed => "✅",
            Action::Blocked => "🚫",
            Action::Signaling => "📢",
            Action::InProgress => "🔄",
            Action::Other(_) => "📝",
        }
    }
}

impl From<String> for Action {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "completed" => Action::Completed,
            "blocked" => Action::Blocked,
            "signaling" => Action::Signaling,
            "in_progress" => Action::InProgress,
            _ => Action::Other(raw),
        }
    }
}

impl From<&str> for Action {
    fn from(raw: &str) -> Self {
        Action::from(raw.to_string())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::Other("unknown".to_string())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the pool log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    #[serde(default)]
    pub id: String,
    #[serde(with = "timestamp::lenient")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub source_instance: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affects: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<String>,
}

/// An extracted signal that has not yet been stamped with identity and time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    /// Explicit `INSTANCE:` override; falls back to the caller's instance
    pub source_instance: Option<String>,
    pub action: Action,
    pub topic: String,
    pub summary: Option<String>,
    pub affects: Option<String>,
    pub blocks: Option<String>,
}

impl CandidateEntry {
    pub fn new(action: Action, topic: impl Into<String>) -> Self {
        Self {
            source_instance: None,
            action,
            topic: topic.into(),
            summary: None,
            affects: None,
            blocks: None,
        }
    }

    pub fn stamp(self, identity: &Identity, now: DateTime<Utc>) -> PoolEntry {
        PoolEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            source_instance: self
                .source_instance
                .unwrap_or_else(|| identity.instance_id.clone()),
            session_id: identity.session_id.clone(),
            action: self.action,
            topic: self.topic,
            summary: self.summary,
            affects: self.affects,
            blocks: self.blocks,
        }
    }
}

/// Who is writing: instance and session ids supplied by the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub instance_id: String,
    pub session_id: String,
}

impl Identity {
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var(INSTANCE_ENV).ok(),
            std::env::var(SESSION_ENV).ok(),
        )
    }

    /// Empty values count as absent. Without a session id a fresh short token
    /// is minted, so separate invocations never share one.
    pub fn resolve(instance: Option<String>, session: Option<String>) -> Self {
        let instance_id = instance
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_INSTANCE.to_string());
        let session_id = session
            .filter(|s| !s.is_empty())
            .unwrap_or_else(short_session_token);
        Self {
            instance_id,
            session_id,
        }
    }
}

fn short_session_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
