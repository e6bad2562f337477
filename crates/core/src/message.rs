//! Turn and conversation record domain types.
//!
//! These are the value objects that flow through the system:
//! user types a message → bot answers → both turns land in the session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters taken from the first user turn for a title.
pub const TITLE_MAX_CHARS: usize = 50;

/// Title used when a conversation has no user turn yet.
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Unique identifier for a conversation (session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The learner
    User,
    /// The bot
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who wrote this turn
    pub role: Role,

    /// The text content
    pub content: String,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// The speaker label used in prompt transcripts.
    pub fn speaker(&self) -> &'static str {
        match self.role {
            Role::User => "Human",
            Role::Assistant => "Assistant",
        }
    }
}

/// The persisted form of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub session_id: SessionId,

    #[serde(default = "default_title")]
    pub title: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Ordered turns, capped at the configured history length
    #[serde(default)]
    pub messages: Vec<Turn>,
}

fn default_title() -> String {
    DEFAULT_TITLE.into()
}

impl ConversationRecord {
    /// Create a fresh record whose title is derived from `messages`.
    pub fn new(session_id: SessionId, messages: Vec<Turn>) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            title: derive_title(&messages),
            created_at: now,
            updated_at: now,
            messages,
        }
    }

    /// A body-free summary of this record.
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            session_id: self.session_id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.messages.len(),
        }
    }
}

/// Listing view of a record, without message bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub session_id: SessionId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}

/// Derive a conversation title from the first user turn.
///
/// Takes the first [`TITLE_MAX_CHARS`] characters and appends `...`.
pub fn derive_title(messages: &[Turn]) -> String {
    match messages.iter().find(|t| t.role == Role::User) {
        Some(turn) => {
            let head: String = turn.content.chars().take(TITLE_MAX_CHARS).collect();
            format!("{head}...")
        }
        None => DEFAULT_TITLE.into(),
    }
}

/// Keep only the last `max` turns, dropping the oldest first.
pub fn truncate_oldest(messages: &mut Vec<Turn>, max: usize) {
    if messages.len() > max {
        messages.drain(..messages.len() - max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_turns() {
        let t = Turn::user("Hello, Nova!");
        assert_eq!(t.role, Role::User);
        assert_eq!(t.speaker(), "Human");
        assert_eq!(Turn::assistant("Hi").speaker(), "Assistant");
    }

    #[test]
    fn turn_serializes_lowercase_role() {
        let json = serde_json::to_string(&Turn::assistant("ok")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    }

    #[test]
    fn session_id_is_transparent() {
        let json = serde_json::to_string(&SessionId::from("abc")).unwrap();
        assert_eq!(json, r#""abc""#);
    }

    #[test]
    fn title_from_first_user_turn() {
        let turns = vec![Turn::assistant("Welcome"), Turn::user("Explain photosynthesis")];
        assert_eq!(derive_title(&turns), "Explain photosynthesis...");
    }

    #[test]
    fn title_truncates_to_fifty_chars() {
        let long = "é".repeat(80);
        let title = derive_title(&[Turn::user(long)]);
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn title_defaults_without_user_turn() {
        assert_eq!(derive_title(&[]), DEFAULT_TITLE);
        assert_eq!(derive_title(&[Turn::assistant("hi")]), DEFAULT_TITLE);
    }

    #[test]
    fn truncate_drops_oldest() {
        let mut turns: Vec<Turn> = (0..5).map(|i| Turn::user(i.to_string())).collect();
        truncate_oldest(&mut turns, 3);
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["2", "3", "4"]);

        truncate_oldest(&mut turns, 10);
        assert_eq!(turns.len(), 3);
    }

    #[test]
    fn record_summary_counts_messages() {
        let record = ConversationRecord::new(
            SessionId::from("s1"),
            vec![Turn::user("q"), Turn::assistant("a")],
        );
        let summary = record.summary();
        assert_eq!(summary.message_count, 2);
        assert_eq!(summary.title, "q...");
        assert_eq!(summary.created_at, record.created_at);
    }
}
