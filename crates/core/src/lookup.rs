//! Lookup trait: the abstraction over external search helpers.
//!
//! Lookups give the bot facts it can fold into a prompt: an encyclopedia
//! summary, a handful of web results, or a list of tutorial videos. Each
//! returns ready-to-embed text, or nothing when there was nothing to find.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::LookupError;

/// Which kind of helper a lookup is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Encyclopedia,
    WebSearch,
    VideoSearch,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Encyclopedia => "encyclopedia",
            Self::WebSearch => "web_search",
            Self::VideoSearch => "video_search",
        };
        f.write_str(name)
    }
}

/// The normalised result of one lookup call.
///
/// Callers branch on this instead of sniffing the text for "No ... found"
/// or "Error ..." markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Formatted text ready to embed in a prompt
    Found(String),
    /// The helper ran but had nothing relevant
    Empty,
    /// The helper failed; the reason is for logs only
    Failed(String),
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The found text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Found(text) => Some(text),
            _ => None,
        }
    }
}

impl From<std::result::Result<Option<String>, LookupError>> for LookupOutcome {
    fn from(result: std::result::Result<Option<String>, LookupError>) -> Self {
        match result {
            Ok(Some(text)) if !text.trim().is_empty() => Self::Found(text),
            Ok(_) => Self::Empty,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// The core Lookup trait.
///
/// Implementations: Wikipedia summaries, DuckDuckGo web results,
/// DuckDuckGo video results.
#[async_trait]
pub trait Lookup: Send + Sync {
    /// The unique name of this helper (e.g., "wikipedia").
    fn name(&self) -> &str;

    /// What kind of helper this is.
    fn kind(&self) -> LookupKind;

    /// Search for `query`, returning at most `max_results` entries.
    ///
    /// `Ok(None)` means the search succeeded but found nothing usable.
    async fn lookup(
        &self,
        query: &str,
        max_results: usize,
    ) -> std::result::Result<Option<String>, LookupError>;
}
