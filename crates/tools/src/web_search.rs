//! Web search via the DuckDuckGo Instant Answer API.
//!
//! Entries come from the topic abstract and the related topics, with topic
//! groups flattened in order.

use async_trait::async_trait;
use nova_core::error::LookupError;
use nova_core::lookup::{Lookup, LookupKind};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "duckduckgo";
const API_URL: &str = "https://api.duckduckgo.com/";

pub struct DuckDuckGoWebSearch {
    api_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl DuckDuckGoWebSearch {
    pub fn new(timeout: Duration) -> Self {
        Self {
            api_url: API_URL.into(),
            timeout,
            client: crate::http_client(timeout),
        }
    }
}

#[async_trait]
impl Lookup for DuckDuckGoWebSearch {
    fn name(&self) -> &str {
        SERVICE
    }

    fn kind(&self) -> LookupKind {
        LookupKind::WebSearch
    }

    async fn lookup(&self, query: &str, max_results: usize) -> Result<Option<String>, LookupError> {
        let query = query.trim();
        if query.is_empty() || max_results == 0 {
            return Ok(None);
        }

        let request = self.client.get(&self.api_url).query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ]);
        let answer: InstantAnswer = crate::fetch_json(SERVICE, request, self.timeout).await?;

        let results = collect_results(answer, max_results);
        debug!(query, count = results.len(), "Web search finished");
        if results.is_empty() {
            return Ok(None);
        }
        Ok(Some(format_results(&results)))
    }
}

/// One web hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebResult {
    pub title: String,
    pub body: String,
    pub url: String,
}

/// Numbered bold titles, the body, an optional link, and a blank line.
pub fn format_results(results: &[WebResult]) -> String {
    let mut lines = vec!["🌐 **Web Search Results:**\n".to_string()];
    for (i, result) in results.iter().enumerate() {
        lines.push(format!("**{}. {}**", i + 1, result.title));
        lines.push(result.body.clone());
        if !result.url.is_empty() {
            lines.push(format!("🔗 {}", result.url));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn collect_results(answer: InstantAnswer, max_results: usize) -> Vec<WebResult> {
    let mut results = Vec::new();

    if !answer.abstract_text.trim().is_empty() {
        let title = if answer.heading.is_empty() {
            answer.abstract_source.clone()
        } else {
            answer.heading.clone()
        };
        results.push(WebResult {
            title,
            body: answer.abstract_text.trim().to_string(),
            url: answer.abstract_url.clone(),
        });
    }

    let topics = answer.related_topics.into_iter().flat_map(|topic| {
        if topic.topics.is_empty() {
            vec![topic]
        } else {
            topic.topics
        }
    });

    for topic in topics {
        if results.len() >= max_results {
            break;
        }
        let text = topic.text.trim();
        if text.is_empty() {
            continue;
        }
        let (title, body) = match text.split_once(" - ") {
            Some((title, body)) => (title.to_string(), body.to_string()),
            None => (
                title_from_url(&topic.first_url).unwrap_or_else(|| text.to_string()),
                text.to_string(),
            ),
        };
        results.push(WebResult {
            title,
            body,
            url: topic.first_url,
        });
    }

    results.truncate(max_results);
    results
}

/// `https://duckduckgo.com/Rust_(programming_language)` → `Rust (programming language)`
fn title_from_url(url: &str) -> Option<String> {
    let slug = url.rsplit('/').next()?;
    if slug.is_empty() {
        return None;
    }
    Some(slug.replace('_', " "))
}

// --- API wire types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    abstract_source: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelatedTopic {
    #[serde(default)]
    text: String,
    #[serde(default, rename = "FirstURL")]
    first_url: String,
    /// Present on topic groups instead of `Text`
    #[serde(default)]
    topics: Vec<RelatedTopic>,
}
