//! Educational video search via DuckDuckGo's video endpoint.
//!
//! The endpoint needs a `vqd` token scraped from the regular search page
//! for the same query, so every lookup costs two requests.

use async_trait::async_trait;
use nova_core::error::LookupError;
use nova_core::lookup::{Lookup, LookupKind};
use regex_lite::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "duckduckgo_videos";
const BASE_URL: &str = "https://duckduckgo.com";
const QUERY_SUFFIX: &str = "educational tutorial";

static VQD_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"vqd=["']?([0-9-]+)"#).ok());

pub struct DuckDuckGoVideoSearch {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl DuckDuckGoVideoSearch {
    pub fn new(timeout: Duration) -> Self {
        Self {
            base_url: BASE_URL.into(),
            timeout,
            client: crate::http_client(timeout),
        }
    }

    async fn token(&self, query: &str) -> Result<String, LookupError> {
        let request = self
            .client
            .get(format!("{}/", self.base_url))
            .query(&[("q", query)]);
        let page = crate::fetch_text(SERVICE, request, self.timeout).await?;
        extract_vqd(&page).ok_or_else(|| LookupError::Parse {
            service: SERVICE.into(),
            reason: "no vqd token in search page".into(),
        })
    }
}

#[async_trait]
impl Lookup for DuckDuckGoVideoSearch {
    fn name(&self) -> &str {
        SERVICE
    }

    fn kind(&self) -> LookupKind {
        LookupKind::VideoSearch
    }

    async fn lookup(&self, query: &str, max_results: usize) -> Result<Option<String>, LookupError> {
        let query = query.trim();
        if query.is_empty() || max_results == 0 {
            return Ok(None);
        }

        let search_query = format!("{query} {QUERY_SUFFIX}");
        let vqd = self.token(&search_query).await?;

        let request = self
            .client
            .get(format!("{}/v.js", self.base_url))
            .header("Referer", format!("{}/", self.base_url))
            .query(&[
                ("l", "us-en"),
                ("o", "json"),
                ("q", search_query.as_str()),
                ("vqd", vqd.as_str()),
                ("f", ",,,"),
                ("p", "1"),
            ]);
        let response: VideoResponse = crate::fetch_json(SERVICE, request, self.timeout).await?;

        let videos: Vec<Video> = response.results.into_iter().take(max_results).collect();
        debug!(query = %search_query, count = videos.len(), "Video search finished");
        if videos.is_empty() {
            return Ok(None);
        }
        Ok(Some(format_videos(&videos)))
    }
}

/// Pull the `vqd` token out of a DuckDuckGo search page.
fn extract_vqd(html: &str) -> Option<String> {
    VQD_PATTERN
        .as_ref()?
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// One video hit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(default = "unknown_publisher")]
    pub publisher: String,
    #[serde(default)]
    pub duration: String,
    /// The watch URL
    #[serde(default)]
    pub content: String,
}

fn untitled() -> String {
    "No title".into()
}

fn unknown_publisher() -> String {
    "Unknown".into()
}

pub fn format_videos(videos: &[Video]) -> String {
    let mut lines = vec!["🎬 **Educational Videos:**\n".to_string()];
    for (i, video) in videos.iter().enumerate() {
        lines.push(format!("**{}. {}**", i + 1, video.title));
        lines.push(format!("   📺 {} | ⏱️ {}", video.publisher, video.duration));
        if !video.content.is_empty() {
            lines.push(format!("   ▶️ Watch: {}", video.content));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

#[derive(Debug, Deserialize)]
struct VideoResponse {
    #[serde(default)]
    results: Vec<Video>,
}
