//! Wikipedia lookup: search for candidate articles, then take the intro of
//! the first one that is a real article. A disambiguation page is resolved
//! to its first listed article.

use async_trait::async_trait;
use nova_core::error::LookupError;
use nova_core::lookup::{Lookup, LookupKind};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "wikipedia";
const DISAMBIGUATION_MARKER: &str = "may refer to";

/// Encyclopedia summaries from the MediaWiki API.
pub struct WikipediaLookup {
    api_url: String,
    sentences: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl WikipediaLookup {
    /// `language` selects the wiki (`en` → en.wikipedia.org).
    pub fn new(language: &str, sentences: u32, timeout: Duration) -> Self {
        Self {
            api_url: format!("https://{language}.wikipedia.org/w/api.php"),
            sentences: sentences.max(1),
            timeout,
            client: crate::http_client(timeout),
        }
    }

    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>, LookupError> {
        let limit = limit.to_string();
        let request = self.client.get(&self.api_url).query(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", limit.as_str()),
            ("format", "json"),
            ("formatversion", "2"),
        ]);
        let response: SearchResponse = crate::fetch_json(SERVICE, request, self.timeout).await?;
        Ok(search_titles(response))
    }

    async fn fetch_page(&self, title: &str) -> Result<PageKind, LookupError> {
        let sentences = self.sentences.to_string();
        let request = self.client.get(&self.api_url).query(&[
            ("action", "query"),
            ("prop", "extracts|info"),
            ("exintro", "1"),
            ("explaintext", "1"),
            ("exsentences", sentences.as_str()),
            ("inprop", "url"),
            ("redirects", "1"),
            ("titles", title),
            ("format", "json"),
            ("formatversion", "2"),
        ]);
        let response: PageResponse = crate::fetch_json(SERVICE, request, self.timeout).await?;
        Ok(classify_page(response))
    }

    /// The first existing article a disambiguation page links to.
    async fn first_option(&self, title: &str) -> Result<Option<String>, LookupError> {
        let request = self.client.get(&self.api_url).query(&[
            ("action", "parse"),
            ("page", title),
            ("prop", "links"),
            ("redirects", "1"),
            ("format", "json"),
            ("formatversion", "2"),
        ]);
        let response: ParseResponse = crate::fetch_json(SERVICE, request, self.timeout).await?;
        Ok(first_article_link(response))
    }

    /// Resolve one candidate title to an article, following a
    /// disambiguation page at most once.
    async fn resolve(&self, title: &str) -> Result<Option<Page>, LookupError> {
        match self.fetch_page(title).await? {
            PageKind::Article(page) => Ok(Some(page)),
            PageKind::Unusable => Ok(None),
            PageKind::Disambiguation => {
                let Some(option) = self.first_option(title).await? else {
                    return Ok(None);
                };
                debug!(title, option = %option, "Following disambiguation page");
                match self.fetch_page(&option).await? {
                    PageKind::Article(page) => Ok(Some(page)),
                    _ => Ok(None),
                }
            }
        }
    }
}

#[async_trait]
impl Lookup for WikipediaLookup {
    fn name(&self) -> &str {
        SERVICE
    }

    fn kind(&self) -> LookupKind {
        LookupKind::Encyclopedia
    }

    async fn lookup(&self, query: &str, max_results: usize) -> Result<Option<String>, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let titles = self.search_titles(query, max_results.max(1)).await?;
        if titles.is_empty() {
            debug!(query, "No Wikipedia articles found");
            return Ok(None);
        }

        for title in &titles {
            if let Some(page) = self.resolve(title).await? {
                return Ok(Some(format_page(&page)));
            }
            debug!(title = %title, "Skipping unusable Wikipedia page");
        }

        Ok(None)
    }
}

/// A Wikipedia article intro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// `📚 **<title>**`, the summary, then the source link.
pub fn format_page(page: &Page) -> String {
    format!(
        "📚 **{}**\n\n{}\n\n🔗 Source: {}",
        page.title, page.summary, page.url
    )
}

fn search_titles(response: SearchResponse) -> Vec<String> {
    response
        .query
        .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
        .unwrap_or_default()
}

/// What a fetched title turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageKind {
    Article(Page),
    Disambiguation,
    Unusable,
}

fn classify_page(response: PageResponse) -> PageKind {
    let Some(query) = response.query else {
        return PageKind::Unusable;
    };
    let Some(page) = query.pages.into_iter().find(|p| !p.missing && !p.invalid) else {
        return PageKind::Unusable;
    };

    let summary = page.extract.unwrap_or_default().trim().to_string();
    if summary.is_empty() {
        PageKind::Unusable
    } else if summary.contains(DISAMBIGUATION_MARKER) {
        PageKind::Disambiguation
    } else {
        PageKind::Article(Page {
            title: page.title,
            summary,
            url: page.fullurl.unwrap_or_default(),
        })
    }
}

/// Links come back in page order, so the first existing main-namespace
/// link is the first listed option.
fn first_article_link(response: ParseResponse) -> Option<String> {
    response
        .parse?
        .links
        .into_iter()
        .find(|link| link.ns == 0 && link.exists)
        .map(|link| link.title)
}

// --- API wire types (formatversion=2) ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    query: Option<PageQuery>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    pages: Vec<ApiPage>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    parse: Option<ParsedPage>,
}

#[derive(Debug, Deserialize)]
struct ParsedPage {
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    #[serde(default)]
    ns: i64,
    title: String,
    #[serde(default)]
    exists: bool,
}
