//! Page-to-markdown scraping through the Firecrawl HTTP API.
//!
//! Only the `/v1/scrape` endpoint is used: one request per article URL,
//! asking for the `markdown` format.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use mdcorpus_shared::{CorpusError, Result};

/// Scrapes render JavaScript server-side and can be slow.
const SCRAPE_TIMEOUT_SECS: u64 = 60;

/// A scraped page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPage {
    /// Main-content markdown.
    pub markdown: String,
    /// Page title from the scrape metadata, if any.
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'a str; 1],
    only_main_content: bool,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    metadata: Option<ScrapeMetadata>,
}

#[derive(Debug, Deserialize)]
struct ScrapeMetadata {
    #[serde(default)]
    title: Option<String>,
}

/// Thin client for the Firecrawl scrape endpoint.
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    client: Client,
    endpoint: String,
    api_key: String,
    only_main_content: bool,
}

impl FirecrawlClient {
    /// Create a client against `api_url` (e.g. `https://api.firecrawl.dev`).
    pub fn new(api_url: &str, api_key: impl Into<String>, only_main_content: bool) -> Result<Self> {
        let client = crate::build_client(Duration::from_secs(SCRAPE_TIMEOUT_SECS))?;
        Ok(Self {
            client,
            endpoint: format!("{}/v1/scrape", api_url.trim_end_matches('/')),
            api_key: api_key.into(),
            only_main_content,
        })
    }

    /// Scrape a single URL to markdown.
    ///
    /// A response without `success` or without markdown is a
    /// [`CorpusError::Scrape`].
    #[instrument(skip(self))]
    pub async fn scrape(&self, url: &str) -> Result<ScrapedPage> {
        let body = ScrapeRequest {
            url,
            formats: ["markdown"],
            only_main_content: self.only_main_content,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CorpusError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let parsed: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| CorpusError::parse(format!("{url}: invalid scrape response (HTTP {status}): {e}")))?;

        let has_markdown = parsed
            .data
            .as_ref()
            .is_some_and(|d| d.markdown.is_some());
        debug!(%status, success = parsed.success, has_markdown, "scrape response");

        if !parsed.success {
            let reason = parsed.error.unwrap_or_else(|| format!("HTTP {status}"));
            return Err(CorpusError::Scrape(format!("{url}: {reason}")));
        }

        let data = parsed
            .data
            .ok_or_else(|| CorpusError::Scrape(format!("{url}: response has no data")))?;
        let markdown = data
            .markdown
            .filter(|md| !md.is_empty())
            .ok_or_else(|| CorpusError::Scrape(format!("{url}: response has no markdown")))?;
        let title = data
            .metadata
            .and_then(|m| m.title)
            .filter(|t| !t.is_empty());

        Ok(ScrapedPage { markdown, title })
    }
}

/// Lowercase, collapse runs of anything outside `[a-z0-9]` into `-`, and
/// trim dashes from both ends.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut pending_dash = false;

    for ch in lower.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// File stem for an article URL: the slugified last path segment.
///
/// Falls back to `article` when the URL has no usable last segment.
pub fn article_file_name(url: &str) -> String {
    let segment = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segs| segs.next_back().map(str::to_string))
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "article".to_string());

    slugify(&segment)
}
