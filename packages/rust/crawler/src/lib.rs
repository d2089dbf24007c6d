//! Network collaborators for building a corpus.
//!
//! This crate provides:
//! - [`links`] — article link discovery from a tag listing page
//! - [`firecrawl`] — page-to-markdown scraping through the Firecrawl API
//! - [`fetch`] — plain downloads of raw files (READMEs)

pub mod fetch;
pub mod firecrawl;
pub mod links;

use std::time::Duration;

use reqwest::Client;

use mdcorpus_shared::{CorpusError, Result};

pub use fetch::{fetch_text, fetch_to_file};
pub use firecrawl::{FirecrawlClient, ScrapedPage, article_file_name, slugify};
pub use links::{discover_article_links, extract_main_links, read_links, write_links};

/// User-Agent string for outgoing requests.
const USER_AGENT: &str = concat!("mdcorpus/", env!("CARGO_PKG_VERSION"));

/// Default timeout for plain page and file downloads.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Build a reqwest client with the shared settings.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(timeout)
        .build()
        .map_err(|e| CorpusError::Network(format!("failed to build HTTP client: {e}")))
}

/// Client used for page and raw-file downloads.
pub fn default_client() -> Result<Client> {
    build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}
