//! Article link discovery from a tag listing page.
//!
//! The listing page's `<main>` element holds one anchor per article plus
//! author profile links. We keep every resolved `href` inside `<main>`,
//! drop the excluded ones, and return a sorted, deduplicated list.

use std::collections::BTreeSet;
use std::path::Path;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use mdcorpus_shared::{CorpusError, Result};

use crate::fetch::fetch_text;

/// Fetch `tag_url` and collect its article links.
#[instrument(skip(client))]
pub async fn discover_article_links(
    client: &Client,
    tag_url: &str,
    exclude: &str,
) -> Result<Vec<String>> {
    let base = Url::parse(tag_url)
        .map_err(|e| CorpusError::validation(format!("invalid tag URL '{tag_url}': {e}")))?;

    info!("fetching tag page");
    let html = fetch_text(client, tag_url).await?;

    let links = extract_main_links(&html, &base, exclude);
    info!(count = links.len(), "article links discovered");

    Ok(links)
}

/// Extract article links from the `<main>` element of a listing page.
///
/// Relative hrefs are resolved against `base`. A page without `<main>`
/// yields no links. An empty `exclude` filters nothing.
pub fn extract_main_links(html: &str, base: &Url, exclude: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(main_sel) = Selector::parse("main") else {
        return Vec::new();
    };
    let Ok(anchor_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let Some(main) = doc.select(&main_sel).next() else {
        debug!("no <main> element on tag page");
        return Vec::new();
    };

    let mut total = 0usize;
    let unique: BTreeSet<String> = main
        .select(&anchor_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .map(|url| url.to_string())
        .inspect(|_| total += 1)
        .filter(|href| exclude.is_empty() || !href.contains(exclude))
        .collect();

    debug!(total, kept = unique.len(), "filtered tag page links");
    unique.into_iter().collect()
}

/// Write links as a pretty-printed JSON array, creating parent directories.
pub fn write_links(path: &Path, links: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CorpusError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(links)
        .map_err(|e| CorpusError::parse(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| CorpusError::io(path, e))?;
    debug!(path = %path.display(), count = links.len(), "wrote links file");
    Ok(())
}

/// Read a links file written by [`write_links`].
pub fn read_links(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| CorpusError::parse(format!("invalid links file {}: {e}", path.display())))
}
