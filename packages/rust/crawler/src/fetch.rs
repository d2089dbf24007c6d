//! Raw file downloads.

use std::path::Path;

use reqwest::Client;
use tracing::{info, instrument};

use mdcorpus_shared::{CorpusError, Result};

/// GET a URL and return its body as text. Non-2xx responses are errors.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CorpusError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CorpusError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| CorpusError::Network(format!("{url}: failed to read body: {e}")))
}

/// Download `url` into `path`, creating parent directories.
///
/// Returns the number of bytes written.
#[instrument(skip(client), fields(path = %path.display()))]
pub async fn fetch_to_file(client: &Client, url: &str, path: &Path) -> Result<usize> {
    let body = fetch_text(client, url).await?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CorpusError::io(parent, e))?;
    }
    std::fs::write(path, &body).map_err(|e| CorpusError::io(path, e))?;

    info!(size_kb = body.len().div_ceil(1024), "saved download");
    Ok(body.len())
}
