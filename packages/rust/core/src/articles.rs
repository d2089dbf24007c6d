//! Blog article stages: scrape to markdown, clean, and combine.
//!
//! Each stage reads the previous stage's directory, so any of them can be
//! re-run on its own:
//! `links → articles_dir (scrape) → cleaned_dir (clean) → blog_file (combine)`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use mdcorpus_crawler::{FirecrawlClient, article_file_name};
use mdcorpus_markdown::clean_article;
use mdcorpus_shared::{CorpusError, CorpusHeader, Result, document_break};

use crate::pipeline::ProgressReporter;

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Outcome counts of a scrape run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub scraped: usize,
    /// Already on disk from an earlier run.
    pub skipped: usize,
    pub failed: usize,
}

/// Outcome counts of a clean run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    /// Articles the normalizer changed.
    pub cleaned: usize,
    /// Articles copied through as is.
    pub unchanged: usize,
}

impl CleanSummary {
    pub fn total(&self) -> usize {
        self.cleaned + self.unchanged
    }
}

// ---------------------------------------------------------------------------
// Scrape
// ---------------------------------------------------------------------------

/// Scrape every link into `articles_dir/<slug>.md`.
///
/// Existing files are skipped so an interrupted run can resume. A failed
/// page is logged and counted, never fatal. Each saved file starts with
/// `# <title>` (the page title, or the slug when the page has none).
#[instrument(skip_all, fields(links = links.len(), dir = %articles_dir.display()))]
pub async fn scrape_articles(
    client: &FirecrawlClient,
    links: &[String],
    articles_dir: &Path,
    delay: Duration,
    progress: &dyn ProgressReporter,
) -> Result<ScrapeSummary> {
    std::fs::create_dir_all(articles_dir).map_err(|e| CorpusError::io(articles_dir, e))?;

    let mut summary = ScrapeSummary::default();
    let total = links.len();

    info!(total, "scraping articles");

    for (i, url) in links.iter().enumerate() {
        let stem = article_file_name(url);
        let output_path = articles_dir.join(format!("{stem}.md"));
        progress.item(url, i + 1, total);

        if output_path.exists() {
            summary.skipped += 1;
            debug!(file = %output_path.display(), "already scraped, skipping");
            continue;
        }

        match client.scrape(url).await {
            Ok(page) => {
                let title = page.title.unwrap_or_else(|| stem.clone());
                let content = format!("# {title}\n\n{}", page.markdown);
                std::fs::write(&output_path, content)
                    .map_err(|e| CorpusError::io(&output_path, e))?;
                summary.scraped += 1;
                debug!(file = %output_path.display(), "saved article");
            }
            Err(e) => {
                summary.failed += 1;
                warn!(%url, error = %e, "scrape failed, skipping article");
            }
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    info!(
        scraped = summary.scraped,
        skipped = summary.skipped,
        failed = summary.failed,
        "scrape complete"
    );

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Clean
// ---------------------------------------------------------------------------

/// Normalize every `*.md` file in `input_dir` into `output_dir`.
///
/// File names are kept. The input directory is not recursed into.
#[instrument(skip_all, fields(input = %input_dir.display(), output = %output_dir.display()))]
pub fn clean_articles(input_dir: &Path, output_dir: &Path) -> Result<CleanSummary> {
    let files = list_markdown_files(input_dir)?;
    std::fs::create_dir_all(output_dir).map_err(|e| CorpusError::io(output_dir, e))?;

    info!(count = files.len(), "cleaning articles");

    let mut summary = CleanSummary::default();
    for path in &files {
        let content = std::fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;
        let cleaned = clean_article(&content);

        let Some(name) = path.file_name() else {
            continue;
        };
        let target = output_dir.join(name);
        std::fs::write(&target, &cleaned).map_err(|e| CorpusError::io(&target, e))?;

        if cleaned == content {
            summary.unchanged += 1;
            debug!(file = %target.display(), "copied unchanged");
        } else {
            summary.cleaned += 1;
            debug!(file = %target.display(), "cleaned");
        }
    }

    info!(
        cleaned = summary.cleaned,
        unchanged = summary.unchanged,
        "articles processed"
    );

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Combine
// ---------------------------------------------------------------------------

/// Concatenate the cleaned articles under a corpus header.
///
/// Documents appear in file-name order separated by a `---` line.
pub fn combine_articles(cleaned_dir: &Path, header: &CorpusHeader) -> Result<String> {
    if !cleaned_dir.is_dir() {
        return Err(CorpusError::validation(format!(
            "{} not found. Run the clean stage first.",
            cleaned_dir.display()
        )));
    }

    let files = list_markdown_files(cleaned_dir)?;
    info!(count = files.len(), "combining articles");

    let documents = files
        .iter()
        .map(|path| {
            debug!(file = %path.display(), "adding article");
            std::fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut combined = header.render();
    combined.push_str(&documents.join(&document_break()));
    Ok(combined)
}

/// [`combine_articles`] and write the result to `output`.
///
/// Returns the number of bytes written.
#[instrument(skip_all, fields(output = %output.display()))]
pub fn combine_to_file(cleaned_dir: &Path, header: &CorpusHeader, output: &Path) -> Result<usize> {
    let combined = combine_articles(cleaned_dir, header)?;
    write_output(output, &combined)?;
    info!(size_kb = combined.len().div_ceil(1024), "blog corpus written");
    Ok(combined.len())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `*.md` files directly inside `dir`, sorted by file name.
pub(crate) fn list_markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| CorpusError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CorpusError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Write a file, creating its parent directory.
pub(crate) fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CorpusError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| CorpusError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::pipeline::SilentProgress;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mdcorpus-articles-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn header() -> CorpusHeader {
        CorpusHeader::new("Patterns", "Everything we scraped.")
    }

    #[test]
    fn clean_articles_normalizes_and_counts() {
        let tmp = temp_dir();
        let input = tmp.join("articles");
        let output = tmp.join("cleaned");
        std::fs::create_dir_all(&input).unwrap();

        std::fs::write(
            input.join("paginate.md"),
            "# Paginate\n\n# Paginate\n\n![hero](h.png)\n\nUse cursors.",
        )
        .unwrap();
        std::fs::write(input.join("plain.md"), "# Plain\n\nNothing to fix.").unwrap();
        std::fs::write(input.join("notes.txt"), "# Ignored\n\n# Ignored\n\nx").unwrap();

        let summary = clean_articles(&input, &output).unwrap();
        assert_eq!(summary, CleanSummary { cleaned: 1, unchanged: 1 });
        assert_eq!(summary.total(), 2);

        let paginate = std::fs::read_to_string(output.join("paginate.md")).unwrap();
        assert_eq!(paginate, "# Paginate\n\nUse cursors.");
        let plain = std::fs::read_to_string(output.join("plain.md")).unwrap();
        assert_eq!(plain, "# Plain\n\nNothing to fix.");
        assert!(!output.join("notes.txt").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn clean_articles_missing_input_is_io_error() {
        let tmp = temp_dir();
        let err = clean_articles(&tmp.join("nope"), &tmp.join("out")).unwrap_err();
        assert!(matches!(err, CorpusError::Io { .. }));
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn combine_sorts_and_separates() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("b.md"), "# B\n\nbee").unwrap();
        std::fs::write(tmp.join("a.md"), "# A\n\nay").unwrap();
        std::fs::write(tmp.join("c.md"), "# C\n\nsee").unwrap();

        let combined = combine_articles(&tmp, &header()).unwrap();
        assert_eq!(
            combined,
            "# Patterns\n\nEverything we scraped.\n\n---\n\n\
             # A\n\nay\n\n---\n\n# B\n\nbee\n\n---\n\n# C\n\nsee"
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn combine_empty_dir_is_header_only() {
        let tmp = temp_dir();
        let combined = combine_articles(&tmp, &header()).unwrap();
        assert_eq!(combined, header().render());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn combine_missing_dir_asks_for_clean() {
        let tmp = temp_dir();
        let err = combine_articles(&tmp.join("cleaned"), &header()).unwrap_err();
        assert!(matches!(err, CorpusError::Validation { .. }));
        assert!(err.to_string().contains("clean stage"));
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn combine_to_file_creates_parent() {
        let tmp = temp_dir();
        let cleaned = tmp.join("cleaned");
        std::fs::create_dir_all(&cleaned).unwrap();
        std::fs::write(cleaned.join("only.md"), "# Only").unwrap();

        let output = tmp.join("blog").join("corpus.md");
        let written = combine_to_file(&cleaned, &header(), &output).unwrap();

        let saved = std::fs::read_to_string(&output).unwrap();
        assert_eq!(saved.len(), written);
        assert!(saved.ends_with("---\n\n# Only"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn scrape_articles_saves_skips_and_counts_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "url": "https://stack.convex.dev/good-one"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": { "markdown": "Body text", "metadata": { "title": "Good One" } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "url": "https://stack.convex.dev/untitled"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": { "markdown": "No title here" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "url": "https://stack.convex.dev/broken"
            })))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "success": false,
                "error": "boom"
            })))
            .mount(&server)
            .await;

        let tmp = temp_dir();
        std::fs::write(tmp.join("existing.md"), "# Existing").unwrap();

        let client = FirecrawlClient::new(&server.uri(), "fc-test", true).unwrap();
        let links = vec![
            "https://stack.convex.dev/good-one".to_string(),
            "https://stack.convex.dev/existing".to_string(),
            "https://stack.convex.dev/untitled".to_string(),
            "https://stack.convex.dev/broken".to_string(),
        ];

        let summary = scrape_articles(&client, &links, &tmp, Duration::ZERO, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(
            summary,
            ScrapeSummary { scraped: 2, skipped: 1, failed: 1 }
        );
        assert_eq!(
            std::fs::read_to_string(tmp.join("good-one.md")).unwrap(),
            "# Good One\n\nBody text"
        );
        assert_eq!(
            std::fs::read_to_string(tmp.join("untitled.md")).unwrap(),
            "# untitled\n\nNo title here"
        );
        assert_eq!(std::fs::read_to_string(tmp.join("existing.md")).unwrap(), "# Existing");
        assert!(!tmp.join("broken.md").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
