//! End-to-end `build` pipeline:
//! links → scrape → clean → combine → helpers → docs → knowledge base.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use mdcorpus_crawler::{FirecrawlClient, default_client, discover_article_links, fetch_to_file, write_links};
use mdcorpus_shared::{AppConfig, Result, firecrawl_api_key};

use crate::articles::{self, CleanSummary, ScrapeSummary};
use crate::docs;
use crate::knowledge::{self, KnowledgeInputs};

/// Result of a full corpus build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Article links discovered on the tag page.
    pub links: usize,
    pub scrape: ScrapeSummary,
    pub clean: CleanSummary,
    /// Documentation pages merged from the docs repository.
    pub doc_pages: usize,
    /// Path of the knowledge-base document.
    pub output: PathBuf,
    /// Size of the knowledge-base document in bytes.
    pub output_bytes: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each item of a multi-item phase.
    fn item(&self, name: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, summary: &BuildSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &BuildSummary) {}
}

/// Run every stage in order.
///
/// The Firecrawl key is checked before any network or filesystem work.
#[instrument(skip_all)]
pub async fn build_corpus(config: &AppConfig, progress: &dyn ProgressReporter) -> Result<BuildSummary> {
    let start = Instant::now();
    let api_key = firecrawl_api_key(config)?;
    let paths = &config.paths;

    info!(output = %paths.output_file.display(), "starting corpus build");

    // --- Phase 1: Article links ---
    progress.phase("Discovering article links");
    let client = default_client()?;
    let links = discover_article_links(
        &client,
        &config.blog.tag_url,
        &config.blog.exclude_link_substring,
    )
    .await?;
    write_links(&paths.links_file, &links)?;

    // --- Phase 2: Scrape ---
    progress.phase("Scraping articles");
    let firecrawl = FirecrawlClient::new(
        &config.firecrawl.api_url,
        api_key,
        config.firecrawl.only_main_content,
    )?;
    let scrape = articles::scrape_articles(
        &firecrawl,
        &links,
        &paths.articles_dir,
        Duration::from_millis(config.firecrawl.delay_ms),
        progress,
    )
    .await?;

    // --- Phase 3: Clean ---
    progress.phase("Cleaning articles");
    let clean = articles::clean_articles(&paths.articles_dir, &paths.cleaned_dir)?;

    // --- Phase 4: Combine ---
    progress.phase("Combining articles");
    let blog_header = config.blog.header();
    articles::combine_to_file(&paths.cleaned_dir, &blog_header, &paths.blog_file)?;

    // --- Phase 5: Helpers README ---
    progress.phase("Fetching helpers README");
    fetch_to_file(&client, &config.helpers.readme_url, &paths.helpers_file).await?;

    // --- Phase 6: Documentation ---
    progress.phase("Merging documentation");
    let doc_pages = docs::build_docs(&config.docs, &paths.docs_file).await?;

    // --- Phase 7: Knowledge base ---
    progress.phase("Merging knowledge base");
    let inputs = KnowledgeInputs {
        blog: &paths.blog_file,
        helpers: &paths.helpers_file,
        docs: &paths.docs_file,
    };
    let output_bytes =
        knowledge::merge_knowledge_files(inputs, &blog_header, &config.knowledge, &paths.output_file)?;

    let summary = BuildSummary {
        links: links.len(),
        scrape,
        clean,
        doc_pages,
        output: paths.output_file.clone(),
        output_bytes,
        elapsed: start.elapsed(),
    };

    info!(
        links = summary.links,
        articles = summary.clean.total(),
        doc_pages,
        output_bytes,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "corpus build complete"
    );

    progress.done(&summary);
    Ok(summary)
}
