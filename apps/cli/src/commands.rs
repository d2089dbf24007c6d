//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use mdcorpus_core::knowledge::KnowledgeInputs;
use mdcorpus_core::pipeline::{BuildSummary, ProgressReporter};
use mdcorpus_core::{articles, docs, knowledge, pipeline};
use mdcorpus_crawler::{FirecrawlClient, default_client, discover_article_links, fetch_to_file, read_links, write_links};
use mdcorpus_shared::{
    AppConfig, firecrawl_api_key, init_config, load_config, load_config_from, validate_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mdcorpus — turn scraped articles and docs into one knowledge-base file.
#[derive(Parser)]
#[command(
    name = "mdcorpus",
    version,
    about = "Scrape, clean, and concatenate markdown into a single knowledge-base document.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.mdcorpus/mdcorpus.toml).
    #[arg(long, global = true, env = "MDCORPUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Collect article links from the blog tag page.
    Links,

    /// Scrape every collected link to markdown via Firecrawl.
    Scrape,

    /// Normalize scraped articles (titles, hero images, code line numbers).
    Clean {
        /// Directory of scraped articles (defaults to paths.articles_dir).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Directory for cleaned articles (defaults to paths.cleaned_dir).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Concatenate cleaned articles into the blog corpus.
    Combine,

    /// Download the helpers README.
    Helpers,

    /// Clone the docs repository and merge its pages.
    Docs,

    /// Merge blog, helpers, and docs into the knowledge-base file.
    Merge,

    /// Run every stage in order.
    Build,

    /// Clean a single markdown file and print the result.
    Normalize {
        /// Markdown file to clean.
        file: PathBuf,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mdcorpus=info",
        1 => "mdcorpus=debug",
        _ => "mdcorpus=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `normalize` output on stdout stays clean.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Links => cmd_links(&config).await,
        Command::Scrape => cmd_scrape(&config).await,
        Command::Clean { input, output } => cmd_clean(&config, input, output),
        Command::Combine => cmd_combine(&config),
        Command::Helpers => cmd_helpers(&config).await,
        Command::Docs => cmd_docs(&config).await,
        Command::Merge => cmd_merge(&config),
        Command::Build => cmd_build(&config).await,
        Command::Normalize { file, output } => cmd_normalize(&file, output.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Stage commands
// ---------------------------------------------------------------------------

async fn cmd_links(config: &AppConfig) -> Result<()> {
    let client = default_client()?;
    let links = discover_article_links(
        &client,
        &config.blog.tag_url,
        &config.blog.exclude_link_substring,
    )
    .await?;
    write_links(&config.paths.links_file, &links)?;

    println!(
        "Saved {} article links to {}",
        links.len(),
        config.paths.links_file.display()
    );
    Ok(())
}

async fn cmd_scrape(config: &AppConfig) -> Result<()> {
    let api_key = firecrawl_api_key(config)?;
    let links = read_links(&config.paths.links_file)
        .wrap_err("no links file; run `mdcorpus links` first")?;

    let client = FirecrawlClient::new(
        &config.firecrawl.api_url,
        api_key,
        config.firecrawl.only_main_content,
    )?;

    let reporter = CliProgress::new();
    reporter.phase("Scraping articles");
    let summary = articles::scrape_articles(
        &client,
        &links,
        &config.paths.articles_dir,
        Duration::from_millis(config.firecrawl.delay_ms),
        &reporter,
    )
    .await?;
    reporter.finish();

    println!();
    println!("  Scraped: {}", summary.scraped);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed:  {}", summary.failed);
    println!("  Dir:     {}", config.paths.articles_dir.display());
    println!();

    Ok(())
}

fn cmd_clean(config: &AppConfig, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let input = input.unwrap_or_else(|| config.paths.articles_dir.clone());
    let output = output.unwrap_or_else(|| config.paths.cleaned_dir.clone());

    let summary = articles::clean_articles(&input, &output)?;

    println!(
        "Processed {} articles ({} cleaned, {} unchanged) into {}",
        summary.total(),
        summary.cleaned,
        summary.unchanged,
        output.display()
    );
    Ok(())
}

fn cmd_combine(config: &AppConfig) -> Result<()> {
    let bytes = articles::combine_to_file(
        &config.paths.cleaned_dir,
        &config.blog.header(),
        &config.paths.blog_file,
    )?;

    println!(
        "Blog corpus written to {} ({} KB)",
        config.paths.blog_file.display(),
        bytes.div_ceil(1024)
    );
    Ok(())
}

async fn cmd_helpers(config: &AppConfig) -> Result<()> {
    let client = default_client()?;
    let bytes = fetch_to_file(&client, &config.helpers.readme_url, &config.paths.helpers_file).await?;

    println!(
        "Helpers README saved to {} ({} KB)",
        config.paths.helpers_file.display(),
        bytes.div_ceil(1024)
    );
    Ok(())
}

async fn cmd_docs(config: &AppConfig) -> Result<()> {
    let pages = docs::build_docs(&config.docs, &config.paths.docs_file).await?;

    println!(
        "Merged {pages} documentation pages into {}",
        config.paths.docs_file.display()
    );
    Ok(())
}

fn cmd_merge(config: &AppConfig) -> Result<()> {
    let paths = &config.paths;
    let inputs = KnowledgeInputs {
        blog: &paths.blog_file,
        helpers: &paths.helpers_file,
        docs: &paths.docs_file,
    };
    let bytes = knowledge::merge_knowledge_files(
        inputs,
        &config.blog.header(),
        &config.knowledge,
        &paths.output_file,
    )?;

    println!(
        "Knowledge base created: {} ({} KB)",
        paths.output_file.display(),
        bytes.div_ceil(1024)
    );
    Ok(())
}

async fn cmd_build(config: &AppConfig) -> Result<()> {
    validate_api_key(config)?;
    info!(output = %config.paths.output_file.display(), "building corpus");

    let reporter = CliProgress::new();
    let summary = pipeline::build_corpus(config, &reporter).await?;

    println!();
    println!("  Knowledge base built!");
    println!("  Links:     {}", summary.links);
    println!(
        "  Scraped:   {} new, {} cached, {} failed",
        summary.scrape.scraped, summary.scrape.skipped, summary.scrape.failed
    );
    println!(
        "  Articles:  {} ({} cleaned)",
        summary.clean.total(),
        summary.clean.cleaned
    );
    println!("  Doc pages: {}", summary.doc_pages);
    println!(
        "  Output:    {} ({} KB)",
        summary.output.display(),
        summary.output_bytes.div_ceil(1024)
    );
    println!("  Time:      {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_normalize(file: &Path, output: Option<&Path>) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;
    let cleaned = mdcorpus_markdown::clean_article(&content);

    match output {
        Some(path) => {
            std::fs::write(path, &cleaned)
                .map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
            info!(path = %path.display(), "normalized document written");
        }
        None => print!("{cleaned}"),
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self::with_bar(spinner)
    }

    fn with_bar(spinner: ProgressBar) -> Self {
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

// Clears the spinner when a command bails out with `?` before `finish`.
impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn item(&self, name: &str, current: usize, total: usize) {
        self.spinner.set_message(format!("[{current}/{total}] {name}"));
    }

    fn done(&self, _summary: &BuildSummary) {
        self.finish();
    }
}
