//! Application configuration for mdcorpus.
//!
//! User config lives at `~/.mdcorpus/mdcorpus.toml`.
//! A `--config` flag overrides the location; a missing file means defaults.
//! Every default reproduces the Convex knowledge-base build.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, Result};
use crate::types::CorpusHeader;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mdcorpus.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mdcorpus";

// ---------------------------------------------------------------------------
// Config structs (matching mdcorpus.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where each stage reads and writes.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Blog article discovery and combining.
    #[serde(default)]
    pub blog: BlogConfig,

    /// Firecrawl scraping settings.
    #[serde(default)]
    pub firecrawl: FirecrawlConfig,

    /// Documentation repository to clone and merge.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Helper library README.
    #[serde(default)]
    pub helpers: HelpersConfig,

    /// Final knowledge-base document.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Raw scraped articles, one `.md` per page.
    pub articles_dir: PathBuf,
    /// Normalized articles.
    pub cleaned_dir: PathBuf,
    /// JSON list of discovered article URLs.
    pub links_file: PathBuf,
    /// Combined blog corpus.
    pub blog_file: PathBuf,
    /// Merged documentation.
    pub docs_file: PathBuf,
    /// Fetched helpers README.
    pub helpers_file: PathBuf,
    /// Final knowledge-base document.
    pub output_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            articles_dir: "tmp/blog/articles".into(),
            cleaned_dir: "tmp/blog/cleaned".into(),
            links_file: "tmp/blog/article-links.json".into(),
            blog_file: "tmp/blog/convex-blog.md".into(),
            docs_file: "tmp/doc/convex-doc.md".into(),
            helpers_file: "tmp/helpers/convex-helpers.md".into(),
            output_file: "convex-knowledge.md".into(),
        }
    }
}

/// `[blog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    /// Tag listing page whose `<main>` links are the articles.
    pub tag_url: String,
    /// Links containing this substring are dropped (author pages).
    pub exclude_link_substring: String,
    /// Title of the combined blog corpus.
    pub title: String,
    /// One-line description under the title.
    pub description: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            tag_url: "https://stack.convex.dev/tag/Patterns".into(),
            exclude_link_substring: "/author/".into(),
            title: "Convex Development Patterns".into(),
            description: "This document contains all Convex development patterns scraped from stack.convex.dev.".into(),
        }
    }
}

impl BlogConfig {
    /// Header written at the top of the combined blog corpus.
    pub fn header(&self) -> CorpusHeader {
        CorpusHeader::new(&self.title, &self.description)
    }
}

/// `[firecrawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirecrawlConfig {
    /// Name of the env var holding the API key (never store the key itself).
    pub api_key_env: String,
    /// API base URL.
    pub api_url: String,
    /// Pause between scrape requests, in milliseconds.
    pub delay_ms: u64,
    /// Ask Firecrawl to drop navigation and other page chrome.
    pub only_main_content: bool,
}

impl Default for FirecrawlConfig {
    fn default() -> Self {
        Self {
            api_key_env: "FIRECRAWL_API_KEY".into(),
            api_url: "https://api.firecrawl.dev".into(),
            delay_ms: 1000,
            only_main_content: true,
        }
    }
}

/// `[docs]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Git repository containing the documentation sources.
    pub repo_url: String,
    /// Temporary clone location, removed after merging.
    pub clone_dir: PathBuf,
    /// Documentation root inside the clone.
    pub docs_subdir: PathBuf,
    /// File placed first in the merged output.
    pub home_file: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            repo_url: "https://github.com/ThomasKientz/convex-backend.git".into(),
            clone_dir: "convex-backend-clone".into(),
            docs_subdir: "npm-packages/docs/docs".into(),
            home_file: "home.mdx".into(),
        }
    }
}

/// `[helpers]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpersConfig {
    /// Raw README URL.
    pub readme_url: String,
}

impl Default for HelpersConfig {
    fn default() -> Self {
        Self {
            readme_url: "https://raw.githubusercontent.com/get-convex/convex-helpers/refs/heads/main/packages/convex-helpers/README.md".into(),
        }
    }
}

/// `[knowledge]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub title: String,
    pub description: String,
    /// Heading above the blog corpus.
    pub patterns_heading: String,
    /// Heading above the helpers README.
    pub helpers_heading: String,
    /// Heading above the merged documentation.
    pub docs_heading: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            title: "Convex Knowledge Base".into(),
            description: "This document contains comprehensive Convex knowledge including development patterns, official documentation, and helper utilities.".into(),
            patterns_heading: "Development Patterns".into(),
            helpers_heading: "Helper Utilities".into(),
            docs_heading: "Official Documentation".into(),
        }
    }
}

impl KnowledgeConfig {
    /// Header written at the top of the knowledge-base document.
    pub fn header(&self) -> CorpusHeader {
        CorpusHeader::new(&self.title, &self.description)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mdcorpus/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| CorpusError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mdcorpus/mdcorpus.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| CorpusError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CorpusError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| CorpusError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CorpusError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the Firecrawl API key from the configured env var.
pub fn firecrawl_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.firecrawl.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(CorpusError::config(format!(
            "Firecrawl API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://firecrawl.dev"
        ))),
    }
}

/// Check that the Firecrawl API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    firecrawl_api_key(config).map(|_| ())
}
