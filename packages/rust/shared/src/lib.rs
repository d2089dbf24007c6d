//! Shared error model, configuration, and types for mdcorpus.
//!
//! This crate is the foundation depended on by all other mdcorpus crates.
//! It provides:
//! - [`CorpusError`] — the unified error type
//! - Configuration ([`AppConfig`] and its sections, config loading)
//! - [`CorpusHeader`] and the document separator used when combining

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BlogConfig, DocsConfig, FirecrawlConfig, HelpersConfig, KnowledgeConfig,
    PathsConfig, config_dir, config_file_path, firecrawl_api_key, init_config, load_config,
    load_config_from, validate_api_key,
};
pub use error::{CorpusError, Result};
pub use types::{CorpusHeader, DOCUMENT_SEPARATOR, document_break};
