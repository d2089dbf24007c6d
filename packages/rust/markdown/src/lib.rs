//! Markdown normalization for scraped articles.
//!
//! Two passes, always applied in this order:
//! 1. [`normalize_header`] keeps a single title and drops the duplicate
//!    title, author block, and hero image that scrapers carry over.
//! 2. [`strip_code_line_numbers`] removes highlighter gutter numbers from
//!    lines inside fenced code blocks.
//!
//! Both are total functions over `&str`: any input, including empty or
//! non-markdown text, produces a string.

mod header;
mod line_numbers;

pub use header::normalize_header;
pub use line_numbers::strip_code_line_numbers;

/// Clean a single scraped article.
///
/// The header pass delegates to the line-number pass on every path, so the
/// stripper runs exactly once per document.
pub fn clean_article(md: &str) -> String {
    normalize_header(md)
}
