//! Title and hero-image normalization for scraped articles.
//!
//! Scraped blog pages repeat the article title: once as the H1 we prepend when
//! saving the page, then again inside the page body, usually followed by an
//! author block and a hero image. This pass keeps the first title and drops
//! everything between it and the first line of real content.

use tracing::debug;

use crate::line_numbers::{strip_code_line_numbers, trim_line};

/// Normalize the header of a scraped article.
///
/// When the document contains at least two H1 titles, the output is the
/// first title line, one blank line, then the body starting at the first
/// real content line after the second title. Otherwise the text is left as
/// is. Either way the result has its code-block line numbers stripped.
pub fn normalize_header(md: &str) -> String {
    match restructure(md) {
        Some(restructured) => strip_code_line_numbers(&restructured),
        None => strip_code_line_numbers(md),
    }
}

/// Rebuild the document around the first title, if the two-title pattern is
/// present and content follows the second one.
fn restructure(md: &str) -> Option<String> {
    let lines: Vec<&str> = md.split('\n').collect();
    let mut first_title = None;
    let mut title_count = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if !is_title(line) {
            continue;
        }

        title_count += 1;
        if title_count == 1 {
            first_title = Some(i);
            continue;
        }

        // Only the second title anchors the search; later ones are body text.
        let first = first_title?;
        let body_start = find_body_start(&lines, i + 1)?;

        debug!(first_title = first, second_title = i, body_start, "restructured article header");

        let mut out = String::with_capacity(md.len());
        out.push_str(lines[first]);
        out.push_str("\n\n");
        out.push_str(&lines[body_start..].join("\n"));
        return Some(out);
    }

    None
}

/// Scan forward from `from` for the line where the article body begins.
///
/// First match wins: a hero image hands off to the next non-empty line after
/// it, while any non-empty line that is not an image is the body itself.
/// Avatar images are neither, so they are skipped.
fn find_body_start(lines: &[&str], from: usize) -> Option<usize> {
    for (j, line) in lines.iter().enumerate().skip(from) {
        let trimmed = trim_line(line);

        if is_hero_image(trimmed) {
            if let Some(k) = next_non_empty(lines, j + 1) {
                return Some(k);
            }
        }

        if !trimmed.is_empty() && !trimmed.starts_with("![") {
            return Some(j);
        }
    }

    None
}

fn next_non_empty(lines: &[&str], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&k| !trim_line(lines[k]).is_empty())
}

/// An H1 title line (`# Title`).
fn is_title(line: &str) -> bool {
    trim_line(line).starts_with("# ")
}

/// An image line that is not an author avatar. Expects a trimmed line.
fn is_hero_image(trimmed: &str) -> bool {
    trimmed.starts_with("![") && !trimmed.contains("avatar")
}
