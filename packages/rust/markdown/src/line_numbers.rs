//! Line-number removal for fenced code blocks.
//!
//! Scraped articles often carry the rendered gutter of a syntax highlighter
//! glued onto each code line (`12 const x = 1;`, `7import`, `3// note`).
//! This pass walks the document once, tracking fence state with a single
//! flag, and strips that numeric prefix from lines inside code blocks.

use std::sync::LazyLock;

use regex::Regex;

/// Fence delimiter that toggles code-block state.
pub(crate) const FENCE: &str = "```";

/// Trim a line for matching. A byte-order mark counts as whitespace.
pub(crate) fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Run the stripper over a whole document.
///
/// The output always has exactly as many lines as the input. Fence lines and
/// lines outside code blocks are emitted untouched. An unterminated fence
/// keeps every remaining line inside the block.
pub fn strip_code_line_numbers(md: &str) -> String {
    let mut state = FenceState::Outside;

    md.split('\n')
        .map(|line| {
            if trim_line(line).starts_with(FENCE) {
                state = state.toggle();
                return line;
            }

            match state {
                FenceState::Inside => strip_line_number(line),
                FenceState::Outside => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether the scan is currently inside a fenced code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FenceState {
    Outside,
    Inside,
}

impl FenceState {
    fn toggle(self) -> Self {
        match self {
            Self::Outside => Self::Inside,
            Self::Inside => Self::Outside,
        }
    }
}

/// Remove a 1–3 digit line number from the start of a code line.
///
/// The digits must be followed by a space or tab (consumed), an ASCII
/// letter, a `//` comment, or the end of the line. Anything else, including
/// four or more leading digits, leaves the line as is.
fn strip_line_number(line: &str) -> &str {
    static LINE_NO_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[0-9]{1,3}(?:[ \t](.*)|([a-zA-Z].*|//.*))?$").expect("valid regex")
    });

    match LINE_NO_RE.captures(line) {
        Some(caps) => caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str()),
        None => line,
    }
}
