//! Small domain types shared by the corpus stages.

/// Delimiter line placed between documents in a combined corpus.
pub const DOCUMENT_SEPARATOR: &str = "---";

/// Title and description written at the top of a combined document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusHeader {
    pub title: String,
    pub description: String,
}

impl CorpusHeader {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Render as `# title`, the description, and a separator line.
    pub fn render(&self) -> String {
        format!(
            "# {}\n\n{}\n\n{DOCUMENT_SEPARATOR}\n\n",
            self.title, self.description
        )
    }
}

/// The text placed between two documents: a separator line padded by blank lines.
pub fn document_break() -> String {
    format!("\n\n{DOCUMENT_SEPARATOR}\n\n")
}
