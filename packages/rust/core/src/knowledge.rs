//! Final knowledge-base merge: blog corpus, helpers README, and docs.

use std::path::Path;

use tracing::{info, instrument};

use mdcorpus_shared::{CorpusError, CorpusHeader, KnowledgeConfig, Result, document_break};

use crate::articles::write_output;

/// Inputs of the knowledge merge.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeInputs<'a> {
    pub blog: &'a Path,
    pub helpers: &'a Path,
    pub docs: &'a Path,
}

/// Drop the blog corpus's own header (`# <title>`, description, separator)
/// so it can sit under a section heading.
///
/// Text that does not start with that header is returned as is.
pub fn strip_corpus_header<'a>(text: &'a str, title: &str) -> &'a str {
    let prefix = format!("# {title}\n\n");
    let Some(rest) = text.strip_prefix(prefix.as_str()) else {
        return text;
    };

    let separator = document_break();
    match rest.find(&separator) {
        Some(pos) => &rest[pos + separator.len()..],
        None => text,
    }
}

/// Assemble the knowledge-base document.
///
/// `blog_header` is the header the combine stage wrote on the blog corpus.
pub fn merge_knowledge(
    blog: &str,
    helpers: &str,
    docs: &str,
    blog_header: &CorpusHeader,
    config: &KnowledgeConfig,
) -> String {
    let separator = document_break();
    let blog_body = strip_corpus_header(blog, &blog_header.title);

    let mut out = config.header().render();
    out.push_str(&format!("# {}\n\n", config.patterns_heading));
    out.push_str(blog_body);
    out.push_str(&separator);
    out.push_str(&format!("# {}\n\n", config.helpers_heading));
    out.push_str(helpers);
    out.push_str(&separator);
    out.push_str(&format!("# {}\n\n", config.docs_heading));
    out.push_str(docs);
    out
}

/// Read the three stage outputs, merge them, and write `output`.
///
/// Every input must exist; the first missing one is reported by path.
/// Returns the number of bytes written.
#[instrument(skip_all, fields(output = %output.display()))]
pub fn merge_knowledge_files(
    inputs: KnowledgeInputs<'_>,
    blog_header: &CorpusHeader,
    config: &KnowledgeConfig,
    output: &Path,
) -> Result<usize> {
    for path in [inputs.blog, inputs.helpers, inputs.docs] {
        if !path.is_file() {
            return Err(CorpusError::validation(format!(
                "{} not found.",
                path.display()
            )));
        }
    }

    info!("merging knowledge files");

    let blog = read(inputs.blog)?;
    let helpers = read(inputs.helpers)?;
    let docs = read(inputs.docs)?;

    let merged = merge_knowledge(&blog, &helpers, &docs, blog_header, config);
    write_output(output, &merged)?;

    info!(size_kb = merged.len().div_ceil(1024), "knowledge base written");
    Ok(merged.len())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mdcorpus-knowledge-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn blog_header() -> CorpusHeader {
        CorpusHeader::new("Convex Development Patterns", "All patterns.")
    }

    #[test]
    fn strips_blog_header() {
        let blog = "# Convex Development Patterns\n\nAll patterns.\n\n---\n\n# First\n\nbody\n\n---\n\n# Second";
        assert_eq!(
            strip_corpus_header(blog, "Convex Development Patterns"),
            "# First\n\nbody\n\n---\n\n# Second"
        );
    }

    #[test]
    fn keeps_text_without_matching_header() {
        let blog = "# Something Else\n\nx\n\n---\n\n# First";
        assert_eq!(strip_corpus_header(blog, "Convex Development Patterns"), blog);

        let no_separator = "# Convex Development Patterns\n\njust text";
        assert_eq!(
            strip_corpus_header(no_separator, "Convex Development Patterns"),
            no_separator
        );
    }

    #[test]
    fn merge_layout() {
        let config = KnowledgeConfig::default();
        let blog = "# Convex Development Patterns\n\nAll patterns.\n\n---\n\n# Paginate\n\ncursors";
        let merged = merge_knowledge(blog, "# helpers\n\nREADME", "# home.mdx\n\nWelcome", &blog_header(), &config);

        let expected = format!(
            "# Convex Knowledge Base\n\n{}\n\n---\n\n\
             # Development Patterns\n\n# Paginate\n\ncursors\n\n---\n\n\
             # Helper Utilities\n\n# helpers\n\nREADME\n\n---\n\n\
             # Official Documentation\n\n# home.mdx\n\nWelcome",
            config.description
        );
        assert_eq!(merged, expected);
    }

    #[test]
    fn merge_files_reports_missing_input() {
        let tmp = temp_dir();
        let blog = tmp.join("blog.md");
        let helpers = tmp.join("helpers.md");
        let docs = tmp.join("docs.md");
        std::fs::write(&blog, "# b").unwrap();

        let inputs = KnowledgeInputs { blog: &blog, helpers: &helpers, docs: &docs };
        let err = merge_knowledge_files(inputs, &blog_header(), &KnowledgeConfig::default(), &tmp.join("out.md"))
            .unwrap_err();

        assert!(matches!(err, CorpusError::Validation { .. }));
        assert!(err.to_string().contains("helpers.md not found"));
        assert!(!tmp.join("out.md").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn merge_files_writes_output() {
        let tmp = temp_dir();
        let blog = tmp.join("blog.md");
        let helpers = tmp.join("helpers.md");
        let docs = tmp.join("docs.md");
        std::fs::write(&blog, "# Convex Development Patterns\n\nAll patterns.\n\n---\n\n# P").unwrap();
        std::fs::write(&helpers, "H").unwrap();
        std::fs::write(&docs, "D").unwrap();

        let output = tmp.join("knowledge.md");
        let inputs = KnowledgeInputs { blog: &blog, helpers: &helpers, docs: &docs };
        let written =
            merge_knowledge_files(inputs, &blog_header(), &KnowledgeConfig::default(), &output).unwrap();

        let saved = std::fs::read_to_string(&output).unwrap();
        assert_eq!(saved.len(), written);
        assert!(saved.contains("# Development Patterns\n\n# P\n\n---"));
        assert!(saved.ends_with("# Official Documentation\n\nD"));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
