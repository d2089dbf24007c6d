//! Documentation-repository merge.
//!
//! Clones the docs repository, walks its docs root for `.md`/`.mdx` pages,
//! and concatenates them into one file, each page under its own `# <file>`
//! heading with a source comment. The clone is always removed afterwards.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use mdcorpus_shared::{CorpusError, DocsConfig, Result, document_break};

use crate::articles::write_output;

/// A documentation page found under the docs root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocFile {
    /// File name, e.g. `home.mdx`.
    pub name: String,
    /// Full path on disk.
    pub path: PathBuf,
    /// Path relative to the docs root, `/`-separated.
    pub relative_path: String,
}

/// Clone `repo_url` into `clone_dir`, replacing any earlier clone.
#[instrument(skip_all, fields(repo = %repo_url, dir = %clone_dir.display()))]
pub async fn clone_repo(repo_url: &str, clone_dir: &Path) -> Result<()> {
    remove_clone(clone_dir);

    info!("cloning repository");
    let status = Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg(repo_url)
        .arg(clone_dir)
        .status()
        .await
        .map_err(|e| CorpusError::Git(format!("failed to run git: {e}. Is `git` installed?")))?;

    if !status.success() {
        return Err(CorpusError::Git(format!(
            "git clone {repo_url} exited with {status}"
        )));
    }

    info!("repository cloned");
    Ok(())
}

/// Remove a clone directory if present. Failures are logged, not returned.
pub fn remove_clone(clone_dir: &Path) {
    if !clone_dir.exists() {
        return;
    }
    match std::fs::remove_dir_all(clone_dir) {
        Ok(()) => debug!(dir = %clone_dir.display(), "removed clone"),
        Err(e) => warn!(dir = %clone_dir.display(), error = %e, "failed to remove clone"),
    }
}

/// Recursively collect `.md`/`.mdx` files under `docs_root`.
///
/// Files whose name starts with `_` are partials and are skipped. A missing
/// root yields an empty list. Results are sorted by relative path.
pub fn find_markdown_files(docs_root: &Path) -> Vec<DocFile> {
    if !docs_root.is_dir() {
        warn!(dir = %docs_root.display(), "docs directory not found");
        return Vec::new();
    }

    let mut files = Vec::new();
    walk_dir(docs_root, docs_root, &mut files);
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    files
}

fn walk_dir(root: &Path, dir: &Path, files: &mut Vec<DocFile>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read directory, skipping");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            walk_dir(root, &path, files);
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if file_type.is_file() && is_doc_page(&name) {
            files.push(DocFile {
                relative_path: relative_path(root, &path),
                name,
                path,
            });
        }
    }
}

fn is_doc_page(name: &str) -> bool {
    (name.ends_with(".md") || name.ends_with(".mdx")) && !name.starts_with('_')
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Merge doc pages into one document, `home_file` first.
///
/// Each page becomes `# <name>`, a `<!-- Source: ... -->` comment, its
/// content, and a trailing separator. An unreadable page contributes empty
/// content.
pub fn merge_docs(files: &[DocFile], home_file: &str) -> String {
    let home = files.iter().find(|f| f.name == home_file);
    let others = files.iter().filter(|f| f.name != home_file);

    let mut merged = String::new();
    for file in home.into_iter().chain(others) {
        debug!(file = %file.relative_path, "merging doc page");
        let content = std::fs::read_to_string(&file.path).unwrap_or_else(|e| {
            warn!(path = %file.path.display(), error = %e, "failed to read doc page");
            String::new()
        });

        merged.push_str(&format!("# {}\n\n", file.name));
        merged.push_str(&format!("<!-- Source: {} -->\n\n", file.relative_path));
        merged.push_str(&content);
        merged.push_str(&document_break());
    }

    merged
}

/// Clone, merge, and write the docs file. The clone is removed on every path.
///
/// Returns the number of pages merged.
#[instrument(skip_all, fields(output = %output.display()))]
pub async fn build_docs(config: &DocsConfig, output: &Path) -> Result<usize> {
    let result = clone_and_merge(config, output).await;
    remove_clone(&config.clone_dir);
    result
}

async fn clone_and_merge(config: &DocsConfig, output: &Path) -> Result<usize> {
    clone_repo(&config.repo_url, &config.clone_dir).await?;
    merge_docs_dir(&config.clone_dir.join(&config.docs_subdir), &config.home_file, output)
}

/// Merge every page under `docs_root` into `output`.
pub fn merge_docs_dir(docs_root: &Path, home_file: &str, output: &Path) -> Result<usize> {
    let files = find_markdown_files(docs_root);
    if files.is_empty() {
        return Err(CorpusError::validation(format!(
            "no markdown files found in {}",
            docs_root.display()
        )));
    }

    info!(count = files.len(), "merging documentation pages");
    let merged = merge_docs(&files, home_file);
    write_output(output, &merged)?;
    info!(size_kb = merged.len().div_ceil(1024), "documentation written");

    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mdcorpus-docs-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_docs_tree(root: &Path) {
        std::fs::create_dir_all(root.join("database").join("reading")).unwrap();
        std::fs::write(root.join("home.mdx"), "Welcome.").unwrap();
        std::fs::write(root.join("auth.md"), "Auth page.").unwrap();
        std::fs::write(root.join("_partial.mdx"), "hidden").unwrap();
        std::fs::write(root.join("logo.svg"), "<svg/>").unwrap();
        std::fs::write(root.join("database").join("schemas.mdx"), "Schemas.").unwrap();
        std::fs::write(
            root.join("database").join("reading").join("indexes.md"),
            "Indexes.",
        )
        .unwrap();
    }

    #[test]
    fn finds_md_and_mdx_skipping_partials() {
        let tmp = temp_dir();
        make_docs_tree(&tmp);

        let files = find_markdown_files(&tmp);
        let rel: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(
            rel,
            vec![
                "auth.md",
                "database/reading/indexes.md",
                "database/schemas.mdx",
                "home.mdx",
            ]
        );
        assert_eq!(files[1].name, "indexes.md");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_docs_root_is_empty() {
        let tmp = temp_dir();
        assert!(find_markdown_files(&tmp.join("absent")).is_empty());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn merge_puts_home_first_with_source_comments() {
        let tmp = temp_dir();
        make_docs_tree(&tmp);

        let files = find_markdown_files(&tmp);
        let merged = merge_docs(&files, "home.mdx");

        assert!(merged.starts_with("# home.mdx\n\n<!-- Source: home.mdx -->\n\nWelcome.\n\n---\n\n"));
        assert!(merged.contains(
            "# indexes.md\n\n<!-- Source: database/reading/indexes.md -->\n\nIndexes.\n\n---\n\n"
        ));
        assert!(merged.ends_with("Schemas.\n\n---\n\n"));
        assert_eq!(merged.matches("<!-- Source:").count(), 4);
        assert!(!merged.contains("hidden"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn merge_without_home_keeps_order() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("b.md"), "B").unwrap();
        std::fs::write(tmp.join("a.md"), "A").unwrap();

        let merged = merge_docs(&find_markdown_files(&tmp), "home.mdx");
        assert_eq!(
            merged,
            "# a.md\n\n<!-- Source: a.md -->\n\nA\n\n---\n\n# b.md\n\n<!-- Source: b.md -->\n\nB\n\n---\n\n"
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn merge_docs_dir_writes_output() {
        let tmp = temp_dir();
        let root = tmp.join("docs");
        make_docs_tree(&root);

        let output = tmp.join("doc").join("merged.md");
        let count = merge_docs_dir(&root, "home.mdx", &output).unwrap();

        assert_eq!(count, 4);
        assert!(std::fs::read_to_string(&output).unwrap().starts_with("# home.mdx"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn merge_docs_dir_rejects_empty_tree() {
        let tmp = temp_dir();
        let err = merge_docs_dir(&tmp, "home.mdx", &tmp.join("out.md")).unwrap_err();
        assert!(matches!(err, CorpusError::Validation { .. }));
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn clone_failure_is_git_error_and_cleans_up() {
        let tmp = temp_dir();
        let config = DocsConfig {
            repo_url: tmp.join("no-such-repo").to_string_lossy().into_owned(),
            clone_dir: tmp.join("clone"),
            ..DocsConfig::default()
        };

        let err = build_docs(&config, &tmp.join("out.md")).await.unwrap_err();
        assert!(matches!(err, CorpusError::Git(_)));
        assert!(!config.clone_dir.exists());
        assert!(!tmp.join("out.md").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
