//! Collects source files from the paths given on the command line.

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directory names never descended into
const IGNORED_DIRS: &[&str] = &[
    "target",
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "build",
    "dist",
    "out",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    "venv",
    ".venv",
    "vendor",
];

/// File names skipped even when their extension is recognized
const IGNORED_FILES: &[&str] = &["Cargo.lock", "package-lock.json", "yarn.lock"];

/// Generated assets
const IGNORED_SUFFIXES: &[&str] = &[".min.js", ".min.css", ".map"];

/// A source file read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Language guessed from the extension, if any
    pub language: Option<&'static str>,
    pub content: String,
}

/// Detect programming language from file extension
pub fn detect_language(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let language = match ext.as_str() {
        "rs" => "rust",
        "py" | "pyi" => "python",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "c" => "c",
        "cpp" | "cc" | "cxx" | "h" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kt" | "kts" => "kotlin",
        "scala" => "scala",
        "lua" => "lua",
        "sh" | "bash" => "bash",
        "html" => "html",
        "css" => "css",
        "sql" => "sql",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "md" => "markdown",
        _ => return None,
    };
    Some(language)
}

/// Check if a path should be skipped during a directory walk
pub fn should_ignore(path: &Path) -> bool {
    let in_ignored_dir = path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
    });
    if in_ignored_dir {
        return true;
    }

    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    IGNORED_FILES.contains(&name) || IGNORED_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Gather source files from `paths`.
///
/// Files named directly are always read. Directories are walked and only
/// files with a recognized extension outside ignored paths are kept. The
/// result is sorted by path so batch order is stable across runs.
pub fn collect_sources<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();

    for root in paths {
        let root = root.as_ref();
        let metadata =
            fs::metadata(root).with_context(|| format!("Failed to read {}", root.display()))?;

        if metadata.is_file() {
            if let Some(source) = read_source(root)? {
                sources.push(source);
            }
            continue;
        }

        debug!(root = %root.display(), "walking directory");
        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !should_ignore(e.path().strip_prefix(root).unwrap_or(e.path())))
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !entry.file_type().is_file() || detect_language(path).is_none() {
                continue;
            }

            if let Some(source) = read_source(path)? {
                sources.push(source);
            }
        }
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));
    sources.dedup_by(|a, b| a.path == b.path);
    Ok(sources)
}

/// Read a file as UTF-8. Binary or otherwise non-UTF-8 files yield `None`.
fn read_source(path: &Path) -> Result<Option<SourceFile>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(SourceFile {
            path: path.to_path_buf(),
            language: detect_language(path),
            content,
        })),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            warn!(path = %path.display(), "skipping non-UTF-8 file");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read file: {}", path.display())),
    }
}
