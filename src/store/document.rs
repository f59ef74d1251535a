//! A markdown document loaded from the store, with derived statistics.

use super::{StoreError, frontmatter::Frontmatter, paths::StorePaths};
use regex::Regex;
use std::{
    fs,
    path::Path,
    sync::LazyLock,
    time::{SystemTime, UNIX_EPOCH},
};

/// Reading speed used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Count word tokens (runs of word characters between word boundaries).
pub fn word_count(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}

/// Estimated read time in minutes, never less than one.
pub const fn read_time(words: usize) -> usize {
    let minutes = words / WORDS_PER_MINUTE;
    if minutes == 0 { 1 } else { minutes }
}

/// Seconds since the Unix epoch, as a float (sub-second precision kept).
pub fn unix_secs(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone)]
pub struct Document {
    /// Store-relative path with `/` separators; the document identity.
    pub path: String,
    /// File name including extension.
    pub name: String,
    pub content: String,
    /// Frontmatter title, or the file stem.
    pub title: String,
    pub tags: Vec<String>,
    pub size: u64,
    pub modified: SystemTime,
    /// Not every platform/filesystem records creation time.
    pub created: Option<SystemTime>,
    pub word_count: usize,
    pub read_time: usize,
}

impl Document {
    /// Read and analyse the document at `abs`.
    ///
    /// Fails if the file cannot be read or is not valid UTF-8.
    pub fn load(paths: &StorePaths, abs: &Path) -> Result<Self, StoreError> {
        let meta = fs::metadata(abs).map_err(|e| StoreError::io(abs, e))?;
        if !meta.is_file() {
            return Err(StoreError::NotFound(abs.display().to_string()));
        }
        let content = fs::read_to_string(abs).map_err(|e| StoreError::io(abs, e))?;

        let path = paths
            .relative(abs)
            .ok_or_else(|| StoreError::InvalidPath(abs.display().to_string()))?;

        Ok(Self::from_parts(abs, path, content, &meta))
    }

    fn from_parts(abs: &Path, path: String, content: String, meta: &fs::Metadata) -> Self {
        let name = abs
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = abs
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let frontmatter = Frontmatter::parse(&content);
        let words = word_count(&content);

        Self {
            path,
            name,
            title: frontmatter.title.unwrap_or(stem),
            tags: frontmatter.tags,
            size: meta.len(),
            modified: meta.modified().unwrap_or(UNIX_EPOCH),
            created: meta.created().ok(),
            word_count: words,
            read_time: read_time(words),
            content,
        }
    }

    /// Number of folders between the store root and this document.
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }

    /// Folder names leading to this document, outermost first.
    pub fn folders(&self) -> impl Iterator<Item = &str> {
        let parts: Vec<&str> = self.path.split('/').collect();
        let n = parts.len().saturating_sub(1);
        parts.into_iter().take(n)
    }
}
