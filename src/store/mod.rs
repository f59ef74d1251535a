//! Markdown store: the directory tree that is the single source of truth.
//!
//! - [`paths`]: containment of user-supplied paths inside the store root
//! - [`frontmatter`]: `---` metadata block parsing
//! - [`document`]: a loaded markdown file with derived statistics
//! - [`tree`]: nested folder/file structure for navigation and listing

pub mod document;
pub mod frontmatter;
pub mod paths;
pub mod tree;

pub use document::Document;
pub use paths::StorePaths;
pub use tree::Node;

use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

/// Extension of markdown documents (matched case-insensitively).
pub const MARKDOWN_EXT: &str = "md";

/// Errors raised while reading or mutating the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("`{0}` is not valid UTF-8 text")]
    Decode(PathBuf),

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] io::Error),
}

impl StoreError {
    pub fn io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::InvalidData {
            Self::Decode(path.to_path_buf())
        } else {
            Self::Io(path.to_path_buf(), err)
        }
    }
}

/// Check whether a path names a markdown document.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(MARKDOWN_EXT))
}

/// Collect every markdown file under `root`, sorted by path.
///
/// Unreadable directory entries are skipped.
pub fn collect_documents(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("a/b.md")));
        assert!(is_markdown(Path::new("NOTES.MD")));
        assert!(!is_markdown(Path::new("a.markdown")));
        assert!(!is_markdown(Path::new("a.md.swp")));
        assert!(!is_markdown(Path::new("md")));
    }

    #[test]
    fn test_collect_documents_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/c")).unwrap();
        fs::write(root.join("z.md"), "z").unwrap();
        fs::write(root.join("b/c/deep.md"), "d").unwrap();
        fs::write(root.join("b/a.md"), "a").unwrap();
        fs::write(root.join("b/image.png"), "x").unwrap();

        let files = collect_documents(root);
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("b/a.md"),
                PathBuf::from("b/c/deep.md"),
                PathBuf::from("z.md"),
            ]
        );
    }

    #[test]
    fn test_collect_documents_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_documents(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_store_error_decode_mapping() {
        let err = StoreError::io(
            Path::new("a.md"),
            io::Error::new(io::ErrorKind::InvalidData, "bad utf-8"),
        );
        assert!(matches!(err, StoreError::Decode(_)));

        let err = StoreError::io(Path::new("a.md"), io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, StoreError::Io(..)));
    }
}
