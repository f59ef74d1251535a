//! Path containment for the store and output roots.
//!
//! Every path that arrives from a request is turned into an absolute path
//! through [`StorePaths::resolve`], which:
//!
//! 1. rejects absolute paths, `..`, and drive/root components outright,
//! 2. joins the remaining components onto the canonical root,
//! 3. canonicalizes the nearest existing ancestor and checks it is still
//!    inside the root, so a symlink cannot lead outside.
//!
//! Leaf names (file or folder renames, new file names) go through
//! [`leaf_name`], which keeps only the final component.

use super::{MARKDOWN_EXT, StoreError};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// Canonical store root plus the output root it is mirrored into.
#[derive(Debug, Clone)]
pub struct StorePaths {
    root: PathBuf,
    output: PathBuf,
}

impl StorePaths {
    /// Create both roots if needed and canonicalize them.
    pub fn new(root: &Path, output: &Path) -> Result<Self, StoreError> {
        for dir in [root, output] {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        Ok(Self {
            root: root.canonicalize().map_err(|e| StoreError::io(root, e))?,
            output: output.canonicalize().map_err(|e| StoreError::io(output, e))?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Resolve a non-empty relative path inside the store root.
    pub fn resolve(&self, rel: &str) -> Result<PathBuf, StoreError> {
        let clean = clean_relative(rel)?;
        if clean.as_os_str().is_empty() {
            return Err(StoreError::InvalidPath("empty path".into()));
        }
        self.contain(&self.root, &clean)
    }

    /// Resolve a folder inside the store root; an empty path is the root itself.
    pub fn resolve_dir(&self, rel: &str) -> Result<PathBuf, StoreError> {
        let clean = clean_relative(rel)?;
        self.contain(&self.root, &clean)
    }

    /// Resolve a path inside the output root (used for static serving).
    pub fn resolve_output(&self, rel: &str) -> Result<PathBuf, StoreError> {
        let clean = clean_relative(rel)?;
        self.contain(&self.output, &clean)
    }

    fn contain(&self, base: &Path, clean: &Path) -> Result<PathBuf, StoreError> {
        let joined = base.join(clean);
        ensure_within(base, &joined)?;
        Ok(joined)
    }

    /// Relative, `/`-separated form of an absolute path inside the store.
    pub fn relative(&self, abs: &Path) -> Option<String> {
        abs.strip_prefix(&self.root).ok().map(to_slash)
    }

    /// Output page for a store-relative document path: `a/b.md` → `<output>/a/b.html`.
    pub fn html_path(&self, rel: &str) -> PathBuf {
        self.output.join(Path::new(rel).with_extension("html"))
    }

    /// Output directory mirroring a store-relative folder.
    pub fn html_dir(&self, rel: &str) -> PathBuf {
        self.output.join(rel)
    }
}

/// Normalize a request path into plain relative components.
///
/// Backslashes are treated as separators and surrounding slashes dropped.
/// `.` components vanish; anything that could climb or re-root is rejected.
pub fn clean_relative(rel: &str) -> Result<PathBuf, StoreError> {
    if rel.contains('\0') {
        return Err(StoreError::InvalidPath(rel.into()));
    }

    let normalized = rel.replace('\\', "/");
    let trimmed = normalized.trim().trim_matches('/');

    let mut clean = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidPath(rel.into()));
            }
        }
    }
    Ok(clean)
}

/// Keep only the final component of a user-supplied name.
pub fn leaf_name(name: &str) -> Result<String, StoreError> {
    let normalized = name.replace('\\', "/");
    let leaf = normalized
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .trim();

    if leaf.is_empty() || leaf == "." || leaf == ".." || leaf.contains('\0') {
        return Err(StoreError::InvalidPath(name.into()));
    }
    Ok(leaf.to_owned())
}

/// Append `.md` unless the name already carries it (any case).
pub fn with_markdown_ext(name: &str) -> String {
    let suffix = format!(".{MARKDOWN_EXT}");
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name.to_owned()
    } else {
        format!("{name}{suffix}")
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Check that the nearest existing ancestor of `path` canonicalizes inside `base`.
fn ensure_within(base: &Path, path: &Path) -> Result<(), StoreError> {
    let existing = path
        .ancestors()
        .find(|p| p.exists())
        .unwrap_or(base);
    let real = existing
        .canonicalize()
        .map_err(|e| StoreError::io(existing, e))?;

    if real.starts_with(base) {
        Ok(())
    } else {
        Err(StoreError::InvalidPath(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, StorePaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::new(&dir.path().join("md"), &dir.path().join("web")).unwrap();
        (dir, paths)
    }

    #[test]
    fn test_clean_relative() {
        assert_eq!(clean_relative("a/b.md").unwrap(), PathBuf::from("a/b.md"));
        assert_eq!(clean_relative("/a/b/").unwrap(), PathBuf::from("a/b"));
        assert_eq!(clean_relative("a\\b.md").unwrap(), PathBuf::from("a/b.md"));
        assert_eq!(clean_relative("./a/./b").unwrap(), PathBuf::from("a/b"));
        assert_eq!(clean_relative("").unwrap(), PathBuf::new());
    }

    #[test]
    fn test_clean_relative_rejects_traversal() {
        for bad in ["../../etc/passwd", "a/../../b", "..", "a/..", "..\\x", "a\0b"] {
            assert!(
                matches!(clean_relative(bad), Err(StoreError::InvalidPath(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_stays_inside_root() {
        let (_dir, paths) = store();
        let resolved = paths.resolve("notes/a.md").unwrap();
        assert!(resolved.starts_with(paths.root()));
        assert!(paths.resolve("../../etc/passwd").is_err());
        assert!(paths.resolve("").is_err());
        assert_eq!(paths.resolve_dir("").unwrap(), paths.root());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlink_escape() {
        let (dir, paths) = store();
        let outside = dir.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, paths.root().join("link")).unwrap();

        assert!(matches!(
            paths.resolve("link/secret.md"),
            Err(StoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_leaf_name() {
        assert_eq!(leaf_name("note.md").unwrap(), "note.md");
        assert_eq!(leaf_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(leaf_name("a\\b\\c.md").unwrap(), "c.md");
        assert_eq!(leaf_name("folder/").unwrap(), "folder");
        assert!(leaf_name("..").is_err());
        assert!(leaf_name("  ").is_err());
        assert!(leaf_name("a/..").is_err());
    }

    #[test]
    fn test_with_markdown_ext() {
        assert_eq!(with_markdown_ext("note"), "note.md");
        assert_eq!(with_markdown_ext("note.md"), "note.md");
        assert_eq!(with_markdown_ext("NOTE.MD"), "NOTE.MD");
        assert_eq!(with_markdown_ext("note.txt"), "note.txt.md");
    }

    #[test]
    fn test_html_path_and_relative() {
        let (_dir, paths) = store();
        assert_eq!(
            paths.html_path("a/b.md"),
            paths.output().join("a").join("b.html")
        );
        let abs = paths.root().join("a").join("b.md");
        assert_eq!(paths.relative(&abs).unwrap(), "a/b.md");
        assert!(paths.relative(Path::new("/elsewhere/x.md")).is_none());
    }

    #[test]
    fn test_resolve_output() {
        let (_dir, paths) = store();
        assert_eq!(paths.resolve_output("").unwrap(), paths.output());
        assert!(paths.resolve_output("../md/a.md").is_err());
    }
}
