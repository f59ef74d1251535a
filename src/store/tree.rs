//! Nested folder/file tree built from the documents of the store.
//!
//! Only folders that (transitively) contain a document appear in the tree.
//! Within a folder, sub-folders come first, then files, each group sorted
//! by name.

use serde::Serialize;

/// A node of the document tree.
///
/// Serializes as `{"type": "folder", "name", "children"}` or
/// `{"type": "file", "name", "path"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Folder { name: String, children: Vec<Node> },
    File { name: String, path: String },
}

impl Node {
    /// Build the tree rooted at a folder named `root_name`.
    ///
    /// `paths` are store-relative, `/`-separated document paths.
    pub fn build<S: AsRef<str>>(root_name: &str, paths: &[S]) -> Self {
        let mut root = Self::folder(root_name);
        for path in paths {
            let path = path.as_ref();
            let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
            root.insert(&parts, path);
        }
        root.sort();
        root
    }

    fn folder(name: &str) -> Self {
        Self::Folder {
            name: name.to_owned(),
            children: Vec::new(),
        }
    }

    fn insert(&mut self, parts: &[&str], full_path: &str) {
        let Self::Folder { children, .. } = self else {
            return;
        };

        match parts {
            [] => {}
            [file] => children.push(Self::File {
                name: (*file).to_owned(),
                path: full_path.to_owned(),
            }),
            [dir, rest @ ..] => {
                let index = children
                    .iter()
                    .position(|c| matches!(c, Self::Folder { name, .. } if name == dir))
                    .unwrap_or_else(|| {
                        children.push(Self::folder(dir));
                        children.len() - 1
                    });
                children[index].insert(rest, full_path);
            }
        }
    }

    fn sort(&mut self) {
        if let Self::Folder { children, .. } = self {
            children.sort_by(|a, b| {
                (a.is_file(), a.name()).cmp(&(b.is_file(), b.name()))
            });
            children.iter_mut().for_each(Self::sort);
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::File { name, .. } => name,
        }
    }

    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Self::Folder { children, .. } => children,
            Self::File { .. } => &[],
        }
    }

    /// Whether the tree holds no documents at all.
    pub fn is_empty(&self) -> bool {
        self.count_files() == 0
    }

    pub fn count_files(&self) -> usize {
        match self {
            Self::File { .. } => 1,
            Self::Folder { children, .. } => children.iter().map(Self::count_files).sum(),
        }
    }

    /// Number of folders below this node (the node itself excluded).
    pub fn count_folders(&self) -> usize {
        self.children()
            .iter()
            .filter(|c| !c.is_file())
            .map(|c| 1 + c.count_folders())
            .sum()
    }
}
