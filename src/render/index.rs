//! Index page: folder tree, tag cloud, and document count.

use super::{Site, escape_html, fill};
use crate::store::{Document, Node, document::unix_secs};
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};

const INDEX_TEMPLATE: &str = include_str!("../embed/index.html");

/// Tags shown in the tag cloud.
const TAG_CLOUD_SIZE: usize = 20;
/// Tags shown next to each file in the tree.
const FILE_TAGS: usize = 3;

/// Render the index page for every document in the store.
///
/// `docs` may come in any order; the tree is sorted folders first, then by
/// name.
pub fn render_index(docs: &[Document], site: Site<'_>) -> String {
    let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
    let tree = Node::build("", &paths);
    let by_path: FxHashMap<&str, &Document> = docs.iter().map(|d| (d.path.as_str(), d)).collect();

    let tree_html = if tree.is_empty() {
        r#"<div class="empty">No .md files found</div>"#.to_owned()
    } else {
        let mut out = Vec::new();
        render_tree(&tree, "", 0, &by_path, &mut out);
        out.join("\n")
    };

    let lang = escape_html(site.language);
    let title = escape_html(site.title);
    let count = docs.len().to_string();
    let folders = tree.count_folders().to_string();
    let cloud = tag_cloud(docs);

    fill(
        INDEX_TEMPLATE,
        &[
            ("lang", lang.as_str()),
            ("site_title", title.as_str()),
            ("document_count", count.as_str()),
            ("folder_count", folders.as_str()),
            ("tag_cloud", cloud.as_str()),
            ("tree", tree_html.as_str()),
        ],
    )
}

fn render_tree(
    node: &Node,
    base: &str,
    level: usize,
    docs: &FxHashMap<&str, &Document>,
    out: &mut Vec<String>,
) {
    let indent = "  ".repeat(level + 4);
    for child in node.children() {
        match child {
            Node::Folder { name, .. } => {
                let folder_path = format!("{base}{name}");
                let id = folder_id(&folder_path);
                out.push(format!(r#"{indent}<div class="folder-item">"#));
                out.push(format!(
                    r#"{indent}  <div class="folder-header" onclick="toggleFolder('{id}')"><span class="folder-icon">📁</span><span class="folder-name">{}</span></div>"#,
                    escape_html(name)
                ));
                out.push(format!(r#"{indent}  <div class="folder-content" id="{id}">"#));
                render_tree(child, &format!("{folder_path}/"), level + 2, docs, out);
                out.push(format!("{indent}  </div>"));
                out.push(format!("{indent}</div>"));
            }
            Node::File { name, path } => {
                if let Some(doc) = docs.get(path.as_str()) {
                    out.push(file_item(doc, name, &indent));
                }
            }
        }
    }
}

fn file_item(doc: &Document, name: &str, indent: &str) -> String {
    let href = escape_html(&html_href(&doc.path));
    let mut item = format!(
        r#"{indent}<a class="file-item" href="{href}" data-words="{}" data-readtime="{}" data-modified="{}">"#,
        doc.word_count,
        doc.read_time,
        unix_secs(doc.modified)
    );
    item.push_str(&format!(
        r#"<span class="file-name">📄 {}</span><span class="file-meta">{} words • {} min</span>"#,
        escape_html(name),
        doc.word_count,
        doc.read_time
    ));
    if !doc.tags.is_empty() {
        let tags: Vec<String> = doc
            .tags
            .iter()
            .take(FILE_TAGS)
            .map(|t| format!(r#"<span class="tag">{}</span>"#, escape_html(t)))
            .collect();
        item.push_str(&format!(r#"<span class="file-tags">{}</span>"#, tags.join(" ")));
    }
    item.push_str("</a>");
    item
}

/// Link to a document's viewer page, relative to the output root.
///
/// Each segment is percent-encoded, so `#`, `?` and spaces stay part of
/// the path.
fn html_href(rel: &str) -> String {
    let stem = rel.rsplit_once('.').map_or(rel, |(stem, _)| stem);
    let segments: Vec<_> = stem.split('/').map(urlencoding::encode).collect();
    format!("{}.html", segments.join("/"))
}

/// Stable element id for a folder, derived from its store-relative path.
fn folder_id(path: &str) -> String {
    let mut hasher = FxHasher::default();
    path.hash(&mut hasher);
    format!("folder-{:x}", hasher.finish())
}

/// Most used tags, by count then name.
fn tag_cloud(docs: &[Document]) -> String {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for tag in docs.iter().flat_map(|d| &d.tags) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }

    let mut tags: Vec<(&str, usize)> = counts.into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    tags.into_iter()
        .take(TAG_CLOUD_SIZE)
        .map(|(tag, count)| {
            format!(
                r#"<span class="tag-cloud-item" data-count="{count}">{}</span>"#,
                escape_html(tag)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}
