//! Viewer page for a single document.

use super::{Site, escape_html, escape_script, fill, js_string};
use crate::store::Document;
use chrono::{DateTime, Local};

const VIEWER_TEMPLATE: &str = include_str!("../embed/viewer.html");

/// Render the viewer page of `doc`.
///
/// The output depends only on the document (content, path, metadata) and
/// `site`, so rendering an unchanged document twice yields identical bytes.
pub fn render_viewer(doc: &Document, site: Site<'_>) -> String {
    let back_to_root = "../".repeat(doc.depth());
    let modified = DateTime::<Local>::from(doc.modified)
        .format("%d/%m/%Y %H:%M")
        .to_string();
    let edit_href = format!(
        "{back_to_root}editor.html?file={}",
        urlencoding::encode(&doc.path)
    );

    let lang = escape_html(site.language);
    let title = escape_html(&doc.title);
    let crumbs = breadcrumb(doc, site, &back_to_root);
    let edit_href = escape_html(&edit_href);
    let words = doc.word_count.to_string();
    let read_time = doc.read_time.to_string();
    let size = doc.size.to_string();
    let source_path = escape_html(&doc.path);
    let doc_path = js_string(&doc.path);
    let markdown = escape_script(&doc.content);

    fill(
        VIEWER_TEMPLATE,
        &[
            ("lang", lang.as_str()),
            ("page_title", title.as_str()),
            ("breadcrumb", crumbs.as_str()),
            ("edit_href", edit_href.as_str()),
            ("modified", modified.as_str()),
            ("words", words.as_str()),
            ("read_time", read_time.as_str()),
            ("size", size.as_str()),
            ("source_path", source_path.as_str()),
            ("doc_path", doc_path.as_str()),
            ("markdown", markdown.as_str()),
        ],
    )
}

/// `Home / folder / … / file.md`, the home link climbing back to the index.
fn breadcrumb(doc: &Document, site: Site<'_>, back_to_root: &str) -> String {
    let mut html = format!(
        r#"<a href="{}">Home</a>"#,
        escape_html(&format!("{back_to_root}{}", site.index))
    );
    for folder in doc.folders() {
        html.push_str(&format!(
            r#"<span class="breadcrumb-sep">/</span><span class="breadcrumb-folder">{}</span>"#,
            escape_html(folder)
        ));
    }
    html.push_str(&format!(
        r#"<span class="breadcrumb-sep">/</span><span class="breadcrumb-file">{}</span>"#,
        escape_html(&doc.name)
    ));
    html
}
