//! HTML page rendering.
//!
//! Pages are produced from templates embedded at compile time. Markdown is
//! never parsed here: the raw text is inlined into the viewer page and turned
//! into HTML by the browser.
//!
//! - [`viewer`]: one page per document
//! - [`index`]: the navigable index page with the folder tree and tag cloud

mod index;
mod viewer;

pub use index::render_index;
pub use viewer::render_viewer;

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Workspace-level values shared by every rendered page.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    pub title: &'a str,
    pub language: &'a str,
    /// File name of the index page, linked from every breadcrumb.
    pub index: &'a str,
}

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

static SCRIPT_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(script)").unwrap());

/// Substitute `{key}` placeholders in a single pass.
///
/// Substituted values are never rescanned, so user text containing `{key}`
/// stays literal. Unknown keys are left untouched.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map_or_else(|| caps[0].to_owned(), |(_, v)| (*v).to_owned())
        })
        .into_owned()
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Make text safe to embed inside a `<script>` element.
///
/// Any `</script` (any case) becomes `<\/script`, which cannot close the
/// element; the text read back through `textContent` is unchanged apart
/// from the added backslash.
pub fn escape_script(s: &str) -> String {
    SCRIPT_CLOSE_RE.replace_all(s, r"<\/$1").into_owned()
}

/// A JavaScript string literal for `s`, safe inside a `<script>` element.
fn js_string(s: &str) -> String {
    let quoted = serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_owned());
    escape_script(&quoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_single_pass() {
        let out = fill(
            "<h1>{title}</h1><p>{body}</p>{unknown}",
            &[("title", "{body}"), ("body", "text")],
        );
        assert_eq!(out, "<h1>{body}</h1><p>text</p>{unknown}");
    }

    #[test]
    fn test_fill_ignores_css_and_js_braces() {
        let template = "a{color:red} x => {} {lang}";
        assert_eq!(fill(template, &[("lang", "en")]), "a{color:red} x => {} en");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_script_any_case() {
        assert_eq!(escape_script("a</script>b"), r"a<\/script>b");
        assert_eq!(escape_script("a</SCRIPT >b"), r"a<\/SCRIPT >b");
        assert_eq!(escape_script("</ScRiPt"), r"<\/ScRiPt");
        assert_eq!(escape_script("<script>"), "<script>");
    }

    #[test]
    fn test_js_string() {
        assert_eq!(js_string("a/b.md"), r#""a/b.md""#);
        assert_eq!(js_string("it's"), r#""it's""#);
        assert_eq!(js_string("x</script>"), r#""x<\/script>""#);
    }
}
