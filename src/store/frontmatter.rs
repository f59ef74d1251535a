//! Frontmatter parsing.
//!
//! Only two keys are recognized, by pattern rather than by a YAML parser:
//!
//! ```text
//! ---
//! title: Lecture 3
//! tags: [physics, "exam"]
//! ---
//! ```
//!
//! A missing or malformed block is not an error; it simply yields nothing.

use regex::Regex;
use std::sync::LazyLock;

static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\s*\n(.*?)\n---\s*\n").unwrap());
static TAGS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"tags:\s*\[(.*?)\]").unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"title:\s*(.+)").unwrap());

/// Metadata extracted from a leading `---` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: Option<String>,
    /// Tags in first-seen order, without duplicates or empty entries.
    pub tags: Vec<String>,
}

impl Frontmatter {
    pub fn parse(text: &str) -> Self {
        let Some(block) = BLOCK_RE.captures(text).and_then(|c| c.get(1)) else {
            return Self::default();
        };
        let block = block.as_str();

        let mut tags: Vec<String> = Vec::new();
        if let Some(list) = TAGS_RE.captures(block).and_then(|c| c.get(1)) {
            for tag in list.as_str().split(',').map(unquote) {
                if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                    tags.push(tag.to_owned());
                }
            }
        }

        let title = TITLE_RE
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| unquote(m.as_str()).to_owned())
            .filter(|t| !t.is_empty());

        Self { title, tags }
    }
}

/// Trim whitespace, then any surrounding quote characters.
fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_and_title() {
        let fm = Frontmatter::parse("---\ntitle: \"Lecture 3\"\ntags: [a, b, c]\n---\n\n# Body\n");
        assert_eq!(fm.title.as_deref(), Some("Lecture 3"));
        assert_eq!(fm.tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_quoted_and_duplicate_tags() {
        let fm = Frontmatter::parse("---\ntags: ['x', \"y\" , x]\n---\n");
        assert_eq!(fm.tags, vec!["x", "y"]);
    }

    #[test]
    fn test_empty_tag_list() {
        let fm = Frontmatter::parse("---\ntags: []\n---\n\n# Note\n");
        assert!(fm.tags.is_empty());
        assert!(fm.title.is_none());
    }

    #[test]
    fn test_no_frontmatter() {
        let fm = Frontmatter::parse("# Title\n\ntags: [not, frontmatter]\n");
        assert_eq!(fm, Frontmatter::default());
    }

    #[test]
    fn test_block_must_be_leading() {
        let fm = Frontmatter::parse("intro\n---\ntags: [a]\n---\n");
        assert!(fm.tags.is_empty());
    }

    #[test]
    fn test_unterminated_block_is_ignored() {
        let fm = Frontmatter::parse("---\ntags: [a, b]\n\n# never closed\n");
        assert_eq!(fm, Frontmatter::default());
    }

    #[test]
    fn test_crlf_block() {
        let fm = Frontmatter::parse("---\r\ntags: [a]\r\n---\r\nbody");
        assert_eq!(fm.tags, vec!["a"]);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("  'hello' "), "hello");
        assert_eq!(unquote("\"x\""), "x");
        assert_eq!(unquote("plain"), "plain");
    }
}
