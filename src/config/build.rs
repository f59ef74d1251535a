//! `[build]` section configuration.
//!
//! Contains the store, output and upload directory paths.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in marknote.toml - regeneration paths.
///
/// # Example
/// ```toml
/// [build]
/// content = "md"           # Markdown store
/// output = "web"           # Generated pages
/// index = "preview.html"   # Index page name inside output
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Workspace root directory (set from CLI, not from the file).
    #[serde(skip)]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Markdown store root.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Output root for generated pages.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Directory receiving uploaded images, served under `/images/`.
    #[serde(default = "defaults::build::images")]
    #[educe(Default = defaults::build::images())]
    pub images: PathBuf,

    /// File name of the index page, written at the top of `output`.
    #[serde(default = "defaults::build::index")]
    #[educe(Default = defaults::build::index())]
    pub index: String,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.content, PathBuf::from("md"));
        assert_eq!(config.build.output, PathBuf::from("web"));
        assert_eq!(config.build.images, PathBuf::from("images"));
        assert_eq!(config.build.index, "preview.html");
        assert!(config.build.root.is_none());
    }

    #[test]
    fn test_build_config_custom() {
        let config = r#"
            [build]
            content = "notes"
            output = "public"
            index = "home.html"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.content, PathBuf::from("notes"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.index, "home.html");
    }
}
