//! `[base]` section configuration.
//!
//! Contains the workspace title and page language.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in marknote.toml - workspace metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "Lecture notes"
/// language = "it"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Title shown in the index page header and browser tab.
    #[serde(default = "defaults::base::title")]
    #[educe(Default = defaults::base::title())]
    pub title: String,

    /// BCP 47 language code written to the `lang` attribute of every page.
    #[serde(default = "defaults::base::language")]
    #[educe(Default = defaults::base::language())]
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_base_config_full() {
        let config = r#"
            [base]
            title = "Appunti"
            language = "it"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.base.title, "Appunti");
        assert_eq!(config.base.language, "it");
    }

    #[test]
    fn test_base_config_defaults() {
        let config: SiteConfig = toml::from_str("[base]").unwrap();

        assert_eq!(config.base.title, "Notes");
        assert_eq!(config.base.language, "en");
    }
}
