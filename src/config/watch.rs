//! `[watch]` section configuration.
//!
//! Controls the debounce window and the regeneration strategy of the watcher.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[watch]` section in marknote.toml - file watcher settings.
///
/// # Example
/// ```toml
/// [watch]
/// debounce_ms = 250
/// # Run an external program instead of the built-in regeneration pass
/// command = ["marknote", "build"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Quiet period after the last markdown event before regenerating.
    #[serde(default = "defaults::watch::debounce_ms")]
    #[educe(Default = defaults::watch::debounce_ms())]
    pub debounce_ms: u64,

    /// External regeneration command. Empty means regenerate in-process.
    #[serde(default = "defaults::watch::command")]
    #[educe(Default = defaults::watch::command())]
    pub command: Vec<String>,
}

impl WatchConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::time::Duration;

    #[test]
    fn test_watch_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.watch.debounce_ms, 250);
        assert_eq!(config.watch.debounce(), Duration::from_millis(250));
        assert!(config.watch.command.is_empty());
    }

    #[test]
    fn test_watch_config_external_command() {
        let config = r#"
            [watch]
            debounce_ms = 500
            command = ["marknote", "build"]
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.watch.debounce_ms, 500);
        assert_eq!(config.watch.command, vec!["marknote", "build"]);
    }
}
