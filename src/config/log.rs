//! `[log]` section configuration.
//!
//! Location and rotation policy of the process log files.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[log]` section in marknote.toml - rotating log files.
///
/// # Example
/// ```toml
/// [log]
/// dir = "logs"
/// max_size = "1MB"   # B, KB or MB
/// backups = 3
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Directory holding `api_server.log` and `watcher.log`.
    #[serde(default = "defaults::log::dir")]
    #[educe(Default = defaults::log::dir())]
    pub dir: PathBuf,

    /// Size at which a log file is rotated.
    #[serde(default = "defaults::log::max_size")]
    #[educe(Default = defaults::log::max_size())]
    pub max_size: String,

    /// Number of rotated files kept next to the active one.
    #[serde(default = "defaults::log::backups")]
    #[educe(Default = defaults::log::backups())]
    pub backups: usize,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_log_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.log.dir, PathBuf::from("logs"));
        assert_eq!(config.log.max_size, "1MB");
        assert_eq!(config.log.backups, 3);
    }

    #[test]
    fn test_log_config_custom() {
        let config = r#"
            [log]
            dir = "var/log"
            max_size = "256KB"
            backups = 1
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.log.dir, PathBuf::from("var/log"));
        assert_eq!(config.get_log_max_size(), 256 * 1024);
        assert_eq!(config.log.backups, 1);
    }
}
