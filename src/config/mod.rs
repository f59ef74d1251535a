//! Workspace configuration management for `marknote.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `[base]`    | Workspace metadata (title, language)           |
//! | `[build]`   | Store, output and upload directories           |
//! | `[serve]`   | API server (port, interface, watch)            |
//! | `[watch]`   | Debounce window, external regeneration command |
//! | `[log]`     | Log directory and rotation                     |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Lecture notes"
//!
//! [build]
//! content = "md"
//! output = "web"
//!
//! [serve]
//! port = 5000
//!
//! [log]
//! max_size = "1MB"
//! backups = 3
//! ```

mod base;
mod build;
pub mod defaults;
mod error;
mod log;
mod serve;
mod watch;

use base::BaseConfig;
use build::BuildConfig;
use error::ConfigError;
use log::LogConfig;
use serve::ServeConfig;
use watch::WatchConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Log file of the API server process.
pub const API_LOG: &str = "api_server.log";
/// Log file of the watcher process.
pub const WATCHER_LOG: &str = "watcher.log";

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B (bytes), KB (kilobytes), MB (megabytes).
/// Case-insensitive for the suffix. Returns `None` when the numeric part
/// is missing or not a number, or the suffix is unknown.
///
/// # Examples
/// ```ignore
/// parse_size_string("20KB") // → Some(20480)
/// parse_size_string("1MB")  // → Some(1048576)
/// parse_size_string("100")  // → Some(100) (defaults to bytes)
/// parse_size_string("3GB")  // → None
/// ```
fn parse_size_string(s: &str) -> Option<u64> {
    let s = s.trim().to_uppercase();
    let (number, multiplier) = if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };
    number.trim().parse::<u64>().ok()?.checked_mul(multiplier)
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing marknote.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Workspace information
    #[serde(default)]
    pub base: BaseConfig,

    /// Regeneration paths
    #[serde(default)]
    pub build: BuildConfig,

    /// API server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Watcher settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Log files
    #[serde(default)]
    pub log: LogConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Parse `[log].max_size` to bytes.
    pub fn get_log_max_size(&self) -> u64 {
        parse_size_string(&self.log.max_size).unwrap_or_default()
    }

    /// Absolute path of a log file inside `[log].dir`.
    pub fn log_path(&self, name: &str) -> PathBuf {
        self.log.dir.join(name)
    }

    /// Absolute path of a PID file at the workspace root.
    pub fn pid_path(&self, name: &str) -> PathBuf {
        self.get_root().join(name)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let base = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        let root = match &cli.command {
            Commands::Init { name: Some(name) } => base.join(name),
            _ => base,
        };

        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        self.resolve_paths(&root);
        self.config_path = Self::normalize_path(&self.get_root().join(&cli.config));
        self.log.max_size = self.log.max_size.to_uppercase();

        if let Commands::Serve {
            interface,
            port,
            watch,
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Make every directory path absolute, relative to `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.build.images = Self::normalize_path(&root.join(&self.build.images));
        self.log.dir = Self::normalize_path(&root.join(&self.log.dir));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !parse_size_string(&self.log.max_size).is_some_and(|size| size > 0) {
            bail!(ConfigError::Validation(
                "[log.max_size] must be a positive size in B, KB or MB".into()
            ));
        }

        self.serve.ip()?;

        if self.watch.debounce_ms == 0 {
            bail!(ConfigError::Validation(
                "[watch.debounce_ms] must be greater than zero".into()
            ));
        }

        let index = Path::new(&self.build.index);
        if self.build.index.is_empty() || index.components().count() != 1 {
            bail!(ConfigError::Validation(
                "[build.index] must be a plain file name".into()
            ));
        }

        if self.build.content == self.build.output {
            bail!(ConfigError::Validation(
                "[build.content] and [build.output] must be different directories".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
