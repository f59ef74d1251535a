//! Workspace initialization.
//!
//! Creates the store, output, upload and log directories, the default
//! configuration and a welcome document.

use crate::config::SiteConfig;
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// First document of a new store.
const WELCOME_FILE: &str = "welcome.md";

const WELCOME_CONTENT: &str = "---
title: Welcome
tags: [getting-started]
---

# Welcome

Every `.md` file under this folder gets its own page in the output folder,
and the index page lists them all.

- `marknote serve` starts the API and regenerates pages as files change
- `marknote build` regenerates every page once
";

/// Create a new workspace at the configured root.
pub fn new_site(config: &'static SiteConfig, has_name: bool) -> Result<()> {
    let root = config.get_root();

    // Without a name the workspace is created in place, so the directory
    // must be completely empty.
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `marknote init <NAME>` to create in a subdirectory."
        );
    }

    init_site_structure(config)?;
    init_default_config(config)?;

    let welcome = config.build.content.join(WELCOME_FILE);
    fs::write(&welcome, WELCOME_CONTENT)
        .with_context(|| format!("Failed to write {}", welcome.display()))?;

    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Write the default configuration file.
fn init_default_config(config: &SiteConfig) -> Result<()> {
    let content = toml::to_string_pretty(&SiteConfig::default())?;
    fs::write(&config.config_path, content)
        .with_context(|| format!("Failed to write {}", config.config_path.display()))?;
    Ok(())
}

/// Create the workspace directories.
fn init_site_structure(config: &SiteConfig) -> Result<()> {
    let dirs = [
        &config.build.content,
        &config.build.output,
        &config.build.images,
        &config.log.dir,
    ];
    for path in dirs {
        if path.exists() {
            bail!(
                "Path `{}` already exists. Try `marknote init <NAME>` instead.",
                path.display()
            );
        }
        fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_at(root: &Path) -> &'static SiteConfig {
        let mut config = SiteConfig::default();
        config.resolve_paths(root);
        config.config_path = config.get_root().join("marknote.toml");
        Box::leak(Box::new(config))
    }

    #[test]
    fn test_new_site_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("notes");
        let config = config_at(&root);

        new_site(config, true).unwrap();

        for sub in ["md", "web", "images", "logs"] {
            assert!(root.join(sub).is_dir(), "{sub}");
        }
        assert!(root.join("md/welcome.md").is_file());

        let written = SiteConfig::from_path(&root.join("marknote.toml")).unwrap();
        assert_eq!(written.serve.port, 5000);
    }

    #[test]
    fn test_refuses_non_empty_dir_without_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.txt"), "x").unwrap();
        let config = config_at(dir.path());

        assert!(new_site(config, false).is_err());
        assert!(!dir.path().join("md").exists());
    }

    #[test]
    fn test_welcome_document_builds() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        new_site(config, false).unwrap();

        let builder = crate::build::SiteBuilder::new(config).unwrap();
        let report = builder.build_site().unwrap();
        assert_eq!(report.documents, 1);
        assert!(config.build.output.join("welcome.html").is_file());
    }
}
