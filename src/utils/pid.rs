//! PID files for the long-running commands.
//!
//! `serve` writes `api_server.pid`, `watch` writes `watcher.pid`. The file
//! holds the decimal process id and disappears when the guard is dropped.

use anyhow::{Context, Result};
use std::{
    fs, process,
    path::PathBuf,
};

/// Removes its file on drop.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Write the current process id to `path`, replacing a stale file.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, process::id().to_string())
            .with_context(|| format!("Failed to write PID file {}", path.display()))?;
        Ok(Self { path })
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
