//! Regeneration pass.
//!
//! Re-derives every viewer page and the index page from the documents
//! currently in the store.
//!
//! # Architecture
//!
//! ```text
//! SiteBuilder::regenerate()
//!     │
//!     ├── [watch] command set ──► run external command, log exit status
//!     │
//!     └── build_site()            (holds the rebuild lock)
//!             │
//!             ├── collect_documents() ──► Document::load() in parallel
//!             │                           (any failure aborts the pass,
//!             │                            so does a page on the index path)
//!             ├── render_viewer() ──► write_if_changed()  (parallel)
//!             │
//!             └── render_index()  ──► write_if_changed()
//! ```
//!
//! The pass is full, not incremental, but a page is only rewritten when its
//! bytes differ, so running it twice over an unchanged store writes nothing
//! the second time. Orphaned pages are not pruned here; the API removes
//! the page of a document it deletes, renames or moves.

use crate::{
    config::SiteConfig,
    log,
    render::{Site, render_index, render_viewer},
    store::{Document, StoreError, StorePaths, collect_documents},
    utils::exec::run_command,
};
use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Outcome of one regeneration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Documents found in the store.
    pub documents: usize,
    /// Pages whose content changed and were written (index included).
    pub written: usize,
}

/// Regenerates the output root from the store.
///
/// One instance is shared by the API server and the watcher; all passes go
/// through the same lock, so two passes never write the output concurrently.
pub struct SiteBuilder {
    paths: StorePaths,
    /// Working directory of the external command.
    workdir: PathBuf,
    title: String,
    language: String,
    index: String,
    command: Vec<String>,
    lock: Mutex<()>,
}

impl SiteBuilder {
    /// Create the builder, creating the store and output roots if missing.
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let paths = StorePaths::new(&config.build.content, &config.build.output)
            .context("Failed to prepare store and output directories")?;

        Ok(Self {
            paths,
            workdir: config.get_root().to_path_buf(),
            title: config.base.title.clone(),
            language: config.base.language.clone(),
            index: config.build.index.clone(),
            command: config.watch.command.clone(),
            lock: Mutex::new(()),
        })
    }

    pub const fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn site(&self) -> Site<'_> {
        Site {
            title: &self.title,
            language: &self.language,
            index: &self.index,
        }
    }

    /// Run the configured external command if any, otherwise [`Self::build_site`].
    pub fn regenerate(&self) -> Result<BuildReport> {
        if self.command.is_empty() {
            return self.build_site();
        }

        let _guard = self.lock.lock();
        run_command(&self.workdir, &self.command)?;
        Ok(BuildReport {
            documents: collect_documents(self.paths.root()).len(),
            written: 0,
        })
    }

    /// Full in-process regeneration pass.
    pub fn build_site(&self) -> Result<BuildReport> {
        let _guard = self.lock.lock();

        let files = collect_documents(self.paths.root());
        let docs = files
            .par_iter()
            .map(|path| Document::load(&self.paths, path))
            .collect::<Result<Vec<_>, StoreError>>()
            .context("Regeneration aborted")?;

        let index_path = self.paths.output().join(&self.index);
        if let Some(doc) = docs.iter().find(|d| self.paths.html_path(&d.path) == index_path) {
            bail!(
                "Regeneration aborted: `{}` would overwrite the index page `{}`",
                doc.path,
                self.index
            );
        }

        let site = self.site();
        let written = docs
            .par_iter()
            .map(|doc| {
                let page = self.paths.html_path(&doc.path);
                write_if_changed(&page, render_viewer(doc, site).as_bytes())
                    .with_context(|| format!("Failed to write {}", page.display()))
            })
            .collect::<Result<Vec<bool>>>()?
            .into_iter()
            .filter(|changed| *changed)
            .count();

        let index_written = write_if_changed(&index_path, render_index(&docs, site).as_bytes())
            .with_context(|| format!("Failed to write {}", index_path.display()))?;

        let report = BuildReport {
            documents: docs.len(),
            written: written + usize::from(index_written),
        };
        log!("build"; "{} documents, {} pages written", report.documents, report.written);
        Ok(report)
    }

    /// Remove the viewer page of a document; a missing page is not an error.
    pub fn remove_page(&self, rel: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let page = self.paths.html_path(rel);
        remove_if_exists(&page, false)
            .with_context(|| format!("Failed to remove {}", page.display()))
    }

    /// Remove the mirrored output folder of a store folder.
    pub fn remove_page_dir(&self, rel: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let dir = self.paths.html_dir(rel);
        if dir == self.paths.output() {
            return Ok(());
        }
        remove_if_exists(&dir, true)
            .with_context(|| format!("Failed to remove {}", dir.display()))
    }
}

/// Write `content` unless the file already holds exactly these bytes.
///
/// Returns whether the file was written.
fn write_if_changed(path: &Path, content: &[u8]) -> io::Result<bool> {
    if fs::read(path).is_ok_and(|existing| existing == content) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(true)
}

fn remove_if_exists(path: &Path, dir: bool) -> io::Result<()> {
    let result = if dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
