//! File system watcher for the markdown store.
//!
//! Watches the store root recursively and regenerates the output after a
//! burst of changes has settled.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌─────────────────────────┐
//! │ notify   │───▶│ Debouncer  │───▶│ SiteBuilder::regenerate │
//! │ events   │    │ (250ms)    │    │ result → watcher.log    │
//! └──────────┘    └────────────┘    └─────────────────────────┘
//!      ▲
//!      └── Ctrl+C sends `Signal::Stop` on the same channel
//! ```
//!
//! Only create/modify/remove events on `.md` files count. Each counting
//! event re-arms the debounce window; when the window passes without a new
//! event, the pending paths are drained and exactly one regeneration runs.
//! A failed regeneration is logged and the loop keeps watching.

use crate::{
    build::SiteBuilder,
    log,
    logger::Journal,
    store::is_markdown,
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel},
    time::{Duration, Instant},
};

/// Messages consumed by the watch loop.
#[derive(Debug)]
pub enum Signal {
    Fs(notify::Result<Event>),
    Stop,
}

/// How long the loop sleeps when nothing is pending.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with(".#")
        || name.starts_with("~$")
}

fn is_document(path: &Path) -> bool {
    is_markdown(path) && !is_temp_file(path)
}

fn describe(kind: &EventKind) -> Option<&'static str> {
    match kind {
        EventKind::Create(_) => Some("created"),
        EventKind::Modify(_) => Some("modified"),
        EventKind::Remove(_) => Some("deleted"),
        _ => None,
    }
}

// =============================================================================
// Debounce State
// =============================================================================

/// Idle while `pending` is empty, pending otherwise.
struct Debouncer {
    window: Duration,
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            window,
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    /// Record the document paths of `event`. Returns what was recorded.
    fn add(&mut self, event: Event) -> Vec<PathBuf> {
        if describe(&event.kind).is_none() {
            return Vec::new();
        }
        let paths: Vec<PathBuf> = event.paths.into_iter().filter(|p| is_document(p)).collect();
        if !paths.is_empty() {
            self.pending.extend(paths.iter().cloned());
            self.last_event = Some(Instant::now());
        }
        paths
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty() && self.last_event.is_some_and(|t| t.elapsed() >= self.window)
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<PathBuf> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    /// Time left until the window closes, or the idle timeout.
    fn timeout(&self) -> Duration {
        match self.last_event {
            Some(t) if !self.pending.is_empty() => self.window.saturating_sub(t.elapsed()),
            _ => IDLE_TIMEOUT,
        }
    }
}

// =============================================================================
// Event Loop
// =============================================================================

/// Drain `rx`, calling `flush` once per settled burst.
///
/// Returns when `Signal::Stop` arrives or every sender is gone; a burst
/// still pending at that point is flushed first.
pub fn run_loop(
    rx: &Receiver<Signal>,
    window: Duration,
    journal: &Journal,
    mut flush: impl FnMut(Vec<PathBuf>),
) {
    let mut debouncer = Debouncer::new(window);

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Signal::Fs(Ok(event))) => {
                let kind = describe(&event.kind);
                for path in debouncer.add(event) {
                    let name = path.file_name().unwrap_or_default().to_string_lossy();
                    journal.info(format!("file {}: {name}", kind.unwrap_or("changed")));
                }
            }
            Ok(Signal::Fs(Err(e))) => journal.error(format!("watch error: {e}")),
            Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        if debouncer.ready() {
            flush(debouncer.take());
        }
    }

    if !debouncer.pending.is_empty() {
        flush(debouncer.take());
    }
}

/// Run one regeneration on behalf of the watcher, logging the outcome.
fn regenerate(builder: &SiteBuilder, journal: &Journal, changed: &[PathBuf]) {
    journal.info(format!("regenerating HTML ({} changed)", changed.len()));
    match builder.regenerate() {
        Ok(report) => journal.info(format!(
            "HTML regenerated: {} documents, {} pages written",
            report.documents, report.written
        )),
        Err(e) => journal.error(format!("regeneration failed: {e:#}")),
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Channel the watcher listens on; keep a sender to stop it later.
pub fn signal_channel() -> (Sender<Signal>, Receiver<Signal>) {
    channel()
}

/// Watch the store and regenerate until `Signal::Stop` arrives on `rx`.
///
/// `tx` must belong to the same channel as `rx`; the file system watcher
/// sends its events through it.
pub fn watch_blocking(
    builder: &SiteBuilder,
    journal: &Journal,
    window: Duration,
    tx: Sender<Signal>,
    rx: &Receiver<Signal>,
) -> Result<()> {
    let root = builder.paths().root();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(Signal::Fs(res));
    })
    .context("Failed to create file watcher")?;
    watcher
        .watch(root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", root.display()))?;

    log!("watch"; "watching {}/**/*.md", root.display());
    journal.info("file watcher started");

    run_loop(rx, window, journal, |changed| regenerate(builder, journal, &changed));

    drop(watcher);
    journal.info("file watcher stopped");
    Ok(())
}
