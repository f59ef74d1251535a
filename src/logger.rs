//! Logging utilities with colored terminal output and rotating log files.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - [`Journal`], a leveled event log that echoes to the terminal and appends
//!   to a size-rotated file (`api_server.log`, `watcher.log`)
//! - [`read_tail`] to parse the last entries of a log file for the API
//!
//! A `Journal` is created once per process role and handed to the components
//! that need it; nothing here holds process-wide file state.
//!
//! # Example
//!
//! ```ignore
//! log!("build"; "rendered {} pages", count);
//!
//! let journal = Journal::new("watch", config.log_path(WATCHER_LOG), 1 << 20, 3)?;
//! journal.info("file modified: index.md");
//! ```

use chrono::Local;
use colored::{ColoredString, Colorize};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, size},
};
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    fs::{self, OpenOptions},
    io::{self, Write, stdout},
    path::{Path, PathBuf},
    sync::OnceLock,
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;

/// Separator between timestamp, level and message in log files.
const FIELD_SEP: &str = " - ";

/// Calculate total prefix length for a module name.
///
/// Returns: `module.len() + 3` (for `[`, `]`, and trailing space)
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a message with a colored module prefix.
///
/// Automatically truncates long messages to fit terminal width.
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);
    let width = get_terminal_width() as usize;

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();

    if message.contains('\n') {
        writeln!(stdout, "{prefix} {message}").ok();
    } else {
        let max_msg_len = width.saturating_sub(calc_prefix_len(module.len()));
        writeln!(stdout, "{prefix} {}", truncate_str(message, max_msg_len)).ok();
    }

    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" | "api" => prefix.bright_blue().bold(),
        "watch" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes.
///
/// Ensures the result is valid UTF-8 by finding the nearest character boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Journal (leveled, rotating file log)
// ============================================================================

/// Severity of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Leveled event log for one process role.
///
/// Every entry goes to the terminal through [`log`] and, when a file is
/// attached, to `path` as `timestamp - LEVEL - message`. The file is rotated
/// to `path.1 .. path.N` once it would grow past `max_size` bytes.
pub struct Journal {
    module: &'static str,
    file: Option<LogFile>,
}

struct LogFile {
    path: PathBuf,
    max_size: u64,
    backups: usize,
    /// Serializes append + rotate between threads of the same process.
    lock: Mutex<()>,
}

impl Journal {
    /// Create a journal writing to `path`, creating its directory.
    pub fn new(
        module: &'static str,
        path: impl Into<PathBuf>,
        max_size: u64,
        backups: usize,
    ) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            module,
            file: Some(LogFile {
                path,
                max_size,
                backups,
                lock: Mutex::new(()),
            }),
        })
    }

    /// Create a terminal-only journal.
    #[cfg(test)]
    pub const fn console(module: &'static str) -> Self {
        Self { module, file: None }
    }

    /// Path of the attached log file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path.as_path())
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.record(Level::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.record(Level::Warning, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.record(Level::Error, message.as_ref());
    }

    fn record(&self, level: Level, message: &str) {
        match level {
            Level::Info => log(self.module, message),
            Level::Warning => log(self.module, &format!("warning: {message}")),
            Level::Error => log("error", message),
        }

        if let Some(file) = &self.file
            && let Err(e) = file.append(level, message)
        {
            log("error", &format!("cannot write {}: {e}", file.path.display()));
        }
    }

    /// Truncate the attached log file.
    pub fn clear(&self) -> io::Result<()> {
        match &self.file {
            Some(file) => {
                let _guard = file.lock.lock();
                truncate_if_exists(&file.path)
            }
            None => Ok(()),
        }
    }
}

impl LogFile {
    fn append(&self, level: Level, message: &str) -> io::Result<()> {
        let _guard = self.lock.lock();

        let line = format_line(&timestamp(), level, message);
        let current = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        if self.max_size > 0 && current > 0 && current + line.len() as u64 > self.max_size {
            self.rotate()?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }

    /// Shift `x.log` → `x.log.1` → … → `x.log.N`, dropping the oldest.
    fn rotate(&self) -> io::Result<()> {
        if self.backups == 0 {
            return truncate_if_exists(&self.path);
        }

        for i in (1..self.backups).rev() {
            let from = backup_path(&self.path, i);
            if from.exists() {
                fs::rename(&from, backup_path(&self.path, i + 1))?;
            }
        }
        fs::rename(&self.path, backup_path(&self.path, 1))
    }
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Truncate a log file in place; missing files are left missing.
pub fn truncate_if_exists(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::write(path, "")?;
    }
    Ok(())
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S,%3f").to_string()
}

fn format_line(timestamp: &str, level: Level, message: &str) -> String {
    // Keep one entry per line so the file stays parseable.
    let message = message.replace(['\r', '\n'], " ");
    format!("{timestamp}{FIELD_SEP}{}{FIELD_SEP}{message}\n", level.as_str())
}

// ============================================================================
// Reading logs back
// ============================================================================

/// One parsed log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

/// Parse `timestamp - LEVEL - message`. Lines in any other shape yield `None`.
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let mut parts = line.trim().splitn(3, FIELD_SEP);
    let (timestamp, level, message) = (parts.next()?, parts.next()?, parts.next()?);
    Some(LogEntry {
        timestamp: timestamp.to_owned(),
        level: level.to_owned(),
        message: message.to_owned(),
    })
}

/// Return the parsed entries among the last `limit` non-empty lines of `path`.
///
/// A missing file yields no entries.
pub fn read_tail(path: &Path, limit: usize) -> io::Result<Vec<LogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(limit);

    Ok(lines[start..].iter().filter_map(|l| parse_line(l)).collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_prefix_len() {
        assert_eq!(calc_prefix_len(0), 3);
        assert_eq!(calc_prefix_len(5), 8);
    }

    #[test]
    fn test_truncate_str_needs_truncation() {
        assert_eq!(truncate_str("hello world", 5), "hello");
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_str_unicode_boundary() {
        // "€" is 3 bytes; cutting at 4 keeps only the first one
        assert_eq!(truncate_str("€€", 4), "€");
        assert_eq!(truncate_str("a€b", 2), "a");
    }

    #[test]
    fn test_format_and_parse_line() {
        let line = format_line("2024-05-01 10:00:00,123", Level::Warning, "file not found: a.md");
        assert_eq!(line, "2024-05-01 10:00:00,123 - WARNING - file not found: a.md\n");

        let entry = parse_line(&line).unwrap();
        assert_eq!(entry.timestamp, "2024-05-01 10:00:00,123");
        assert_eq!(entry.level, "WARNING");
        assert_eq!(entry.message, "file not found: a.md");
    }

    #[test]
    fn test_format_line_flattens_newlines() {
        let line = format_line("t", Level::Error, "first\nsecond");
        assert_eq!(line, "t - ERROR - first second\n");
    }

    #[test]
    fn test_parse_line_keeps_separator_in_message() {
        let entry = parse_line("t - INFO - search: \"a - b\"").unwrap();
        assert_eq!(entry.message, "search: \"a - b\"");
    }

    #[test]
    fn test_parse_line_rejects_plain_text() {
        assert!(parse_line("Serving on http://localhost:5000").is_none());
    }

    #[test]
    fn test_journal_appends_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("api_server.log");
        let journal = Journal::new("api", &path, 1024 * 1024, 3).unwrap();

        journal.info("file created: a.md");
        journal.error("write failed");

        let entries = read_tail(&path, 100).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, "INFO");
        assert_eq!(entries[0].message, "file created: a.md");
        assert_eq!(entries[1].level, "ERROR");
    }

    #[test]
    fn test_journal_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watcher.log");
        let journal = Journal::new("watch", &path, 120, 2).unwrap();

        for i in 0..10 {
            journal.info(format!("event number {i}"));
        }

        assert!(path.exists());
        assert!(backup_path(&path, 1).exists());
        assert!(backup_path(&path, 2).exists());
        assert!(!backup_path(&path, 3).exists());
        assert!(fs::metadata(&path).unwrap().len() <= 120);

        let last = read_tail(&path, 100).unwrap();
        assert_eq!(last.last().unwrap().message, "event number 9");
    }

    #[test]
    fn test_journal_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_server.log");
        let journal = Journal::new("api", &path, 0, 0).unwrap();

        journal.info("something");
        journal.clear().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert!(read_tail(&path, 100).unwrap().is_empty());
    }

    #[test]
    fn test_read_tail_limit_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        assert!(read_tail(&path, 10).unwrap().is_empty());

        let content: String = (0..150)
            .map(|i| format!("t{i} - INFO - m{i}\n\n"))
            .collect();
        fs::write(&path, content).unwrap();

        let entries = read_tail(&path, 100).unwrap();
        assert_eq!(entries.len(), 100);
        assert_eq!(entries[0].message, "m50");
        assert_eq!(entries[99].message, "m149");
    }

    #[test]
    fn test_console_journal_has_no_file() {
        let journal = Journal::console("build");
        assert!(journal.path().is_none());
        journal.info("only on the terminal");
        assert!(journal.clear().is_ok());
    }
}
