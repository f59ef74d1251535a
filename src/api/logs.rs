//! Log inspection endpoints for the editor's log panel.

use super::{Api, ApiResponse, ApiResult};
use crate::logger::{LogEntry, read_tail, truncate_if_exists};
use serde_json::json;
use std::io;

/// Entries returned per log.
const TAIL: usize = 100;

/// Tails of the API log and the watcher log.
fn tails(api: &Api) -> io::Result<(Vec<LogEntry>, Vec<LogEntry>)> {
    let api_log = match api.journal.path() {
        Some(path) => read_tail(path, TAIL)?,
        None => Vec::new(),
    };
    Ok((api_log, read_tail(&api.watcher_log, TAIL)?))
}

/// `GET /api/logs`
pub fn read(api: &Api) -> ApiResult {
    match tails(api) {
        Ok((api_log, watcher)) => Ok(ApiResponse::ok(json!({
            "api": api_log,
            "watcher": watcher,
        }))),
        Err(e) => Ok(ApiResponse::with_status(
            500,
            json!({ "error": e.to_string(), "api": [], "watcher": [] }),
        )),
    }
}

/// `POST /api/logs/clear`
pub fn clear(api: &Api) -> ApiResult {
    api.journal.clear()?;
    truncate_if_exists(&api.watcher_log)?;
    api.journal.info("logs cleared");
    Ok(ApiResponse::ok(json!({ "ok": true })))
}
