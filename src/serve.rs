//! API server and static file server.
//!
//! Built on `tiny_http`:
//!
//! - `/api/*` is dispatched to [`Api`] and answered with JSON
//! - `/images/*` is served from the upload directory
//! - everything else is served from the output root (`/` → index page)
//! - optional watcher on a background thread
//! - graceful shutdown on Ctrl+C
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Main Thread   │     │  Watcher Thread  │
//! │  (HTTP Server)  │     │  (File Monitor)  │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//!    API handlers ──────► SiteBuilder ◄── debounced regenerate
//!    static files          (rebuild lock)
//! ```

use crate::{
    api::{API_PREFIX, Api, ApiRequest, ApiResponse},
    build::SiteBuilder,
    config::{API_LOG, SiteConfig, WATCHER_LOG},
    log,
    logger::Journal,
    store::paths::clean_relative,
    utils::pid::PidFile,
    watch::{Signal, signal_channel, watch_blocking},
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{
    fs,
    io::Read,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// PID file of the server process.
const PID_FILE: &str = "api_server.pid";

/// URL prefix of uploaded images.
const IMAGES_PREFIX: &str = "/images/";

// ============================================================================
// Server Entry Point
// ============================================================================

/// Everything a request handler needs.
struct ServeState {
    api: Api,
    builder: Arc<SiteBuilder>,
    images: PathBuf,
    index: String,
}

/// Run a first regeneration pass, then start the API server and the
/// watcher if enabled.
///
/// Blocks until Ctrl+C is received.
pub fn serve_site(config: &'static SiteConfig, builder: Arc<SiteBuilder>) -> Result<()> {
    let max_size = config.get_log_max_size();
    let journal = Arc::new(
        Journal::new("api", config.log_path(API_LOG), max_size, config.log.backups)
            .context("Failed to open API log")?,
    );
    let _pid = PidFile::create(config.pid_path(PID_FILE))?;
    initial_pass(&builder, &journal);

    let (server, addr) = try_bind_port(config.serve.ip()?, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let (tx, rx) = signal_channel();

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    let tx_for_signal = tx.clone();
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        let _ = tx_for_signal.send(Signal::Stop);
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    journal.info(format!("API server started on http://{addr}"));
    log!("serve"; "http://{}", addr);

    let watcher = if config.serve.watch {
        let watch_journal = Journal::new(
            "watch",
            config.log_path(WATCHER_LOG),
            max_size,
            config.log.backups,
        )
        .context("Failed to open watcher log")?;
        let builder = Arc::clone(&builder);
        let window = config.watch.debounce();
        Some(thread::spawn(move || {
            if let Err(err) = watch_blocking(&builder, &watch_journal, window, tx, &rx) {
                log!("watch"; "{err:#}");
            }
        }))
    } else {
        drop(tx);
        None
    };

    let ctx = ServeState {
        api: Api::new(
            Arc::clone(&builder),
            Arc::clone(&journal),
            config.build.images.clone(),
            config.log_path(WATCHER_LOG),
        ),
        builder,
        images: config.build.images.clone(),
        index: config.build.index.clone(),
    };

    // Handle requests in main thread (blocks until Ctrl+C)
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &ctx) {
            log!("serve"; "request error: {e:#}");
        }
    }

    if let Some(handle) = watcher {
        let _ = handle.join();
    }
    journal.info("API server stopped");
    Ok(())
}

/// Regenerate before accepting requests.
///
/// A failure is only logged: the API stays up so a broken document can be
/// fixed or deleted through it.
fn initial_pass(builder: &SiteBuilder, journal: &Journal) {
    if let Err(err) = builder.build_site() {
        journal.error(format!("initial regeneration failed: {err:#}"));
    }
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    anyhow::bail!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )
}

// ============================================================================
// Request Handling
// ============================================================================

/// Handle a single HTTP request.
///
/// Resolution order:
/// 1. `/api/*` → JSON API
/// 2. `/images/<name>` → upload directory
/// 3. File in the output root → serve file (directories resolve to their index page)
/// 4. Nothing found → 404
fn handle_request(mut request: Request, ctx: &ServeState) -> Result<()> {
    // Decode URL-encoded characters (e.g., %20 → space)
    let url = request.url().to_owned();
    let (raw_path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let path = urlencoding::decode(raw_path)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| raw_path.to_owned());

    if path.starts_with(API_PREFIX) {
        let content_type = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Content-Type"))
            .map(|h| h.value.as_str().to_owned());
        let mut body = Vec::new();
        request
            .as_reader()
            .read_to_end(&mut body)
            .context("Failed to read request body")?;

        let response = ctx.api.handle(&ApiRequest {
            query,
            content_type: content_type.as_deref(),
            body: &body,
            ..ApiRequest::new(request.method().clone(), &path)
        });
        return respond_json(request, &response);
    }

    if !matches!(request.method(), Method::Get | Method::Head) {
        return respond_text(request, 405, "405 Method Not Allowed");
    }

    match resolve_static(ctx, &path) {
        Some(file) => serve_file(request, &file),
        None => respond_text(request, 404, "404 Not Found"),
    }
}

/// Map a request path onto a file in the images dir or the output root.
fn resolve_static(ctx: &ServeState, path: &str) -> Option<PathBuf> {
    if let Some(name) = path.strip_prefix(IMAGES_PREFIX) {
        return contained_file(&ctx.images, name);
    }

    let paths = ctx.builder.paths();
    contained_file(paths.output(), path).or_else(|| {
        let dir = paths.resolve_output(path).ok()?;
        contained_file(&dir, &ctx.index)
    })
}

/// An existing regular file `rel` below `base`, never outside it.
fn contained_file(base: &Path, rel: &str) -> Option<PathBuf> {
    let clean = clean_relative(rel).ok()?;
    if clean.as_os_str().is_empty() {
        return None;
    }
    let real = base.join(clean).canonicalize().ok()?;
    let base = base.canonicalize().ok()?;
    (real.starts_with(&base) && real.is_file()).then_some(real)
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Build a header from static parts; names and values used here are plain ASCII.
fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn with_headers<R: Read>(mut response: Response<R>, headers: &[(&str, &str)]) -> Response<R> {
    for (name, value) in headers {
        if let Some(h) = header(name, value) {
            response.add_header(h);
        }
    }
    response
}

/// Serve a file with its content type and modification time.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map(http_date)
        .unwrap_or_default();

    let mut headers = vec![
        ("Content-Type", guess_content_type(path)),
        ("Cache-Control", "no-cache"),
    ];
    if !modified.is_empty() {
        headers.push(("Last-Modified", modified.as_str()));
    }

    request.respond(with_headers(Response::from_data(content), &headers))?;
    Ok(())
}

fn respond_json(request: Request, response: &ApiResponse) -> Result<()> {
    let body = if response.status == 204 {
        Vec::new()
    } else {
        serde_json::to_vec(&response.body)?
    };

    let response = Response::from_data(body).with_status_code(StatusCode(response.status));
    let response = with_headers(
        response,
        &[
            ("Content-Type", "application/json; charset=utf-8"),
            ("Access-Control-Allow-Origin", "*"),
            ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
            ("Access-Control-Allow-Headers", "Content-Type"),
        ],
    );
    request.respond(response)?;
    Ok(())
}

fn respond_text(request: Request, status: u16, text: &str) -> Result<()> {
    let response = Response::from_string(text).with_status_code(StatusCode(status));
    let response = with_headers(response, &[("Content-Type", "text/plain; charset=utf-8")]);
    request.respond(response)?;
    Ok(())
}

/// Format a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
fn http_date(time: std::time::SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("bmp") => "image/bmp",
        Some("ico") => "image/x-icon",

        // Documents
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        // Default binary
        _ => "application/octet-stream",
    }
}
