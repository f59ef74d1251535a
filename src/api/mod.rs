//! JSON API over the markdown store.
//!
//! The router is a plain function from [`ApiRequest`] to [`ApiResponse`];
//! the HTTP server in `serve` only converts to and from `tiny_http` types.
//!
//! # Routes
//!
//! | Method | Path                         | Handler                  |
//! |--------|------------------------------|--------------------------|
//! | GET    | `/api/files`                 | [`files::list`]          |
//! | POST   | `/api/create`                | [`files::create`]        |
//! | GET    | `/api/file/<p>`              | [`files::read`]          |
//! | PUT    | `/api/file/<p>`              | [`files::update`]        |
//! | DELETE | `/api/file/<p>`              | [`files::delete`]        |
//! | POST   | `/api/file/<p>/rename`       | [`files::rename`]        |
//! | POST   | `/api/file/<p>/move`         | [`files::move_to`]       |
//! | POST   | `/api/folder`                | [`folders::create`]      |
//! | DELETE | `/api/folder/<p>`            | [`folders::delete`]      |
//! | POST   | `/api/folder/<p>/rename`     | [`folders::rename`]      |
//! | GET    | `/api/search?q=`             | [`search::search`]       |
//! | GET    | `/api/stats`                 | [`search::stats`]        |
//! | GET    | `/api/templates`             | [`assets::templates`]    |
//! | POST   | `/api/upload-image`          | [`assets::upload_image`] |
//! | GET    | `/api/logs`                  | [`logs::read`]           |
//! | POST   | `/api/logs/clear`            | [`logs::clear`]          |
//!
//! Mutating document and folder handlers regenerate the output before they
//! respond and report the outcome under `generator`. A failed regeneration
//! does not undo the file system change; the response still succeeds.

mod assets;
mod error;
mod files;
mod folders;
mod logs;
mod search;

pub use error::ApiError;

use crate::{build::SiteBuilder, logger::Journal, store::StorePaths};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::{path::PathBuf, sync::Arc};
use tiny_http::Method;

/// Route prefix of every API endpoint.
pub const API_PREFIX: &str = "/api/";

/// A decoded HTTP request.
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    pub method: Method,
    /// Percent-decoded path, starting with `/api/`.
    pub path: &'a str,
    /// Raw query string, without the `?`.
    pub query: &'a str,
    pub content_type: Option<&'a str>,
    pub body: &'a [u8],
}

impl<'a> ApiRequest<'a> {
    pub fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            query: "",
            content_type: None,
            body: &[],
        }
    }

    /// Value of a query parameter (`+` and percent escapes decoded).
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.query
            .split('&')
            .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| {
                let v = v.replace('+', " ");
                urlencoding::decode(&v).map_or(v.clone(), |d| d.into_owned())
            })
    }

    /// Body as JSON; an empty body is the type's default.
    pub fn json<T: DeserializeOwned + Default>(&self) -> Result<T, ApiError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(self.body).map_err(|_| ApiError::bad_request("invalid_json"))
    }
}

/// Status and JSON body of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn created(body: Value) -> Self {
        Self { status: 201, body }
    }

    pub fn with_status(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        Self::with_status(err.status_code(), err.to_json())
    }
}

type ApiResult = Result<ApiResponse, ApiError>;

/// Shared state of the API handlers.
pub struct Api {
    builder: Arc<SiteBuilder>,
    journal: Arc<Journal>,
    images: PathBuf,
    watcher_log: PathBuf,
}

impl Api {
    pub fn new(
        builder: Arc<SiteBuilder>,
        journal: Arc<Journal>,
        images: PathBuf,
        watcher_log: PathBuf,
    ) -> Self {
        Self {
            builder,
            journal,
            images,
            watcher_log,
        }
    }

    fn paths(&self) -> &StorePaths {
        self.builder.paths()
    }

    /// Dispatch a request to its handler.
    pub fn handle(&self, req: &ApiRequest<'_>) -> ApiResponse {
        if req.method == Method::Options {
            return ApiResponse::with_status(204, Value::Null);
        }

        match self.route(req) {
            Ok(response) => response,
            Err(err) => {
                if let ApiError::Internal(msg) = &err {
                    self.journal
                        .error(format!("{} {}: {msg}", req.method, req.path));
                }
                err.into()
            }
        }
    }

    fn route(&self, req: &ApiRequest<'_>) -> ApiResult {
        let Some(route) = req.path.strip_prefix(API_PREFIX) else {
            return Err(ApiError::not_found("not_found"));
        };
        let route = route.trim_end_matches('/');
        let method = &req.method;

        match route {
            "files" => expect(method, Method::Get, || files::list(self)),
            "create" => expect(method, Method::Post, || files::create(self, req)),
            "folder" => expect(method, Method::Post, || folders::create(self, req)),
            "search" => expect(method, Method::Get, || search::search(self, req)),
            "stats" => expect(method, Method::Get, || search::stats(self)),
            "templates" => expect(method, Method::Get, || Ok(assets::templates())),
            "upload-image" => expect(method, Method::Post, || assets::upload_image(self, req)),
            "logs" => expect(method, Method::Get, || logs::read(self)),
            "logs/clear" => expect(method, Method::Post, || logs::clear(self)),
            _ => {
                if let Some(rel) = route.strip_prefix("file/") {
                    self.route_file(method, rel, req)
                } else if let Some(rel) = route.strip_prefix("folder/") {
                    self.route_folder(method, rel)
                        .unwrap_or_else(|| folders_with_body(self, method, rel, req))
                } else {
                    Err(ApiError::not_found("not_found"))
                }
            }
        }
    }

    fn route_file(&self, method: &Method, rel: &str, req: &ApiRequest<'_>) -> ApiResult {
        if *method == Method::Post {
            if let Some(rel) = rel.strip_suffix("/rename") {
                return files::rename(self, rel, req);
            }
            if let Some(rel) = rel.strip_suffix("/move") {
                return files::move_to(self, rel, req);
            }
        }
        match *method {
            Method::Get => files::read(self, rel),
            Method::Put => files::update(self, rel, req),
            Method::Delete => files::delete(self, rel),
            _ => Err(method_not_allowed()),
        }
    }

    /// Folder routes that need no request body.
    fn route_folder(&self, method: &Method, rel: &str) -> Option<ApiResult> {
        (*method == Method::Delete).then(|| folders::delete(self, rel))
    }

    /// Regenerate and describe the outcome for a response's `generator` field.
    fn regenerate(&self) -> Value {
        match self.builder.regenerate() {
            Ok(report) => json!({
                "ok": true,
                "documents": report.documents,
                "written": report.written,
            }),
            Err(e) => {
                self.journal.error(format!("regeneration failed: {e:#}"));
                json!({ "ok": false, "error": format!("{e:#}") })
            }
        }
    }
}

fn folders_with_body(api: &Api, method: &Method, rel: &str, req: &ApiRequest<'_>) -> ApiResult {
    match (method, rel.strip_suffix("/rename")) {
        (Method::Post, Some(rel)) => folders::rename(api, rel, req),
        (Method::Post, None) => Err(ApiError::not_found("not_found")),
        _ => Err(method_not_allowed()),
    }
}

fn expect(method: &Method, allowed: Method, handler: impl FnOnce() -> ApiResult) -> ApiResult {
    if *method == allowed {
        handler()
    } else {
        Err(method_not_allowed())
    }
}

fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("method_not_allowed".into())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::SiteConfig;

    /// API over a fresh workspace in a temp dir.
    pub(crate) fn api() -> (tempfile::TempDir, Api) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.resolve_paths(dir.path());
        let builder = Arc::new(SiteBuilder::new(&config).unwrap());
        let journal = Arc::new(Journal::console("api"));
        let api = Api::new(
            builder,
            journal,
            config.build.images.clone(),
            config.log_path(crate::config::WATCHER_LOG),
        );
        (dir, api)
    }

    pub(crate) fn call(api: &Api, method: Method, path: &str, body: Value) -> ApiResponse {
        let body = if body.is_null() {
            Vec::new()
        } else {
            serde_json::to_vec(&body).unwrap()
        };
        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        api.handle(&ApiRequest {
            method,
            path,
            query,
            content_type: Some("application/json"),
            body: &body,
        })
    }

    #[test]
    fn test_unknown_route() {
        let (_dir, api) = api();
        let res = call(&api, Method::Get, "/api/nope", Value::Null);
        assert_eq!(res.status, 404);
        assert_eq!(res.body, json!({"error": "not_found"}));
    }

    #[test]
    fn test_wrong_method() {
        let (_dir, api) = api();
        assert_eq!(call(&api, Method::Post, "/api/files", Value::Null).status, 405);
        assert_eq!(call(&api, Method::Patch, "/api/file/a.md", Value::Null).status, 405);
    }

    #[test]
    fn test_options_preflight() {
        let (_dir, api) = api();
        assert_eq!(call(&api, Method::Options, "/api/create", Value::Null).status, 204);
    }

    #[test]
    fn test_invalid_json_body() {
        let (_dir, api) = api();
        let res = api.handle(&ApiRequest {
            body: b"{not json",
            ..ApiRequest::new(Method::Post, "/api/create")
        });
        assert_eq!(res.status, 400);
        assert_eq!(res.body, json!({"error": "invalid_json"}));
    }

    #[test]
    fn test_query_param() {
        let req = ApiRequest {
            query: "q=hello+world%21&x",
            ..ApiRequest::new(Method::Get, "/api/search")
        };
        assert_eq!(req.query_param("q").as_deref(), Some("hello world!"));
        assert_eq!(req.query_param("x").as_deref(), Some(""));
        assert_eq!(req.query_param("missing"), None);
    }
}
