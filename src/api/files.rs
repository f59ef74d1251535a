//! Document endpoints: list, create, read, update, delete, rename, move.

use super::{Api, ApiError, ApiRequest, ApiResponse, ApiResult};
use crate::store::{
    Document, Node, StoreError, collect_documents,
    document::unix_secs,
    paths::{leaf_name, with_markdown_ext},
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateBody {
    name: Option<String>,
    folder: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateBody {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RenameBody {
    pub new_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MoveBody {
    destination: String,
}

/// `GET /api/files`
pub fn list(api: &Api) -> ApiResult {
    let paths = api.paths();
    let docs: Vec<String> = collect_documents(paths.root())
        .iter()
        .filter_map(|abs| paths.relative(abs))
        .collect();

    let root_name = paths
        .root()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tree = Node::build(&root_name, &docs);
    Ok(ApiResponse::ok(json!(tree)))
}

/// `POST /api/create`
pub fn create(api: &Api, req: &ApiRequest<'_>) -> ApiResult {
    let body: CreateBody = req.json()?;

    let name = match body.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => Local::now().format("new-%Y%m%d-%H%M%S.md").to_string(),
    };
    let name = with_markdown_ext(&leaf_name(&name)?);

    let folder = api.paths().resolve_dir(body.folder.as_deref().unwrap_or_default())?;
    let dest = folder.join(&name);
    // Re-check containment now that the leaf is attached.
    let rel = api
        .paths()
        .relative(&dest)
        .ok_or_else(|| StoreError::InvalidPath(name.clone()))?;
    api.paths().resolve(&rel)?;

    let content = match body.content {
        Some(content) if !content.is_empty() => content,
        _ => format!("# {name}\n\n"),
    };

    match write_new(&dest, &content) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            api.journal.warn(format!("create refused, file exists: {rel}"));
            return Ok(ApiResponse::with_status(
                409,
                json!({ "error": "exists", "name": name }),
            ));
        }
        Err(e) => return Err(StoreError::io(&dest, e).into()),
    }

    api.journal.info(format!("file created: {rel}"));
    let generator = api.regenerate();
    Ok(ApiResponse::created(json!({
        "ok": true,
        "name": name,
        "path": rel,
        "generator": generator,
    })))
}

/// Create `path` (and its parents) only if it does not exist yet.
fn write_new(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(content.as_bytes())
}

/// Resolve `rel` to an existing document.
fn existing_file(api: &Api, rel: &str) -> Result<PathBuf, ApiError> {
    let abs = api.paths().resolve(rel)?;
    if abs.is_file() {
        Ok(abs)
    } else {
        api.journal.warn(format!("file not found: {rel}"));
        Err(ApiError::not_found("file_not_found"))
    }
}

/// `GET /api/file/<path>`
pub fn read(api: &Api, rel: &str) -> ApiResult {
    let abs = existing_file(api, rel)?;
    let doc = Document::load(api.paths(), &abs)?;

    Ok(ApiResponse::ok(json!({
        "content": doc.content,
        "name": doc.name,
        "path": doc.path,
        "size": doc.size,
        "modified": unix_secs(doc.modified),
        "created": doc.created.map(unix_secs),
        "word_count": doc.word_count,
        "read_time": doc.read_time,
        "tags": doc.tags,
        "title": doc.title,
    })))
}

/// `PUT /api/file/<path>`
pub fn update(api: &Api, rel: &str, req: &ApiRequest<'_>) -> ApiResult {
    let body: UpdateBody = req.json()?;
    let abs = existing_file(api, rel)?;

    fs::write(&abs, &body.content).map_err(|e| StoreError::io(&abs, e))?;
    let rel = api.paths().relative(&abs).unwrap_or_else(|| rel.to_owned());
    api.journal.info(format!("file updated: {rel}"));

    let generator = api.regenerate();
    Ok(ApiResponse::ok(json!({
        "ok": true,
        "path": rel,
        "generator": generator,
    })))
}

/// `DELETE /api/file/<path>`
pub fn delete(api: &Api, rel: &str) -> ApiResult {
    let abs = existing_file(api, rel)?;
    let rel = api.paths().relative(&abs).unwrap_or_else(|| rel.to_owned());

    fs::remove_file(&abs).map_err(|e| StoreError::io(&abs, e))?;
    api.builder.remove_page(&rel)?;
    api.journal.info(format!("file deleted: {rel}"));

    let generator = api.regenerate();
    Ok(ApiResponse::ok(json!({ "ok": true, "generator": generator })))
}

/// `POST /api/file/<path>/rename`
pub fn rename(api: &Api, rel: &str, req: &ApiRequest<'_>) -> ApiResult {
    let body: RenameBody = req.json()?;
    if body.new_name.trim().is_empty() {
        return Err(ApiError::bad_request("new_name required"));
    }
    let abs = existing_file(api, rel)?;
    let new_name = with_markdown_ext(&leaf_name(&body.new_name)?);
    let dest = abs.with_file_name(&new_name);

    relocate(api, &abs, &dest, "name_exists")
}

/// `POST /api/file/<path>/move`
pub fn move_to(api: &Api, rel: &str, req: &ApiRequest<'_>) -> ApiResult {
    let body: MoveBody = req.json()?;
    let abs = existing_file(api, rel)?;

    let folder = api.paths().resolve_dir(&body.destination)?;
    if !folder.is_dir() {
        return Err(ApiError::not_found("destination_not_found"));
    }
    let Some(name) = abs.file_name() else {
        return Err(ApiError::bad_request("invalid_path"));
    };
    let dest = folder.join(name);

    relocate(api, &abs, &dest, "file_exists_in_destination")
}

/// Move a document, drop its old page and regenerate.
fn relocate(api: &Api, from: &Path, to: &Path, conflict: &str) -> ApiResult {
    let paths = api.paths();
    let (Some(old_rel), Some(new_rel)) = (paths.relative(from), paths.relative(to)) else {
        return Err(ApiError::bad_request("invalid_path"));
    };
    if to.exists() {
        return Err(ApiError::conflict(conflict));
    }

    fs::rename(from, to).map_err(|e| StoreError::io(from, e))?;
    api.builder.remove_page(&old_rel)?;
    api.journal.info(format!("file moved: {old_rel} -> {new_rel}"));

    let generator = api.regenerate();
    Ok(ApiResponse::ok(json!({
        "ok": true,
        "new_path": new_rel,
        "generator": generator,
    })))
}
