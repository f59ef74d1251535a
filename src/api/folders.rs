//! Folder endpoints. Folders are structural only; creating one changes no page.

use super::{Api, ApiError, ApiRequest, ApiResponse, ApiResult, files::RenameBody};
use crate::store::{StoreError, paths::leaf_name};
use serde::Deserialize;
use serde_json::json;
use std::{fs, path::PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateBody {
    path: String,
}

/// `POST /api/folder`
pub fn create(api: &Api, req: &ApiRequest<'_>) -> ApiResult {
    let body: CreateBody = req.json()?;
    if body.path.trim().is_empty() {
        return Err(ApiError::bad_request("path required"));
    }

    let abs = api.paths().resolve_dir(&body.path)?;
    if abs.exists() {
        return Err(ApiError::conflict("folder_exists"));
    }
    fs::create_dir_all(&abs).map_err(|e| StoreError::io(&abs, e))?;

    let rel = api.paths().relative(&abs).unwrap_or_default();
    api.journal.info(format!("folder created: {rel}"));
    Ok(ApiResponse::created(json!({ "ok": true, "path": rel })))
}

/// Resolve `rel` to an existing folder other than the store root.
fn existing_folder(api: &Api, rel: &str) -> Result<(PathBuf, String), ApiError> {
    let abs = api.paths().resolve_dir(rel)?;
    let rel = api.paths().relative(&abs).unwrap_or_default();
    if rel.is_empty() {
        return Err(ApiError::bad_request("invalid_path"));
    }
    if !abs.is_dir() {
        return Err(ApiError::not_found("folder_not_found"));
    }
    Ok((abs, rel))
}

/// `DELETE /api/folder/<path>`
pub fn delete(api: &Api, rel: &str) -> ApiResult {
    let (abs, rel) = existing_folder(api, rel)?;

    fs::remove_dir_all(&abs).map_err(|e| StoreError::io(&abs, e))?;
    api.builder.remove_page_dir(&rel)?;
    api.journal.info(format!("folder deleted: {rel}"));

    let generator = api.regenerate();
    Ok(ApiResponse::ok(json!({ "ok": true, "generator": generator })))
}

/// `POST /api/folder/<path>/rename`
pub fn rename(api: &Api, rel: &str, req: &ApiRequest<'_>) -> ApiResult {
    let body: RenameBody = req.json()?;
    if body.new_name.trim().is_empty() {
        return Err(ApiError::bad_request("new_name required"));
    }
    let (abs, old_rel) = existing_folder(api, rel)?;
    let dest = abs.with_file_name(leaf_name(&body.new_name)?);
    if dest.exists() {
        return Err(ApiError::conflict("name_exists"));
    }
    let new_rel = api
        .paths()
        .relative(&dest)
        .ok_or_else(|| StoreError::InvalidPath(body.new_name.clone()))?;

    fs::rename(&abs, &dest).map_err(|e| StoreError::io(&abs, e))?;
    api.builder.remove_page_dir(&old_rel)?;
    api.journal.info(format!("folder renamed: {old_rel} -> {new_rel}"));

    let generator = api.regenerate();
    Ok(ApiResponse::ok(json!({
        "ok": true,
        "new_path": new_rel,
        "generator": generator,
    })))
}
