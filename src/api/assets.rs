//! Editor support endpoints: document templates and image upload.

use super::{Api, ApiError, ApiRequest, ApiResponse, ApiResult};
use crate::store::paths::leaf_name;
use chrono::Local;
use futures::{executor::block_on, stream};
use multer::Multipart;
use serde_json::{Value, json};
use std::{convert::Infallible, fs};

/// Built-in templates as `(key, display name, content)`.
///
/// `{title}` and `{date}` are left for the editor to fill in.
const TEMPLATES: &[(&str, &str, &str)] = &[
    ("blank", "Blank", "# New document\n\n"),
    ("note", "Note", "---\ntags: []\n---\n\n# {title}\n\n## Notes\n\n"),
    (
        "lecture",
        "Lecture",
        "---\ntags: [lecture]\ndate: {date}\n---\n\n# {title}\n\n## Topics\n\n## Notes\n\n## References\n\n",
    ),
    (
        "todo",
        "TODO List",
        "---\ntags: [todo]\n---\n\n# TODO: {title}\n\n- [ ] Task 1\n- [ ] Task 2\n- [ ] Task 3\n\n",
    ),
];

/// `GET /api/templates`
pub fn templates() -> ApiResponse {
    let map: serde_json::Map<String, Value> = TEMPLATES
        .iter()
        .map(|(key, name, content)| ((*key).to_owned(), json!({ "name": name, "content": content })))
        .collect();
    ApiResponse::ok(Value::Object(map))
}

/// Form field carrying the uploaded image.
const UPLOAD_FIELD: &str = "file";

/// `POST /api/upload-image` with a multipart field named `file`.
pub fn upload_image(api: &Api, req: &ApiRequest<'_>) -> ApiResult {
    let boundary = req
        .content_type
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| ApiError::bad_request("no_file"))?;
    let upload = block_on(file_field(req.body.to_vec(), boundary))
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?;

    let Some((original, data)) = upload else {
        return Err(ApiError::bad_request("no_file"));
    };
    if original.trim().is_empty() {
        return Err(ApiError::bad_request("empty_filename"));
    }

    let filename = format!(
        "{}{}",
        Local::now().format("%Y%m%d-%H%M%S-"),
        leaf_name(&original)?
    );
    fs::create_dir_all(&api.images)?;
    fs::write(api.images.join(&filename), &data)?;
    api.journal.info(format!("image uploaded: {filename}"));

    Ok(ApiResponse::ok(json!({
        "ok": true,
        "url": format!("/images/{}", urlencoding::encode(&filename)),
        "filename": filename,
    })))
}

/// File name and content of the upload field, if the form has one.
///
/// The body is already in memory, so it is fed to the parser as a
/// single-chunk stream.
async fn file_field(body: Vec<u8>, boundary: String) -> multer::Result<Option<(String, Vec<u8>)>> {
    let chunks = stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = Multipart::new(chunks, boundary);

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let data = field.bytes().await?;
        return Ok(Some((file_name, data.to_vec())));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{api, call};
    use super::*;
    use tiny_http::Method;

    fn upload(api: &Api, body: &[u8]) -> ApiResponse {
        upload_with(api, "multipart/form-data; boundary=b", body)
    }

    fn upload_with(api: &Api, content_type: &str, body: &[u8]) -> ApiResponse {
        api.handle(&ApiRequest {
            content_type: Some(content_type),
            body,
            ..ApiRequest::new(Method::Post, "/api/upload-image")
        })
    }

    #[test]
    fn test_templates() {
        let (_dir, api) = api();
        let res = call(&api, Method::Get, "/api/templates", Value::Null);
        let body = res.body.as_object().unwrap();
        assert_eq!(body.len(), 4);
        for key in ["blank", "note", "lecture", "todo"] {
            assert!(body[key]["content"].is_string(), "{key}");
        }
        assert!(body["lecture"]["content"].as_str().unwrap().contains("{date}"));
    }

    #[test]
    fn test_upload_image() {
        let (_dir, api) = api();
        let body = b"--b\r\nContent-Disposition: form-data; name=\"file\"; filename=\"../cat photo.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--b--\r\n";
        let res = upload(&api, body);
        assert_eq!(res.status, 200);

        let filename = res.body["filename"].as_str().unwrap();
        assert!(filename.ends_with("-cat photo.png"), "{filename}");
        assert_eq!(
            res.body["url"],
            format!("/images/{}", urlencoding::encode(filename))
        );
        assert_eq!(fs::read(api.images.join(filename)).unwrap(), b"PNGDATA");
    }

    #[test]
    fn test_upload_keeps_boundary_text_inside_data() {
        let (_dir, api) = api();
        let body = b"------abc\r\n\
Content-Disposition: form-data; name=\"caption\"\r\n\r\nhi\r\n\
------abc\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"notes.bin\"\r\n\r\n\
line1\n------abcdef inside data\r\n\x00\x01\r\n\
------abc--\r\n";
        let res = upload_with(&api, "multipart/form-data; boundary=----abc", body);
        assert_eq!(res.status, 200, "{}", res.body);

        let filename = res.body["filename"].as_str().unwrap();
        assert_eq!(
            fs::read(api.images.join(filename)).unwrap(),
            b"line1\n------abcdef inside data\r\n\x00\x01"
        );
    }

    #[test]
    fn test_upload_errors() {
        let (_dir, api) = api();
        let no_file = b"--b\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--b--\r\n";
        assert_eq!(upload(&api, no_file).body, json!({"error": "no_file"}));

        let empty = b"--b\r\nContent-Disposition: form-data; name=\"file\"; filename=\"\"\r\n\r\n\r\n--b--\r\n";
        assert_eq!(upload(&api, empty).body, json!({"error": "empty_filename"}));

        let res = call(&api, Method::Post, "/api/upload-image", json!({}));
        assert_eq!(res.status, 400);

        let truncated = b"--b\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\r\nPNG";
        assert_eq!(upload(&api, truncated).status, 400);
    }
}
