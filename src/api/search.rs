//! Read-only scans over the whole store: substring search and statistics.
//!
//! Both walk every document on each request; nothing is cached. Documents
//! that cannot be read are skipped, though `total_files` still counts them.

use super::{Api, ApiRequest, ApiResponse, ApiResult};
use crate::store::{Document, collect_documents, document::unix_secs};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::{collections::BTreeMap, path::PathBuf};

/// Matches reported per document.
const MAX_MATCHES: usize = 3;
/// Characters of context kept per match.
const CONTEXT_CHARS: usize = 200;
/// Entries in `recent_files`.
const RECENT_FILES: usize = 10;

#[derive(Debug, Serialize)]
struct Match {
    line: usize,
    context: String,
}

#[derive(Debug, Serialize)]
struct Hit {
    path: String,
    name: String,
    matches: Vec<Match>,
}

fn load_all(api: &Api) -> Vec<Document> {
    load(api, &collect_documents(api.paths().root()))
}

fn load(api: &Api, files: &[PathBuf]) -> Vec<Document> {
    let paths = api.paths();
    files
        .par_iter()
        .filter_map(|abs| Document::load(paths, abs).ok())
        .collect()
}

/// `GET /api/search?q=`
pub fn search(api: &Api, req: &ApiRequest<'_>) -> ApiResult {
    let query = req.query_param("q").unwrap_or_default().to_lowercase();
    if query.is_empty() {
        return Ok(ApiResponse::ok(json!({ "results": [] })));
    }
    api.journal.info(format!("search: \"{query}\""));

    let results: Vec<Hit> = load_all(api)
        .into_iter()
        .filter(|doc| {
            doc.content.to_lowercase().contains(&query) || doc.name.to_lowercase().contains(&query)
        })
        .map(|doc| Hit {
            matches: find_matches(&doc.content, &query),
            path: doc.path,
            name: doc.name,
        })
        .collect();

    Ok(ApiResponse::ok(json!({ "results": results })))
}

/// Lines containing `query` (already lowercase), with one line of context
/// on either side.
fn find_matches(content: &str, query: &str) -> Vec<Match> {
    let lines: Vec<&str> = content.split('\n').collect();
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(query))
        .take(MAX_MATCHES)
        .map(|(i, _)| {
            let start = i.saturating_sub(1);
            let end = (i + 2).min(lines.len());
            Match {
                line: i + 1,
                context: lines[start..end].join("\n").chars().take(CONTEXT_CHARS).collect(),
            }
        })
        .collect()
}

/// `GET /api/stats`
pub fn stats(api: &Api) -> ApiResult {
    let files = collect_documents(api.paths().root());
    let mut docs = load(api, &files);

    let total_words: usize = docs.iter().map(|d| d.word_count).sum();
    let total_size: u64 = docs.iter().map(|d| d.size).sum();

    let mut tags: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in docs.iter().flat_map(|d| &d.tags) {
        *tags.entry(tag.as_str()).or_default() += 1;
    }
    let tags = json!(tags);

    docs.sort_by(|a, b| b.modified.cmp(&a.modified));
    let recent: Vec<_> = docs
        .iter()
        .take(RECENT_FILES)
        .map(|d| {
            json!({
                "path": d.path,
                "name": d.name,
                "modified": unix_secs(d.modified),
                "word_count": d.word_count,
            })
        })
        .collect();

    Ok(ApiResponse::ok(json!({
        "total_files": files.len(),
        "total_words": total_words,
        "total_size": total_size,
        "tags": tags,
        "recent_files": recent,
    })))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{api, call};
    use super::*;
    use serde_json::Value;
    use tiny_http::Method;

    fn create(api: &super::Api, name: &str, content: &str) {
        call(api, Method::Post, "/api/create", json!({"name": name, "content": content}));
    }

    #[test]
    fn test_search_single_document() {
        let (_dir, api) = api();
        create(&api, "a", "first line\nthe Quasar is bright\nlast line");
        create(&api, "b", "nothing here");

        let res = call(&api, Method::Get, "/api/search?q=quasar", Value::Null);
        let results = res.body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["path"], "a.md");
        assert_eq!(results[0]["matches"][0]["line"], 2);
        assert_eq!(
            results[0]["matches"][0]["context"],
            "first line\nthe Quasar is bright\nlast line"
        );
    }

    #[test]
    fn test_search_empty_query_and_name_match() {
        let (_dir, api) = api();
        create(&api, "physics", "waves");

        let res = call(&api, Method::Get, "/api/search?q=", Value::Null);
        assert_eq!(res.body, json!({"results": []}));

        // the name matches but no line does
        let res = call(&api, Method::Get, "/api/search?q=PHYS", Value::Null);
        let results = res.body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["matches"], json!([]));
    }

    #[test]
    fn test_find_matches_limits() {
        let content = "x\n".repeat(10);
        let matches = find_matches(&content, "x");
        assert_eq!(matches.len(), MAX_MATCHES);
        assert_eq!(matches[0].context, "x\nx");
        assert_eq!(matches[1].context, "x\nx\nx");

        let long = "y".repeat(500);
        let matches = find_matches(&long, "y");
        assert_eq!(matches[0].context.chars().count(), CONTEXT_CHARS);
    }

    #[test]
    fn test_stats() {
        let (_dir, api) = api();
        create(&api, "a", "---\ntags: [x, y]\n---\none two");
        create(&api, "b", "---\ntags: [x]\n---\nthree");
        std::fs::write(api.paths().root().join("bad.md"), [0xff, 0xfe]).unwrap();

        let res = call(&api, Method::Get, "/api/stats", Value::Null);
        assert_eq!(res.status, 200);
        // counted, but contributes no words or tags
        assert_eq!(res.body["total_files"], 3);
        assert_eq!(res.body["total_words"], 8);
        assert_eq!(res.body["tags"], json!({"x": 2, "y": 1}));
        assert_eq!(res.body["recent_files"].as_array().unwrap().len(), 2);
        assert!(res.body["total_size"].as_u64().unwrap() > 0);
    }
}
