//! Listing-page extraction: fetch the page, find the embedded JSON payload,
//! and decode its two layers into a [`Model`].
//!
//! The payload is double-encoded: the script block holds an envelope
//! `{ "body": "<json string>" }` whose body string decodes to
//! `{ "data": { "model": { "id", "stls": [...] } } }`.

mod script_block;

pub use script_block::json_script_blocks;

use crate::client::HttpClient;
use crate::model::{id_string, FileDescriptor, Model};
use serde::Deserialize;
use thiserror::Error;

/// Marker distinguishing the listing payload among the page's JSON blocks.
const FILE_LIST_MARKER: &str = "stls";

/// Listing pages expose the file list on their `/files` sub-page.
const FILES_SUFFIX: &str = "/files";

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page request itself failed (transport-level).
    #[error("listing page request failed: {0:#}")]
    Fetch(anyhow::Error),
    /// The page responded with a non-success status.
    #[error("listing page returned HTTP {status}")]
    HttpStatus { status: u32 },
    /// No application/json script block carries the file-list marker.
    #[error("no embedded file-list payload found on the page")]
    NoScriptBlock,
    /// The script block content is not valid JSON.
    #[error("embedded payload envelope is not valid JSON: {0}")]
    OuterJson(#[source] serde_json::Error),
    /// The envelope decodes but has no `body` string.
    #[error("embedded payload envelope has no body")]
    MissingBody,
    /// The envelope body is not a valid model payload.
    #[error("embedded model payload is not valid JSON: {0}")]
    InnerJson(#[source] serde_json::Error),
}

/// Outer layer: the script block wraps the real payload in a `body` string.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    data: PayloadData,
}

#[derive(Debug, Deserialize)]
struct PayloadData {
    model: PayloadModel,
}

#[derive(Debug, Deserialize)]
struct PayloadModel {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default)]
    stls: Vec<FileDescriptor>,
}

/// Appends `/files` to a listing URL unless it already points there.
/// Trailing slashes are stripped first, so `…/model/1/` and `…/model/1`
/// normalize identically.
pub fn normalize_files_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with(FILES_SUFFIX) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{FILES_SUFFIX}")
    }
}

/// Decodes the embedded model payload out of already-fetched listing HTML.
pub fn parse_model_page(html: &str) -> Result<Model, ExtractError> {
    let block = json_script_blocks(html)
        .into_iter()
        .find(|b| b.contains(FILE_LIST_MARKER))
        .ok_or(ExtractError::NoScriptBlock)?;

    let envelope: Envelope = serde_json::from_str(block).map_err(ExtractError::OuterJson)?;
    let body = envelope.body.filter(|b| !b.is_empty()).ok_or(ExtractError::MissingBody)?;
    let payload: Payload = serde_json::from_str(&body).map_err(ExtractError::InnerJson)?;

    Ok(Model {
        id: payload.data.model.id,
        files: payload.data.model.stls,
    })
}

/// Fetches a listing page and extracts its model. One outbound GET.
pub fn extract(client: &HttpClient, url: &str) -> Result<Model, ExtractError> {
    let files_url = normalize_files_url(url);
    tracing::debug!(url = %files_url, "fetching listing page");
    let response = client.get_text(&files_url).map_err(ExtractError::Fetch)?;
    if !response.is_success() {
        return Err(ExtractError::HttpStatus {
            status: response.status,
        });
    }
    tracing::debug!(bytes = response.body.len(), "listing page fetched");
    parse_model_page(&response.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Page HTML embedding `inner` through both JSON layers, the way the
    /// listing page serves it.
    fn page_with_payload(inner: &serde_json::Value) -> String {
        let envelope = serde_json::json!({ "body": inner.to_string() });
        format!(
            r#"<html><body><script type="application/json">{}</script></body></html>"#,
            envelope
        )
    }

    fn listing(files: serde_json::Value) -> serde_json::Value {
        serde_json::json!({ "data": { "model": { "id": "314", "stls": files } } })
    }

    #[test]
    fn normalize_appends_files_suffix() {
        assert_eq!(
            normalize_files_url("https://example.com/model/1-x"),
            "https://example.com/model/1-x/files"
        );
        assert_eq!(
            normalize_files_url("https://example.com/model/1-x/"),
            "https://example.com/model/1-x/files"
        );
    }

    #[test]
    fn normalize_keeps_existing_suffix() {
        assert_eq!(
            normalize_files_url("https://example.com/model/1-x/files"),
            "https://example.com/model/1-x/files"
        );
        assert_eq!(
            normalize_files_url("https://example.com/model/1-x/files/"),
            "https://example.com/model/1-x/files"
        );
    }

    #[test]
    fn parse_extracts_all_file_descriptors() {
        let html = page_with_payload(&listing(serde_json::json!([
            { "id": "f1", "name": "a.stl", "folder": "" },
            { "id": "f2", "name": "b.3mf", "folder": "print" },
        ])));
        let model = parse_model_page(&html).unwrap();
        assert_eq!(model.id, "314");
        assert_eq!(model.files.len(), 2);
        assert_eq!(model.files[0].name, "a.stl");
        assert_eq!(model.files[1].name, "b.3mf");
        assert_eq!(model.files[1].folder, "print");
    }

    #[test]
    fn parse_picks_the_marked_block_among_several() {
        let marked = page_with_payload(&listing(serde_json::json!([
            { "id": "f1", "name": "a.stl" },
        ])));
        let html = format!(
            r#"<script type="application/json">{{"unrelated": true}}</script>{marked}"#
        );
        let model = parse_model_page(&html).unwrap();
        assert_eq!(model.files.len(), 1);
    }

    #[test]
    fn parse_without_marked_block_fails() {
        let html = r#"<script type="application/json">{"no": "files"}</script>"#;
        assert!(matches!(
            parse_model_page(html),
            Err(ExtractError::NoScriptBlock)
        ));
    }

    #[test]
    fn parse_with_invalid_outer_json_fails() {
        let html = r#"<script type="application/json">not json but mentions stls</script>"#;
        assert!(matches!(
            parse_model_page(html),
            Err(ExtractError::OuterJson(_))
        ));
    }

    #[test]
    fn parse_with_missing_body_fails() {
        let html = r#"<script type="application/json">{"stls_hint": "stls"}</script>"#;
        assert!(matches!(
            parse_model_page(html),
            Err(ExtractError::MissingBody)
        ));
    }

    #[test]
    fn parse_with_invalid_inner_json_fails() {
        let html = r#"<script type="application/json">{"body": "stls but not json"}</script>"#;
        assert!(matches!(
            parse_model_page(html),
            Err(ExtractError::InnerJson(_))
        ));
    }

    #[test]
    fn parse_with_empty_file_list() {
        let html = page_with_payload(&serde_json::json!({
            "data": { "model": { "id": 7, "stls": [] } }
        }));
        let model = parse_model_page(&html).unwrap();
        assert_eq!(model.id, "7");
        assert!(model.files.is_empty());
    }
}
