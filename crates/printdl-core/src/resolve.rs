//! Download-link resolution via the `GetDownloadLink` GraphQL mutation.
//!
//! A file id is stable; the link it resolves to is signed and short-lived,
//! so resolution happens immediately before each fetch.

use crate::client::HttpClient;
use anyhow::{Context, Result};
use serde_json::{json, Value};

/// Mutation text sent verbatim with every link request.
const GET_DOWNLOAD_LINK_QUERY: &str = "mutation GetDownloadLink($id: ID!, $modelId: ID!, $fileType: DownloadFileTypeEnum!, $source: DownloadSourceEnum!) {\n  getDownloadLink(\n    id: $id\n    printId: $modelId\n    fileType: $fileType\n    source: $source\n  ) {\n    ok\n    output {\n      link\n    }\n  }\n}";

/// Seam between the orchestrator and the link API.
///
/// `Ok(None)` means the remote reported no link available for the file, a
/// normal outcome. `Err` means the call itself failed and the run should stop.
pub trait LinkResolver {
    fn resolve(&self, file_id: &str, model_id: &str) -> Result<Option<String>>;
}

/// Resolver backed by the GraphQL endpoint.
pub struct GraphqlLinkResolver<'a> {
    client: &'a HttpClient,
    endpoint: String,
}

impl<'a> GraphqlLinkResolver<'a> {
    pub fn new(client: &'a HttpClient, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }
}

impl LinkResolver for GraphqlLinkResolver<'_> {
    fn resolve(&self, file_id: &str, model_id: &str) -> Result<Option<String>> {
        let payload = link_request_payload(file_id, model_id);
        let (status, body) = self
            .client
            .post_json(&self.endpoint, &payload)
            .context("download-link request failed")?;
        if !(200..300).contains(&status) {
            anyhow::bail!("download-link endpoint returned HTTP {}", status);
        }
        Ok(parse_link_response(&body))
    }
}

/// Fixed mutation payload, parameterized by the two identifiers.
fn link_request_payload(file_id: &str, model_id: &str) -> Value {
    json!({
        "operationName": "GetDownloadLink",
        "query": GET_DOWNLOAD_LINK_QUERY,
        "variables": {
            "id": file_id,
            "modelId": model_id,
            "fileType": "stl",
            "source": "model_detail",
        },
    })
}

/// Pulls the signed link out of a `GetDownloadLink` response. `ok == false`
/// or any shape mismatch is "no link", not an error.
pub fn parse_link_response(body: &Value) -> Option<String> {
    let node = body.get("data")?.get("getDownloadLink")?;
    if !node.get("ok")?.as_bool()? {
        return None;
    }
    Some(node.get("output")?.get("link")?.as_str()?.to_string())
}
