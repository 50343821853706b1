//! Shared HTTP client identity for a run.
//!
//! One `HttpClient` is constructed per run and passed to every component.
//! Each request builds a fresh curl `Easy` handle carrying the same identity
//! headers, so all traffic in a run presents the same client.

use anyhow::{Context, Result};
use curl::easy::{Easy, List};
use std::time::Duration;

/// Total-transfer timeout for streaming downloads (large bodies).
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(3600);

/// Status and body for text endpoints (listing page, GraphQL).
#[derive(Debug)]
pub struct TextResponse {
    pub status: u32,
    pub body: String,
}

impl TextResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Client identity reused for every request in a run.
#[derive(Debug, Clone)]
pub struct HttpClient {
    user_agent: String,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
        }
    }

    /// Fresh handle with the shared identity and baseline transfer settings.
    fn easy(&self, url: &str) -> Result<Easy> {
        let mut easy = Easy::new();
        easy.url(url).context("invalid URL")?;
        easy.useragent(&self.user_agent)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(Duration::from_secs(15))?;
        easy.timeout(Duration::from_secs(60))?;
        Ok(easy)
    }

    /// GET returning the whole body as text.
    pub fn get_text(&self, url: &str) -> Result<TextResponse> {
        let mut easy = self.easy(url)?;
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                buf.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform().context("GET request failed")?;
        }
        let status = easy.response_code().context("no response code")?;
        let body = String::from_utf8_lossy(&buf).into_owned();
        Ok(TextResponse { status, body })
    }

    /// POST a JSON payload, returning the status and decoded JSON body.
    pub fn post_json(&self, url: &str, payload: &serde_json::Value) -> Result<(u32, serde_json::Value)> {
        let body = serde_json::to_vec(payload).context("encode request payload")?;

        let mut easy = self.easy(url)?;
        easy.post(true)?;
        easy.post_fields_copy(&body)?;
        let mut headers = List::new();
        headers.append("Content-Type: application/json")?;
        easy.http_headers(headers)?;

        let mut out: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                out.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform().context("POST request failed")?;
        }
        let status = easy.response_code().context("no response code")?;
        let value: serde_json::Value =
            serde_json::from_slice(&out).context("response body is not valid JSON")?;
        Ok((status, value))
    }

    /// Streaming GET: each body chunk is handed to `write`. Returns the final
    /// status. An `Err` from `write` aborts the transfer; HTTP errors (>= 400)
    /// fail the transfer before any body byte reaches `write`.
    pub fn get_streaming<F>(&self, url: &str, mut write: F) -> Result<u32>
    where
        F: FnMut(&[u8]) -> std::io::Result<()>,
    {
        let mut easy = self.easy(url)?;
        easy.timeout(DOWNLOAD_TIMEOUT)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.fail_on_error(true)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match write(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    tracing::warn!("download write failed: {}", e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform().context("GET request failed")?;
        }
        let status = easy.response_code().context("no response code")?;
        Ok(status)
    }
}
