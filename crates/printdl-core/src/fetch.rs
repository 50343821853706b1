//! Streaming file download with a bounded retry budget.

use crate::cancel::CancelToken;
use crate::client::HttpClient;
use crate::retry::{RetryDecision, RetryPolicy};
use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Seam between the orchestrator and the network: turn a resolved URL into
/// bytes on disk, reporting plain success or failure.
pub trait Fetcher {
    /// Downloads `url` to `dest`. `false` means the retry budget ran out;
    /// the caller decides what to do with the file's outcome.
    fn fetch(&self, url: &str, dest: &Path) -> bool;
}

/// Curl-backed fetcher: one streaming GET per attempt, fixed delay between
/// attempts. The destination file is created lazily on the first body byte,
/// so an attempt that fails at the HTTP layer leaves nothing behind; partial
/// bytes from a broken transfer are removed before the next attempt.
pub struct HttpFetcher<'a> {
    client: &'a HttpClient,
    policy: RetryPolicy,
    cancel: CancelToken,
}

impl<'a> HttpFetcher<'a> {
    pub fn new(client: &'a HttpClient, policy: RetryPolicy, cancel: CancelToken) -> Self {
        Self {
            client,
            policy,
            cancel,
        }
    }

    /// One attempt: stream the body into `dest`. Success only when the status
    /// is 2xx and every chunk was written.
    fn attempt(&self, url: &str, dest: &Path) -> Result<()> {
        let cancel = self.cancel.clone();
        let mut out: Option<File> = None;
        let status = self.client.get_streaming(url, |chunk| {
            if cancel.is_cancelled() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Interrupted,
                    "cancelled",
                ));
            }
            if out.is_none() {
                out = Some(File::create(dest)?);
            }
            if let Some(file) = out.as_mut() {
                file.write_all(chunk)?;
            }
            Ok(())
        })?;
        if !(200..300).contains(&status) {
            anyhow::bail!("GET {} returned HTTP {}", url, status);
        }
        // An empty 2xx body never reaches the write callback; the completed
        // file must still exist or a rerun's skip check would re-fetch it.
        if out.is_none() {
            File::create(dest)?;
        }
        Ok(())
    }

    /// Sleeps the retry delay in short slices, returning false as soon as the
    /// cancel token is set so an interrupt does not wait out the delay.
    fn sleep_unless_cancelled(&self, delay: Duration) -> bool {
        const SLICE: Duration = Duration::from_millis(50);
        let mut remaining = delay;
        while !remaining.is_zero() {
            if self.cancel.is_cancelled() {
                return false;
            }
            let step = remaining.min(SLICE);
            std::thread::sleep(step);
            remaining -= step;
        }
        !self.cancel.is_cancelled()
    }
}

impl Fetcher for HttpFetcher<'_> {
    fn fetch(&self, url: &str, dest: &Path) -> bool {
        let mut attempt = 1u32;
        loop {
            if self.cancel.is_cancelled() {
                return false;
            }
            tracing::debug!(attempt, dest = %dest.display(), "download attempt");
            match self.attempt(url, dest) {
                Ok(()) => {
                    tracing::info!(dest = %dest.display(), "saved");
                    return true;
                }
                Err(e) => {
                    tracing::warn!(attempt, dest = %dest.display(), "download attempt failed: {:#}", e);
                    // Drop partial bytes so a rerun does not mistake them
                    // for a completed file.
                    let _ = std::fs::remove_file(dest);
                }
            }
            match self.policy.decide(attempt) {
                RetryDecision::NoRetry => {
                    tracing::warn!(dest = %dest.display(), "giving up after {} attempt(s)", attempt);
                    return false;
                }
                RetryDecision::RetryAfter(delay) => {
                    if !self.sleep_unless_cancelled(delay) {
                        return false;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

/// Fetcher used for dry runs: no network, no disk, always "succeeds".
pub struct DryRunFetcher;

impl Fetcher for DryRunFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> bool {
        tracing::info!(url, dest = %dest.display(), "dry run, would download");
        true
    }
}
