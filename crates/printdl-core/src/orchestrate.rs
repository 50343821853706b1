//! Sequential download pass over a model's file list: filter by extension,
//! skip what is already on disk, then resolve and fetch one file at a time.

use crate::cancel::{CancelToken, Cancelled};
use crate::fetch::Fetcher;
use crate::model::{FileDescriptor, Model};
use crate::resolve::LinkResolver;
use crate::sanitize::sanitize_filename;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// What happened to one file during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Downloaded,
    /// Selected and resolvable, but this was a dry run.
    DryRun,
    /// Destination already existed; resolution and fetch were skipped.
    SkippedExisting,
    /// The remote reported no download link for the file.
    Unavailable,
    /// The fetch retry budget ran out.
    Failed,
}

/// Per-file record in the run report.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub name: String,
    pub dest: PathBuf,
    pub outcome: FileOutcome,
}

/// Ordered outcome of every file the run considered.
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub files: Vec<FileReport>,
}

impl DownloadReport {
    pub fn count(&self, outcome: FileOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }
}

/// Options for one orchestration run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_root: PathBuf,
    /// Lowercased, dot-prefixed extension suffixes (e.g. `.3mf`).
    pub extensions: Vec<String>,
    /// Plan and resolve, but write nothing to disk or fetch over the network.
    pub dry_run: bool,
}

/// A file that passed filtering, paired with its destination path.
#[derive(Debug, Clone)]
pub struct PlannedDownload {
    pub file: FileDescriptor,
    pub dest: PathBuf,
}

fn has_extension(name: &str, ext: &str) -> bool {
    name.to_lowercase().ends_with(ext)
}

/// Format fallback: a request for `.3mf` against a model that has none also
/// accepts `.stl`, the near-universal print format.
pub fn effective_extensions(model: &Model, requested: &[String]) -> Vec<String> {
    let mut extensions = requested.to_vec();
    let wants_3mf = extensions.iter().any(|e| e == ".3mf");
    let has_3mf = model.files.iter().any(|f| has_extension(&f.name, ".3mf"));
    if wants_3mf && !has_3mf && !extensions.iter().any(|e| e == ".stl") {
        tracing::info!("model has no .3mf files, also accepting .stl");
        extensions.push(".stl".to_string());
    }
    extensions
}

/// Filters the file list and assigns destination paths under
/// `output_root/<folder>/`, creating folders as needed and recording files
/// already on disk as skipped. Dry runs create nothing and skip nothing.
pub fn plan(model: &Model, opts: &RunOptions) -> Result<(Vec<PlannedDownload>, Vec<FileReport>)> {
    let extensions = effective_extensions(model, &opts.extensions);
    let mut planned = Vec::new();
    let mut skipped = Vec::new();

    for file in &model.files {
        if !extensions.iter().any(|e| has_extension(&file.name, e)) {
            continue;
        }
        let folder = sanitize_filename(&file.folder);
        let name = sanitize_filename(&file.name);
        let dir = opts.output_root.join(&folder);
        if !opts.dry_run {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create output folder {}", dir.display()))?;
        }
        let dest = dir.join(&name);
        if !opts.dry_run && dest.exists() {
            tracing::info!(dest = %dest.display(), "already downloaded, skipping");
            skipped.push(FileReport {
                name: file.name.clone(),
                dest,
                outcome: FileOutcome::SkippedExisting,
            });
            continue;
        }
        planned.push(PlannedDownload {
            file: file.clone(),
            dest,
        });
    }

    Ok((planned, skipped))
}

/// Runs the full pass: plan, then resolve and fetch each remaining file in
/// order. A per-file failure or missing link is recorded and the loop goes
/// on; a resolver transport failure or a set cancel token stops the run.
pub fn run<R, F>(
    model: &Model,
    opts: &RunOptions,
    resolver: &R,
    fetcher: &F,
    cancel: &CancelToken,
) -> Result<DownloadReport>
where
    R: LinkResolver + ?Sized,
    F: Fetcher + ?Sized,
{
    let (planned, skipped) = plan(model, opts)?;
    let mut report = DownloadReport { files: skipped };

    for item in planned {
        if cancel.is_cancelled() {
            return Err(Cancelled.into());
        }
        tracing::debug!(file = %item.file.name, "resolving download link");
        let outcome = match resolver.resolve(&item.file.id, &model.id)? {
            None => {
                tracing::warn!(file = %item.file.name, "no download link available");
                FileOutcome::Unavailable
            }
            Some(url) => {
                if fetcher.fetch(&url, &item.dest) {
                    if opts.dry_run {
                        FileOutcome::DryRun
                    } else {
                        FileOutcome::Downloaded
                    }
                } else {
                    tracing::warn!(file = %item.file.name, "could not download");
                    FileOutcome::Failed
                }
            }
        };
        report.files.push(FileReport {
            name: item.file.name,
            dest: item.dest,
            outcome,
        });
    }

    Ok(report)
}
