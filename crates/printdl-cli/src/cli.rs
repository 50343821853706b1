//! CLI for the printdl model file downloader.

use anyhow::{Context, Result};
use clap::Parser;
use printdl_core::cancel::{self, CancelToken, Cancelled};
use printdl_core::client::HttpClient;
use printdl_core::config;
use printdl_core::extract;
use printdl_core::fetch::{DryRunFetcher, HttpFetcher};
use printdl_core::orchestrate::{self, DownloadReport, FileOutcome, RunOptions};
use printdl_core::resolve::GraphqlLinkResolver;
use printdl_core::retry::RetryPolicy;
use std::path::PathBuf;
use url::Url;

/// Download the printable files attached to a model listing.
#[derive(Debug, Parser)]
#[command(name = "printdl")]
#[command(about = "Download 3D model files from a Printables listing", long_about = None)]
pub struct Cli {
    /// Model listing URL, or a bare numeric model id.
    pub model: String,

    /// Output root folder.
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// File extensions to download (leading dot optional).
    #[arg(short = 'e', long = "ext", default_value = ".3mf")]
    pub extensions: Vec<String>,

    /// Plan only: no downloads, no folders, no files.
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose progress output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses arguments and runs; returns the process exit code.
pub fn run_from_args() -> i32 {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => 0,
        Err(err) if err.is::<Cancelled>() => {
            eprintln!("printdl: cancelled by user");
            130
        }
        Err(err) => {
            eprintln!("printdl error: {:#}", err);
            1
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    cancel::install_sigint_handler();
    let cancel = CancelToken::new();

    let client = HttpClient::new(&cfg.user_agent);
    let listing_url = model_url(&cli.model, &cfg.base_url)?;
    if cli.verbose {
        println!("Fetching {listing_url}");
    }
    let model = extract::extract(&client, &listing_url)?;
    if cli.verbose {
        println!("Model {}: {} file(s) listed", model.id, model.files.len());
    }

    let opts = RunOptions {
        output_root: cli.output,
        extensions: cli.extensions.iter().map(|e| normalize_extension(e)).collect(),
        dry_run: cli.dry_run,
    };
    let resolver = GraphqlLinkResolver::new(&client, &cfg.api_url);
    let policy = RetryPolicy::from_config(cfg.retry.as_ref());

    let report = if cli.dry_run {
        orchestrate::run(&model, &opts, &resolver, &DryRunFetcher, &cancel)?
    } else {
        let fetcher = HttpFetcher::new(&client, policy, cancel.clone());
        orchestrate::run(&model, &opts, &resolver, &fetcher, &cancel)?
    };

    print_report(&report);
    Ok(())
}

/// A bare numeric id becomes `<base_url>/model/<id>`; anything else must be
/// a valid URL.
fn model_url(input: &str, base_url: &str) -> Result<String> {
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return Ok(format!("{}/model/{}", base_url.trim_end_matches('/'), input));
    }
    let parsed = Url::parse(input).with_context(|| format!("invalid model URL: {input}"))?;
    Ok(parsed.into())
}

/// Lowercases and dot-prefixes an extension argument (`3MF` -> `.3mf`).
fn normalize_extension(ext: &str) -> String {
    let ext = ext.to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

fn print_report(report: &DownloadReport) {
    for file in &report.files {
        match file.outcome {
            FileOutcome::Downloaded => println!("Saved: {}", file.dest.display()),
            FileOutcome::DryRun => println!("Would download: {}", file.dest.display()),
            FileOutcome::SkippedExisting => println!("Already downloaded: {}", file.dest.display()),
            FileOutcome::Unavailable => println!("No download link for: {}", file.name),
            FileOutcome::Failed => println!("Could not download: {}", file.name),
        }
    }
    println!(
        "Done. {} downloaded, {} planned, {} skipped, {} unavailable, {} failed.",
        report.count(FileOutcome::Downloaded),
        report.count(FileOutcome::DryRun),
        report.count(FileOutcome::SkippedExisting),
        report.count(FileOutcome::Unavailable),
        report.count(FileOutcome::Failed),
    );
}
