//! CLI entry point for the drive-fetch tool.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use drive_fetch::{FetchEngine, FsStore, HttpTransport, RetryPolicy, format_human_size};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let engine = FetchEngine::new(
        Arc::new(HttpTransport::new()),
        Arc::new(FsStore::new(&args.output_dir)),
    )
    .with_retry_policy(RetryPolicy::with_max_attempts(u32::from(args.max_retries)));

    let outcome = engine.download(&args.link).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        let size = std::fs::metadata(&outcome.path)
            .map(|m| m.len())
            .unwrap_or(0);
        info!(
            name = %outcome.name,
            size = %format_human_size(size, 2),
            "download finished"
        );
        println!(
            "Saved {} ({}) to {}",
            outcome.name,
            format_human_size(size, 2),
            outcome.path.display()
        );
        if let Some(url) = &outcome.download_url {
            println!("Confirmation URL: {url}");
        }
    }

    Ok(())
}
