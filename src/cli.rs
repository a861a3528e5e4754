//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use drive_fetch::DEFAULT_MAX_RETRIES;

/// Fetch a file behind a Google Drive sharing link.
///
/// Emulates the browser-facing HTML confirmation flow (including the
/// large-file confirmation token round-trip) and saves the payload locally.
#[derive(Parser, Debug)]
#[command(name = "drive-fetch")]
#[command(author, version, about)]
pub struct Args {
    /// The sharing link to fetch
    pub link: String,

    /// Directory to save the downloaded file under
    #[arg(short = 'o', long, default_value = "downloads")]
    pub output_dir: PathBuf,

    /// Maximum attempts for the initial content request (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_retries: u8,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
