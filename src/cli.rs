//! Command-line interface for rmdupes.
//!
//! ```bash
//! # List duplicate groups under the current directory
//! rmdupes -p
//!
//! # Same, as JSON, keeping the newest copy of each group
//! rmdupes -p ~/Downloads --format json --keep newest
//!
//! # Remove every redundant copy, keeping files under ~/Photos/originals
//! rmdupes -d ~/Photos --prefer ~/Photos/originals
//! ```
//!
//! Options left unset fall back to the configuration file and `RMDUPES_*`
//! environment variables, see [`crate::config`].

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::duplicates::KeepStrategy;
use crate::output::OutputFormat;
use crate::scanner::HashAlgorithm;

/// Find duplicate files and optionally delete the redundant copies.
///
/// Files are grouped by size first and only same-sized files are hashed.
/// In every group one file is kept (the survivor); with `--delete` all
/// others are removed permanently.
#[derive(Debug, Parser)]
#[command(name = "rmdupes")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["print", "delete"]),
))]
pub struct Cli {
    /// Print duplicate groups without changing anything
    #[arg(short, long)]
    pub print: bool,

    /// Delete every duplicate except the survivor of its group
    #[arg(short, long)]
    pub delete: bool,

    /// Directory to scan (default: current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Which file of a group to keep
    #[arg(long, value_enum, value_name = "STRATEGY")]
    pub keep: Option<KeepStrategy>,

    /// Prefer keeping files under DIR (repeatable)
    #[arg(long, value_name = "DIR")]
    pub prefer: Vec<PathBuf>,

    /// Content hash algorithm
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Number of hashing threads (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub io_threads: Option<u64>,

    /// Ignore files smaller than SIZE (e.g. 10KB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Ignore files larger than SIZE (e.g. 1GB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Do not re-check a file's size before deleting it
    #[arg(long, requires = "delete")]
    pub no_verify: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// ```
/// use rmdupes::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, has no valid number, or has
/// an unknown suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
