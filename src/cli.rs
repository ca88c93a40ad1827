//! Command-line interface definitions for dupescan.
//!
//! Single-command CLI using the clap derive API: one or more root
//! directories to scan, an optional size threshold in megabytes, and
//! output/diagnostic switches.
//!
//! # Example
//!
//! ```bash
//! # Scan two folders for duplicates
//! dupescan ~/Downloads ~/Pictures
//!
//! # Only consider files larger than 5 MB, JSON output
//! dupescan --greater-than 5 --output json /mnt/backup
//!
//! # Verbose diagnostics into a log file
//! dupescan -v --log-file scan.log ~/Documents
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Bytes per megabyte for the `--greater-than` conversion.
const BYTES_PER_MB: f64 = 1_048_576.0;

/// Find duplicate files by size, then by content checksum.
///
/// Files are first grouped by size; only files whose size collides with
/// another file are checksummed. Nothing is deleted or modified.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// One or more folders to search for duplicates in
    #[arg(value_name = "DIR", required = true)]
    pub roots: Vec<PathBuf>,

    /// Only consider files strictly larger than SIZE_MB megabytes
    #[arg(
        short = 'g',
        long = "greater-than",
        value_name = "SIZE_MB",
        value_parser = parse_size_mb
    )]
    pub greater_than: Option<f64>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable the progress display
    #[arg(long)]
    pub no_progress: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Emit top-level errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Byte-for-byte verification of checksum matches before reporting
    ///
    /// Slower, but rules out checksum collisions entirely.
    #[arg(long)]
    pub verify: bool,

    /// Number of I/O threads for checksumming (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs; 1 is fully sequential.
    #[arg(long, value_name = "N", default_value = "4")]
    pub io_threads: usize,
}

impl Cli {
    /// The size threshold in bytes, if one was given.
    ///
    /// Megabytes are converted via x1,048,576 and truncated; the
    /// classifier applies a strict `>` against the result.
    #[must_use]
    pub fn min_size_bytes(&self) -> Option<u64> {
        self.greater_than.map(|mb| (mb * BYTES_PER_MB) as u64)
    }
}

/// Parse the `--greater-than` value: a finite, non-negative megabyte count.
fn parse_size_mb(s: &str) -> Result<f64, String> {
    let mb: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid size in MB"))?;
    if !mb.is_finite() || mb < 0.0 {
        return Err(format!("size must be a non-negative number, got '{s}'"));
    }
    Ok(mb)
}

/// Report format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
