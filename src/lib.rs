//! dupescan - find duplicate files by size, then by content checksum.
//!
//! The pipeline runs in two phases. Traversal groups every file under the
//! given roots into size buckets; only files whose size collides with
//! another file are then checksummed with BLAKE3. Files with a unique
//! size are never opened, which is where almost all of the speed comes
//! from on real trees. Nothing is ever deleted or modified.
//!
//! # Library usage
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (groups, report) = finder.find_duplicates(&[PathBuf::from(".")])?;
//! for group in &groups {
//!     println!("{} files of {} bytes", group.len(), group.size);
//! }
//! println!("{} errors", report.total_errors);
//! # Ok::<(), dupescan::duplicates::FinderError>(())
//! ```

pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, OutputFormat};
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::progress::{Progress, ProgressCallback};

/// Run the application with the given CLI arguments.
///
/// Initializes logging and the Ctrl+C handler, runs the two-phase
/// pipeline and writes the report to stdout. The returned code reflects
/// the outcome: duplicates found (0), none found (2), or partial
/// success when some files could not be read (3).
///
/// # Errors
///
/// Returns an error if a root is invalid, the run is interrupted, or the
/// report cannot be written. Per-file read failures are counted in the
/// report and never surface here.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    log::debug!("starting dupescan with roots: {:?}", cli.roots);

    let mut config = FinderConfig::default()
        .with_min_size(cli.min_size_bytes())
        .with_io_threads(cli.io_threads)
        .with_verify(cli.verify);

    // A failed handler install is not fatal; the scan just won't stop
    // cleanly on Ctrl+C. Tests call run_app repeatedly and the second
    // install attempt always fails.
    match signal::install_handler() {
        Ok(handler) => config = config.with_shutdown_flag(handler.get_flag()),
        Err(e) => log::warn!("could not install Ctrl+C handler: {e}"),
    }

    if !cli.quiet && !cli.no_progress {
        let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(false));
        config = config.with_progress_callback(progress);
    }

    let finder = DuplicateFinder::new(config);
    let (groups, report) = finder.find_duplicates(&cli.roots)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => {
            output::write_text_report(&mut out, &groups, &report, cli.greater_than)
        }
        OutputFormat::Json => {
            output::write_json_report(&mut out, &groups, &report, cli.greater_than)
        }
    }
    .context("failed to write report")?;
    out.flush().context("failed to flush report")?;

    // Per-file errors downgrade the run to partial success; a clean run
    // with nothing to report gets its own code so scripts can tell the
    // two apart.
    let code = if report.total_errors > 0 {
        ExitCode::PartialSuccess
    } else if groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };
    Ok(code)
}
