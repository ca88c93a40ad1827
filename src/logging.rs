//! Logging infrastructure for dupescan.
//!
//! Structured logging using the `log` facade and `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: warn level, so per-file diagnostics stay out of the way
//!    of the report unless asked for
//!
//! Diagnostics go to stderr by default; `--log-file` redirects them to a
//! file so the progress bar and report stay clean.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Initialize the logging subsystem based on CLI flags.
///
/// Safe to call more than once; subsequent calls are no-ops (relevant
/// for tests that drive the application entry point repeatedly).
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=warn, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
/// * `log_file` - If set, write diagnostics to this file instead of stderr
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    if let Some(path) = log_file {
        let file = File::create(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    configure_format(&mut builder, verbose);

    // Ignore AlreadyInit: the first initialization wins
    let _ = builder.try_init();
    Ok(())
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Configure the log format based on verbosity.
///
/// Verbose runs include the module path so per-file diagnostics can be
/// traced to the phase that emitted them.
fn configure_format(builder: &mut Builder, verbose: u8) {
    if verbose >= 1 {
        builder.format(|buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                timestamp,
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}
