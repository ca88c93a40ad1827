//! Directory walker for deterministic multi-root traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct which enumerates every
//! regular file under one or more root directories. Directory entries are
//! sorted by file name before descent, so for a fixed filesystem state the
//! sequence of yielded records is identical across runs and platforms.
//! That ordering is what makes the final duplicate report deterministic.
//!
//! Per-file failures (permission denied, file vanished between listing
//! and stat) are yielded as [`ScanError`] values instead of stopping the
//! walk; the caller decides how to count and report them.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::Walker;
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")]);
//! for record in walker.walk() {
//!     match record {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{FileRecord, ScanError};

/// Directory walker over one or more roots.
///
/// Roots are walked in the order given; within each root the traversal is
/// depth-first with lexicographically sorted entries.
#[derive(Debug)]
pub struct Walker {
    /// Root paths to walk, in order
    roots: Vec<PathBuf>,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given roots.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries
    /// as soon as possible. This allows for clean Ctrl+C handling.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk all roots, yielding one record per regular file.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Symlinks are not followed; directories and other
    /// non-regular entries are silently skipped.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        self.roots
            .iter()
            .flat_map(|root| {
                WalkDir::new(root)
                    .follow_links(false)
                    .sort_by_file_name()
                    .into_iter()
            })
            .take_while(|_| !self.is_shutdown_requested())
            .filter_map(|entry_result| match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        return None;
                    }
                    let path = entry.path().to_path_buf();
                    match entry.metadata() {
                        Ok(metadata) => Some(Ok(FileRecord::new(path, metadata.len()))),
                        Err(e) => {
                            log::warn!("Failed to stat {}: {}", path.display(), e);
                            Some(Err(walkdir_error(path, e)))
                        }
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(PathBuf::new, std::borrow::ToOwned::to_owned);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    Some(Err(walkdir_error(path, e)))
                }
            })
    }
}

/// Convert a walkdir error into a [`ScanError`], preserving the I/O kind.
fn walkdir_error(path: PathBuf, error: walkdir::Error) -> ScanError {
    match error.into_io_error() {
        Some(io) => ScanError::from_io(path, io),
        None => ScanError::Io {
            path,
            source: std::io::Error::other("filesystem loop detected"),
        },
    }
}
