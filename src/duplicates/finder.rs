//! Duplicate resolution and run coordination.
//!
//! # Overview
//!
//! This module contains the second phase of detection and the coordinator
//! that ties the phases together:
//!
//! 1. **Phase 1 - Size classification**: see [`crate::duplicates::classify`]
//! 2. **Phase 2 - Checksum resolution**: [`resolve_duplicates`] digests
//!    every member of a multi-member size bucket and regroups by digest
//! 3. **Coordination**: [`DuplicateFinder`] sequences the phases and
//!    assembles the final [`RunReport`]
//!
//! Size buckets with a single member are never checksummed; their member
//! is provably unique. That skip is the efficiency invariant the whole
//! design exists for.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let (groups, report) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! println!("Found {} duplicate groups", report.duplicate_groups);
//! println!("Reclaimable space: {}", report.wasted_display());
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;

use super::groups::{classify, DigestBucket, DuplicateGroup, HashBuckets, SizeBuckets};
use crate::progress::{FileOutcome, ProgressCallback};
use crate::scanner::{Digest, HashError, Hasher, Walker};

/// Configuration for the checksum resolution phase.
#[derive(Clone)]
pub struct ResolveConfig {
    /// Number of I/O threads for parallel checksumming.
    /// Default is 4 to prevent disk thrashing; 1 means fully sequential.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            shutdown_flag: None,
        }
    }
}

impl ResolveConfig {
    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Resolve size buckets into hash buckets (Phase 2).
///
/// For every size bucket with two or more members, computes each member's
/// content digest and regroups by digest. Singleton buckets are skipped
/// without any I/O. A file whose digest cannot be computed is counted as
/// an error and excluded from every hash bucket; it is never reported as
/// a duplicate of anything.
///
/// Digests are computed on a bounded rayon pool. Each work item carries
/// the sequence index assigned at discovery time and results are sorted
/// by that index before insertion, so bucket order matches what a fully
/// sequential run would produce.
///
/// # Arguments
///
/// * `buckets` - Size buckets from Phase 1
/// * `prior_errors` - Error count carried forward from classification
/// * `hasher` - The checksummer to use
/// * `config` - Thread count and shutdown flag
/// * `progress` - Optional per-file progress sink
///
/// # Returns
///
/// The completed hash buckets and the cumulative error count.
pub fn resolve_duplicates(
    buckets: SizeBuckets,
    prior_errors: usize,
    hasher: &Hasher,
    config: &ResolveConfig,
    progress: Option<&dyn ProgressCallback>,
) -> (HashBuckets, usize) {
    // Flatten multi-member buckets into sequenced work items
    let work: Vec<(usize, u64, PathBuf)> = buckets
        .into_iter()
        .filter(|(size, paths)| {
            if paths.len() < 2 {
                log::trace!("Skipping unique size {size}, member is provably unique");
                false
            } else {
                true
            }
        })
        .flat_map(|(size, paths)| paths.into_iter().map(move |p| (size, p)))
        .enumerate()
        .map(|(seq, (size, path))| (seq, size, path))
        .collect();

    if work.is_empty() {
        log::debug!("Phase 2: no size collisions, nothing to checksum");
        return (HashBuckets::new(), prior_errors);
    }

    if let Some(p) = progress {
        p.on_phase_start("checksum", work.len());
    }
    log::info!("Phase 2: checksumming {} files", work.len());

    // None marks a file skipped because shutdown was requested mid-phase
    type ItemResult = (usize, u64, PathBuf, Option<Result<Digest, HashError>>);
    let digest_all = || -> Vec<ItemResult> {
        work.into_par_iter()
            .map(|(seq, size, path)| {
                if config.is_shutdown_requested() {
                    return (seq, size, path, None);
                }
                let result = hasher.digest(&path);
                if let Some(p) = progress {
                    p.on_file(match result {
                        Ok(_) => FileOutcome::Ok,
                        Err(_) => FileOutcome::Error,
                    });
                }
                (seq, size, path, Some(result))
            })
            .collect()
    };

    let mut results = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(digest_all),
        Err(e) => {
            log::warn!(
                "Failed to create thread pool ({e}), using global pool with {} threads",
                rayon::current_num_threads()
            );
            digest_all()
        }
    };

    // Re-impose discovery order before any bucket mutation
    results.sort_unstable_by_key(|(seq, ..)| *seq);

    let mut hash_buckets = HashBuckets::new();
    let mut errors = prior_errors;
    for (_, size, path, result) in results {
        match result {
            Some(Ok(digest)) => {
                hash_buckets
                    .entry(digest)
                    .or_insert_with(|| DigestBucket {
                        size,
                        paths: Vec::new(),
                    })
                    .paths
                    .push(path);
            }
            Some(Err(e)) => {
                errors += 1;
                log::warn!("Failed to checksum {}: {}", path.display(), e);
            }
            None => {
                log::debug!("Skipped (shutdown requested): {}", path.display());
            }
        }
    }

    if let Some(p) = progress {
        p.on_phase_end("checksum");
    }

    (hash_buckets, errors)
}

/// Errors that can occur during a duplicate-finding run.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// A provided root does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// A provided root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred outside the per-file error contracts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Summary counters for a completed run.
///
/// Mutated only while the run is in flight; read-only once reporting
/// begins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Total files examined during traversal, including failures
    pub total_files: usize,
    /// Per-file errors across both phases
    pub total_errors: usize,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Total bytes of files admitted past the size filter
    pub total_size: u64,
    /// Bytes reclaimable by keeping one copy per group
    pub wasted_space: u64,
    /// Wall-clock duration of the run
    pub scan_duration: Duration,
}

impl RunReport {
    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn wasted_display(&self) -> String {
        format_size(self.wasted_space)
    }

    /// Total scanned size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        format_size(self.total_size)
    }
}

/// Format a byte size as a human-readable string.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Strict lower bound on file size; `None` admits everything.
    pub min_size: Option<u64>,
    /// Number of I/O threads for checksumming (0 or 1 means sequential).
    pub io_threads: usize,
    /// Byte-for-byte verification of digest matches before reporting.
    pub verify: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("min_size", &self.min_size)
            .field("io_threads", &self.io_threads)
            .field("verify", &self.verify)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the strict minimum-size threshold in bytes.
    #[must_use]
    pub fn with_min_size(mut self, min_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the I/O thread count for checksumming.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable byte-for-byte verification of digest matches.
    #[must_use]
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Run coordinator for the two-phase detection pipeline.
///
/// Sequences traversal, size classification and checksum resolution, then
/// filters the hash buckets down to groups of two or more. It never
/// inspects file contents or sizes itself.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create a new finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under the given roots.
    ///
    /// # Arguments
    ///
    /// * `roots` - Root directories to scan, walked in order
    ///
    /// # Returns
    ///
    /// The duplicate groups in discovery order, plus the run counters.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if a root does not exist or is not a
    /// directory, or if the run is interrupted. Per-file read failures
    /// are never errors here; they are counted in the report.
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, RunReport), FinderError> {
        let start_time = std::time::Instant::now();

        for root in roots {
            if !root.exists() {
                return Err(FinderError::PathNotFound(root.clone()));
            }
            if !root.is_dir() {
                return Err(FinderError::NotADirectory(root.clone()));
            }
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Starting duplicate scan of {} root(s)", roots.len());
        let progress = self.config.progress_callback.as_deref();

        // Phase 1: walk and classify by size
        if let Some(p) = progress {
            p.on_phase_start("scan", 0);
        }

        let mut walker = Walker::new(roots.to_vec());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let (size_buckets, classify_stats) =
            classify(walker.walk(), self.config.min_size, progress);

        if let Some(p) = progress {
            p.on_phase_end("scan");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Phase 2: resolve size collisions by content digest
        let resolve_config = ResolveConfig {
            io_threads: self.config.io_threads.max(1),
            shutdown_flag: self.config.shutdown_flag.clone(),
        };
        let (hash_buckets, total_errors) = resolve_duplicates(
            size_buckets,
            classify_stats.errors,
            &self.hasher,
            &resolve_config,
            progress,
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Hash buckets with two or more members are the reportable groups
        let mut groups: Vec<DuplicateGroup> = hash_buckets
            .into_iter()
            .filter(|(_, bucket)| bucket.paths.len() >= 2)
            .map(|(digest, bucket)| DuplicateGroup {
                digest,
                size: bucket.size,
                paths: bucket.paths,
            })
            .collect();

        let mut total_errors = total_errors;
        if self.config.verify {
            self.verify_groups(&mut groups, &mut total_errors);
        }

        let report = RunReport {
            total_files: classify_stats.total_files,
            total_errors,
            duplicate_groups: groups.len(),
            total_size: classify_stats.bucketed_size,
            wasted_space: groups.iter().map(DuplicateGroup::wasted_space).sum(),
            scan_duration: start_time.elapsed(),
        };

        log::info!(
            "Scan complete: {} groups among {} files ({} errors, {} reclaimable) in {:.2?}",
            report.duplicate_groups,
            report.total_files,
            report.total_errors,
            report.wasted_display(),
            report.scan_duration
        );

        Ok((groups, report))
    }

    /// Byte-for-byte verification of digest matches (opt-in).
    ///
    /// Each member is compared against the first member of its group.
    /// Members that differ (a genuine checksum collision) or cannot be
    /// read are dropped; groups reduced below two members disappear.
    fn verify_groups(&self, groups: &mut Vec<DuplicateGroup>, errors: &mut usize) {
        for group in groups.iter_mut() {
            let Some((first, rest)) = group.paths.split_first() else {
                continue;
            };
            let first = first.clone();
            let mut kept = vec![first.clone()];
            for path in rest {
                match self.hasher.contents_equal(&first, path) {
                    Ok(true) => kept.push(path.clone()),
                    Ok(false) => {
                        log::warn!(
                            "Checksum collision: {} differs from {} despite equal digests",
                            path.display(),
                            first.display()
                        );
                    }
                    Err(e) => {
                        *errors += 1;
                        log::warn!("Verification failed for {}: {}", path.display(), e);
                    }
                }
            }
            group.paths = kept;
        }
        groups.retain(|g| g.len() >= 2);
    }
}
