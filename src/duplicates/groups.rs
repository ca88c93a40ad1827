//! Size classification and duplicate grouping structures.
//!
//! # Overview
//!
//! This module provides the first phase of duplicate detection and the
//! data structures shared by both phases.
//!
//! ## Size classification (Phase 1)
//!
//! Files are grouped by their exact byte size. Files whose size nobody
//! else shares cannot be duplicates and are eliminated without any
//! content I/O, which is where almost all of the savings come from.
//!
//! All bucket maps are [`IndexMap`]s: iteration follows insertion order,
//! so for a deterministic traversal the report order is deterministic
//! too.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::classify;
//! use dupescan::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let records = vec![
//!     Ok(FileRecord::new(PathBuf::from("/file1.txt"), 1024)),
//!     Ok(FileRecord::new(PathBuf::from("/file2.txt"), 1024)),
//!     Ok(FileRecord::new(PathBuf::from("/file3.txt"), 2048)),
//! ];
//!
//! let (buckets, stats) = classify(records, None, None);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(buckets[&1024].len(), 2);
//! ```

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::progress::{FileOutcome, ProgressCallback};
use crate::scanner::{digest_to_hex, Digest, FileRecord, ScanError};

/// Mapping from file size to the paths sharing that size.
///
/// Insertion order of sizes and of paths within a size is preserved.
/// A path appears in exactly one bucket.
pub type SizeBuckets = IndexMap<u64, Vec<PathBuf>>;

/// Mapping from content digest to the bucket of paths sharing it.
pub type HashBuckets = IndexMap<Digest, DigestBucket>;

/// Paths sharing one content digest, plus the size they all have.
///
/// Populated only from size buckets with two or more members, so every
/// path here already survived the size filter.
#[derive(Debug, Clone, Default)]
pub struct DigestBucket {
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Paths with this digest, in discovery order
    pub paths: Vec<PathBuf>,
}

/// Statistics from the size classification phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    /// Total number of files examined, including failures
    pub total_files: usize,
    /// Number of files whose size could not be read
    pub errors: usize,
    /// Number of files admitted past the size filter
    pub bucketed_files: usize,
    /// Total bytes of the admitted files
    pub bucketed_size: u64,
}

impl ClassifyStats {
    /// Percentage of examined files that were admitted into buckets.
    #[must_use]
    pub fn admission_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.bucketed_files as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Partition discovered files into size buckets (Phase 1).
///
/// Consumes the walker's output stream. Every item counts toward
/// `total_files`; stat failures increment `errors`, emit a progress
/// signal tagged [`FileOutcome::Error`], and never abort the scan.
///
/// # Arguments
///
/// * `records` - Stream of discovered files (or per-file errors)
/// * `min_size` - If set, a file enters a bucket only when its size is
///   strictly greater than this many bytes. `None` admits everything,
///   including empty files, which bucket together at size 0.
/// * `progress` - Optional per-file progress sink
///
/// # Returns
///
/// The completed size buckets and the classification counters.
pub fn classify<I>(
    records: I,
    min_size: Option<u64>,
    progress: Option<&dyn ProgressCallback>,
) -> (SizeBuckets, ClassifyStats)
where
    I: IntoIterator<Item = Result<FileRecord, ScanError>>,
{
    let mut buckets = SizeBuckets::new();
    let mut stats = ClassifyStats::default();

    for record in records {
        stats.total_files += 1;
        match record {
            Ok(file) => {
                if let Some(p) = progress {
                    p.on_file(FileOutcome::Ok);
                }
                // Strict >: a file exactly at the threshold is excluded
                if min_size.is_some_and(|threshold| file.size <= threshold) {
                    log::trace!(
                        "Below size threshold ({} bytes): {}",
                        file.size,
                        file.path.display()
                    );
                    continue;
                }
                stats.bucketed_files += 1;
                stats.bucketed_size += file.size;
                buckets.entry(file.size).or_default().push(file.path);
            }
            Err(e) => {
                stats.errors += 1;
                if let Some(p) = progress {
                    p.on_file(FileOutcome::Error);
                }
                log::warn!("Scan error: {e}");
            }
        }
    }

    log::info!(
        "Phase 1 complete: {} files examined, {} bucketed ({} errors)",
        stats.total_files,
        stats.bucketed_files,
        stats.errors
    );

    (buckets, stats)
}

/// Confirmed duplicate group: a hash bucket with two or more members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// BLAKE3 digest of the shared content, hex-encoded in JSON output
    #[serde(serialize_with = "serialize_digest")]
    pub digest: Digest,
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Member paths, in discovery order
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Bytes that could be reclaimed by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * (self.paths.len() as u64).saturating_sub(1)
    }

    /// Digest as a hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        digest_to_hex(&self.digest)
    }
}

fn serialize_digest<S>(digest: &Digest, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&digest_to_hex(digest))
}
