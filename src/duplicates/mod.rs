//! Duplicate detection pipeline: size classification, checksum
//! resolution and run coordination.

pub mod finder;
pub mod groups;

pub use finder::{
    format_size, resolve_duplicates, DuplicateFinder, FinderConfig, FinderError, ResolveConfig,
    RunReport,
};
pub use groups::{classify, ClassifyStats, DigestBucket, DuplicateGroup, HashBuckets, SizeBuckets};
