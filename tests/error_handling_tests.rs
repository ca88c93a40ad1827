//! Tests for error isolation and top-level failure modes.
//!
//! Per-file read failures must never abort a scan; they are counted and
//! the remaining files still group normally. Only invalid roots and
//! interruption are fatal.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use dupescan::duplicates::{DuplicateFinder, FinderConfig, FinderError};

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(contents).unwrap();
    path
}

#[test]
fn test_missing_root_is_fatal() {
    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(&[PathBuf::from("/no/such/directory")]);

    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}

#[test]
fn test_file_root_is_fatal() {
    let temp = TempDir::new().unwrap();
    let file = write_file(temp.path(), "plain.txt", b"not a directory");

    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(&[file]);

    assert!(matches!(result, Err(FinderError::NotADirectory(_))));
}

#[test]
fn test_one_bad_root_fails_before_any_work() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "a.txt", b"content");

    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(&[
        temp.path().to_path_buf(),
        PathBuf::from("/no/such/directory"),
    ]);

    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}

#[test]
fn test_preinstalled_shutdown_flag_interrupts() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "a.txt", b"content");

    let flag = Arc::new(AtomicBool::new(false));
    flag.store(true, Ordering::SeqCst);

    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));
    let result = finder.find_duplicates(&[temp.path().to_path_buf()]);

    assert!(matches!(result, Err(FinderError::Interrupted)));
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn make_unreadable(path: &Path) {
        fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
    }

    fn restore(path: &Path) {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o755));
    }

    /// Permission bits do not apply to root; these tests are meaningless there.
    fn running_as_root() -> bool {
        fs::read("/proc/self/status")
            .ok()
            .and_then(|s| String::from_utf8(s).ok())
            .map(|s| s.lines().any(|l| l.starts_with("Uid:\t0")))
            .unwrap_or(false)
    }

    #[test]
    fn test_unreadable_file_is_counted_not_fatal() {
        if running_as_root() {
            return;
        }

        let temp = TempDir::new().unwrap();
        let a = write_file(temp.path(), "a.txt", b"identical");
        let b = write_file(temp.path(), "b.txt", b"identical");
        let locked = write_file(temp.path(), "locked.txt", b"identical");
        make_unreadable(&locked);

        let finder = DuplicateFinder::with_defaults();
        let (groups, report) = finder
            .find_duplicates(&[temp.path().to_path_buf()])
            .unwrap();
        restore(&locked);

        // The locked file fails at checksum time; the survivors still group.
        assert_eq!(report.total_files, 3);
        assert_eq!(report.total_errors, 1);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths, vec![a, b]);
    }

    #[test]
    fn test_unreadable_file_downgrades_exit_code() {
        use clap::Parser;
        use dupescan::cli::Cli;
        use dupescan::error::ExitCode;

        if running_as_root() {
            return;
        }

        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "a.txt", b"identical");
        write_file(temp.path(), "b.txt", b"identical");
        let locked = write_file(temp.path(), "locked.txt", b"identical");
        make_unreadable(&locked);

        let cli = Cli::try_parse_from([
            "dupescan",
            "--no-progress",
            "--quiet",
            temp.path().to_str().unwrap(),
        ])
        .unwrap();

        let code = dupescan::run_app(cli).unwrap();
        restore(&locked);

        assert_eq!(code, ExitCode::PartialSuccess);
    }

    #[test]
    fn test_unreadable_directory_is_counted_not_fatal() {
        if running_as_root() {
            return;
        }

        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "a.txt", b"readable dup");
        write_file(temp.path(), "b.txt", b"readable dup");
        let locked_dir = temp.path().join("locked");
        fs::create_dir(&locked_dir).unwrap();
        write_file(&locked_dir, "hidden.txt", b"unseen");
        make_unreadable(&locked_dir);

        let finder = DuplicateFinder::with_defaults();
        let result = finder.find_duplicates(&[temp.path().to_path_buf()]);
        restore(&locked_dir);

        let (groups, report) = result.unwrap();
        assert!(report.total_errors >= 1);
        assert_eq!(groups.len(), 1);
    }
}

#[test]
fn test_vanished_file_during_checksum() {
    use dupescan::duplicates::{classify, resolve_duplicates, ResolveConfig};
    use dupescan::scanner::{FileRecord, Hasher};

    let temp = TempDir::new().unwrap();
    let a = write_file(temp.path(), "a.txt", b"still here");
    let b = write_file(temp.path(), "b.txt", b"still here");
    let ghost = temp.path().join("ghost.txt");

    // Feed the classifier a record for a file that no longer exists by
    // checksum time, sharing a size with real duplicates.
    let records = vec![
        Ok(FileRecord::new(a.clone(), 10)),
        Ok(FileRecord::new(b.clone(), 10)),
        Ok(FileRecord::new(ghost, 10)),
    ];
    let (buckets, stats) = classify(records.into_iter(), None, None);
    assert_eq!(stats.errors, 0);

    let hasher = Hasher::new();
    let (hash_buckets, errors) =
        resolve_duplicates(buckets, stats.errors, &hasher, &ResolveConfig::default(), None);

    assert_eq!(errors, 1);
    let survivors: Vec<_> = hash_buckets
        .values()
        .filter(|bucket| bucket.paths.len() >= 2)
        .collect();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].paths, vec![a, b]);
}
