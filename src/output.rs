//! Report rendering for scan results.
//!
//! Two formats: a human-readable text report and a JSON document for
//! scripting. Both are written to an arbitrary `io::Write` sink so tests
//! can capture the output.

use crate::duplicates::{DuplicateGroup, RunReport};
use serde::Serialize;
use std::io::{self, Write};

const SEPARATOR_WIDTH: usize = 60;

/// Top-level JSON document for `--output json`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub groups: &'a [DuplicateGroup],
    pub summary: JsonSummary,
}

/// Summary section of the JSON report.
#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub total_files: usize,
    pub errors: usize,
    pub duplicate_groups: usize,
    pub duplicate_files: usize,
    pub wasted_bytes: u64,
    pub scan_duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size_mb: Option<f64>,
}

/// Write the text report: one block per duplicate group, then a summary
/// line with totals.
pub fn write_text_report<W: Write>(
    writer: &mut W,
    groups: &[DuplicateGroup],
    report: &RunReport,
    min_size_mb: Option<f64>,
) -> io::Result<()> {
    for group in groups {
        writeln!(
            writer,
            "Duplicate files found for checksum {}:",
            group.digest_hex()
        )?;
        for path in &group.paths {
            writeln!(writer, "    - {}", path.display())?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "-".repeat(SEPARATOR_WIDTH))?;

    let duplicate_files: usize = groups.iter().map(DuplicateGroup::len).sum();
    let threshold = match min_size_mb {
        Some(mb) => format!(" above {mb} MB"),
        None => String::new(),
    };
    writeln!(
        writer,
        "{} duplicate group(s) holding {} file(s) found among {} file(s){} ({} error(s))",
        groups.len(),
        duplicate_files,
        report.total_files,
        threshold,
        report.total_errors,
    )?;
    writeln!(
        writer,
        "Wasted space: {} (scan took {:.2}s)",
        report.wasted_display(),
        report.scan_duration.as_secs_f64(),
    )?;

    Ok(())
}

/// Write the JSON report as a single pretty-printed document.
pub fn write_json_report<W: Write>(
    writer: &mut W,
    groups: &[DuplicateGroup],
    report: &RunReport,
    min_size_mb: Option<f64>,
) -> io::Result<()> {
    let doc = JsonReport {
        groups,
        summary: JsonSummary {
            total_files: report.total_files,
            errors: report.total_errors,
            duplicate_groups: groups.len(),
            duplicate_files: groups.iter().map(DuplicateGroup::len).sum(),
            wasted_bytes: report.wasted_space,
            scan_duration_secs: report.scan_duration.as_secs_f64(),
            min_size_mb,
        },
    };

    serde_json::to_writer_pretty(&mut *writer, &doc)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn sample_group() -> DuplicateGroup {
        DuplicateGroup {
            digest: [0xab; 32],
            size: 1024,
            paths: vec![PathBuf::from("/tmp/a.txt"), PathBuf::from("/tmp/b.txt")],
        }
    }

    fn sample_report() -> RunReport {
        RunReport {
            total_files: 10,
            total_errors: 1,
            duplicate_groups: 1,
            total_size: 4096,
            wasted_space: 1024,
            scan_duration: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_text_report_lists_group_members() {
        let mut buf = Vec::new();
        write_text_report(&mut buf, &[sample_group()], &sample_report(), None).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains(&format!(
            "Duplicate files found for checksum {}:",
            "ab".repeat(32)
        )));
        assert!(text.contains("    - /tmp/a.txt"));
        assert!(text.contains("    - /tmp/b.txt"));
        assert!(text.contains("1 duplicate group(s) holding 2 file(s) found among 10 file(s) (1 error(s))"));
        assert!(text.contains(&"-".repeat(60)));
    }

    #[test]
    fn test_text_report_mentions_threshold() {
        let mut buf = Vec::new();
        write_text_report(&mut buf, &[], &sample_report(), Some(5.0)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("above 5 MB"));
    }

    #[test]
    fn test_text_report_no_groups() {
        let mut buf = Vec::new();
        let report = RunReport {
            total_files: 3,
            total_errors: 0,
            duplicate_groups: 0,
            total_size: 0,
            wasted_space: 0,
            scan_duration: Duration::from_millis(10),
        };
        write_text_report(&mut buf, &[], &report, None).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("0 duplicate group(s) holding 0 file(s) found among 3 file(s) (0 error(s))"));
        assert!(!text.contains("Duplicate files found for checksum"));
    }

    #[test]
    fn test_json_report_structure() {
        let mut buf = Vec::new();
        write_json_report(&mut buf, &[sample_group()], &sample_report(), Some(1.0)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["summary"]["total_files"], 10);
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["summary"]["duplicate_groups"], 1);
        assert_eq!(value["summary"]["duplicate_files"], 2);
        assert_eq!(value["summary"]["wasted_bytes"], 1024);
        assert_eq!(value["summary"]["min_size_mb"], 1.0);
        assert_eq!(value["groups"][0]["digest"], "ab".repeat(32));
        assert_eq!(value["groups"][0]["size"], 1024);
        assert_eq!(value["groups"][0]["paths"][0], "/tmp/a.txt");
    }

    #[test]
    fn test_json_report_omits_absent_threshold() {
        let mut buf = Vec::new();
        write_json_report(&mut buf, &[], &sample_report(), None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value["summary"].get("min_size_mb").is_none());
    }
}
