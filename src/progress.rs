//! Progress reporting utilities using indicatif.
//!
//! The core pipeline never prints anything itself; it emits per-file
//! signals through the [`ProgressCallback`] trait and the consumer
//! renders them however it likes. The bundled [`Progress`] implementation
//! draws a spinner for the scan phase and a bar for the checksum phase.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Outcome of processing a single file, for progress rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was examined successfully.
    Ok,
    /// The file could not be read (stat or checksum failure).
    Error,
}

/// Progress callback for the duplicate detection pipeline.
///
/// Implement this trait to receive progress updates. All methods are
/// called from worker threads, so implementations must be `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ("scan" or "checksum")
    /// * `total` - Total number of items, or 0 if unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called once per file examined, tagged with its outcome.
    fn on_file(&self, outcome: FileOutcome);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using indicatif.
///
/// Manages one bar per phase. The scan phase uses a spinner because the
/// total file count is unknown until traversal finishes; the checksum
/// phase knows its total up front and gets a real bar.
pub struct Progress {
    multi: MultiProgress,
    scan: Mutex<Option<ProgressBar>>,
    checksum: Mutex<Option<ProgressBar>>,
    errors: AtomicUsize,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            scan: Mutex::new(None),
            checksum: Mutex::new(None),
            errors: AtomicUsize::new(0),
            quiet,
        }
    }

    fn scan_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn checksum_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn error_suffix(&self) -> String {
        let errors = self.errors.load(Ordering::Relaxed);
        if errors == 0 {
            String::new()
        } else {
            format!("{errors} errors")
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            "scan" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::scan_style());
                pb.set_message("Scanning");
                pb.enable_steady_tick(Duration::from_millis(100));
                *self.scan.lock().unwrap() = Some(pb);
            }
            "checksum" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::checksum_style());
                pb.set_message("Checksumming");
                *self.checksum.lock().unwrap() = Some(pb);
            }
            _ => {}
        }
    }

    fn on_file(&self, outcome: FileOutcome) {
        if self.quiet {
            return;
        }

        if outcome == FileOutcome::Error {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }

        // Tick whichever phase is active
        if let Some(ref pb) = *self.checksum.lock().unwrap() {
            pb.inc(1);
            pb.set_message(format!("Checksumming {}", self.error_suffix()));
        } else if let Some(ref pb) = *self.scan.lock().unwrap() {
            pb.inc(1);
            pb.set_message(format!("Scanning {}", self.error_suffix()));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            "scan" => {
                if let Some(pb) = self.scan.lock().unwrap().take() {
                    pb.finish_with_message("Scan complete");
                }
            }
            "checksum" => {
                if let Some(pb) = self.checksum.lock().unwrap().take() {
                    pb.finish_with_message("Checksumming complete");
                }
            }
            _ => {}
        }
    }
}
