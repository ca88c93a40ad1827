//! Signal handling for graceful shutdown.
//!
//! Centralized Ctrl+C handling: an `AtomicBool` flag shared across
//! threads signals when shutdown has been requested. The walker and the
//! checksum phase check the flag between files, so an interrupted run
//! stops promptly without leaving half-written output.
//!
//! # Exit Codes
//!
//! When a signal is received the flag is set and "Interrupted. Cleaning
//! up..." is printed to stderr; the application exits with code 130
//! (128 + SIGINT).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Centralized shutdown handler for graceful application termination.
///
/// `ShutdownHandler` is `Send` and `Sync`; the underlying flag uses
/// atomic operations for thread-safe access.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a new handler with the flag initially unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the flag for passing to worker threads.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Install a Ctrl+C handler that sets the shutdown flag.
///
/// # Errors
///
/// Returns `ctrlc::Error` if a handler is already installed for this
/// process; callers that may run more than once per process (tests)
/// should treat that as non-fatal.
pub fn install_handler() -> Result<ShutdownHandler, ctrlc::Error> {
    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Cleaning up...");
        flag.store(true, Ordering::SeqCst);
    })?;

    Ok(handler)
}
