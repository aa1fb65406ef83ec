//! Logging infrastructure for Zonecast.
//!
//! This module provides:
//! - Global `tracing` subscriber setup honouring `RUST_LOG`
//! - Optional daily-rolling log file alongside stderr output
//! - A quiet subscriber for tests
//!
//! # Example
//!
//! ```no_run
//! use zonecast_core::logging::{init_tracing, LogLevel};
//!
//! // Keep the guard alive for the lifetime of the process.
//! let _guard = init_tracing(LogLevel::Info, Some(std::path::Path::new(".logs")));
//! tracing::info!("Console started");
//! ```

mod types;

pub use types::LogLevel;

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Prefix of the daily log files.
const LOG_FILE_PREFIX: &str = "zonecast.log";

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
/// - Additionally writes to a daily file in `log_dir`, if given
///
/// Should be called once at application startup. The returned guard
/// flushes the file writer when dropped.
pub fn init_tracing(default_level: LogLevel, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter()));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

/// Initialize tracing for tests (only logs warnings and above).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
