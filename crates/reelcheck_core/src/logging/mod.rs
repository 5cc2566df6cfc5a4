//! Logging infrastructure for reelcheck.
//!
//! This module provides:
//! - Global `tracing` setup with stderr and optional file output
//! - Per-run loggers with file + callback output
//! - Tail buffer of tool output for error diagnosis
//!
//! # Example
//!
//! ```no_run
//! use reelcheck_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("review", "/path/to/logs", LogConfig::default(), None).unwrap();
//! logger.phase("Matching");
//! logger.warn("No scan record for /mnt/show/file2");
//! logger.success("Run completed");
//! ```

mod run_logger;
mod types;

use std::fs;
use std::io;
use std::path::Path;

pub use run_logger::RunLogger;
pub use tracing_appender::non_blocking::WorkerGuard;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides `default_level`. Events go to stderr, and also to
/// `log_file` when given. Keep the returned guard alive until exit so the
/// file writer gets flushed.
pub fn init_tracing(
    default_level: LogLevel,
    log_file: Option<&Path>,
) -> io::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            fs::create_dir_all(dir)?;
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "reelcheck.log".into());

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_filter_strings() {
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
    }
}
