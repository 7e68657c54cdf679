//! File logging.
//!
//! The terminal belongs to the board while it runs, so log records go to
//! rotating files instead of stdout/stderr. The returned handle must be kept
//! alive for buffered records to be flushed.

use anyhow::{Context, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::path::Path;

use crate::config::LogLevel;

const LOG_FILE_BASENAME: &str = "taskboard";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Starts the process-wide logger. Fails if a logger is already installed.
pub fn init_logging(level: LogLevel, log_dir: &Path) -> Result<LoggerHandle> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory `{}`", log_dir.display()))?;

    let handle = Logger::try_with_str(level.as_str())
        .with_context(|| format!("invalid log level `{}`", level))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")?;

    log::info!(
        "taskboard {} logging at level={} dir={}",
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The logger is global, so every assertion about it lives in this one test.
    #[test]
    fn writes_to_the_log_dir_and_refuses_a_second_init() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");

        let handle = init_logging(LogLevel::Debug, &log_dir).unwrap();
        log::debug!("hello from the test");
        handle.flush();

        let files: Vec<_> = std::fs::read_dir(&log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(
            files.iter().any(|name| name.starts_with(LOG_FILE_BASENAME)),
            "{files:?}"
        );

        assert!(init_logging(LogLevel::Info, &log_dir).is_err());
    }
}
