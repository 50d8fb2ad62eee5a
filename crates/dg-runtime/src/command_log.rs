use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use dg_core::{Command, DialogicError};

pub const LOG_HEADER: &str = "==========================";

/// Append-only record of fired commands, one tab-separated line each:
/// wall clock, milliseconds since the log was created, printable command.
///
/// Write failures never interrupt execution. They are reported through
/// `tracing` and counted in [`CommandLog::dropped_lines`].
#[derive(Debug)]
pub struct CommandLog {
    path: PathBuf,
    started: Instant,
    dropped: usize,
}

impl CommandLog {
    /// Truncates `path` and writes the separator header.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        let mut log = Self {
            path: path.into(),
            started: Instant::now(),
            dropped: 0,
        };
        if let Err(error) = log.reset() {
            tracing::warn!(%error, "command log unavailable");
            log.dropped += 1;
        }
        log
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dropped_lines(&self) -> usize {
        self.dropped
    }

    pub fn record(&mut self, command: &Command) {
        if command.is_noop() {
            return;
        }
        let line = format!(
            "{}\t{}\t{}",
            chrono::Local::now().format("%H:%M:%S"),
            self.started.elapsed().as_millis(),
            command
        );
        if let Err(error) = self.append(&line) {
            tracing::warn!(%error, "dropped command log line");
            self.dropped += 1;
        }
    }

    fn reset(&self) -> Result<(), DialogicError> {
        fs::write(&self.path, format!("{}\n", LOG_HEADER)).map_err(|error| self.sink_error(error))
    }

    fn append(&self, line: &str) -> Result<(), DialogicError> {
        let to_error = |error: std::io::Error| self.sink_error(error);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_error)?;
        writeln!(file, "{}", line).map_err(to_error)
    }

    fn sink_error(&self, error: std::io::Error) -> DialogicError {
        DialogicError::new(
            "LOG_SINK_ERROR",
            format!("{}: {}", self.path.display(), error),
        )
    }
}
