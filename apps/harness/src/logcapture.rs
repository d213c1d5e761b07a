//! Per-suite capture of diagnostic log lines.
//!
//! Every line written through a [`LogSink`] goes to three places: the
//! in-memory buffer that is copied into the current case's result record,
//! the process-wide `tracing` subscriber, and optionally the suite's log file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset, empty or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Process log filter: the `RUST_LOG` directives when usable, INFO otherwise.
pub fn logging_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Ordered, append-only buffer of log lines owned by one suite.
#[derive(Debug)]
pub struct LogSink {
    suite: String,
    lines: Vec<String>,
    file: Option<File>,
}

impl LogSink {
    /// Create a sink that only buffers and forwards to `tracing`.
    pub fn new(suite: &str) -> Self {
        LogSink {
            suite: suite.to_string(),
            lines: Vec::new(),
            file: None,
        }
    }

    /// Create a sink that also appends to `<dir>/<suite>.log`.
    pub fn with_file(suite: &str, dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{}.log", suite)))?;

        Ok(LogSink {
            suite: suite.to_string(),
            lines: Vec::new(),
            file: Some(file),
        })
    }

    /// Drop buffered lines. Called before each case starts.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.push(Level::INFO, message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.push(Level::WARN, message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.push(Level::ERROR, message.as_ref());
    }

    /// Lines buffered since the last [`LogSink::clear`].
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn push(&mut self, level: Level, message: &str) {
        match level {
            Level::ERROR => error!(suite = %self.suite, "{}", message),
            Level::WARN => warn!(suite = %self.suite, "{}", message),
            _ => info!(suite = %self.suite, "{}", message),
        }

        let line = format!("{} {}", level, message);

        if let Some(file) = self.file.as_mut()
            && let Err(e) = writeln!(file, "{} {}", chrono::Utc::now().to_rfc3339(), line)
        {
            warn!(suite = %self.suite, "Failed to write suite log file: {}", e);
        }

        self.lines.push(line);
    }
}
