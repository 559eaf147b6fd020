//! Append-only progress log

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::AuraError;

/// Default log artifact, relative to the repository root
pub const DEFAULT_LOG_FILE: &str = "progress_log.txt";

/// Default label between the agent name and the text
pub const DEFAULT_LABEL: &str = "Insight";

/// Timestamp layout, e.g. `10/18/2026, 3:04:05 PM`
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// One line of the progress log
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub agent: String,
    pub label: String,
    pub text: String,
}

impl LogEntry {
    pub fn new(
        agent: impl Into<String>,
        label: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            agent: agent.into(),
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// `"\n[<ts>] <agent> <label>: <text>"`, always a single line
    pub fn render(&self) -> String {
        let text = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        format!(
            "\n[{}] {} {}: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.agent,
            self.label,
            text
        )
    }
}

/// Appends entries to the log artifact. No file locking.
#[derive(Debug, Clone)]
pub struct LogWriter {
    path: PathBuf,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, creating the file if needed. Returns bytes written.
    pub fn append(&self, entry: &LogEntry) -> Result<usize, AuraError> {
        let line = entry.render();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        debug!(path = %self.path.display(), bytes = line.len(), "appended log entry");
        Ok(line.len())
    }
}
