use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;

/// Append-only diagnostic log for one pipeline run.
///
/// Lifecycle is owned by the caller and the value is passed explicitly into
/// the builder and dispatcher. Every line is timestamped, kept in memory,
/// mirrored to `tracing`, and appended to the backing file when one is
/// attached. A failed file write never fails the run.
#[derive(Debug, Default)]
pub struct RunLog {
    lines: Vec<String>,
    file: Option<File>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(RunLog {
            lines: Vec::new(),
            file: Some(file),
        })
    }

    pub fn append(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        let line = format!("{} | {message}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        tracing::info!("{message}");
        if let Some(file) = &mut self.file {
            let _ = writeln!(file, "{line}");
        }
        self.lines.push(line);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::warn!("{message}");
        self.append(format!("Warning: {message}"));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any appended line contains `needle`. Diagnostic assertions
    /// in tests read the log through this.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}
