//! Single file appender

use crate::core::{Appender, LogEntry, LoggerError, Result, TimestampFormat};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Renders an entry as one file record: `<timestamp> <LEVEL> <tag> <message>\n`.
pub fn format_line(entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
    format!(
        "{} {} {} {}\n",
        timestamp_format.format(&entry.timestamp),
        entry.level.to_str(),
        entry.tag,
        entry.message
    )
}

/// Writes every record to one file.
///
/// The file is opened on the first append. In overwrite mode it is truncated
/// by that first open only; every later open of the same appender (after a
/// [`close`](Appender::close)) appends, so one appender never discards its
/// own records.
pub struct FileAppender {
    path: PathBuf,
    append: bool,
    truncated: bool,
    writer: Option<BufWriter<File>>,
    timestamp_format: TimestampFormat,
}

impl FileAppender {
    /// Appender adding to any existing content of `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_mode(path, true)
    }

    /// Appender replacing the content of `path` once per session.
    pub fn overwrite(path: impl Into<PathBuf>) -> Self {
        Self::with_mode(path, false)
    }

    pub fn with_mode(path: impl Into<PathBuf>, append: bool) -> Self {
        Self {
            path: path.into(),
            append,
            truncated: false,
            writer: None,
            timestamp_format: TimestampFormat::default(),
        }
    }

    /// Set the timestamp format for this appender
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use taglog::appenders::FileAppender;
    /// use taglog::TimestampFormat;
    ///
    /// let appender = FileAppender::new("/var/log/app.log")
    ///     .with_timestamp_format(TimestampFormat::Iso8601);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_append(&self) -> bool {
        self.append
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::io_operation(
                        "create log directory",
                        format!("Failed to create directory '{}'", parent.display()),
                        e,
                    )
                })?;
            }

            let truncate = !self.append && !self.truncated;
            let mut options = OpenOptions::new();
            options.create(true);
            if truncate {
                options.write(true).truncate(true);
            } else {
                options.append(true);
            }
            let file = options.open(&self.path).map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;
            self.truncated = true;
            self.writer = Some(BufWriter::new(file));
        }

        self.writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))
    }
}

impl Appender for FileAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let line = format_line(entry, &self.timestamp_format);
        let path = self.path.display().to_string();
        let writer = self.writer()?;

        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| LoggerError::file_appender(path, format!("Failed to write log entry: {}", e)))
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
