//! File sink selection and failure latching

use super::chunked_file::{ChunkedFileAppender, ChunkedFileConfig};
use super::file::FileAppender;
use crate::core::{Appender, LogEntry, LoggerError, Result, TimestampFormat};
use std::path::PathBuf;

/// Where file output goes.
#[derive(Debug, Clone)]
pub enum FileSinkConfig {
    /// One file; `append == false` truncates it once per session.
    Single { path: PathBuf, append: bool },
    /// Rotating, size-bounded chunks.
    Chunked(ChunkedFileConfig),
}

impl FileSinkConfig {
    pub fn single(path: impl Into<PathBuf>, append: bool) -> Self {
        FileSinkConfig::Single {
            path: path.into(),
            append,
        }
    }

    pub fn chunked(config: ChunkedFileConfig) -> Self {
        FileSinkConfig::Chunked(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            FileSinkConfig::Single { path, .. } if path.as_os_str().is_empty() => {
                Err(LoggerError::config("SingleFile", "path must not be empty"))
            }
            FileSinkConfig::Single { .. } => Ok(()),
            FileSinkConfig::Chunked(config) => config.validate(),
        }
    }
}

/// File appender that switches itself off after its first device failure.
///
/// The failing record's error is returned (and reported by the caller);
/// every later record is skipped without touching the disk. Errors tied to
/// a single record, such as an oversized record in chunked mode, are
/// returned per record and leave the sink enabled.
pub struct FileSink {
    inner: Box<dyn Appender>,
    description: String,
    disabled: bool,
}

impl FileSink {
    pub fn open(config: &FileSinkConfig, timestamp_format: TimestampFormat) -> Result<Self> {
        config.validate()?;
        let (inner, description): (Box<dyn Appender>, String) = match config {
            FileSinkConfig::Single { path, append } => (
                Box::new(
                    FileAppender::with_mode(path.clone(), *append)
                        .with_timestamp_format(timestamp_format),
                ),
                path.display().to_string(),
            ),
            FileSinkConfig::Chunked(chunked) => (
                Box::new(
                    ChunkedFileAppender::new(chunked.clone())?
                        .with_timestamp_format(timestamp_format),
                ),
                chunked.chunk_path(0).display().to_string(),
            ),
        };

        Ok(Self {
            inner,
            description,
            disabled: false,
        })
    }

    /// Wraps an arbitrary appender with the same failure latch.
    pub fn wrap(inner: Box<dyn Appender>, description: impl Into<String>) -> Self {
        Self {
            inner,
            description: description.into(),
            disabled: false,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

impl Appender for FileSink {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        if self.disabled {
            return Ok(());
        }

        match self.inner.append(entry) {
            Err(e) if e.is_io() => {
                self.disabled = true;
                Err(LoggerError::writer(format!(
                    "{}; file output to '{}' disabled",
                    e, self.description
                )))
            }
            other => other,
        }
    }

    fn flush(&mut self) -> Result<()> {
        if self.disabled {
            return Ok(());
        }
        self.inner.flush()
    }

    fn name(&self) -> &str {
        "file-sink"
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}
