//! Chunked rotating file appender
//!
//! Records go to a sequence of size-bounded chunk files in one directory.
//! Chunk names come from a [`ChunkNaming`] scheme applied to a 0-based index;
//! the highest index is the most recent chunk. When a record would push the
//! active chunk past its size limit the appender rolls over to the next
//! index and deletes the oldest chunks beyond the retention count.

use super::file::format_line;
use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use crate::core::log_entry::LogEntry;
use crate::core::timestamp::TimestampFormat;
use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maps chunk indices to file names and back.
///
/// Any `Fn(u64) -> String` is a naming scheme:
///
/// ```
/// use taglog::appenders::ChunkNaming;
///
/// let naming = |index: u64| format!("chunk-{}.log", index);
/// assert_eq!(naming.chunk_name(3), "chunk-3.log");
/// assert_eq!(naming.chunk_index("chunk-12.log"), Some(12));
/// assert_eq!(naming.chunk_index("other.log"), None);
/// ```
pub trait ChunkNaming: Send + Sync {
    fn chunk_name(&self, index: u64) -> String;

    /// Index of the chunk stored under `file_name`, if the name belongs to
    /// this scheme.
    ///
    /// The default tries every digit run of the name as a candidate index
    /// and accepts the one that names the file back exactly.
    fn chunk_index(&self, file_name: &str) -> Option<u64> {
        let bytes = file_name.as_bytes();
        let mut start = 0;
        while start < bytes.len() {
            if !bytes[start].is_ascii_digit() {
                start += 1;
                continue;
            }
            let end = bytes[start..]
                .iter()
                .position(|b| !b.is_ascii_digit())
                .map_or(bytes.len(), |offset| start + offset);
            if let Ok(index) = file_name[start..end].parse::<u64>() {
                if self.chunk_name(index) == file_name {
                    return Some(index);
                }
            }
            start = end;
        }
        None
    }
}

impl<F> ChunkNaming for F
where
    F: Fn(u64) -> String + Send + Sync,
{
    fn chunk_name(&self, index: u64) -> String {
        self(index)
    }
}

/// Settings of a chunked file sink.
#[derive(Clone)]
pub struct ChunkedFileConfig {
    pub directory: PathBuf,
    pub max_chunk_bytes: u64,
    pub max_chunks: usize,
    pub naming: Arc<dyn ChunkNaming>,
}

impl ChunkedFileConfig {
    /// Chunks named `chunk-<index>.log` inside `directory`.
    pub fn new(directory: impl Into<PathBuf>, max_chunk_bytes: u64, max_chunks: usize) -> Self {
        Self {
            directory: directory.into(),
            max_chunk_bytes,
            max_chunks,
            naming: Arc::new(|index: u64| format!("chunk-{}.log", index)),
        }
    }

    #[must_use]
    pub fn with_naming<N: ChunkNaming + 'static>(mut self, naming: N) -> Self {
        self.naming = Arc::new(naming);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_bytes == 0 {
            return Err(LoggerError::config(
                "ChunkedFile",
                "max_chunk_bytes must be greater than 0",
            ));
        }
        if self.max_chunks == 0 {
            return Err(LoggerError::config("ChunkedFile", "max_chunks must be at least 1"));
        }
        let first = self.naming.chunk_name(0);
        if first.is_empty() || self.naming.chunk_name(1) == first {
            return Err(LoggerError::config(
                "ChunkedFile",
                "chunk naming must produce distinct, non-empty names",
            ));
        }
        let second = self.naming.chunk_name(1);
        let nested = [first.as_str(), second.as_str()]
            .into_iter()
            .find(|name| Path::new(name).file_name().and_then(|n| n.to_str()) != Some(*name));
        if let Some(name) = nested {
            return Err(LoggerError::config(
                "ChunkedFile",
                format!("chunk name '{}' must be a plain file name inside the directory", name),
            ));
        }
        Ok(())
    }

    pub fn chunk_path(&self, index: u64) -> PathBuf {
        self.directory.join(self.naming.chunk_name(index))
    }
}

impl fmt::Debug for ChunkedFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedFileConfig")
            .field("directory", &self.directory)
            .field("max_chunk_bytes", &self.max_chunk_bytes)
            .field("max_chunks", &self.max_chunks)
            .field("first_chunk", &self.naming.chunk_name(0))
            .finish()
    }
}

struct ActiveChunk {
    index: u64,
    writer: BufWriter<File>,
    offset: u64,
}

/// Appender writing into rotating, size-bounded chunks.
///
/// # Examples
///
/// ```no_run
/// use taglog::appenders::{ChunkedFileAppender, ChunkedFileConfig};
///
/// let config = ChunkedFileConfig::new("/var/log/app", 1024 * 1024, 5)
///     .with_naming(|i: u64| format!("app.{:04}.log", i));
/// let appender = ChunkedFileAppender::new(config).unwrap();
/// ```
pub struct ChunkedFileAppender {
    config: ChunkedFileConfig,
    /// Indices of chunks on disk, oldest first
    chunks: VecDeque<u64>,
    active: Option<ActiveChunk>,
    initialized: bool,
    timestamp_format: TimestampFormat,
}

impl ChunkedFileAppender {
    /// Creates the appender. Nothing touches the disk before the first append.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn new(config: ChunkedFileConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            chunks: VecDeque::new(),
            active: None,
            initialized: false,
            timestamp_format: TimestampFormat::default(),
        })
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn config(&self) -> &ChunkedFileConfig {
        &self.config
    }

    /// Indices of the chunks currently on disk, oldest first.
    pub fn chunk_indices(&self) -> Vec<u64> {
        self.chunks.iter().copied().collect()
    }

    /// Bytes written to the active chunk.
    pub fn current_offset(&self) -> u64 {
        self.active.as_ref().map_or(0, |active| active.offset)
    }

    /// Writes raw bytes as one record, rolling over first if they do not fit
    /// into the active chunk.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let len = bytes.len() as u64;
        if len > self.config.max_chunk_bytes {
            return Err(LoggerError::RecordTooLarge {
                size: len,
                limit: self.config.max_chunk_bytes,
            });
        }

        self.ensure_initialized()?;

        let needs_rollover = match &self.active {
            Some(active) => active.offset > 0 && active.offset + len > self.config.max_chunk_bytes,
            None => true,
        };
        if needs_rollover {
            self.roll_over()?;
        }

        let path = self.active_path();
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| LoggerError::writer("No active chunk"))?;
        active
            .writer
            .write_all(bytes)
            .and_then(|_| active.writer.flush())
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Failed to write log entry: {}", e),
                )
            })?;
        active.offset += len;
        Ok(())
    }

    fn active_path(&self) -> PathBuf {
        self.config
            .chunk_path(self.active.as_ref().map_or(0, |active| active.index))
    }

    /// Scans the directory for chunks of this naming scheme and resumes the
    /// most recent one.
    fn ensure_initialized(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let directory = &self.config.directory;
        fs::create_dir_all(directory).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", directory.display()),
                e,
            )
        })?;

        let mut indices = scan_chunks(directory, self.config.naming.as_ref())?;
        indices.sort_unstable();
        self.chunks = indices.into();

        if let Some(&latest) = self.chunks.back() {
            let path = self.config.chunk_path(latest);
            let file = open_chunk(&path, true)?;
            let offset = file
                .metadata()
                .map_err(|e| {
                    LoggerError::file_appender(
                        path.display().to_string(),
                        format!("Cannot access file metadata: {}", e),
                    )
                })?
                .len();
            self.active = Some(ActiveChunk {
                index: latest,
                writer: BufWriter::new(file),
                offset,
            });
            self.evict_excess()?;
        } else {
            let file = open_chunk(&self.config.chunk_path(0), false)?;
            self.chunks.push_back(0);
            self.active = Some(ActiveChunk {
                index: 0,
                writer: BufWriter::new(file),
                offset: 0,
            });
        }

        self.initialized = true;
        Ok(())
    }

    fn roll_over(&mut self) -> Result<()> {
        let next = match self.active.take() {
            Some(mut previous) => {
                previous.writer.flush().map_err(|e| {
                    LoggerError::file_rotation(
                        self.config.chunk_path(previous.index).display().to_string(),
                        format!("Failed to flush before rotation: {}", e),
                    )
                })?;
                previous.index + 1
            }
            None => self.chunks.back().map_or(0, |&latest| latest + 1),
        };

        let path = self.config.chunk_path(next);
        let file = open_chunk(&path, false).map_err(|e| {
            LoggerError::file_rotation(
                path.display().to_string(),
                format!("Failed to create next chunk: {}", e),
            )
        })?;

        self.chunks.push_back(next);
        self.active = Some(ActiveChunk {
            index: next,
            writer: BufWriter::new(file),
            offset: 0,
        });

        self.evict_excess()
    }

    /// Deletes the oldest chunks until at most `max_chunks` remain.
    fn evict_excess(&mut self) -> Result<()> {
        while self.chunks.len() > self.config.max_chunks {
            let Some(oldest) = self.chunks.pop_front() else {
                break;
            };
            let path = self.config.chunk_path(oldest);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(LoggerError::file_rotation(
                        path.display().to_string(),
                        format!("Failed to delete oldest chunk: {}", e),
                    ))
                }
            }
        }
        Ok(())
    }
}

fn scan_chunks(directory: &Path, naming: &dyn ChunkNaming) -> Result<Vec<u64>> {
    let entries = fs::read_dir(directory).map_err(|e| {
        LoggerError::io_operation(
            "scan log directory",
            format!("Failed to list '{}'", directory.display()),
            e,
        )
    })?;

    Ok(entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| naming.chunk_index(name))
        })
        .collect())
}

fn open_chunk(path: &Path, resume: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    if resume {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    options.open(path).map_err(|e| {
        LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
    })
}

impl Appender for ChunkedFileAppender {
    fn name(&self) -> &str {
        "chunked-file"
    }

    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let line = format_line(entry, &self.timestamp_format);
        self.append_bytes(line.as_bytes())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut active) = self.active {
            active.writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.config.chunk_path(active.index).display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    /// Flushes and releases the active chunk; the next append rescans the
    /// directory and resumes from the newest chunk.
    fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.active = None;
        self.initialized = false;
        Ok(())
    }
}

impl Drop for ChunkedFileAppender {
    fn drop(&mut self) {
        // Best effort flush - ignore errors during drop
        let _ = self.flush();
    }
}
