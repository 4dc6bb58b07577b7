//! Appender implementations

pub mod chunked_file;
pub mod console;
pub mod file;
pub mod file_sink;
pub mod memory;

pub use chunked_file::{ChunkNaming, ChunkedFileAppender, ChunkedFileConfig};
pub use console::ConsoleAppender;
pub use file::FileAppender;
pub use file_sink::{FileSink, FileSinkConfig};
pub use memory::MemoryAppender;

pub use crate::core::Appender;
