//! # taglog
//!
//! Tag-scoped logging with rich value formatting.
//!
//! ## Features
//!
//! - **Tagged records**: every record carries a level, a tag and an optional
//!   `[thread] Type.method(file:line)` prefix derived from the call site
//! - **Value formatting**: arrays, collections, maps and iterables render
//!   structurally; custom formatters render user types
//! - **Payloads**: pretty-printed JSON and XML, hex dumps, errors with
//!   their cause chain and stack trace
//! - **Sinks**: console, a single file or a directory of size-bounded
//!   chunks, plus any user [`Appender`]
//! - **Cheap when off**: a call below the level threshold does no
//!   formatting work
//!
//! ## Example
//!
//! ```
//! use taglog::prelude::*;
//! use taglog::info;
//!
//! taglog::initialize(
//!     Configuration::builder()
//!         .minimal_level(LogLevel::Debug)
//!         .tag("App")
//!         .build()
//!         .unwrap(),
//! );
//!
//! let logger = Logger::global();
//! info!(logger, "started with {} workers", 4);
//! logger.json(r#"{"mode":"batch"}"#);
//! # taglog::shutdown();
//! ```

pub mod appenders;
pub mod core;
pub mod global;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ChunkedFileConfig, FileSinkConfig, MemoryAppender};
    pub use crate::core::{
        Appender, Configuration, ConfigurationBuilder, Formatter, LogEntry, LogLevel, LogValue,
        Logger, LoggerError, LoggerMetrics, Result, Throwable, TimestampFormat,
    };
}

pub use appenders::{ConsoleAppender, FileAppender};
pub use core::{
    Appender, CallSite, Configuration, ConfigurationBuilder, Delegate, Elements, Entries,
    Formatter, FormatterRegistry, Iterable, LogEntry, LogLevel, LogValue, Logger, LoggerError,
    LoggerMetrics, Null, Result, Shape, SharedAppender, StackFrame, StructureOptions, Throwable,
    TimestampFormat,
};
pub use global::{
    current, initialize, is_initialized, shutdown, tagged, tagged_with_stack_trace,
    with_stack_trace,
};
