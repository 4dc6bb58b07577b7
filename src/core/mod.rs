//! Core logger types and traits

pub mod appender;
pub mod assembler;
pub mod caller;
pub mod config;
pub mod error;
pub mod formatter;
pub mod hex;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod pretty_print;
pub mod throwable;
pub mod timestamp;
pub mod value;

pub use appender::{Appender, SharedAppender};
pub use caller::{CallSite, StackFrame};
pub use config::{Configuration, ConfigurationBuilder};
pub use error::{LoggerError, Result};
pub use formatter::{Delegate, Formatter, FormatterRegistry, StructureOptions, ValueFormatter};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::LoggerMetrics;
pub use throwable::Throwable;
pub use timestamp::TimestampFormat;
pub use value::{Elements, Entries, Iterable, LogValue, Null, Shape};
