//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Thread-local cache for the thread label to avoid repeated allocations
thread_local! {
    static THREAD_NAME_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Name of the current thread, or its id for unnamed threads.
pub fn current_thread_name() -> String {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let thread = std::thread::current();
                match thread.name() {
                    Some(name) => name.to_string(),
                    None => format!("{:?}", thread.id()),
                }
            })
            .clone()
    })
}

/// A fully assembled record, as handed to every appender.
///
/// `message` already carries the prefix and any block payload (JSON, XML,
/// hex or stack trace lines); appenders only add their own layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub tag: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub thread_name: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            tag: tag.into(),
            message: message.into(),
            timestamp: Utc::now(),
            thread_name: current_thread_name(),
        }
    }

    #[must_use]
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Message lines, for sinks that write one physical line per call.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.message.lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_name_of_named_thread() {
        let name = std::thread::Builder::new()
            .name("worker-7".to_string())
            .spawn(current_thread_name)
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(name, "worker-7");
    }

    #[test]
    fn test_thread_name_of_unnamed_thread() {
        let name = std::thread::spawn(current_thread_name).join().unwrap();
        assert!(name.starts_with("ThreadId("));
    }

    #[test]
    fn test_entry_lines() {
        let entry = LogEntry::new(LogLevel::Info, "Net", "header\n{\n}");
        assert_eq!(entry.lines().collect::<Vec<_>>(), ["header", "{", "}"]);
        assert_eq!(entry.with_thread_name("io").thread_name, "io");
    }
}
