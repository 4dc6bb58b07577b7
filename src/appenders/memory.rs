//! In-memory capture appender

use crate::core::{Appender, LogEntry, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Keeps every entry in memory.
///
/// Clones share one buffer, so a clone kept by the caller observes what the
/// clone handed to the configuration receives.
///
/// ```
/// use taglog::appenders::MemoryAppender;
/// use taglog::{Configuration, Logger};
///
/// let memory = MemoryAppender::new();
/// let config = Configuration::builder()
///     .console(false)
///     .appender(memory.clone())
///     .tag("Demo")
///     .build()
///     .unwrap();
///
/// Logger::with_config(config).info("ready");
/// assert!(memory.messages()[0].ends_with("ready"));
/// ```
#[derive(Clone, Default)]
pub struct MemoryAppender {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Appender for MemoryAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
