//! Appender trait for log output destinations

use super::{error::Result, log_entry::LogEntry};
use parking_lot::Mutex;
use std::sync::Arc;

pub trait Appender: Send {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;

    /// Releases any held resources. Further appends may reopen them.
    fn close(&mut self) -> Result<()> {
        self.flush()
    }
}

/// An appender shared between configuration snapshots.
pub type SharedAppender = Arc<Mutex<Box<dyn Appender>>>;

pub fn shared<A: Appender + 'static>(appender: A) -> SharedAppender {
    Arc::new(Mutex::new(Box::new(appender)))
}
