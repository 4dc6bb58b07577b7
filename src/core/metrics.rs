//! Logger metrics for observability
//!
//! Counters shared by every logger bound to one configuration snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

/// Emission counters
///
/// # Example
///
/// ```
/// use taglog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_emitted();
/// metrics.record_suppressed();
///
/// assert_eq!(metrics.emitted_count(), 1);
/// assert_eq!(metrics.suppressed_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records delivered to every appender
    emitted: AtomicU64,

    /// Calls rejected by the level gate
    suppressed: AtomicU64,

    /// Records that at least one appender failed to write
    dropped: AtomicU64,

    /// Malformed JSON/XML payloads emitted with an inline marker instead
    format_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            emitted: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            format_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn emitted_count(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn format_failure_count(&self) -> u64 {
        self.format_failures.load(Ordering::Relaxed)
    }

    /// Record a delivered entry, returning the previous count
    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_suppressed(&self) -> u64 {
        self.suppressed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_format_failure(&self) -> u64 {
        self.format_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been emitted.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.emitted_count() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.emitted.store(0, Ordering::Relaxed);
        self.suppressed.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.format_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            emitted: AtomicU64::new(self.emitted_count()),
            suppressed: AtomicU64::new(self.suppressed_count()),
            dropped: AtomicU64::new(self.dropped_count()),
            format_failures: AtomicU64::new(self.format_failure_count()),
        }
    }
}
