//! Logging macros
//!
//! Every macro takes a [`Logger`](crate::Logger) (use
//! [`Logger::global()`](crate::Logger::global) for the process-wide one) and
//! one of these argument forms:
//!
//! ```
//! use taglog::prelude::*;
//! use taglog::{info, error};
//!
//! let logger = Logger::global().with_tag("Server");
//! let port = 8080;
//! let err = std::io::Error::other("refused");
//!
//! info!(logger);                                   // call site only
//! info!(logger, port);                             // one value
//! info!(logger, "listening on {}:{}", "0.0.0.0", port);
//! error!(logger, error = err);                     // error and stack
//! error!(logger, error = err, "bind {} failed", port);
//! ```
//!
//! Template arguments are [`LogValue`](crate::LogValue)s, not `Display`
//! values: collections and maps are rendered structurally and registered
//! formatters apply.

/// Log at an explicit level.
///
/// ```
/// # use taglog::prelude::*;
/// use taglog::log;
/// let logger = Logger::global();
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(,)?) => {
        $logger.mark($level)
    };
    ($logger:expr, $level:expr, error = $err:expr $(,)?) => {
        $logger.log_error($level, &$err)
    };
    ($logger:expr, $level:expr, error = $err:expr, $template:literal $(, $arg:expr)* $(,)?) => {
        $logger.log_error_args(
            $level,
            &$err,
            $template,
            &[$(&$arg as &dyn $crate::LogValue),*],
        )
    };
    ($logger:expr, $level:expr, $template:literal, $($arg:expr),+ $(,)?) => {
        $logger.log_args($level, $template, &[$(&$arg as &dyn $crate::LogValue),+])
    };
    ($logger:expr, $level:expr, $value:expr $(,)?) => {
        $logger.log($level, $value)
    };
}

/// Log a verbose-level record.
#[macro_export]
macro_rules! verbose {
    ($logger:expr $(, $($rest:tt)+)?) => {
        $crate::log!($logger, $crate::LogLevel::Verbose $(, $($rest)+)?)
    };
}

/// Log a debug-level record.
///
/// ```
/// # use taglog::prelude::*;
/// use taglog::debug;
/// let logger = Logger::global();
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $($rest:tt)+)?) => {
        $crate::log!($logger, $crate::LogLevel::Debug $(, $($rest)+)?)
    };
}

/// Log an info-level record.
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $($rest:tt)+)?) => {
        $crate::log!($logger, $crate::LogLevel::Info $(, $($rest)+)?)
    };
}

/// Log a warning-level record.
#[macro_export]
macro_rules! warning {
    ($logger:expr $(, $($rest:tt)+)?) => {
        $crate::log!($logger, $crate::LogLevel::Warning $(, $($rest)+)?)
    };
}

/// Log an error-level record.
///
/// ```
/// # use taglog::prelude::*;
/// use taglog::error;
/// let logger = Logger::global();
/// let err = std::io::Error::other("disk full");
/// error!(logger, error = err, "flush of {} bytes failed", 4096);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $($rest:tt)+)?) => {
        $crate::log!($logger, $crate::LogLevel::Error $(, $($rest)+)?)
    };
}

/// Log a record for a condition that should never happen.
#[macro_export]
macro_rules! wtf {
    ($logger:expr $(, $($rest:tt)+)?) => {
        $crate::log!($logger, $crate::LogLevel::Wtf $(, $($rest)+)?)
    };
}

#[cfg(test)]
mod tests {
    use crate::appenders::MemoryAppender;
    use crate::core::{Configuration, LogLevel, Logger, LoggerError};

    fn capture() -> (Logger, MemoryAppender) {
        let memory = MemoryAppender::new();
        let config = Configuration::builder()
            .console(false)
            .show_prefixes(false)
            .tag("Macro")
            .appender(memory.clone())
            .build()
            .unwrap();
        (Logger::with_config(config), memory)
    }

    #[test]
    fn test_value_and_template_forms() {
        let (logger, memory) = capture();
        info!(logger, 42);
        info!(logger, "Items: {}", vec![1, 2]);
        warning!(logger, "{1} before {0}", "b", "a");
        assert_eq!(memory.messages(), ["42", "Items: [1, 2]", "a before b"]);
    }

    #[test]
    fn test_marker_form() {
        let (logger, memory) = capture();
        verbose!(logger);
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.entries()[0].level, LogLevel::Verbose);
    }

    #[test]
    fn test_error_forms() {
        let (logger, memory) = capture();
        let err = LoggerError::other("boom");
        error!(logger, error = err);
        wtf!(logger, error = err, "during {}", "startup");

        let entries = memory.entries();
        assert_eq!(entries[0].message, "LoggerError: boom");
        assert_eq!(entries[1].message, "during startup\nLoggerError: boom");
        assert_eq!(entries[1].level, LogLevel::Wtf);
    }

    #[test]
    fn test_log_macro_levels() {
        let (logger, memory) = capture();
        log!(logger, LogLevel::Debug, "Count: {}", 5);
        debug!(logger, "Debug message");
        assert_eq!(memory.messages(), ["Count: 5", "Debug message"]);
    }
}
