//! Error types for the logger system
//!
//! None of these ever escape an emission call: they travel between the
//! pipeline stages and end up either rendered inline (formatting failures)
//! or reported on the diagnostic channel (sink failures).

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Device failure, with what the library was doing at the time
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Rejected by a builder or sink configuration check
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Opening or writing a log file failed
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// Chunk rollover error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// A single record does not fit into an empty chunk
    #[error("Record of {size} bytes exceeds the chunk limit of {limit} bytes")]
    RecordTooLarge { size: u64, limit: u64 },

    /// A JSON or XML payload could not be re-indented
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// The call site could not be found on the captured stack
    #[error("Unresolvable caller location: {0}")]
    UnresolvableLocation(String),

    #[error("Writer error: {0}")]
    WriterError(String),

    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// `component` names the rejected setting group, e.g. `ChunkedFile`.
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// `format_type` is the payload kind, `JSON` or `XML`.
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    pub fn unresolvable(message: impl Into<String>) -> Self {
        LoggerError::UnresolvableLocation(message.into())
    }

    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error came from the storage device rather than from the
    /// record being written. Device failures disable a file sink for good.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            LoggerError::IoOperation { .. }
                | LoggerError::IoError(_)
                | LoggerError::FileAppenderError { .. }
                | LoggerError::FileRotationError { .. }
                | LoggerError::WriterError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("ChunkedFile", "max_chunks must be at least 1");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_appender("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileAppenderError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::file_rotation("/var/log/chunk-3.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/chunk-3.log': Disk full"
        );

        let err = LoggerError::formatter("XML", "unexpected end of input");
        assert_eq!(err.to_string(), "Formatter error (XML): unexpected end of input");

        let err = LoggerError::RecordTooLarge { size: 2048, limit: 1024 };
        assert_eq!(
            err.to_string(),
            "Record of 2048 bytes exceeds the chunk limit of 1024 bytes"
        );
    }

    #[test]
    fn test_io_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening chunk", "cannot open chunk-0.log", io_err);

        assert!(err.is_io());
        assert!(err.to_string().contains("opening chunk"));
        assert!(!LoggerError::RecordTooLarge { size: 2, limit: 1 }.is_io());
        assert!(!LoggerError::formatter("JSON", "bad").is_io());
    }
}
