//! Timestamp formatting for file output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const STANDARD_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.3f";
const ISO8601_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Leading timestamp of every file line
///
/// ```
/// use taglog::TimestampFormat;
/// use chrono::Utc;
///
/// let text = TimestampFormat::default().format(&Utc::now());
/// assert_eq!(text.len(), "2025-01-08 10:30:45.123".len());
///
/// let parsed: TimestampFormat = "unix-millis".parse().unwrap();
/// assert_eq!(parsed, TimestampFormat::UnixMillis);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08 10:30:45.123`, UTC
    #[default]
    Standard,

    /// `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// Milliseconds since the Unix epoch
    UnixMillis,

    /// Any strftime pattern
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Standard => datetime.format(STANDARD_PATTERN).to_string(),
            TimestampFormat::Iso8601 => datetime.format(ISO8601_PATTERN).to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => datetime.format(pattern).to_string(),
        }
    }
}

/// Accepts `standard`, `iso8601` and `unix-millis` (any case); anything
/// else containing a `%` directive is taken as a custom pattern.
impl FromStr for TimestampFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(TimestampFormat::Standard),
            "iso8601" | "iso-8601" => Ok(TimestampFormat::Iso8601),
            "unix-millis" | "unix_millis" | "millis" => Ok(TimestampFormat::UnixMillis),
            _ if s.contains('%') => Ok(TimestampFormat::Custom(s.to_string())),
            _ => Err(format!("Invalid timestamp format: '{}'", s)),
        }
    }
}
