//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log call, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    #[default]
    Verbose = 0,
    Debug = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
    Wtf = 5,
}

impl LogLevel {
    /// All levels in increasing severity.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Verbose,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Wtf,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Verbose => "VERBOSE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Wtf => "WTF",
        }
    }

    /// One-letter label used by the console layout (`I/tag: message`).
    pub fn letter(&self) -> char {
        match self {
            LogLevel::Verbose => 'V',
            LogLevel::Debug => 'D',
            LogLevel::Info => 'I',
            LogLevel::Warning => 'W',
            LogLevel::Error => 'E',
            LogLevel::Wtf => 'A',
        }
    }

    /// Priority value of the platform line writer (logcat numbering).
    pub fn platform_priority(&self) -> u8 {
        match self {
            LogLevel::Verbose => 2,
            LogLevel::Debug => 3,
            LogLevel::Info => 4,
            LogLevel::Warning => 5,
            LogLevel::Error => 6,
            LogLevel::Wtf => 7,
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Verbose => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warning => Yellow,
            LogLevel::Error => Red,
            LogLevel::Wtf => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "VERBOSE" | "V" => Ok(LogLevel::Verbose),
            "DEBUG" | "D" => Ok(LogLevel::Debug),
            "INFO" | "I" => Ok(LogLevel::Info),
            "WARN" | "WARNING" | "W" => Ok(LogLevel::Warning),
            "ERROR" | "E" => Ok(LogLevel::Error),
            "WTF" | "ASSERT" | "A" => Ok(LogLevel::Wtf),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
