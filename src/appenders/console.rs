//! Console appender implementation
//!
//! Mirrors the platform line writer: one `L/tag: text` line per message
//! line, where `L` is the level letter.

use crate::core::{Appender, LogEntry, LogLevel, Result};
#[cfg(feature = "console")]
use colored::Colorize;

pub struct ConsoleAppender {
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors: use_colors && cfg!(feature = "console"),
        }
    }

    /// Lines exactly as written, without colors.
    pub fn render_plain(entry: &LogEntry) -> Vec<String> {
        let header = format!("{}/{}", entry.level.letter(), entry.tag);
        entry
            .lines()
            .map(|line| format!("{}: {}", header, line))
            .collect()
    }

    fn header(&self, entry: &LogEntry) -> String {
        let header = format!("{}/{}", entry.level.letter(), entry.tag);
        #[cfg(feature = "console")]
        if self.use_colors {
            return header.color(entry.level.color_code()).to_string();
        }
        header
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let header = self.header(entry);
        let to_stderr = matches!(entry.level, LogLevel::Error | LogLevel::Wtf);

        // An empty message still produces one line
        let mut lines = entry.lines().peekable();
        if lines.peek().is_none() {
            if to_stderr {
                eprintln!("{}: ", header);
            } else {
                println!("{}: ", header);
            }
            return Ok(());
        }

        // Route Error and Wtf levels to stderr, others to stdout
        for line in lines {
            if to_stderr {
                eprintln!("{}: {}", header, line);
            } else {
                println!("{}: {}", header, line);
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
