//! Immutable logging configuration

use super::appender::{shared, Appender, SharedAppender};
use super::error::Result;
use super::formatter::{Formatter, FormatterRegistry, StructureOptions};
use super::log_level::LogLevel;
use super::metrics::LoggerMetrics;
use super::timestamp::TimestampFormat;
use crate::appenders::{ConsoleAppender, FileSink, FileSinkConfig};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_INDENT: usize = 2;

/// One complete configuration snapshot.
///
/// Never mutated after [`ConfigurationBuilder::build`]; derive a changed
/// copy with [`to_builder`](Configuration::to_builder). Sinks, formatters and
/// metrics are shared between a configuration and the copies derived from it.
#[derive(Clone)]
pub struct Configuration {
    enabled: bool,
    minimal_level: LogLevel,
    tag: Option<String>,
    show_thread: bool,
    show_class: bool,
    show_method: bool,
    show_line: bool,
    stack_trace_line_count: usize,
    structure: StructureOptions,
    json_indent: usize,
    json_level: LogLevel,
    xml_indent: usize,
    xml_level: LogLevel,
    hex_level: LogLevel,
    formatters: FormatterRegistry,
    timestamp_format: TimestampFormat,
    file_sink: Option<FileSinkConfig>,
    console_sink: Option<SharedAppender>,
    file_appender: Option<SharedAppender>,
    appenders: Vec<SharedAppender>,
    metrics: Arc<LoggerMetrics>,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// A builder starting from this configuration. Sinks are shared with
    /// `self` unless replaced.
    pub fn to_builder(&self) -> ConfigurationBuilder {
        ConfigurationBuilder {
            enabled: self.enabled,
            minimal_level: self.minimal_level,
            tag: self.tag.clone(),
            show_thread: self.show_thread,
            show_class: self.show_class,
            show_method: self.show_method,
            show_line: self.show_line,
            stack_trace_line_count: self.stack_trace_line_count,
            structure: self.structure,
            json_indent: self.json_indent,
            json_level: self.json_level,
            xml_indent: self.xml_indent,
            xml_level: self.xml_level,
            hex_level: self.hex_level,
            formatters: self.formatters.clone(),
            timestamp_format: self.timestamp_format.clone(),
            file_sink: self.file_sink.clone(),
            console: self.console_sink.is_some(),
            console_sink: self.console_sink.clone(),
            file_appender: self.file_appender.clone(),
            appenders: self.appenders.clone(),
            metrics: Some(Arc::clone(&self.metrics)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn minimal_level(&self) -> LogLevel {
        self.minimal_level
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn show_thread(&self) -> bool {
        self.show_thread
    }

    pub fn show_class(&self) -> bool {
        self.show_class
    }

    pub fn show_method(&self) -> bool {
        self.show_method
    }

    pub fn show_line(&self) -> bool {
        self.show_line
    }

    pub fn stack_trace_line_count(&self) -> usize {
        self.stack_trace_line_count
    }

    pub fn structure(&self) -> StructureOptions {
        self.structure
    }

    pub fn json_indent(&self) -> usize {
        self.json_indent
    }

    pub fn json_level(&self) -> LogLevel {
        self.json_level
    }

    pub fn xml_indent(&self) -> usize {
        self.xml_indent
    }

    pub fn xml_level(&self) -> LogLevel {
        self.xml_level
    }

    pub fn hex_level(&self) -> LogLevel {
        self.hex_level
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamp_format
    }

    pub fn file_sink(&self) -> Option<&FileSinkConfig> {
        self.file_sink.as_ref()
    }

    pub fn metrics(&self) -> &Arc<LoggerMetrics> {
        &self.metrics
    }

    /// Level gate: whether a record at `level` may be emitted at all.
    #[inline]
    pub fn accepts(&self, level: LogLevel) -> bool {
        self.enabled && level >= self.minimal_level
    }

    /// Every sink of this configuration: console first, then added
    /// appenders, then the file sink.
    pub fn sinks(&self) -> impl Iterator<Item = &SharedAppender> {
        self.console_sink
            .iter()
            .chain(self.appenders.iter())
            .chain(self.file_appender.iter())
    }

    /// Closes the sinks of `self` that `next` does not share.
    pub fn close_sinks_replaced_by(&self, next: Option<&Configuration>) {
        for sink in self.sinks() {
            let kept = next.is_some_and(|next| next.sinks().any(|other| Arc::ptr_eq(sink, other)));
            if kept {
                continue;
            }
            let mut appender = sink.lock();
            if let Err(e) = appender.close() {
                eprintln!(
                    "[LOGGER ERROR] Appender '{}' failed to close: {}",
                    appender.name(),
                    e
                );
            }
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        ConfigurationBuilder::new().build_infallible()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("enabled", &self.enabled)
            .field("minimal_level", &self.minimal_level)
            .field("tag", &self.tag)
            .field("show_thread", &self.show_thread)
            .field("show_class", &self.show_class)
            .field("show_method", &self.show_method)
            .field("show_line", &self.show_line)
            .field("stack_trace_line_count", &self.stack_trace_line_count)
            .field("structure", &self.structure)
            .field("json", &(self.json_indent, self.json_level))
            .field("xml", &(self.xml_indent, self.xml_level))
            .field("hex_level", &self.hex_level)
            .field("formatters", &self.formatters)
            .field("file_sink", &self.file_sink)
            .field("sinks", &self.sinks().count())
            .finish()
    }
}

/// Builder for [`Configuration`]
///
/// # Example
///
/// ```
/// use taglog::{Configuration, LogLevel};
///
/// let config = Configuration::builder()
///     .minimal_level(LogLevel::Info)
///     .tag("Billing")
///     .show_class(true)
///     .stack_trace_line_count(8)
///     .json(4, LogLevel::Debug)
///     .build()
///     .unwrap();
/// assert_eq!(config.tag(), Some("Billing"));
/// ```
pub struct ConfigurationBuilder {
    enabled: bool,
    minimal_level: LogLevel,
    tag: Option<String>,
    show_thread: bool,
    show_class: bool,
    show_method: bool,
    show_line: bool,
    stack_trace_line_count: usize,
    structure: StructureOptions,
    json_indent: usize,
    json_level: LogLevel,
    xml_indent: usize,
    xml_level: LogLevel,
    hex_level: LogLevel,
    formatters: FormatterRegistry,
    timestamp_format: TimestampFormat,
    file_sink: Option<FileSinkConfig>,
    console: bool,
    console_sink: Option<SharedAppender>,
    file_appender: Option<SharedAppender>,
    appenders: Vec<SharedAppender>,
    metrics: Option<Arc<LoggerMetrics>>,
}

impl ConfigurationBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            enabled: true,
            minimal_level: LogLevel::Verbose,
            tag: None,
            show_thread: true,
            show_class: false,
            show_method: true,
            show_line: true,
            stack_trace_line_count: 0,
            structure: StructureOptions::default(),
            json_indent: DEFAULT_INDENT,
            json_level: LogLevel::Info,
            xml_indent: DEFAULT_INDENT,
            xml_level: LogLevel::Info,
            hex_level: LogLevel::Info,
            formatters: FormatterRegistry::new(),
            timestamp_format: TimestampFormat::default(),
            file_sink: None,
            console: true,
            console_sink: None,
            file_appender: None,
            appenders: Vec::new(),
            metrics: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn minimal_level(mut self, level: LogLevel) -> Self {
        self.minimal_level = level;
        self
    }

    /// Tag for every record. Without one, records are tagged with the
    /// caller's type (or module) name.
    #[must_use = "builder methods return a new value"]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn no_tag(mut self) -> Self {
        self.tag = None;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn show_thread(mut self, show: bool) -> Self {
        self.show_thread = show;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn show_class(mut self, show: bool) -> Self {
        self.show_class = show;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn show_method(mut self, show: bool) -> Self {
        self.show_method = show;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn show_line(mut self, show: bool) -> Self {
        self.show_line = show;
        self
    }

    /// Turns every caller prefix (thread, class, method, line) on or off.
    #[must_use = "builder methods return a new value"]
    pub fn show_prefixes(self, show: bool) -> Self {
        self.show_thread(show)
            .show_class(show)
            .show_method(show)
            .show_line(show)
    }

    /// Maximum number of stack lines rendered per error; 0 renders none.
    #[must_use = "builder methods return a new value"]
    pub fn stack_trace_line_count(mut self, count: usize) -> Self {
        self.stack_trace_line_count = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format_arrays(mut self, enabled: bool) -> Self {
        self.structure.arrays = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format_collections(mut self, enabled: bool) -> Self {
        self.structure.collections = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format_maps(mut self, enabled: bool) -> Self {
        self.structure.maps = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format_iterables(mut self, enabled: bool) -> Self {
        self.structure.iterables = enabled;
        self
    }

    /// Indent width (0 = compact) and minimal level of JSON payloads.
    #[must_use = "builder methods return a new value"]
    pub fn json(mut self, indent: usize, level: LogLevel) -> Self {
        self.json_indent = indent;
        self.json_level = level;
        self
    }

    /// Indent width (0 = compact) and minimal level of XML payloads.
    #[must_use = "builder methods return a new value"]
    pub fn xml(mut self, indent: usize, level: LogLevel) -> Self {
        self.xml_indent = indent;
        self.xml_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn hex_level(mut self, level: LogLevel) -> Self {
        self.hex_level = level;
        self
    }

    /// Registers a custom formatter, replacing any other formatter for the
    /// same type.
    #[must_use = "builder methods return a new value"]
    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatters = self.formatters.with(formatter);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self.file_appender = None;
        self
    }

    /// Enables or disables the console appender.
    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        if !enabled {
            self.console_sink = None;
        }
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(shared(appender));
        self
    }

    /// Add an appender already shared with another owner.
    #[must_use = "builder methods return a new value"]
    pub fn shared_appender(mut self, appender: SharedAppender) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Removes every appender added with [`appender`](Self::appender).
    #[must_use = "builder methods return a new value"]
    pub fn clear_appenders(mut self) -> Self {
        self.appenders.clear();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_sink(mut self, config: FileSinkConfig) -> Self {
        self.file_sink = Some(config);
        self.file_appender = None;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn no_file_sink(mut self) -> Self {
        self.file_sink = None;
        self.file_appender = None;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`](super::LoggerError::InvalidConfiguration)
    /// if the file sink settings are invalid
    pub fn build(self) -> Result<Configuration> {
        let file_appender = match (&self.file_sink, &self.file_appender) {
            (Some(_), Some(existing)) => Some(Arc::clone(existing)),
            (Some(config), None) => {
                Some(shared(FileSink::open(config, self.timestamp_format.clone())?))
            }
            (None, _) => None,
        };
        Ok(self.finish(file_appender))
    }

    fn build_infallible(self) -> Configuration {
        self.finish(None)
    }

    fn finish(self, file_appender: Option<SharedAppender>) -> Configuration {
        let console_sink = match (self.console, self.console_sink) {
            (true, Some(existing)) => Some(existing),
            (true, None) => Some(shared(ConsoleAppender::new())),
            (false, _) => None,
        };

        Configuration {
            enabled: self.enabled,
            minimal_level: self.minimal_level,
            tag: self.tag,
            show_thread: self.show_thread,
            show_class: self.show_class,
            show_method: self.show_method,
            show_line: self.show_line,
            stack_trace_line_count: self.stack_trace_line_count,
            structure: self.structure,
            json_indent: self.json_indent,
            json_level: self.json_level,
            xml_indent: self.xml_indent,
            xml_level: self.xml_level,
            hex_level: self.hex_level,
            formatters: self.formatters,
            timestamp_format: self.timestamp_format,
            file_sink: self.file_sink,
            console_sink,
            file_appender,
            appenders: self.appenders,
            metrics: self.metrics.unwrap_or_default(),
        }
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
