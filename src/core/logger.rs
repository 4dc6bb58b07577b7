//! Main logger implementation
//!
//! Every emission goes through the same pipeline on the calling thread:
//! level gate, caller resolution, value formatting, record assembly, then
//! one write per sink. Nothing past the gate runs for a suppressed call.

use super::{
    assembler::{assemble, compose_prefix, resolve_tag, PrefixOptions},
    caller::{self, CallSite},
    config::Configuration,
    formatter::ValueFormatter,
    hex::hex_dump,
    log_entry::{current_thread_name, LogEntry},
    log_level::LogLevel,
    pretty_print::{annotate_malformed, pretty_json, pretty_xml},
    throwable::Throwable,
    value::LogValue,
};
use std::error::Error;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe, Location};
use std::sync::Arc;

#[derive(Clone)]
enum ConfigSource {
    /// Whatever configuration is installed process-wide at call time
    Global,
    Fixed(Arc<Configuration>),
}

#[derive(Debug, Clone, Default)]
struct Overrides {
    tag: Option<String>,
    thread_name: Option<String>,
    stack_trace_line_count: Option<usize>,
    skip_frames: usize,
}

#[derive(Debug, Clone, Copy)]
enum Document {
    Json,
    Xml,
}

impl Document {
    fn label(self) -> &'static str {
        match self {
            Document::Json => "JSON",
            Document::Xml => "XML",
        }
    }
}

/// A handle emitting records through one configuration, optionally with
/// its own tag, thread name, stack depth and frame skipping.
///
/// Loggers are cheap to clone and to derive; all state they read lives in
/// the configuration snapshot.
///
/// # Example
///
/// ```
/// use taglog::{Configuration, Logger, LogLevel};
/// use taglog::appenders::MemoryAppender;
///
/// let memory = MemoryAppender::new();
/// let config = Configuration::builder()
///     .console(false)
///     .show_prefixes(false)
///     .appender(memory.clone())
///     .build()
///     .unwrap();
///
/// let logger = Logger::with_config(config).with_tag("Cache");
/// logger.log_args(LogLevel::Info, "{} hits, {} misses", &[&120, &3]);
///
/// let entry = &memory.entries()[0];
/// assert_eq!(entry.tag, "Cache");
/// assert_eq!(entry.message, "120 hits, 3 misses");
/// ```
#[derive(Clone)]
pub struct Logger {
    source: ConfigSource,
    overrides: Overrides,
}

macro_rules! level_methods {
    ($($name:ident => $level:ident),+ $(,)?) => {
        $(
            #[doc = concat!("Logs `value` at [`LogLevel::", stringify!($level), "`].")]
            #[track_caller]
            pub fn $name(&self, value: impl LogValue) {
                self.log_at(LogLevel::$level, &value, Location::caller());
            }
        )+
    };
}

impl Logger {
    /// Logger bound to the process-wide configuration.
    pub fn global() -> Self {
        Self {
            source: ConfigSource::Global,
            overrides: Overrides::default(),
        }
    }

    /// Logger bound to an explicit configuration, independent of the
    /// process-wide one.
    pub fn with_config(config: Configuration) -> Self {
        Self::with_shared_config(Arc::new(config))
    }

    pub fn with_shared_config(config: Arc<Configuration>) -> Self {
        Self {
            source: ConfigSource::Fixed(config),
            overrides: Overrides::default(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.overrides.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.overrides.thread_name = Some(thread_name.into());
        self
    }

    /// Overrides the configured number of stack lines rendered per error.
    #[must_use]
    pub fn with_stack_trace(mut self, line_count: usize) -> Self {
        self.overrides.stack_trace_line_count = Some(line_count);
        self
    }

    /// Attributes records to a caller `frames` levels further out, for
    /// helpers that wrap the logger.
    #[must_use]
    pub fn skip_frames(mut self, frames: usize) -> Self {
        self.overrides.skip_frames = frames;
        self
    }

    /// The configuration a call made now would use.
    pub fn configuration(&self) -> Option<Arc<Configuration>> {
        match &self.source {
            ConfigSource::Global => crate::global::current(),
            ConfigSource::Fixed(config) => Some(Arc::clone(config)),
        }
    }

    /// Whether a record at `level` would currently be emitted.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.configuration()
            .is_some_and(|config| config.accepts(level))
    }

    /// Logs the call site alone.
    #[track_caller]
    pub fn mark(&self, level: LogLevel) {
        let location = Location::caller();
        if let Some(config) = self.gate(level, None) {
            self.dispatch(&config, level, location, "", false);
        }
    }

    /// Logs a single value rendered by the value formatter.
    #[track_caller]
    pub fn log(&self, level: LogLevel, value: impl LogValue) {
        self.log_at(level, &value, Location::caller());
    }

    /// Logs a message template. `{}` takes the next argument, `{N}` the
    /// argument at index `N`; `{{` and `}}` are literal braces.
    #[track_caller]
    pub fn log_args(&self, level: LogLevel, template: &str, args: &[&dyn LogValue]) {
        let location = Location::caller();
        if let Some(config) = self.gate(level, None) {
            let formatter = ValueFormatter::new(config.structure(), config.formatters());
            let body = formatter.format_template(template, args);
            self.dispatch(&config, level, location, &body, false);
        }
    }

    /// Logs an error with its cause chain and the current stack.
    #[track_caller]
    pub fn log_error<E: Error + ?Sized>(&self, level: LogLevel, error: &E) {
        let location = Location::caller();
        if let Some(config) = self.gate(level, None) {
            let throwable = Throwable::new(error);
            self.dispatch_throwable(&config, level, location, &throwable, None);
        }
    }

    /// Logs a message template followed by an error.
    #[track_caller]
    pub fn log_error_args<E: Error + ?Sized>(
        &self,
        level: LogLevel,
        error: &E,
        template: &str,
        args: &[&dyn LogValue],
    ) {
        let location = Location::caller();
        if let Some(config) = self.gate(level, None) {
            let throwable = Throwable::new(error);
            let formatter = ValueFormatter::new(config.structure(), config.formatters());
            let message = formatter.format_template(template, args);
            self.dispatch_throwable(&config, level, location, &throwable, Some(&message));
        }
    }

    /// Logs an already captured error.
    #[track_caller]
    pub fn log_throwable(&self, level: LogLevel, throwable: &Throwable) {
        let location = Location::caller();
        if let Some(config) = self.gate(level, None) {
            self.dispatch_throwable(&config, level, location, throwable, None);
        }
    }

    /// Logs a JSON document at the configured JSON level.
    #[track_caller]
    pub fn json(&self, source: &str) {
        self.document(Document::Json, None, source, Location::caller());
    }

    /// Logs a JSON document at `level`, if `level` reaches the configured
    /// JSON level.
    #[track_caller]
    pub fn json_at(&self, level: LogLevel, source: &str) {
        self.document(Document::Json, Some(level), source, Location::caller());
    }

    /// Logs an XML document at the configured XML level.
    #[track_caller]
    pub fn xml(&self, source: &str) {
        self.document(Document::Xml, None, source, Location::caller());
    }

    #[track_caller]
    pub fn xml_at(&self, level: LogLevel, source: &str) {
        self.document(Document::Xml, Some(level), source, Location::caller());
    }

    /// Logs a hex dump at the configured hex level.
    #[track_caller]
    pub fn hex(&self, bytes: &[u8]) {
        let location = Location::caller();
        if let Some(config) = self.configuration() {
            self.hex_with(&config, config.hex_level(), bytes, location);
        }
    }

    #[track_caller]
    pub fn hex_at(&self, level: LogLevel, bytes: &[u8]) {
        let location = Location::caller();
        if let Some(config) = self.configuration() {
            self.hex_with(&config, level, bytes, location);
        }
    }

    /// Logs the current call stack, at most `depth` frames, innermost first.
    #[track_caller]
    pub fn stack_trace(&self, level: LogLevel, depth: usize) {
        let location = Location::caller();
        if let Some(config) = self.gate(level, None) {
            let frames = caller::caller_stack(self.overrides.skip_frames);
            let body = if frames.is_empty() {
                "\t<stack trace unavailable>".to_string()
            } else {
                frames
                    .iter()
                    .take(depth)
                    .map(|frame| format!("\t{}", frame))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            self.dispatch(&config, level, location, &body, true);
        }
    }

    level_methods! {
        verbose => Verbose,
        debug => Debug,
        info => Info,
        warning => Warning,
        error => Error,
        wtf => Wtf,
    }

    fn log_at(&self, level: LogLevel, value: &dyn LogValue, location: &'static Location<'static>) {
        if let Some(config) = self.gate(level, None) {
            let formatter = ValueFormatter::new(config.structure(), config.formatters());
            let body = formatter.format(value);
            self.dispatch(&config, level, location, &body, false);
        }
    }

    fn document(
        &self,
        kind: Document,
        level: Option<LogLevel>,
        source: &str,
        location: &'static Location<'static>,
    ) {
        let Some(config) = self.configuration() else {
            return;
        };
        let (indent, threshold) = match kind {
            Document::Json => (config.json_indent(), config.json_level()),
            Document::Xml => (config.xml_indent(), config.xml_level()),
        };
        let level = level.unwrap_or(threshold);
        if !self.passes(&config, level, Some(threshold)) {
            return;
        }

        let rendered = match kind {
            Document::Json => pretty_json(source, indent),
            Document::Xml => pretty_xml(source, indent),
        };
        let body = rendered.unwrap_or_else(|e| {
            config.metrics().record_format_failure();
            annotate_malformed(kind.label(), source, &e)
        });
        self.dispatch(&config, level, location, &body, true);
    }

    fn hex_with(
        &self,
        config: &Configuration,
        level: LogLevel,
        bytes: &[u8],
        location: &'static Location<'static>,
    ) {
        if self.passes(config, level, Some(config.hex_level())) {
            self.dispatch(config, level, location, &hex_dump(bytes), true);
        }
    }

    /// Loads the configuration and applies the level gate.
    fn gate(&self, level: LogLevel, threshold: Option<LogLevel>) -> Option<Arc<Configuration>> {
        let config = self.configuration()?;
        if self.passes(&config, level, threshold) {
            Some(config)
        } else {
            None
        }
    }

    fn passes(&self, config: &Configuration, level: LogLevel, threshold: Option<LogLevel>) -> bool {
        let accepted = config.accepts(level) && threshold.map_or(true, |t| level >= t);
        if !accepted {
            config.metrics().record_suppressed();
        }
        accepted
    }

    fn dispatch_throwable(
        &self,
        config: &Configuration,
        level: LogLevel,
        location: &'static Location<'static>,
        throwable: &Throwable,
        message: Option<&str>,
    ) {
        let line_count = self
            .overrides
            .stack_trace_line_count
            .unwrap_or_else(|| config.stack_trace_line_count());
        let trace = throwable.render(line_count);
        let body = match message {
            Some(message) => format!("{}\n{}", message, trace),
            None => trace,
        };
        self.dispatch(config, level, location, &body, false);
    }

    /// Resolves the caller, assembles the record and writes it to every sink.
    fn dispatch(
        &self,
        config: &Configuration,
        level: LogLevel,
        location: &'static Location<'static>,
        body: &str,
        block: bool,
    ) {
        let options = PrefixOptions {
            thread: config.show_thread(),
            class: config.show_class(),
            method: config.show_method(),
            line: config.show_line(),
        };
        let explicit_tag = self.overrides.tag.as_deref().or(config.tag());

        let site = if options.needs_symbols() || explicit_tag.is_none() {
            Some(
                caller::resolve(location, self.overrides.skip_frames)
                    .unwrap_or_else(|_| CallSite::from_location(location)),
            )
        } else if options.line {
            Some(CallSite::from_location(location))
        } else {
            None
        };

        let thread_name = self
            .overrides
            .thread_name
            .clone()
            .unwrap_or_else(current_thread_name);
        let prefix = compose_prefix(options, Some(thread_name.as_str()), site.as_ref());
        let tag = resolve_tag(explicit_tag, site.as_ref());
        let message = assemble(&prefix, body, block);

        let entry = LogEntry::new(level, tag, message).with_thread_name(thread_name);
        Self::write_to_sinks(config, &entry);
    }

    /// Writes one entry to every sink with per-appender panic isolation
    fn write_to_sinks(config: &Configuration, entry: &LogEntry) {
        let mut has_error = false;

        for sink in config.sinks() {
            let mut appender = sink.lock();
            let append_result =
                catch_unwind(AssertUnwindSafe(|| appender.append(entry)));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender '{}' failed: {}", appender.name(), e);
                    has_error = true;
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[LOGGER CRITICAL] Appender '{}' panicked: {}. \
                         Other appenders continue to function.",
                        appender.name(),
                        panic_msg
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            config.metrics().record_dropped();
        } else {
            config.metrics().record_emitted();
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            ConfigSource::Global => "global",
            ConfigSource::Fixed(_) => "fixed",
        };
        f.debug_struct("Logger")
            .field("source", &source)
            .field("overrides", &self.overrides)
            .finish()
    }
}
