//! Process-wide configuration and the static call surface
//!
//! One configuration slot is shared by the whole process. Every call loads
//! the current snapshot once, so a call never observes a mix of an old and
//! a new configuration. Calls made before [`initialize`] emit nothing.

use crate::core::{Configuration, LogLevel, LogValue, Logger, Throwable};
use arc_swap::ArcSwapOption;
use std::error::Error;
use std::sync::Arc;

static CURRENT: ArcSwapOption<Configuration> = ArcSwapOption::const_empty();

/// Installs `config` as the process-wide configuration.
///
/// Calls already in flight finish with the snapshot they loaded. Sinks of
/// the previous configuration that `config` does not share are closed once
/// the new one is in place.
pub fn initialize(config: Configuration) {
    let next = Arc::new(config);
    let previous = CURRENT.swap(Some(Arc::clone(&next)));
    if let Some(previous) = previous {
        previous.close_sinks_replaced_by(Some(&next));
    }
}

/// The installed configuration, if any.
pub fn current() -> Option<Arc<Configuration>> {
    CURRENT.load_full()
}

pub fn is_initialized() -> bool {
    CURRENT.load().is_some()
}

/// Removes the process-wide configuration and closes all of its sinks.
/// Later calls emit nothing until the next [`initialize`].
pub fn shutdown() {
    if let Some(previous) = CURRENT.swap(None) {
        previous.close_sinks_replaced_by(None);
    }
}

/// Logger bound to the process-wide configuration.
pub fn logger() -> Logger {
    Logger::global()
}

/// Logger with an explicit tag.
pub fn tagged(tag: impl Into<String>) -> Logger {
    Logger::global().with_tag(tag)
}

/// Logger rendering up to `line_count` stack lines per error.
pub fn with_stack_trace(line_count: usize) -> Logger {
    Logger::global().with_stack_trace(line_count)
}

pub fn tagged_with_stack_trace(tag: impl Into<String>, line_count: usize) -> Logger {
    Logger::global().with_tag(tag).with_stack_trace(line_count)
}

macro_rules! global_level_functions {
    ($($name:ident => $level:ident),+ $(,)?) => {
        $(
            #[doc = concat!("Logs `value` at [`LogLevel::", stringify!($level), "`] through the process-wide configuration.")]
            #[track_caller]
            pub fn $name(value: impl LogValue) {
                Logger::global().log(LogLevel::$level, value);
            }
        )+
    };
}

global_level_functions! {
    verbose => Verbose,
    debug => Debug,
    info => Info,
    warning => Warning,
    error => Error,
    wtf => Wtf,
}

#[track_caller]
pub fn mark(level: LogLevel) {
    Logger::global().mark(level);
}

#[track_caller]
pub fn log(level: LogLevel, value: impl LogValue) {
    Logger::global().log(level, value);
}

#[track_caller]
pub fn log_args(level: LogLevel, template: &str, args: &[&dyn LogValue]) {
    Logger::global().log_args(level, template, args);
}

#[track_caller]
pub fn log_error<E: Error + ?Sized>(level: LogLevel, error: &E) {
    Logger::global().log_error(level, error);
}

#[track_caller]
pub fn log_throwable(level: LogLevel, throwable: &Throwable) {
    Logger::global().log_throwable(level, throwable);
}

#[track_caller]
pub fn json(source: &str) {
    Logger::global().json(source);
}

#[track_caller]
pub fn xml(source: &str) {
    Logger::global().xml(source);
}

#[track_caller]
pub fn hex(bytes: &[u8]) {
    Logger::global().hex(bytes);
}

#[track_caller]
pub fn stack_trace(level: LogLevel, depth: usize) {
    Logger::global().stack_trace(level, depth);
}
