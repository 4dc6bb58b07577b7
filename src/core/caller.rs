//! Caller resolution
//!
//! File and line of a log call come from `#[track_caller]`; the enclosing
//! type (or module) and function come from walking the native stack with
//! `backtrace` and locating the frame of that call site.

use super::error::{LoggerError, Result};
use std::fmt;
use std::panic::Location;
use std::path::Path;

const CRATE_PREFIX: &str = "taglog::";
const UNIT_TEST_MARKER: &str = "::tests::";
const CLOSURE_SUFFIX: &str = "::{{closure}}";

/// One resolved frame of a captured stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub function: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl StackFrame {
    /// Enclosing type or module of the function, if it has one.
    pub fn class_name(&self) -> Option<&str> {
        split_symbol(&self.function).0
    }

    pub fn method_name(&self) -> &str {
        split_symbol(&self.function).1
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}", self.function)?;
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, " ({}:{})", file, line),
            (Some(file), None) => write!(f, " ({})", file),
            _ => write!(f, " (unknown source)"),
        }
    }
}

/// Where a log call was made from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
    pub class: Option<String>,
    pub method: Option<String>,
}

impl CallSite {
    /// A call site known only by its source position.
    pub fn from_location(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
            class: None,
            method: None,
        }
    }

    /// Source file name without directories.
    pub fn file_name(&self) -> &str {
        Path::new(&self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file)
    }

    /// Source file name without directories and extension.
    pub fn file_stem(&self) -> &str {
        Path::new(&self.file)
            .file_stem()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.file)
    }
}

/// Captures the current native stack, innermost frame first.
pub fn capture_stack() -> Vec<StackFrame> {
    let mut frames = Vec::new();
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            let function = match symbol.name() {
                Some(name) => format!("{:#}", name),
                None => "<unknown>".to_string(),
            };
            frames.push(StackFrame {
                function,
                file: symbol.filename().map(|path| path.display().to_string()),
                line: symbol.lineno(),
            });
        });
        true
    });
    frames
}

/// Resolves the call site recorded by `location`, walking `skip_frames`
/// further frames outward (for callers that wrap the logger in their own
/// functions).
///
/// Fails with [`LoggerError::UnresolvableLocation`] when the stack is too
/// shallow or carries no symbols; callers then fall back to
/// [`CallSite::from_location`].
pub fn resolve(location: &Location<'_>, skip_frames: usize) -> Result<CallSite> {
    let frames = capture_stack();
    let index = call_site_index(&frames, location).ok_or_else(|| {
        LoggerError::unresolvable(format!(
            "no frame for {}:{} among {} captured frames",
            location.file(),
            location.line(),
            frames.len()
        ))
    })?;

    let target = index.checked_add(skip_frames).ok_or_else(|| {
        LoggerError::unresolvable(format!(
            "cannot skip {} frames past frame {}",
            skip_frames, index
        ))
    })?;
    let frame = frames.get(target).ok_or_else(|| {
        LoggerError::unresolvable(format!(
            "stack has {} frames, caller requested frame {}",
            frames.len(),
            target
        ))
    })?;

    let (class, method) = split_symbol(&frame.function);
    let (file, line) = match (skip_frames, &frame.file, frame.line) {
        (0, _, _) | (_, None, _) | (_, _, None) => {
            (location.file().to_string(), location.line())
        }
        (_, Some(file), Some(line)) => (file.clone(), line),
    };

    Ok(CallSite {
        file,
        line,
        class: class.map(str::to_string),
        method: Some(method.to_string()),
    })
}

/// Frames outside the logging machinery, starting at the first caller frame.
///
/// Used to render a stack trace of the current position; `skip_frames`
/// removes additional caller frames from the top.
pub fn caller_stack(skip_frames: usize) -> Vec<StackFrame> {
    let frames = capture_stack();
    match first_caller_index(&frames) {
        Some(index) => frames.into_iter().skip(index.saturating_add(skip_frames)).collect(),
        None => Vec::new(),
    }
}

fn call_site_index(frames: &[StackFrame], location: &Location<'_>) -> Option<usize> {
    let wanted = Path::new(location.file());
    frames
        .iter()
        .position(|frame| {
            frame.line == Some(location.line())
                && frame
                    .file
                    .as_deref()
                    .is_some_and(|file| Path::new(file).ends_with(wanted))
        })
        .or_else(|| first_caller_index(frames))
}

/// Index of the first frame after the innermost run of library frames.
fn first_caller_index(frames: &[StackFrame]) -> Option<usize> {
    let first_internal = frames.iter().position(|frame| is_internal(&frame.function))?;
    frames[first_internal..]
        .iter()
        .position(|frame| !is_internal(&frame.function))
        .map(|offset| first_internal + offset)
}

fn is_internal(function: &str) -> bool {
    let function = function.trim_start_matches('<');
    (function.starts_with(CRATE_PREFIX) && !function.contains(UNIT_TEST_MARKER))
        || function.starts_with("backtrace::")
}

/// Splits a demangled symbol into its enclosing type or module and its
/// function name.
///
/// `app::net::Server::start` gives `(Some("Server"), "start")`,
/// `<app::Cache as app::Store>::get` gives `(Some("Cache"), "get")`.
pub fn split_symbol(symbol: &str) -> (Option<&str>, &str) {
    let mut symbol = symbol;
    while let Some(stripped) = symbol.strip_suffix(CLOSURE_SUFFIX) {
        symbol = stripped;
    }

    if let Some(qualified) = symbol.strip_prefix('<') {
        if let Some(end) = qualified.rfind(">::") {
            let self_type = &qualified[..end];
            let self_type = self_type
                .split_once(" as ")
                .map_or(self_type, |(self_type, _)| self_type);
            let self_type = strip_generics(self_type);
            let class = self_type.rsplit("::").next().filter(|s| !s.is_empty());
            let method = qualified[end + 3..].rsplit("::").next().unwrap_or_default();
            return (class, method);
        }
    }

    let mut segments = symbol.rsplit("::");
    let method = segments.next().unwrap_or(symbol);
    let class = segments.next().map(strip_generics).filter(|s| !s.is_empty());
    (class, method)
}

fn strip_generics(path: &str) -> &str {
    match path.find('<') {
        Some(index) => &path[..index],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_inherent_method() {
        assert_eq!(split_symbol("app::net::Server::start"), (Some("Server"), "start"));
    }

    #[test]
    fn test_split_trait_method() {
        assert_eq!(
            split_symbol("<app::cache::Cache as app::Store>::get"),
            (Some("Cache"), "get")
        );
        assert_eq!(
            split_symbol("<alloc::vec::Vec<u8> as core::fmt::Debug>::fmt"),
            (Some("Vec"), "fmt")
        );
    }

    #[test]
    fn test_split_closure_and_free_function() {
        assert_eq!(
            split_symbol("app::worker::run::{{closure}}::{{closure}}"),
            (Some("worker"), "run")
        );
        assert_eq!(split_symbol("main"), (None, "main"));
    }

    #[test]
    fn test_oversized_skip_is_unresolvable() {
        let location = Location::caller();
        assert!(matches!(
            resolve(location, usize::MAX),
            Err(LoggerError::UnresolvableLocation(_))
        ));
        assert!(caller_stack(usize::MAX).is_empty());
    }

    #[test]
    fn test_frame_display() {
        let frame = StackFrame {
            function: "app::Server::start".to_string(),
            file: Some("src/server.rs".to_string()),
            line: Some(42),
        };
        assert_eq!(frame.to_string(), "at app::Server::start (src/server.rs:42)");
        assert_eq!(frame.class_name(), Some("Server"));
        assert_eq!(frame.method_name(), "start");
    }

    #[test]
    fn test_call_site_file_parts() {
        let site = CallSite {
            file: "src/net/server.rs".to_string(),
            line: 7,
            class: None,
            method: None,
        };
        assert_eq!(site.file_name(), "server.rs");
        assert_eq!(site.file_stem(), "server");
    }

    #[test]
    fn test_internal_frame_detection() {
        assert!(is_internal("taglog::core::logger::Logger::emit"));
        assert!(is_internal("<taglog::core::logger::Logger as core::fmt::Debug>::fmt"));
        assert!(!is_internal("taglog::core::logger::tests::test_gate"));
        assert!(!is_internal("app::main"));
    }

    #[test]
    fn test_first_caller_index_skips_library_frames() {
        let frame = |name: &str| StackFrame {
            function: name.to_string(),
            file: None,
            line: None,
        };
        let frames = vec![
            frame("backtrace::backtrace::trace"),
            frame("taglog::core::caller::capture_stack"),
            frame("taglog::core::logger::Logger::emit"),
            frame("app::Service::handle"),
            frame("app::main"),
        ];
        assert_eq!(first_caller_index(&frames), Some(3));
        assert_eq!(first_caller_index(&frames[3..]), None);
    }

    #[test]
    fn test_unresolvable_depth_is_an_error() {
        let location = Location::caller();
        let result = resolve(location, usize::MAX / 2);
        assert!(matches!(result, Err(LoggerError::UnresolvableLocation(_))));
    }
}
