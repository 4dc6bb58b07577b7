//! Errors attached to log records

use super::caller::{caller_stack, StackFrame};
use std::error::Error;
use std::fmt;

/// An error captured for logging: its type, message, `source()` chain and
/// the stack at the point it was captured.
///
/// ```
/// use taglog::Throwable;
///
/// let err = std::fs::read("/definitely/missing").unwrap_err();
/// let throwable = Throwable::new(&err);
/// assert_eq!(throwable.type_name(), "Error");
/// ```
#[derive(Debug, Clone)]
pub struct Throwable {
    type_name: String,
    message: String,
    causes: Vec<String>,
    frames: Vec<StackFrame>,
}

impl Throwable {
    /// Captures `error` together with the current call stack.
    pub fn new<E: Error + ?Sized>(error: &E) -> Self {
        Self::with_frames(error, caller_stack(0))
    }

    /// Captures `error` with an explicit stack, innermost frame first.
    pub fn with_frames<E: Error + ?Sized>(error: &E, frames: Vec<StackFrame>) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            type_name: simple_type_name(std::any::type_name::<E>()).to_string(),
            message: error.to_string(),
            causes,
            frames,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Renders the error header, at most `max_frames` stack lines and the
    /// cause chain. With `max_frames == 0` no stack line is rendered.
    pub fn render(&self, max_frames: usize) -> String {
        let mut out = format!("{}: {}", self.type_name, self.message);
        for frame in self.frames.iter().take(max_frames) {
            out.push_str("\n\t");
            out.push_str(&frame.to_string());
        }
        for cause in &self.causes {
            out.push_str("\nCaused by: ");
            out.push_str(cause);
        }
        out
    }
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

impl<E: Error> From<&E> for Throwable {
    fn from(error: &E) -> Self {
        Self::new(error)
    }
}

fn simple_type_name(full: &str) -> &str {
    let base = match full.find('<') {
        Some(index) => &full[..index],
        None => full,
    };
    base.rsplit("::").next().unwrap_or(base)
}
