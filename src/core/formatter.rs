//! Formatter registry and value rendering
//!
//! Dispatch order for a single value (first match wins):
//!
//! 1. null → `null`
//! 2. exact runtime type registered in the [`FormatterRegistry`]
//! 3. arrays, when array formatting is enabled
//! 4. maps, when map formatting is enabled
//! 5. collections when collection formatting is enabled, else any iterable
//!    when iterable formatting is enabled
//! 6. the value's own text, or `type@identity` for structures whose
//!    formatting toggle is off

use super::value::{default_representation, Elements, Entries, LogValue, Shape};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Text rendered for a null value.
pub const NULL_LITERAL: &str = "null";

/// Nesting depth at which rendering stops descending.
///
/// Custom formatters may recurse into the delegate without bound (for example
/// on a graph with shared `Rc` cycles); past this depth the nested value is
/// replaced by [`DEPTH_EXCEEDED_LITERAL`].
pub const MAX_FORMAT_DEPTH: usize = 32;

pub const DEPTH_EXCEEDED_LITERAL: &str = "<max depth exceeded>";

/// Callback handed to complex formatters; renders any nested value through
/// the same dispatch as the top-level value.
pub type Delegate<'a> = &'a dyn Fn(&dyn LogValue) -> String;

type SimpleFn = dyn Fn(&dyn Any) -> String + Send + Sync;
type ComplexFn = dyn Fn(&dyn Any, Delegate<'_>) -> String + Send + Sync;

#[derive(Clone)]
enum FormatterKind {
    Simple(Arc<SimpleFn>),
    Complex(Arc<ComplexFn>),
}

/// A custom rendering function bound to exactly one runtime type.
///
/// # Examples
///
/// ```
/// use taglog::Formatter;
///
/// struct Celsius(f64);
/// taglog::log_value!(Celsius);
///
/// let formatter = Formatter::simple(|c: &Celsius| format!("{:.1}°C", c.0));
/// assert!(formatter.type_name().ends_with("Celsius"));
/// ```
#[derive(Clone)]
pub struct Formatter {
    type_id: TypeId,
    type_name: &'static str,
    kind: FormatterKind,
}

impl Formatter {
    /// A formatter that renders a value on its own.
    pub fn simple<T, F>(render: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind: FormatterKind::Simple(Arc::new(move |value: &dyn Any| {
                value.downcast_ref::<T>().map(&render).unwrap_or_default()
            })),
        }
    }

    /// A formatter that may render nested values through the shared
    /// dispatch, via the delegate it receives.
    ///
    /// ```
    /// use taglog::{Formatter, LogValue};
    ///
    /// struct Team { name: String, members: Vec<String> }
    /// taglog::log_value!(Team);
    ///
    /// let formatter = Formatter::complex(|team: &Team, format: &dyn Fn(&dyn LogValue) -> String| {
    ///     format!("Team({}, {})", team.name, format(&team.members))
    /// });
    /// # let _ = formatter;
    /// ```
    pub fn complex<T, F>(render: F) -> Self
    where
        T: Any,
        F: Fn(&T, Delegate<'_>) -> String + Send + Sync + 'static,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind: FormatterKind::Complex(Arc::new(
                move |value: &dyn Any, delegate: Delegate<'_>| {
                    value
                        .downcast_ref::<T>()
                        .map(|value| render(value, delegate))
                        .unwrap_or_default()
                },
            )),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.kind, FormatterKind::Complex(_))
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter")
            .field("type_name", &self.type_name)
            .field("complex", &self.is_complex())
            .finish()
    }
}

/// Immutable mapping from runtime type to custom [`Formatter`].
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: Arc<HashMap<TypeId, Formatter>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a registry with `formatter` added, replacing any formatter
    /// previously bound to the same type.
    #[must_use = "registries are immutable; use the returned value"]
    pub fn with(&self, formatter: Formatter) -> Self {
        let mut formatters = (*self.formatters).clone();
        formatters.insert(formatter.type_id, formatter);
        Self {
            formatters: Arc::new(formatters),
        }
    }

    pub fn get(&self, type_id: TypeId) -> Option<&Formatter> {
        self.formatters.get(&type_id)
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.formatters.values().map(|formatter| formatter.type_name))
            .finish()
    }
}

/// Independent structural formatting toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureOptions {
    pub arrays: bool,
    pub collections: bool,
    pub maps: bool,
    pub iterables: bool,
}

impl Default for StructureOptions {
    fn default() -> Self {
        Self {
            arrays: true,
            collections: true,
            maps: true,
            iterables: true,
        }
    }
}

/// Renders values and message templates under one set of options.
pub struct ValueFormatter<'a> {
    options: StructureOptions,
    registry: &'a FormatterRegistry,
}

impl<'a> ValueFormatter<'a> {
    pub fn new(options: StructureOptions, registry: &'a FormatterRegistry) -> Self {
        Self { options, registry }
    }

    pub fn format(&self, value: &dyn LogValue) -> String {
        self.format_at(value, 0)
    }

    fn format_at(&self, value: &dyn LogValue, depth: usize) -> String {
        if depth > MAX_FORMAT_DEPTH {
            return DEPTH_EXCEEDED_LITERAL.to_string();
        }

        let shape = value.shape();
        if let Shape::Null = shape {
            return NULL_LITERAL.to_string();
        }

        if let Some(any) = value.as_any() {
            if let Some(formatter) = self.registry.get(Any::type_id(any)) {
                return self.invoke(formatter, any, depth);
            }
        }

        match shape {
            Shape::Array(elements) if self.options.arrays => self.format_list(&*elements, depth),
            Shape::Map(entries) if self.options.maps => self.format_map(&*entries, depth),
            Shape::Collection(elements) if self.options.collections || self.options.iterables => {
                self.format_list(&*elements, depth)
            }
            Shape::Iterable(elements) if self.options.iterables => {
                self.format_list(&*elements, depth)
            }
            Shape::Scalar(display) => display.to_string(),
            Shape::Text(text) => text.to_string(),
            _ => default_representation(value),
        }
    }

    fn invoke(&self, formatter: &Formatter, value: &dyn Any, depth: usize) -> String {
        let result = catch_unwind(AssertUnwindSafe(|| match &formatter.kind {
            FormatterKind::Simple(render) => render(value),
            FormatterKind::Complex(render) => {
                let delegate = |nested: &dyn LogValue| self.format_at(nested, depth + 1);
                render(value, &delegate)
            }
        }));

        match result {
            Ok(text) => text,
            Err(panic) => {
                let message = if let Some(s) = panic.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                format!("<formatter for {} panicked: {}>", formatter.type_name, message)
            }
        }
    }

    fn format_list(&self, elements: &dyn Elements, depth: usize) -> String {
        let mut out = String::from("[");
        let mut first = true;
        elements.for_each_element(&mut |element| {
            if !first {
                out.push_str(", ");
            }
            first = false;
            out.push_str(&self.format_at(element, depth + 1));
        });
        out.push(']');
        out
    }

    fn format_map(&self, entries: &dyn Entries, depth: usize) -> String {
        let mut out = String::from("{");
        let mut first = true;
        entries.for_each_entry(&mut |key, value| {
            if !first {
                out.push_str(", ");
            }
            first = false;
            out.push_str(&self.format_at(key, depth + 1));
            out.push('=');
            out.push_str(&self.format_at(value, depth + 1));
        });
        out.push('}');
        out
    }

    /// Expands a message template.
    ///
    /// `{}` takes the next argument, `{N}` takes argument `N` (0-based),
    /// `{{` and `}}` are literal braces. A placeholder without a matching
    /// argument is kept verbatim; surplus arguments are ignored.
    pub fn format_template(&self, template: &str, args: &[&dyn LogValue]) -> String {
        let mut out = String::with_capacity(template.len() + args.len() * 8);
        let mut next = 0;
        let mut rest = template;

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") {
                out.push('{');
                rest = &tail[2..];
            } else if tail.starts_with("}}") {
                out.push('}');
                rest = &tail[2..];
            } else if tail.starts_with('{') {
                match tail.find('}') {
                    Some(close) => {
                        let placeholder = &tail[..=close];
                        let inner = &tail[1..close];
                        let index = if inner.is_empty() {
                            let index = next;
                            next += 1;
                            Some(index)
                        } else {
                            inner.trim().parse::<usize>().ok()
                        };
                        match index.and_then(|index| args.get(index)) {
                            Some(arg) => out.push_str(&self.format(*arg)),
                            None => out.push_str(placeholder),
                        }
                        rest = &tail[close + 1..];
                    }
                    None => {
                        out.push_str(tail);
                        rest = "";
                    }
                }
            } else {
                out.push('}');
                rest = &tail[1..];
            }
        }

        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{Iterable, Null};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Point {
        x: i32,
        y: i32,
    }
    crate::log_value!(Point);

    struct Polygon {
        points: Vec<Point>,
    }
    crate::log_value!(Polygon);

    fn render(options: StructureOptions, registry: &FormatterRegistry, value: &dyn LogValue) -> String {
        ValueFormatter::new(options, registry).format(value)
    }

    #[test]
    fn test_null_literal() {
        let registry = FormatterRegistry::new();
        assert_eq!(render(StructureOptions::default(), &registry, &Null), "null");
        assert_eq!(
            render(StructureOptions::default(), &registry, &Option::<i32>::None),
            "null"
        );
    }

    #[test]
    fn test_map_formatting_toggle() {
        let registry = FormatterRegistry::new();
        let mut map = BTreeMap::new();
        map.insert("a", 1);
        map.insert("b", 2);

        assert_eq!(render(StructureOptions::default(), &registry, &map), "{a=1, b=2}");

        let options = StructureOptions {
            maps: false,
            ..StructureOptions::default()
        };
        let text = render(options, &registry, &map);
        assert_ne!(text, "{a=1, b=2}");
        assert!(text.starts_with("alloc::collections::btree::map::BTreeMap<&str, i32>@"));
    }

    #[test]
    fn test_toggles_are_independent() {
        let registry = FormatterRegistry::new();
        let mut map = BTreeMap::new();
        map.insert(1, "one");
        let array = [map];

        let options = StructureOptions {
            maps: false,
            ..StructureOptions::default()
        };
        let text = render(options, &registry, &array);
        assert!(text.starts_with("[alloc::collections::btree::map::BTreeMap"));
        assert!(text.ends_with(']'));
    }

    #[test]
    fn test_arrays_and_byte_arrays() {
        let registry = FormatterRegistry::new();
        let bytes: [u8; 2] = [0x0A, 0xFF];
        assert_eq!(render(StructureOptions::default(), &registry, &bytes), "[10, 255]");

        let options = StructureOptions {
            arrays: false,
            ..StructureOptions::default()
        };
        assert!(render(options, &registry, &bytes).starts_with("[u8; 2]@"));
    }

    #[test]
    fn test_collection_falls_back_to_iterable_formatting() {
        let registry = FormatterRegistry::new();
        let list = vec!["x", "y"];

        let options = StructureOptions {
            collections: false,
            ..StructureOptions::default()
        };
        assert_eq!(render(options, &registry, &list), "[x, y]");

        let options = StructureOptions {
            collections: false,
            iterables: false,
            ..StructureOptions::default()
        };
        assert!(render(options, &registry, &list).starts_with("alloc::vec::Vec<&str>@"));
    }

    #[test]
    fn test_iterable_preserves_order() {
        let registry = FormatterRegistry::new();
        let iterable = Iterable([3i32, 1, 2]);
        assert_eq!(render(StructureOptions::default(), &registry, &iterable), "[3, 1, 2]");
    }

    #[test]
    fn test_simple_formatter_takes_precedence() {
        let registry = FormatterRegistry::new()
            .with(Formatter::simple(|p: &Point| format!("({}, {})", p.x, p.y)));
        let text = render(StructureOptions::default(), &registry, &Point { x: 1, y: 2 });
        assert_eq!(text, "(1, 2)");

        let registry = registry.with(Formatter::simple(|v: &Vec<i32>| format!("{} ints", v.len())));
        let text = render(StructureOptions::default(), &registry, &vec![1i32, 2, 3]);
        assert_eq!(text, "3 ints");
    }

    #[test]
    fn test_complex_formatter_recurses_through_delegate() {
        let registry = FormatterRegistry::new()
            .with(Formatter::simple(|p: &Point| format!("({}, {})", p.x, p.y)))
            .with(Formatter::complex(|polygon: &Polygon, format: Delegate<'_>| {
                format!("Polygon{}", format(&polygon.points))
            }));
        let polygon = Polygon {
            points: vec![Point { x: 0, y: 0 }, Point { x: 3, y: 4 }],
        };
        assert_eq!(
            render(StructureOptions::default(), &registry, &polygon),
            "Polygon[(0, 0), (3, 4)]"
        );
    }

    #[test]
    fn test_unregistered_opaque_type_uses_default_representation() {
        let registry = FormatterRegistry::new();
        let text = render(StructureOptions::default(), &registry, &Point { x: 1, y: 1 });
        assert!(text.contains("Point@"));
    }

    #[test]
    fn test_runaway_recursion_is_bounded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = FormatterRegistry::new().with(Formatter::complex(
            move |point: &Point, format: Delegate<'_>| {
                counter.fetch_add(1, Ordering::Relaxed);
                format!("<{}>", format(point))
            },
        ));
        let text = render(StructureOptions::default(), &registry, &Point { x: 0, y: 0 });
        assert!(text.contains(DEPTH_EXCEEDED_LITERAL));
        assert_eq!(calls.load(Ordering::Relaxed), MAX_FORMAT_DEPTH + 1);
    }

    #[test]
    fn test_panicking_formatter_is_contained() {
        let registry = FormatterRegistry::new()
            .with(Formatter::simple(|_: &Point| -> String { panic!("boom") }));
        let text = render(StructureOptions::default(), &registry, &Point { x: 0, y: 0 });
        assert!(text.contains("panicked: boom"));
    }

    #[test]
    fn test_template_placeholders() {
        let registry = FormatterRegistry::new();
        let formatter = ValueFormatter::new(StructureOptions::default(), &registry);

        assert_eq!(
            formatter.format_template("Message {}, {}", &[&"title", &100]),
            "Message title, 100"
        );
        assert_eq!(formatter.format_template("{1} before {0}", &[&"a", &"b"]), "b before a");
        assert_eq!(formatter.format_template("{{literal}} {}", &[&1]), "{literal} 1");
        assert_eq!(formatter.format_template("missing {} {}", &[&1]), "missing 1 {}");
        assert_eq!(formatter.format_template("list {}", &[&vec![1i32, 2]]), "list [1, 2]");
        assert_eq!(formatter.format_template("open { brace", &[]), "open { brace");
    }
}
