//! Loggable value model
//!
//! Rust has no runtime reflection, so every value handed to the formatter
//! describes itself through [`LogValue`]: it reports a [`Shape`] (null,
//! scalar, array, collection, iterable, map or opaque) and, for `'static`
//! types, exposes itself as [`Any`] so a custom formatter can be looked up by
//! its `TypeId`.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Structural view of a value, as seen by the formatter.
pub enum Shape<'a> {
    /// Absent value, rendered as `null`.
    Null,
    /// A value with its own textual representation.
    Scalar(&'a dyn fmt::Display),
    /// Borrowed text.
    Text(&'a str),
    /// Fixed-size array or slice.
    Array(Box<dyn Elements + 'a>),
    /// List, deque or set.
    Collection(Box<dyn Elements + 'a>),
    /// Anything else that can be iterated.
    Iterable(Box<dyn Elements + 'a>),
    /// Key/value container.
    Map(Box<dyn Entries + 'a>),
    /// A value with no structure and no textual representation; only a
    /// custom formatter can render it meaningfully.
    Opaque,
}

/// Sequential access to the elements of an array, collection or iterable.
pub trait Elements {
    fn for_each_element(&self, visit: &mut dyn FnMut(&dyn LogValue));
}

/// Sequential access to the entries of a map, in its iteration order.
pub trait Entries {
    fn for_each_entry(&self, visit: &mut dyn FnMut(&dyn LogValue, &dyn LogValue));
}

impl<E: Elements + ?Sized> Elements for &E {
    fn for_each_element(&self, visit: &mut dyn FnMut(&dyn LogValue)) {
        (**self).for_each_element(visit)
    }
}

impl<E: Entries + ?Sized> Entries for &E {
    fn for_each_entry(&self, visit: &mut dyn FnMut(&dyn LogValue, &dyn LogValue)) {
        (**self).for_each_entry(visit)
    }
}

/// A value that can be rendered by the logging pipeline.
///
/// Implementations for primitives, strings, arrays, standard collections,
/// maps, `Option` and smart pointers are provided. User types implement
/// `shape` and, to be eligible for a custom formatter, `as_any`:
///
/// ```
/// use std::any::Any;
/// use taglog::{LogValue, Shape};
///
/// struct Point { x: i32, y: i32 }
///
/// impl LogValue for Point {
///     fn shape(&self) -> Shape<'_> { Shape::Opaque }
///     fn as_any(&self) -> Option<&dyn Any> { Some(self) }
/// }
/// ```
///
/// The [`log_value!`](crate::log_value) macro writes these impls for you.
pub trait LogValue {
    fn shape(&self) -> Shape<'_>;

    /// The value as `Any`, used as the custom formatter lookup key.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }

    /// Full type name, used for the default `type@identity` representation.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Address used for the default `type@identity` representation.
    fn identity(&self) -> usize {
        self as *const Self as *const () as usize
    }
}

/// Library default text for a value that is not rendered structurally:
/// the type name followed by the value's address.
pub fn default_representation(value: &dyn LogValue) -> String {
    format!("{}@{:x}", value.type_name(), value.identity())
}

/// Adapter that logs any cloneable iterable as a generic iterable.
///
/// ```
/// use taglog::Iterable;
/// let evens = Iterable((0..10).filter(|n| n % 2 == 0));
/// # let _ = evens;
/// ```
#[derive(Debug, Clone)]
pub struct Iterable<I>(pub I);

impl<I> Elements for Iterable<I>
where
    I: Clone + IntoIterator,
    I::Item: LogValue,
{
    fn for_each_element(&self, visit: &mut dyn FnMut(&dyn LogValue)) {
        for item in self.0.clone() {
            visit(&item);
        }
    }
}

impl<I> LogValue for Iterable<I>
where
    I: Clone + IntoIterator,
    I::Item: LogValue,
{
    fn shape(&self) -> Shape<'_> {
        Shape::Iterable(Box::new(self))
    }
}

/// The explicit absence of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Null;

impl LogValue for Null {
    fn shape(&self) -> Shape<'_> {
        Shape::Null
    }
}

/// Implements [`LogValue`] for user types.
///
/// `log_value!(Type)` makes the type opaque (rendered by a registered custom
/// formatter, otherwise as `type@identity`); `log_value!(display Type)` makes
/// it a scalar rendered through its `Display` impl. Both variants make the
/// type eligible for custom formatters.
#[macro_export]
macro_rules! log_value {
    (display $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::LogValue for $ty {
                fn shape(&self) -> $crate::Shape<'_> {
                    $crate::Shape::Scalar(self)
                }

                fn as_any(&self) -> ::std::option::Option<&dyn ::std::any::Any> {
                    ::std::option::Option::Some(self)
                }
            }
        )+
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::LogValue for $ty {
                fn shape(&self) -> $crate::Shape<'_> {
                    $crate::Shape::Opaque
                }

                fn as_any(&self) -> ::std::option::Option<&dyn ::std::any::Any> {
                    ::std::option::Option::Some(self)
                }
            }
        )+
    };
}

log_value!(display
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String
);

impl LogValue for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Text(self)
    }
}

impl<T: LogValue + ?Sized> LogValue for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn as_any(&self) -> Option<&dyn Any> {
        (**self).as_any()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn identity(&self) -> usize {
        (**self).identity()
    }
}

macro_rules! delegate_pointer {
    ($($ptr:ident),+) => {
        $(
            impl<T: LogValue + ?Sized> LogValue for $ptr<T> {
                fn shape(&self) -> Shape<'_> {
                    (**self).shape()
                }

                fn as_any(&self) -> Option<&dyn Any> {
                    (**self).as_any()
                }

                fn type_name(&self) -> &'static str {
                    (**self).type_name()
                }

                fn identity(&self) -> usize {
                    (**self).identity()
                }
            }
        )+
    };
}

delegate_pointer!(Box, Rc, Arc);

impl<T: LogValue> LogValue for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Null,
        }
    }

    fn as_any(&self) -> Option<&dyn Any> {
        self.as_ref().and_then(|value| value.as_any())
    }

    fn type_name(&self) -> &'static str {
        match self {
            Some(value) => value.type_name(),
            None => std::any::type_name::<Self>(),
        }
    }
}

impl<T: LogValue> Elements for [T] {
    fn for_each_element(&self, visit: &mut dyn FnMut(&dyn LogValue)) {
        for item in self {
            visit(item);
        }
    }
}

impl<T: LogValue> LogValue for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::Array(Box::new(self))
    }
}

impl<T: LogValue + 'static, const N: usize> LogValue for [T; N] {
    fn shape(&self) -> Shape<'_> {
        Shape::Array(Box::new(self.as_slice()))
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

macro_rules! sequence_collection {
    ($($coll:ident),+) => {
        $(
            impl<T: LogValue> Elements for $coll<T> {
                fn for_each_element(&self, visit: &mut dyn FnMut(&dyn LogValue)) {
                    for item in self {
                        visit(item);
                    }
                }
            }

            impl<T: LogValue + 'static> LogValue for $coll<T> {
                fn shape(&self) -> Shape<'_> {
                    Shape::Collection(Box::new(self))
                }

                fn as_any(&self) -> Option<&dyn Any> {
                    Some(self)
                }
            }
        )+
    };
}

sequence_collection!(Vec, VecDeque, LinkedList, BTreeSet);

impl<T: LogValue, S> Elements for HashSet<T, S> {
    fn for_each_element(&self, visit: &mut dyn FnMut(&dyn LogValue)) {
        for item in self {
            visit(item);
        }
    }
}

impl<T: LogValue + 'static, S: 'static> LogValue for HashSet<T, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Collection(Box::new(self))
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl<K: LogValue, V: LogValue> Entries for BTreeMap<K, V> {
    fn for_each_entry(&self, visit: &mut dyn FnMut(&dyn LogValue, &dyn LogValue)) {
        for (key, value) in self {
            visit(key, value);
        }
    }
}

impl<K: LogValue + 'static, V: LogValue + 'static> LogValue for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(Box::new(self))
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl<K: LogValue, V: LogValue, S> Entries for HashMap<K, V, S> {
    fn for_each_entry(&self, visit: &mut dyn FnMut(&dyn LogValue, &dyn LogValue)) {
        for (key, value) in self {
            visit(key, value);
        }
    }
}

impl<K: LogValue + 'static, V: LogValue + 'static, S: 'static> LogValue for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(Box::new(self))
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}
