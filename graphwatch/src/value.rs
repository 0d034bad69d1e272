//! The data carried by a [`crate::Change`]: keys, sources, and the small
//! value representation used for `old`/`new` payloads.

use crate::identity::NodeId;
use crate::node::Node;
use std::fmt;
use std::rc::Rc;

/// How a parent references a child, and how a write was made.
///
/// Mirrors the three write surfaces of §4.B: record fields, indexed/keyed
/// containers, and unordered set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// A record field.
    Attr,
    /// A sequence index or mapping key.
    Item,
    /// An unordered set element.
    Set,
}

/// The key at which a write occurred: a sequence index or a name (mapping
/// key, field name, or — once bubbled — a composed path segment).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Name(s) => Some(s),
            Key::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(_) => None,
        }
    }

    /// The `repr(n)` used when composing a path segment: integers render
    /// bare, strings render quoted. See §4.D.
    pub(crate) fn path_repr(&self) -> String {
        match self {
            Key::Index(i) => i.to_string(),
            Key::Name(s) => format!("{s:?}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(s) => write!(f, "{s}"),
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Name(s)
    }
}

/// A snapshot of an `old` or `new` value, for display and for the few
/// comparisons the filter layer performs (see `Filter::matches`).
///
/// This is deliberately a closed, small set rather than an open `dyn Any`:
/// the crate does not need to round-trip arbitrary Rust types through a
/// `Change`, only to describe them, the way the source's dynamically-typed
/// `repr()` does.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A nested tracked node: carries its identity and type name so a
    /// subscriber can tell which child moved without dereferencing it.
    Node(NodeId, &'static str),
    /// Fallback for leaf types that only implement `Debug`.
    Other(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Node(id, ty) => write!(f, "<{ty} {id}>"),
            Value::Other(s) => write!(f, "{s}"),
        }
    }
}

/// The injected capability for a value to participate as a `Change` payload
/// and, if it is itself a tracked container or record, to be recursed into
/// by the activation engine.
///
/// Implemented for common leaf types below; container wrappers and
/// `#[derive(Record)]` types implement it by delegating `as_node` to
/// themselves.
pub trait Trackable: 'static {
    fn to_value(&self) -> Value;

    /// `Some` if this value is itself a tracked node (container or record),
    /// so the activation engine can recurse into it. `None` for leaves.
    fn as_node(&self) -> Option<Rc<dyn Node>> {
        None
    }
}

/// Logged wherever a container or record's `children()` skips a field/element
/// whose `Trackable::as_node()` is `None` — a value the activation engine
/// does not recurse into because it is neither a record, sequence, mapping,
/// nor set (§4.A, §7 `UnsupportedType`: "logged at info level, silently
/// skipped, not fatal").
#[doc(hidden)]
pub fn log_unsupported_child<T: ?Sized>() {
    tracing::info!("{}", crate::error::Error::UnsupportedType(std::any::type_name::<T>()));
}

macro_rules! impl_trackable_int {
    ($($t:ty),*) => {
        $(impl Trackable for $t {
            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }
        })*
    };
}

impl_trackable_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Trackable for f32 {
    fn to_value(&self) -> Value {
        Value::Float(*self as f64)
    }
}

impl Trackable for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl Trackable for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Trackable for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl<T: Trackable> Trackable for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn as_node(&self) -> Option<Rc<dyn Node>> {
        self.as_ref().and_then(Trackable::as_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_path_repr_quotes_strings_bares_integers() {
        assert_eq!(Key::Index(3).path_repr(), "3");
        assert_eq!(Key::Name("foo".into()).path_repr(), "\"foo\"");
    }

    #[test]
    fn value_display_matches_change_format() {
        assert_eq!(Value::Str("bar".into()).to_string(), "\"bar\"");
        assert_eq!(Value::Null.to_string(), "None");
        assert_eq!(Value::Int(3).to_string(), "3");
    }

    #[test]
    fn option_leaf_to_value() {
        let none: Option<i32> = None;
        assert!(matches!(none.to_value(), Value::Null));
        assert!(matches!(Some(5i32).to_value(), Value::Int(5)));
    }
}
