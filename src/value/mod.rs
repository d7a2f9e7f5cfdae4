//! Defines the [`Value`] enum, representing any data a template can see.

mod cow;
mod from;
mod items;
mod object;
#[cfg(feature = "serde")]
mod ser;

use std::fmt::Write;
use std::sync::Arc;

pub use std::collections::BTreeMap as Map;

pub(crate) use crate::value::cow::ValueCow;
pub(crate) use crate::value::items::Items;
pub use crate::value::object::{Command, Object};
#[cfg(feature = "serde")]
pub use crate::value::ser::to_value;
use crate::{Error, Result};

/// Data to be rendered represented as a recursive enum.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map<String, Value>),
    /// An inclusive integer range, e.g. `(1..5)`.
    Range(i64, i64),
    /// A host provided object, see [`Object`].
    Object(Arc<dyn Object>),
}

impl Default for Value {
    fn default() -> Self {
        Self::None
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(s), Self::Bool(o)) => s == o,
            (Self::Integer(s), Self::Integer(o)) => s == o,
            (Self::Float(s), Self::Float(o)) => s == o,
            (Self::Integer(s), Self::Float(o)) | (Self::Float(o), Self::Integer(s)) => {
                *s as f64 == *o
            }
            (Self::String(s), Self::String(o)) => s == o,
            (Self::List(s), Self::List(o)) => s == o,
            (Self::Map(s), Self::Map(o)) => s == o,
            (Self::Range(a, b), Self::Range(c, d)) => a == c && b == d,
            (Self::Object(s), Self::Object(o)) => Arc::ptr_eq(s, o),
            _ => false,
        }
    }
}

impl Value {
    /// A human readable name for the type of this value.
    pub fn human(&self) -> &'static str {
        match self {
            Self::None => "nil",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Range(..) => "range",
            Self::Object(_) => "object",
        }
    }

    /// Everything is truthy except `nil` and `false`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::None | Self::Bool(false))
    }

    /// Whether this value is `nil`, `false`, a whitespace only string or an
    /// empty collection.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::None | Self::Bool(false) => true,
            Self::String(s) => s.trim().is_empty(),
            _ => self.is_empty(),
        }
    }

    /// Whether this value is an empty string or an empty collection.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::List(list) => list.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Range(a, b) => b < a,
            _ => false,
        }
    }

    /// Strict integer coercion: integers and integer strings only.
    pub fn to_integer(&self) -> Result<i64> {
        match self {
            Self::Integer(i) => Ok(*i),
            Self::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::argument("invalid integer")),
            _ => Err(Error::argument("invalid integer")),
        }
    }

    /// Lenient integer coercion, anything unparseable becomes zero.
    pub fn to_int_lossy(&self) -> i64 {
        match self {
            Self::Integer(i) => *i,
            Self::Float(f) => *f as i64,
            Self::String(s) => {
                let s = s.trim_start();
                let end = s
                    .char_indices()
                    .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
                    .map(|(i, _)| i)
                    .unwrap_or(s.len());
                s[..end].parse().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Applies a command accessor to this value.
    pub fn command(&self, command: Command) -> Option<Value> {
        match (self, command) {
            (Self::String(s), Command::Size) => Some(Self::Integer(s.chars().count() as i64)),
            (Self::List(list), Command::Size) => Some(Self::Integer(list.len() as i64)),
            (Self::List(list), Command::First) => Some(list.first().cloned().unwrap_or_default()),
            (Self::List(list), Command::Last) => Some(list.last().cloned().unwrap_or_default()),
            (Self::Map(map), Command::Size) => Some(Self::Integer(map.len() as i64)),
            (Self::Map(map), Command::First) => Some(
                map.iter()
                    .next()
                    .map(|(k, v)| Self::List(vec![Self::String(k.clone()), v.clone()]))
                    .unwrap_or_default(),
            ),
            (Self::Range(a, b), Command::Size) => Some(Self::Integer(
                i64::try_from(items::range_len(*a, *b)).unwrap_or(i64::MAX),
            )),
            (Self::Range(a, b), Command::First) => Some(if b < a { Self::None } else { Self::Integer(*a) }),
            (Self::Range(a, b), Command::Last) => Some(if b < a { Self::None } else { Self::Integer(*b) }),
            (Self::Object(obj), command) => obj.command(command),
            _ => None,
        }
    }

    /// Returns the items this value yields when iterated by a loop.
    ///
    /// Maps yield `[key, value]` pairs and anything that is not a collection
    /// yields nothing. A non-empty string always yields itself, ignoring the
    /// window.
    pub(crate) fn to_items(&self, from: usize, to: Option<usize>) -> Items {
        let take = |len: usize| to.map_or(len, |to| to.min(len)).saturating_sub(from);
        let items = match self {
            Self::List(list) => list.iter().skip(from).take(take(list.len())).cloned().collect(),
            Self::Map(map) => map
                .iter()
                .skip(from)
                .take(take(map.len()))
                .map(|(k, v)| Self::List(vec![Self::String(k.clone()), v.clone()]))
                .collect(),
            Self::Range(a, b) => return Items::range(*a, *b, from, to),
            Self::String(s) if !s.is_empty() => vec![self.clone()],
            Self::Object(obj) => {
                let items = obj.iter().unwrap_or_default();
                let len = items.len();
                items.into_iter().skip(from).take(take(len)).collect()
            }
            _ => Vec::new(),
        };
        Items::list(items)
    }

    /// Writes this value as template output.
    pub(crate) fn render(&self, out: &mut String) {
        match self {
            Self::None => {}
            Self::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            Self::Integer(i) => {
                let _ = write!(out, "{i}");
            }
            Self::Float(f) => {
                let _ = write!(out, "{f:?}");
            }
            Self::String(s) => out.push_str(s),
            Self::List(list) => {
                for item in list {
                    item.render(out);
                }
            }
            Self::Map(_) => self.inspect(out),
            Self::Range(a, b) => {
                let _ = write!(out, "{a}..{b}");
            }
            Self::Object(obj) => obj.render(out),
        }
    }

    /// Writes a debug representation, used for values nested in maps.
    fn inspect(&self, out: &mut String) {
        match self {
            Self::None => out.push_str("nil"),
            Self::String(s) => {
                let _ = write!(out, "{s:?}");
            }
            Self::List(list) => {
                out.push('[');
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.inspect(out);
                }
                out.push(']');
            }
            Self::Map(map) => {
                out.push('{');
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{k:?}=>");
                    v.inspect(out);
                }
                out.push('}');
            }
            v => v.render(out),
        }
    }

    /// Renders this value to a new string.
    pub fn to_output(&self) -> String {
        let mut s = String::new();
        self.render(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
    }

    #[test]
    fn blank_and_empty() {
        assert!(Value::from("  \n").is_blank());
        assert!(!Value::from("  \n").is_empty());
        assert!(Value::None.is_blank());
        assert!(!Value::None.is_empty());
        assert!(Value::List(Vec::new()).is_empty());
    }

    #[test]
    fn numbers_compare_across_types() {
        assert_eq!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::Integer(1), Value::from("1"));
    }

    #[test]
    fn to_int_lossy() {
        assert_eq!(Value::from("12abc").to_int_lossy(), 12);
        assert_eq!(Value::from("abc").to_int_lossy(), 0);
        assert_eq!(Value::from(" -4").to_int_lossy(), -4);
        assert_eq!(Value::Float(2.9).to_int_lossy(), 2);
        assert_eq!(Value::None.to_int_lossy(), 0);
    }

    #[test]
    fn to_integer_rejects_floats() {
        assert_eq!(Value::from("7").to_integer().unwrap(), 7);
        let err = Value::Float(1.5).to_integer().unwrap_err();
        assert_eq!(err.message(), "invalid integer");
    }

    #[test]
    fn render_values() {
        assert_eq!(Value::Float(1.0).to_output(), "1.0");
        assert_eq!(Value::Range(1, 3).to_output(), "1..3");
        assert_eq!(Value::from(vec![1, 2, 3]).to_output(), "123");
        let map: Value = [("a", Value::from(1)), ("b", Value::from("x"))].into();
        assert_eq!(map.to_output(), r#"{"a"=>1, "b"=>"x"}"#);
    }

    #[test]
    fn items_window() {
        let items = |value: Value, from, to| value.to_items(from, to).collect::<Vec<_>>();
        let range = Value::Range(1, 6);
        assert_eq!(items(range.clone(), 2, Some(4)), [Value::Integer(3), Value::Integer(4)]);
        assert_eq!(items(range.clone(), 5, None), [Value::Integer(6)]);
        assert!(items(range, 9, None).is_empty());
        assert_eq!(items(Value::from("abc"), 0, None), [Value::from("abc")]);
        assert_eq!(items(Value::from("abc"), 3, Some(1)), [Value::from("abc")]);
        assert!(items(Value::from(""), 0, None).is_empty());
        let map = Value::from([("a", 1), ("b", 2)]);
        assert_eq!(items(map, 1, None), [Value::from(vec![Value::from("b"), Value::from(2)])]);
    }

    #[test]
    fn extreme_range_commands() {
        let range = Value::Range(-9_000_000_000_000_000_000, 9_000_000_000_000_000_000);
        assert_eq!(range.command(Command::Size), Some(Value::Integer(i64::MAX)));
        assert_eq!(range.command(Command::First), Some(Value::Integer(-9_000_000_000_000_000_000)));
        assert_eq!(Value::Range(3, 1).command(Command::Size), Some(Value::Integer(0)));
    }
}
