//! Built-in filters.

use crate::filters::Filters;
use crate::value::{Command, Map};
use crate::Value;

pub(crate) fn register(filters: &mut Filters) {
    filters.insert("upcase", upcase);
    filters.insert("downcase", downcase);
    filters.insert("capitalize", capitalize);
    filters.insert("append", append);
    filters.insert("prepend", prepend);
    filters.insert("strip", strip);
    filters.insert("size", size);
    filters.insert("first", first);
    filters.insert("last", last);
    filters.insert("join", join);
    filters.insert("reverse", reverse);
    filters.insert("default", default);
    filters.insert("plus", plus);
    filters.insert("minus", minus);
    filters.insert("times", times);
}

/// Converts a string to uppercase.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn upcase(s: String) -> String {
    s.to_uppercase()
}

/// Converts a string to lowercase.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn downcase(s: String) -> String {
    s.to_lowercase()
}

/// Uppercases the first character and lowercases the rest.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn capitalize(s: String) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => s,
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn append(s: String, suffix: String) -> String {
    s + &suffix
}

#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn prepend(s: String, prefix: String) -> String {
    prefix + &s
}

/// Removes leading and trailing whitespace.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn strip(s: String) -> String {
    s.trim().to_owned()
}

/// Returns the number of characters in a string or elements in a collection,
/// and zero for anything else.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn size(value: Value) -> Value {
    value.command(Command::Size).unwrap_or(Value::Integer(0))
}

/// Returns the first element of a list.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn first(value: Value) -> Option<Value> {
    value.command(Command::First)
}

/// Returns the last element of a list.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn last(value: Value) -> Option<Value> {
    value.command(Command::Last)
}

/// Joins the elements of a list with a separator, a space by default.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn join(value: Value, sep: Option<String>) -> String {
    let sep = sep.as_deref().unwrap_or(" ");
    match value {
        Value::List(list) => list
            .iter()
            .map(Value::to_output)
            .collect::<Vec<_>>()
            .join(sep),
        value => value.to_output(),
    }
}

/// Reverses the elements of a collection.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn reverse(value: Value) -> Vec<Value> {
    match value {
        Value::List(mut list) => {
            list.reverse();
            list
        }
        value => {
            let mut items = value.to_items(0, None);
            items.reverse();
            items.collect()
        }
    }
}

/// Returns the default if the value is nil, false or empty.
///
/// Pass `allow_false: true` to keep `false` values.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn default(value: Value, default: Option<Value>, options: Option<Map<String, Value>>) -> Value {
    let allow_false = options
        .as_ref()
        .and_then(|o| o.get("allow_false"))
        .map_or(false, Value::is_truthy);
    let missing = match value {
        Value::Bool(false) => !allow_false,
        ref value => !value.is_truthy() || value.is_empty(),
    };
    match missing {
        true => default.unwrap_or_else(|| Value::String(String::new())),
        false => value,
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn plus(a: Value, b: Value) -> Value {
    arithmetic(a, b, i64::wrapping_add, |a, b| a + b)
}

#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn minus(a: Value, b: Value) -> Value {
    arithmetic(a, b, i64::wrapping_sub, |a, b| a - b)
}

#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn times(a: Value, b: Value) -> Value {
    arithmetic(a, b, i64::wrapping_mul, |a, b| a * b)
}

enum Number {
    Integer(i64),
    Float(f64),
}

fn to_number(value: &Value) -> Number {
    match value {
        Value::Integer(i) => Number::Integer(*i),
        Value::Float(f) => Number::Float(*f),
        Value::String(s) if s.trim().contains('.') => match s.trim().parse() {
            Ok(f) => Number::Float(f),
            Err(_) => Number::Integer(value.to_int_lossy()),
        },
        value => Number::Integer(value.to_int_lossy()),
    }
}

fn arithmetic(a: Value, b: Value, int: fn(i64, i64) -> i64, float: fn(f64, f64) -> f64) -> Value {
    match (to_number(&a), to_number(&b)) {
        (Number::Integer(a), Number::Integer(b)) => Value::Integer(int(a, b)),
        (Number::Integer(a), Number::Float(b)) => Value::Float(float(a as f64, b)),
        (Number::Float(a), Number::Integer(b)) => Value::Float(float(a, b as f64)),
        (Number::Float(a), Number::Float(b)) => Value::Float(float(a, b)),
    }
}
