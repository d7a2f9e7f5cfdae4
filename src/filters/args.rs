use crate::value::Map;
use crate::Value;

pub type Result<T> = std::result::Result<T, Error>;

pub enum Error {
    /// When there is a type mismatch.
    Type(
        /// Expected
        &'static str,
        /// Got
        &'static str,
    ),
    /// When a required argument was not passed.
    Missing,
}

/// A type that a filter argument can be converted into.
///
/// `None` is passed when the template did not provide the argument.
pub trait FilterArg: Sized {
    fn from_value(v: Option<Value>) -> Result<Self>;
}

fn required(v: Option<Value>) -> Result<Value> {
    v.ok_or(Error::Missing)
}

impl FilterArg for Value {
    fn from_value(v: Option<Value>) -> Result<Self> {
        required(v)
    }
}

impl FilterArg for bool {
    fn from_value(v: Option<Value>) -> Result<Self> {
        match required(v)? {
            Value::Bool(b) => Ok(b),
            v => Err(Error::Type("bool", v.human())),
        }
    }
}

impl FilterArg for i64 {
    fn from_value(v: Option<Value>) -> Result<Self> {
        match required(v)? {
            Value::Integer(i) => Ok(i),
            v => Err(Error::Type("integer", v.human())),
        }
    }
}

impl FilterArg for f64 {
    fn from_value(v: Option<Value>) -> Result<Self> {
        match required(v)? {
            Value::Integer(i) => Ok(i as f64),
            Value::Float(f) => Ok(f),
            v => Err(Error::Type("float", v.human())),
        }
    }
}

/// Any value is accepted as a string, using its output form.
impl FilterArg for String {
    fn from_value(v: Option<Value>) -> Result<Self> {
        match required(v)? {
            Value::String(s) => Ok(s),
            v => Ok(v.to_output()),
        }
    }
}

impl FilterArg for Vec<Value> {
    fn from_value(v: Option<Value>) -> Result<Self> {
        match required(v)? {
            Value::List(list) => Ok(list),
            v => Err(Error::Type("list", v.human())),
        }
    }
}

impl FilterArg for Map<String, Value> {
    fn from_value(v: Option<Value>) -> Result<Self> {
        match required(v)? {
            Value::Map(map) => Ok(map),
            v => Err(Error::Type("map", v.human())),
        }
    }
}

/// An optional trailing argument.
impl<T: FilterArg> FilterArg for Option<T> {
    fn from_value(v: Option<Value>) -> Result<Self> {
        match v {
            Some(v) => T::from_value(Some(v)).map(Some),
            None => Ok(None),
        }
    }
}
