use std::fmt;

use crate::render::Context;
use crate::Value;

/// A host value that resolves its keys on demand.
///
/// Objects let the host expose computed or expensive data to templates
/// without converting everything to a [`Value`] up front. Every method has a
/// default except [`get`][Object::get].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tincture::{Engine, Object, Value};
///
/// #[derive(Debug)]
/// struct User;
///
/// impl Object for User {
///     fn get(&self, key: &str) -> Option<Value> {
///         match key {
///             "name" => Some(Value::from("John")),
///             _ => None,
///         }
///     }
/// }
///
/// let engine = Engine::new();
/// let template = engine.compile("Hello {{ user.name }}!")?;
/// let data = Value::from([("user", Value::Object(Arc::new(User)))]);
/// let result = template.render_from(&data).to_string()?;
/// assert_eq!(result, "Hello John!");
/// # Ok::<(), tincture::Error>(())
/// ```
pub trait Object: fmt::Debug + Send + Sync {
    /// Returns the value for `key`, or `None` if there is no such key.
    fn get(&self, key: &str) -> Option<Value>;

    /// Returns the result of a command accessor like `size`, or `None` if the
    /// object does not support it.
    fn command(&self, command: Command) -> Option<Value> {
        let _ = command;
        None
    }

    /// Called every time a lookup reaches this object. Returning a value
    /// replaces the object for the rest of the lookup.
    fn bind(&self, ctx: &Context<'_>) -> Option<Value> {
        let _ = ctx;
        None
    }

    /// Returns the items to use when this object is iterated by a loop.
    fn iter(&self) -> Option<Vec<Value>> {
        None
    }

    /// Writes this object as template output.
    fn render(&self, out: &mut String) {
        let _ = out;
    }
}

/// A command accessor, applied when a lookup ends in `.size`, `.first` or
/// `.last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Size,
    First,
    Last,
}

impl Command {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "size" => Some(Self::Size),
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            _ => None,
        }
    }

    /// The key this command is written as.
    pub fn name(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::First => "first",
            Self::Last => "last",
        }
    }
}
