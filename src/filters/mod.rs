//! Filters are functions applied to output with the `|` operator, e.g.
//! `{{ name | append: "!" }}`.

mod args;
#[cfg(feature = "builtins")]
pub mod builtins;

use std::collections::BTreeMap;
use std::fmt;

pub use crate::filters::args::FilterArg;
use crate::{Error, Result, Value};

/// A type-erased filter function, taking the piped value and the arguments.
pub type FilterFn = dyn Fn(Value, Vec<Value>) -> Result<Value> + Send + Sync + 'static;

pub fn new<F, R, A>(f: F) -> Box<FilterFn>
where
    F: Filter<R, A> + Send + Sync + 'static,
    R: FilterReturn,
    A: FilterArgs,
{
    Box::new(move |value: Value, args: Vec<Value>| -> Result<Value> {
        let args = A::from_values(value, args)?;
        FilterReturn::to_value(f.filter(args))
    })
}

/// Represents any filter function.
///
/// This trait is used by [`Engine::add_filter`][crate::Engine::add_filter]
/// to abstract over functions and closures with different arities, argument
/// types and return types. The first argument always receives the piped
/// value and up to four more arguments can follow. Arguments are checked when
/// the filter is applied.
///
/// [`Filter`] is implemented for functions that return any of the following
/// types.
///
/// - `R` where `R` implements `Into<Value>`
/// - `Option<R>` where `R` implements `Into<Value>`
/// - `Result<R>` where `R` implements `Into<Value>`
///
/// Arguments can be any of the following types.
/// - [`bool`]
/// - [`i64`]
/// - [`f64`], which also accepts integers
/// - [`String`], which accepts any value using its output form
/// - [`Vec<Value>`]
/// - [`BTreeMap<String, Value>`][std::collections::BTreeMap]
/// - [`Value`]
/// - [`Option<T>`] of any of the above, for trailing arguments that can be
///   left out
///
/// Keyword arguments like `truncate: 5, omission: "..."` are collected into a
/// map that is passed as the last argument.
///
/// # Examples
///
/// ```
/// use tincture::{Engine, Value};
///
/// let mut engine = Engine::new();
/// engine.add_filter("split", split);
///
/// fn split(s: String, sep: Option<String>) -> Vec<String> {
///     let sep = sep.unwrap_or_else(|| " ".into());
///     s.split(sep.as_str()).map(String::from).collect()
/// }
///
/// let template = engine.compile(r#"{{ "a b c" | split | size }}"#)?;
/// assert_eq!(template.render_from(&Value::None).to_string()?, "3");
/// # Ok::<(), tincture::Error>(())
/// ```
pub trait Filter<R, A> {
    #[doc(hidden)]
    fn filter(&self, args: A) -> R;
}

#[doc(hidden)]
pub trait FilterArgs: Sized {
    fn from_values(value: Value, args: Vec<Value>) -> Result<Self>;
}

pub trait FilterReturn {
    fn to_value(self) -> Result<Value>;
}

macro_rules! impl_filter {
    ($($arg:ident $var:ident)*) => {
        impl<Func, R, V, $($arg,)*> Filter<R, (V, $($arg,)*)> for Func
        where
            Func: Fn(V, $($arg,)*) -> R,
            R: FilterReturn,
            V: FilterArg,
            $($arg: FilterArg,)*
        {
            fn filter(&self, (v, $($var,)*): (V, $($arg,)*)) -> R {
                self(v, $($var,)*)
            }
        }

        impl<V, $($arg,)*> FilterArgs for (V, $($arg,)*)
        where
            V: FilterArg,
            $($arg: FilterArg,)*
        {
            #[allow(unused_mut, unused_variables)]
            fn from_values(value: Value, args: Vec<Value>) -> Result<Self> {
                let expected = count!($($arg)*);
                let given = args.len();
                if given > expected {
                    return Err(err_arity(given, expected));
                }
                let v = V::from_value(Some(value)).map_err(err_expected_val)?;
                let mut args = args.into_iter();
                $(
                    let $var = $arg::from_value(args.next())
                        .map_err(|e| err_expected_arg(e, given, expected))?;
                )*
                Ok((v, $($var,)*))
            }
        }
    };
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

impl_filter! {}
impl_filter! { A a }
impl_filter! { A a B b }
impl_filter! { A a B b C c }
impl_filter! { A a B b C c D d }

fn err_arity(given: usize, expected: usize) -> Error {
    Error::argument(format!(
        "wrong number of arguments (given {given}, expected {expected})"
    ))
}

fn err_expected_arg(err: args::Error, given: usize, expected: usize) -> Error {
    match err {
        args::Error::Type(exp, got) => {
            Error::argument(format!("filter expected {exp} argument, found {got}"))
        }
        args::Error::Missing => err_arity(given, expected),
    }
}

fn err_expected_val(err: args::Error) -> Error {
    match err {
        args::Error::Type(exp, got) => {
            Error::argument(format!("filter expected {exp} value, found {got}"))
        }
        args::Error::Missing => Error::argument("filter expected a value"),
    }
}

impl<T> FilterReturn for T
where
    T: Into<Value>,
{
    fn to_value(self) -> Result<Value> {
        Ok(self.into())
    }
}

impl<T> FilterReturn for Result<T>
where
    T: Into<Value>,
{
    fn to_value(self) -> Result<Value> {
        self.map(Into::into)
    }
}

/// A set of named filters.
#[derive(Default)]
pub struct Filters {
    map: BTreeMap<String, Box<FilterFn>>,
}

impl Filters {
    /// An empty set of filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in filters, if the `builtins` feature is enabled.
    pub fn with_builtins() -> Self {
        #[allow(unused_mut)]
        let mut filters = Self::new();
        #[cfg(feature = "builtins")]
        builtins::register(&mut filters);
        filters
    }

    pub fn insert<F, R, A>(&mut self, name: impl Into<String>, f: F)
    where
        F: Filter<R, A> + Send + Sync + 'static,
        R: FilterReturn,
        A: FilterArgs,
    {
        self.map.insert(name.into(), new(f));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.map.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&FilterFn> {
        self.map.get(name).map(|f| &**f)
    }
}

impl fmt::Debug for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}
