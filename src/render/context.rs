use std::collections::BTreeMap;

use crate::filters::Filters;
use crate::render::ResourceLimits;
use crate::value::Map;
use crate::{Error, Result, Value};

/// The maximum number of nested scopes.
const MAX_SCOPES: usize = 100;

/// A function that converts a render error into replacement output.
pub type ErrorHandler<'a> = dyn Fn(&Error) -> String + 'a;

/// State that stateful tags keep across tag instances, and optionally across
/// renders.
///
/// A fresh set of registers is used for every render unless one is passed
/// with [`Renderer::with_registers`][crate::Renderer::with_registers].
#[derive(Debug, Clone, Default)]
pub struct Registers {
    values: Map<String, Value>,
    pub(crate) for_offsets: BTreeMap<String, i64>,
    pub(crate) cycles: BTreeMap<String, usize>,
    pub(crate) ifchanged: Option<String>,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a free-form value stored by the host or a custom tag.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Forgets everything, including loop offsets and cycle positions.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The runtime state of a single render.
pub struct Context<'r> {
    /// Variable scopes, the outermost first.
    scopes: Vec<Map<String, Value>>,
    globals: &'r Value,
    registers: &'r mut Registers,
    limits: ResourceLimits,
    filters: &'r Filters,
    strict_variables: bool,
    strict_filters: bool,
    rethrow: bool,
    handler: Option<&'r ErrorHandler<'r>>,
    template_name: Option<&'r str>,
    errors: Vec<Error>,
    /// The `forloop` objects of the enclosing loops, innermost last.
    pub(crate) for_stack: Vec<Value>,
}

/// Render options, see [`Renderer`][crate::Renderer].
pub(crate) struct Settings<'r> {
    pub strict_variables: bool,
    pub strict_filters: bool,
    pub rethrow: bool,
    pub handler: Option<&'r ErrorHandler<'r>>,
    pub template_name: Option<&'r str>,
}

impl<'r> Context<'r> {
    pub(crate) fn new(
        globals: &'r Value,
        registers: &'r mut Registers,
        mut limits: ResourceLimits,
        filters: &'r Filters,
        settings: Settings<'r>,
    ) -> Self {
        limits.reset();
        Self {
            scopes: vec![Map::new()],
            globals,
            registers,
            limits,
            filters,
            strict_variables: settings.strict_variables,
            strict_filters: settings.strict_filters,
            rethrow: settings.rethrow,
            handler: settings.handler,
            template_name: settings.template_name,
            errors: Vec::new(),
            for_stack: Vec::new(),
        }
    }

    /// Looks up a variable in the scopes, innermost first, and then in the
    /// render data.
    pub fn find_variable(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| match self.globals {
                Value::Map(map) => map.get(name),
                _ => None,
            })
    }

    /// Sets a variable in the innermost scope.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// Sets a variable in the outermost scope, so that it outlives the
    /// current block.
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.first_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// Runs `f` with a fresh innermost scope.
    pub fn stack<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.scopes.len() >= MAX_SCOPES {
            return Err(Error::stack_level());
        }
        self.scopes.push(Map::new());
        let result = f(self);
        self.scopes.pop();
        result
    }

    pub fn registers(&mut self) -> &mut Registers {
        &mut *self.registers
    }

    pub fn limits(&mut self) -> &mut ResourceLimits {
        &mut self.limits
    }

    pub fn strict_variables(&self) -> bool {
        self.strict_variables
    }

    /// Applies a filter by name.
    ///
    /// An unknown filter returns the value unchanged, unless strict filters
    /// are enabled.
    pub fn apply_filter(&self, name: &str, value: Value, args: Vec<Value>) -> Result<Value> {
        match self.filters.get(name) {
            Some(f) => f(value, args),
            None if self.strict_filters => Err(Error::undefined_filter(name)),
            None => Ok(value),
        }
    }

    /// Records an error raised while rendering a node and returns the text
    /// to output in place of the node.
    ///
    /// Memory errors, and every error when rethrowing, are returned instead.
    pub(crate) fn handle_error(&mut self, err: Error, line: Option<usize>) -> Result<String> {
        let err = err.with_line(line).with_template_name(self.template_name);
        if err.is_memory() || self.rethrow {
            return Err(err);
        }
        tracing::debug!(kind = ?err.kind(), line = ?err.line_number(), "{}", err.message());
        let text = match self.handler {
            Some(handler) => handler(&err),
            None => err.to_string(),
        };
        self.errors.push(err);
        Ok(text)
    }

    pub(crate) fn take_errors(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn with_context<F>(globals: Value, f: F)
    where
        F: FnOnce(&mut Context<'_>),
    {
        let mut registers = Registers::new();
        let filters = Filters::new();
        let settings = Settings {
            strict_variables: false,
            strict_filters: false,
            rethrow: false,
            handler: None,
            template_name: None,
        };
        let mut ctx = Context::new(&globals, &mut registers, ResourceLimits::new(), &filters, settings);
        f(&mut ctx);
    }

    #[test]
    fn scopes_shadow_globals() {
        with_context(Value::from([("x", 1)]), |ctx| {
            assert_eq!(ctx.find_variable("x"), Some(&Value::Integer(1)));
            ctx.stack(|ctx| {
                ctx.set("x", Value::Integer(2));
                ctx.assign("y", Value::Integer(3));
                assert_eq!(ctx.find_variable("x"), Some(&Value::Integer(2)));
                Ok(())
            })
            .unwrap();
            assert_eq!(ctx.find_variable("x"), Some(&Value::Integer(1)));
            assert_eq!(ctx.find_variable("y"), Some(&Value::Integer(3)));
        });
    }

    #[test]
    fn stack_too_deep() {
        fn nest(ctx: &mut Context<'_>, n: usize) -> Result<()> {
            match n {
                0 => Ok(()),
                n => ctx.stack(|ctx| nest(ctx, n - 1)),
            }
        }
        with_context(Value::None, |ctx| {
            nest(ctx, 99).unwrap();
            let err = nest(ctx, 100).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StackLevel);
            assert_eq!(ctx.scopes.len(), 1);
        });
    }

    #[test]
    fn unknown_filter_passes_through() {
        with_context(Value::None, |ctx| {
            let v = ctx.apply_filter("nope", Value::Integer(1), Vec::new()).unwrap();
            assert_eq!(v, Value::Integer(1));
        });
    }

    #[test]
    fn handle_error_substitutes() {
        with_context(Value::None, |ctx| {
            let text = ctx.handle_error(Error::undefined_variable("x"), Some(2)).unwrap();
            assert_eq!(text, "error (line 2): undefined variable x");
            assert!(ctx.handle_error(Error::memory(), None).is_err());
            assert_eq!(ctx.take_errors().len(), 1);
        });
    }
}
