//! Render a compiled template against some data.

mod context;
mod core;
mod limits;

use std::io;

pub use crate::render::context::{Context, ErrorHandler, Registers};
pub use crate::render::limits::ResourceLimits;

use crate::render::context::Settings;
use crate::{Error, Result, Template, Value};

/// How a render of some nodes ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// All nodes were rendered.
    Normal,
    /// A `{% break %}` was reached.
    Break,
    /// A `{% continue %}` was reached.
    Continue,
}

/// A renderer that interprets a compiled [`Template`].
///
/// This struct is created by one of the following functions:
/// - [`Template::render`]
/// - [`Template::render_from`]
#[must_use = "must call `.to_string()` or `.to_writer(..)` on the renderer"]
pub struct Renderer<'render> {
    template: &'render Template<'render>,
    globals: Globals<'render>,
    registers: Option<&'render mut Registers>,
    limits: ResourceLimits,
    strict_variables: bool,
    strict_filters: bool,
    rethrow: bool,
    handler: Option<Box<ErrorHandler<'render>>>,
    errors: Option<&'render mut Vec<Error>>,
}

pub(crate) enum Globals<'render> {
    Owned(Result<Value>),
    Borrowed(&'render Value),
}

impl<'render> Renderer<'render> {
    pub(crate) fn new(template: &'render Template<'render>, globals: Globals<'render>) -> Self {
        Self {
            template,
            globals,
            registers: None,
            limits: ResourceLimits::new(),
            strict_variables: false,
            strict_filters: false,
            rethrow: false,
            handler: None,
            errors: None,
        }
    }

    /// Use the given registers instead of a fresh set.
    ///
    /// This lets stateful tags, like `for` with `offset: continue` or
    /// `cycle`, pick up where a previous render left off.
    pub fn with_registers(mut self, registers: &'render mut Registers) -> Self {
        self.registers = Some(registers);
        self
    }

    /// Fail lookups of undefined variables and object keys.
    pub fn with_strict_variables(mut self, yes: bool) -> Self {
        self.strict_variables = yes;
        self
    }

    /// Fail when an undefined filter is used.
    pub fn with_strict_filters(mut self, yes: bool) -> Self {
        self.strict_filters = yes;
        self
    }

    /// Abort the render on the first error instead of replacing the failing
    /// node's output.
    pub fn with_rethrow(mut self, yes: bool) -> Self {
        self.rethrow = yes;
        self
    }

    /// Set the function that produces the replacement output for a node that
    /// failed to render.
    ///
    /// Defaults to the error's [`Display`][std::fmt::Display] output.
    pub fn with_error_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&Error) -> String + 'render,
    {
        self.handler = Some(Box::new(f));
        self
    }

    /// Set the resource limits for this render.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Collect the errors that were replaced in the output.
    pub fn with_errors(mut self, errors: &'render mut Vec<Error>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Render the template to a string.
    pub fn to_string(self) -> Result<String> {
        let mut s = String::with_capacity(self.template.source_len());
        self.render(&mut s)?;
        Ok(s)
    }

    /// Render the template to the given writer.
    pub fn to_writer<W>(self, mut w: W) -> Result<()>
    where
        W: io::Write,
    {
        let s = self.to_string()?;
        w.write_all(s.as_bytes())?;
        Ok(())
    }

    fn render(self, out: &mut String) -> Result<()> {
        let Self {
            template,
            globals,
            registers,
            limits,
            strict_variables,
            strict_filters,
            rethrow,
            handler,
            errors,
        } = self;

        let owned;
        let globals = match globals {
            Globals::Owned(result) => {
                owned = result?;
                &owned
            }
            Globals::Borrowed(value) => value,
        };
        let mut fresh = Registers::new();
        let registers = match registers {
            Some(registers) => registers,
            None => &mut fresh,
        };
        let settings = Settings {
            strict_variables,
            strict_filters,
            rethrow,
            handler: handler.as_deref(),
            template_name: template.name(),
        };

        let mut ctx = Context::new(globals, registers, limits, template.filters(), settings);
        let result = template.document().render(&mut ctx, out);
        if let Some(errors) = errors {
            errors.extend(ctx.take_errors());
        }
        result
    }
}
