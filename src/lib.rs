//! A safe, extensible template engine for the Liquid language.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Output: `{{ user.name }}`
//! - Filters: `{{ user.name | upcase | append: "!" }}`
//! - Conditionals: `{% if user.admin %} ... {% elsif user.mod %} ... {% endif %}`
//! - Loops: `{% for item in cart limit: 3 %} ... {% endfor %}`
//! - Assignment: `{% assign total = cart.size %}`
//! - Whitespace control: `{%- if x -%}` strips whitespace either side
//!
//! ### Engine
//!
//! - Lax, warn and strict parsing modes
//! - Custom tags and filters, registered per [`Engine`]
//! - Render errors substituted inline or returned, your choice
//! - Resource limits on output size, work done and memory assigned
//! - Render using any [`serde`] serializable values
//! - Convenient macro for quick rendering:
//!   `tincture::value!{ name: "John", age: 42 }`
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores the tag
//! registry, filter functions, and parse settings. Generally, you only need
//! to construct one engine during the lifetime of a program.
//!
//! ```
//! let engine = tincture::Engine::new();
//! ```
//!
//! Next, [`.compile`][Engine::compile] is used to parse a template.
//!
//! ```
//! # let engine = tincture::Engine::new();
//! let template = engine.compile("Hello {{ user.name }}!")?;
//! # Ok::<(), tincture::Error>(())
//! ```
//!
//! Finally, the template is rendered by calling
//! [`.render`][Template::render] and then
//! [`.to_string`][Renderer::to_string] on the returned renderer.
//!
//! ```
//! # let engine = tincture::Engine::new();
//! # let template = engine.compile("Hello {{ user.name }}!")?;
//! let result = template
//!     .render(tincture::value! { user: { name: "John Smith" } })
//!     .to_string()?;
//! assert_eq!(result, "Hello John Smith!");
//! # Ok::<(), tincture::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Render using structured data
//!
//! ```
//! #[derive(serde::Serialize)]
//! struct Data { user: User }
//!
//! #[derive(serde::Serialize)]
//! struct User { name: String, orders: Vec<u32> }
//!
//! let data = Data {
//!     user: User { name: "John Smith".into(), orders: vec![7, 11] },
//! };
//!
//! let engine = tincture::Engine::new();
//! let result = engine
//!     .compile("{{ user.name }}: {% for o in user.orders %}#{{ o }} {% endfor %}")?
//!     .render(&data)
//!     .to_string()?;
//! assert_eq!(result, "John Smith: #7 #11 ");
//! # Ok::<(), tincture::Error>(())
//! ```
//!
//! ### Handle errors
//!
//! By default an error while rendering a node is written into the output in
//! place of that node and the render carries on. Errors can be collected or
//! made fatal instead.
//!
//! ```
//! let engine = tincture::Engine::new();
//! let template = engine.compile("a{{ x }}c{{ y }}")?;
//!
//! let mut errors = Vec::new();
//! let result = template
//!     .render(tincture::value! { y: 1 })
//!     .with_strict_variables(true)
//!     .with_errors(&mut errors)
//!     .to_string()?;
//! assert_eq!(result, "aerror (line 1): undefined variable xc1");
//! assert_eq!(errors.len(), 1);
//!
//! let err = template
//!     .render(tincture::value! { y: 1 })
//!     .with_strict_variables(true)
//!     .with_rethrow(true)
//!     .to_string()
//!     .unwrap_err();
//! assert_eq!(err.to_string(), "error (line 1): undefined variable x");
//! # Ok::<(), tincture::Error>(())
//! ```
//!
//! ### Add a filter
//!
//! ```
//! let mut engine = tincture::Engine::new();
//! engine.add_filter("shout", |s: String| s.to_uppercase() + "!");
//!
//! let result = engine
//!     .compile("{{ name | shout }}")?
//!     .render(tincture::value! { name: "hi" })
//!     .to_string()?;
//! assert_eq!(result, "HI!");
//! # Ok::<(), tincture::Error>(())
//! ```
//!
//! # Crate features
//!
//! All of the following are enabled by default.
//!
//! - **`builtins`**: registers the built-in filters like `upcase` and
//!   `append` on new engines.
//! - **`serde`**: enables rendering any [`serde::Serialize`] data, along
//!   with [`to_value`].
//! - **`unicode`**: allows unicode identifiers in expressions and measures
//!   error carets by display width.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod compile;
mod error;
mod expr;
mod filters;
mod macros;
mod render;
mod tags;
mod types;
mod value;

use std::fmt;

pub use crate::compile::tokenize::{Token, TokenKind, Tokenizer};
pub use crate::compile::{parse_body, unknown_tag, ErrorMode, ParseContext};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::filters::{Filter, FilterArg};
pub use crate::render::{Context, ErrorHandler, Flow, Registers, Renderer, ResourceLimits};
pub use crate::tags::{Tag, TagInfo, TagRegistry, TagStart};
pub use crate::types::node::{BlockBody, Document, Node};
#[cfg(feature = "serde")]
pub use crate::value::to_value;
pub use crate::value::{Command, Map, Object, Value};

use crate::compile::Options;
use crate::filters::{FilterArgs, FilterReturn, Filters};
use crate::render::Globals;

/// The compilation engine.
///
/// Holds the tag registry, the filters, and the settings used to parse
/// templates.
pub struct Engine {
    tags: TagRegistry,
    filters: Filters,
    options: Options,
}

/// A compiled template.
pub struct Template<'engine> {
    engine: &'engine Engine,
    document: Document,
    name: Option<String>,
    warnings: Vec<Error>,
    source_len: usize,
}

impl Default for Engine {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Construct a new engine with the standard tags and the built-in
    /// filters.
    #[inline]
    pub fn new() -> Self {
        Self::with_tags(TagRegistry::with_defaults())
    }

    /// Construct a new engine with the given tag registry.
    #[inline]
    pub fn with_tags(tags: TagRegistry) -> Self {
        Self {
            tags,
            filters: Filters::with_builtins(),
            options: Options {
                mode: ErrorMode::Lax,
                max_depth: 100,
                line_numbers: true,
            },
        }
    }

    /// Set how markup is parsed. Defaults to [`ErrorMode::Lax`].
    #[inline]
    pub fn set_error_mode(&mut self, mode: ErrorMode) {
        self.options.mode = mode;
    }

    /// Set how deep blocks may be nested. Defaults to 100, the document
    /// itself counting as one level.
    #[inline]
    pub fn set_max_depth(&mut self, depth: usize) {
        self.options.max_depth = depth;
    }

    /// Set whether to track line numbers for errors. Defaults to `true`.
    #[inline]
    pub fn set_line_numbers(&mut self, enabled: bool) {
        self.options.line_numbers = enabled;
    }

    /// Register a custom tag, replacing any tag with the same name.
    ///
    /// # Examples
    ///
    /// ```
    /// use tincture::{Context, Engine, Flow, ParseContext, Result, Tag, TagInfo, TagStart, Tokenizer};
    ///
    /// #[derive(Debug)]
    /// struct Hello(TagInfo);
    ///
    /// impl Tag for Hello {
    ///     fn info(&self) -> &TagInfo {
    ///         &self.0
    ///     }
    ///
    ///     fn render(&self, _: &mut Context<'_>, out: &mut String) -> Result<Flow> {
    ///         out.push_str("Hello ");
    ///         out.push_str(self.markup().trim());
    ///         Ok(Flow::Normal)
    ///     }
    /// }
    ///
    /// fn hello(start: TagStart<'_>, _: &mut Tokenizer<'_>, _: &mut ParseContext<'_>) -> Result<Box<dyn Tag>> {
    ///     Ok(Box::new(Hello(start.into())))
    /// }
    ///
    /// let mut engine = Engine::new();
    /// engine.register_tag("hello", hello);
    /// let result = engine.compile("{% hello world %}")?.render_from(&tincture::Value::None).to_string()?;
    /// assert_eq!(result, "Hello world");
    /// # Ok::<(), tincture::Error>(())
    /// ```
    #[inline]
    pub fn register_tag<F>(&mut self, name: impl Into<String>, parser: F)
    where
        F: Fn(TagStart<'_>, &mut Tokenizer<'_>, &mut ParseContext<'_>) -> Result<Box<dyn Tag>>
            + Send
            + Sync
            + 'static,
    {
        self.tags.register(name, parser);
    }

    /// Returns the tag registry.
    #[inline]
    pub fn tags_mut(&mut self) -> &mut TagRegistry {
        &mut self.tags
    }

    /// Add a new filter to the engine, replacing any filter with the same
    /// name.
    ///
    /// See [`Filter`] for the functions that can be used.
    #[inline]
    pub fn add_filter<F, R, A>(&mut self, name: impl Into<String>, f: F)
    where
        F: Filter<R, A> + Send + Sync + 'static,
        R: FilterReturn,
        A: FilterArgs,
    {
        self.filters.insert(name, f);
    }

    /// Remove a filter from the engine.
    #[inline]
    pub fn remove_filter(&mut self, name: &str) -> bool {
        self.filters.remove(name)
    }

    /// Compile a template.
    #[inline]
    pub fn compile(&self, source: &str) -> Result<Template<'_>> {
        self.compile_impl(source, None)
    }

    /// Compile a template with a name that is included in errors.
    #[inline]
    pub fn compile_named(&self, name: impl Into<String>, source: &str) -> Result<Template<'_>> {
        self.compile_impl(source, Some(name.into()))
    }

    fn compile_impl(&self, source: &str, name: Option<String>) -> Result<Template<'_>> {
        let (document, warnings) = compile::document(&self.tags, self.options, source, name.as_deref())?;
        Ok(Template {
            engine: self,
            document,
            name,
            warnings,
            source_len: source.len(),
        })
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("tags", &self.tags)
            .field("filters", &self.filters)
            .field("error_mode", &self.options.mode)
            .field("max_depth", &self.options.max_depth)
            .finish()
    }
}

impl<'engine> Template<'engine> {
    /// Render the template using the provided serializable data.
    ///
    /// Returns a [`Renderer`] to configure the render with before calling
    /// [`.to_string`][Renderer::to_string]. [`Object`]s do not survive
    /// serialization and become nil, use [`.render_from`][Template::render_from]
    /// to render data containing them.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render<S>(&self, data: S) -> Renderer<'_>
    where
        S: serde::Serialize,
    {
        Renderer::new(self, Globals::Owned(to_value(data)))
    }

    /// Render the template using the provided value.
    #[inline]
    pub fn render_from<'render>(&'render self, data: &'render Value) -> Renderer<'render> {
        Renderer::new(self, Globals::Borrowed(data))
    }

    /// The name the template was compiled with, if any.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Markup errors that were recovered from in [`ErrorMode::Warn`].
    #[inline]
    pub fn warnings(&self) -> &[Error] {
        &self.warnings
    }

    /// The parsed node tree.
    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn filters(&self) -> &'engine Filters {
        &self.engine.filters
    }

    pub(crate) fn source_len(&self) -> usize {
        self.source_len
    }
}

impl fmt::Debug for Template<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}
