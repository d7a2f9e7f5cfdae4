//! Compile template source into a tree of nodes.
//!
//! This process has three layers:
//! - The tokenizer chunks the template source into text, tag and output
//!   segments.
//! - The block parser builds the node tree, dispatching tags to the
//!   constructors in the [`TagRegistry`].
//! - Tag and output markup is parsed either with the fragment patterns in
//!   [`syntax`] (lax) or with the [`lex`] based [`parser`] (strict).

mod block;
pub mod lex;
pub mod parser;
pub mod syntax;
pub mod tokenize;

pub use crate::compile::block::{parse_body, unknown_tag};

use crate::compile::tokenize::Tokenizer;
use crate::tags::TagRegistry;
use crate::types::node::Document;
use crate::types::span::Span;
use crate::{Error, Result};

/// How strictly tag and output markup is parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Match markup by fragment, silently ignoring anything unrecognised.
    #[default]
    Lax,
    /// Parse markup strictly, recording failures as warnings and falling
    /// back to lax parsing.
    Warn,
    /// Parse markup strictly, failing on anything malformed.
    Strict,
}

/// State for a single parse.
pub struct ParseContext<'a> {
    registry: &'a TagRegistry,
    mode: ErrorMode,
    max_depth: usize,
    depth: usize,
    line: Option<usize>,
    span: Span,
    pub(crate) trim_whitespace: bool,
    warnings: Vec<Error>,
}

/// Options that control parsing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Options {
    pub mode: ErrorMode,
    pub max_depth: usize,
    pub line_numbers: bool,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn new(registry: &'a TagRegistry, mode: ErrorMode, max_depth: usize) -> Self {
        Self {
            registry,
            mode,
            max_depth,
            depth: 0,
            line: None,
            span: Span::from(0..0),
            trim_whitespace: false,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn registry(&self) -> &'a TagRegistry {
        self.registry
    }

    /// The configured error mode.
    pub fn error_mode(&self) -> ErrorMode {
        self.mode
    }

    /// The line of the token currently being parsed.
    pub fn line_number(&self) -> Option<usize> {
        self.line
    }

    pub(crate) fn set_position(&mut self, line: Option<usize>, span: Span) {
        self.line = line;
        self.span = span;
    }

    /// Enters a nested body, failing if this would exceed the maximum depth.
    pub(crate) fn enter(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(Error::stack_level());
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.depth -= 1;
    }

    /// Parses markup with the parser selected by the error mode.
    pub fn parse_with<T, S, L>(&mut self, markup: &str, strict: S, lax: L) -> Result<T>
    where
        S: FnOnce(&str) -> Result<T>,
        L: FnOnce(&str) -> Result<T>,
    {
        match self.mode {
            ErrorMode::Lax => lax(markup),
            ErrorMode::Strict => strict(markup).map_err(|err| err.with_markup_context(markup)),
            ErrorMode::Warn => match strict(markup) {
                Ok(value) => Ok(value),
                Err(err) => {
                    let err = err.with_markup_context(markup).with_line(self.line);
                    tracing::warn!(line = ?self.line, "{}", err.message());
                    self.warnings.push(err);
                    lax(markup)
                }
            },
        }
    }
}

/// Compile a template into a document.
///
/// Returns the document along with any warnings recorded in
/// [`ErrorMode::Warn`].
pub(crate) fn document(
    registry: &TagRegistry,
    options: Options,
    source: &str,
    name: Option<&str>,
) -> Result<(Document, Vec<Error>)> {
    let mut tokens = Tokenizer::new(source, options.line_numbers);
    let mut ctx = ParseContext::new(registry, options.mode, options.max_depth);
    match Document::parse(&mut tokens, &mut ctx) {
        Ok(document) => Ok((document, ctx.warnings)),
        Err(err) => Err(err
            .with_line(ctx.line)
            .with_template_name(name)
            .with_span(source, ctx.span)),
    }
}
