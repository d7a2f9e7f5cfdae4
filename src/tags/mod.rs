//! Tags: the `{% ... %}` constructs of the template language.
//!
//! Every tag is constructed at parse time by a function registered in a
//! [`TagRegistry`] under the tag's name. Block tags parse their own bodies
//! from the tokenizer before returning.

mod assign;
mod case;
mod comment;
mod cycle;
mod for_loop;
mod if_else;
mod interrupt;
mod table_row;

use std::collections::BTreeMap;
use std::fmt;

use crate::compile::tokenize::Tokenizer;
use crate::compile::ParseContext;
use crate::render::{Context, Flow};
use crate::types::node::BlockBody;
use crate::types::span::Span;
use crate::Result;

/// The opening of a tag, as handed to its constructor.
#[derive(Debug, Clone, Copy)]
pub struct TagStart<'a> {
    /// The tag name, e.g. `for`.
    pub name: &'a str,
    /// Everything after the name, e.g. `item in items`.
    pub markup: &'a str,
    pub line: Option<usize>,
    pub span: Span,
}

/// The name, markup and line every tag records.
#[derive(Debug, Clone)]
pub struct TagInfo {
    pub name: String,
    pub markup: String,
    pub line: Option<usize>,
}

impl From<TagStart<'_>> for TagInfo {
    fn from(start: TagStart<'_>) -> Self {
        Self {
            name: start.name.to_owned(),
            markup: start.markup.to_owned(),
            line: start.line,
        }
    }
}

/// A parsed tag node.
pub trait Tag: fmt::Debug + Send + Sync {
    fn info(&self) -> &TagInfo;

    fn name(&self) -> &str {
        &self.info().name
    }

    fn markup(&self) -> &str {
        &self.info().markup
    }

    fn line_number(&self) -> Option<usize> {
        self.info().line
    }

    /// Writes this tag's output, returning an interrupt if one was raised
    /// and not consumed.
    fn render(&self, ctx: &mut Context<'_>, out: &mut String) -> Result<Flow>;

    /// Whether this tag never produces output, in which case its output is
    /// discarded when it is rendered.
    fn blank(&self) -> bool {
        false
    }

    fn is_block(&self) -> bool {
        false
    }

    /// The bodies nested in this tag, in source order.
    fn nodelist(&self) -> Vec<&BlockBody> {
        Vec::new()
    }
}

/// A tag constructor.
pub type TagParser = dyn Fn(TagStart<'_>, &mut Tokenizer<'_>, &mut ParseContext<'_>) -> Result<Box<dyn Tag>>
    + Send
    + Sync
    + 'static;

/// Maps tag names to their constructors.
#[derive(Default)]
pub struct TagRegistry {
    tags: BTreeMap<String, Box<TagParser>>,
}

impl TagRegistry {
    /// An empty registry, where every tag is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with all the standard tags.
    pub fn with_defaults() -> Self {
        let mut r = Self::new();
        r.register("if", if_else::parse_if);
        r.register("unless", if_else::parse_unless);
        r.register("case", case::parse);
        r.register("for", for_loop::parse);
        r.register("tablerow", table_row::parse);
        r.register("break", interrupt::parse_break);
        r.register("continue", interrupt::parse_continue);
        r.register("assign", assign::parse_assign);
        r.register("capture", assign::parse_capture);
        r.register("comment", comment::parse_comment);
        r.register("raw", comment::parse_raw);
        r.register("cycle", cycle::parse_cycle);
        r.register("ifchanged", cycle::parse_ifchanged);
        r
    }

    /// Registers a tag constructor, replacing any existing one.
    pub fn register<F>(&mut self, name: impl Into<String>, parser: F)
    where
        F: Fn(TagStart<'_>, &mut Tokenizer<'_>, &mut ParseContext<'_>) -> Result<Box<dyn Tag>>
            + Send
            + Sync
            + 'static,
    {
        self.tags.insert(name.into(), Box::new(parser));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.tags.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&TagParser> {
        self.tags.get(name).map(|p| &**p)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.tags.keys()).finish()
    }
}

/// The error for markup a tag cannot make sense of.
fn err_syntax(tag: &str, usage: &str) -> crate::Error {
    crate::Error::syntax(format!("invalid syntax for '{tag}', expected: {usage}"))
}
