//! The recursive descent core: parses nodes into bodies and bodies into
//! blocks.

use crate::compile::syntax;
use crate::compile::tokenize::{Token, TokenKind, Tokenizer};
use crate::compile::ParseContext;
use crate::expr::Variable;
use crate::tags::TagStart;
use crate::types::node::{BlockBody, Document, Node};
use crate::{Error, Result};

impl BlockBody {
    /// Parses nodes until the end of input or a tag that is not registered.
    ///
    /// Returns the unregistered tag so that the enclosing block can decide
    /// whether it is its own delimiter, a continuation like `else`, or an
    /// error. Returns `None` at the end of input.
    pub fn parse<'s>(
        &mut self,
        tokens: &mut Tokenizer<'s>,
        ctx: &mut ParseContext<'_>,
    ) -> Result<Option<TagStart<'s>>> {
        while let Some(token) = tokens.next()? {
            ctx.set_position(token.line, token.span);
            match token.kind {
                TokenKind::Text => {
                    let mut text = token.raw;
                    if ctx.trim_whitespace {
                        text = text.trim_start();
                        ctx.trim_whitespace = false;
                    }
                    if text.is_empty() {
                        continue;
                    }
                    self.blank &= text.trim().is_empty();
                    self.nodes.push(Node::Text(text.to_owned()));
                }
                TokenKind::Output => {
                    self.handle_whitespace(&token, ctx);
                    let variable = Variable::parse(token.inner(), token.line, ctx)?;
                    self.nodes.push(Node::Output(variable));
                    self.blank = false;
                }
                TokenKind::Tag => {
                    self.handle_whitespace(&token, ctx);
                    let caps = syntax::FULL_TAG.captures(token.inner()).ok_or_else(|| {
                        Error::syntax(format!("tag '{}' was not properly terminated", token.raw))
                    })?;
                    let start = TagStart {
                        name: caps.get(1).map_or("", |m| m.as_str()),
                        markup: caps.get(2).map_or("", |m| m.as_str()),
                        line: token.line,
                        span: token.span,
                    };
                    let registry = ctx.registry();
                    let parser = match registry.get(start.name) {
                        Some(parser) => parser,
                        None => return Ok(Some(start)),
                    };
                    let tag = parser(start, tokens, ctx)?;
                    self.blank &= tag.blank();
                    self.nodes.push(Node::Tag(tag));
                }
            }
        }
        Ok(None)
    }

    /// Strips whitespace before an opening `{%-` or `{{-` and records whether
    /// whitespace after the closing delimiter must be stripped.
    fn handle_whitespace(&mut self, token: &Token<'_>, ctx: &mut ParseContext<'_>) {
        if token.trim_left() {
            if let Some(Node::Text(text)) = self.nodes.last_mut() {
                text.truncate(text.trim_end().len());
            }
        }
        ctx.trim_whitespace = token.trim_right();
    }
}

/// Parses one body of the block opened by `start`.
///
/// Returns `None` if the body ended with the block's own end delimiter and
/// otherwise the tag that ended it, which the block must handle or reject
/// using [`unknown_tag`].
pub fn parse_body<'s>(
    start: &TagStart<'_>,
    body: &mut BlockBody,
    tokens: &mut Tokenizer<'s>,
    ctx: &mut ParseContext<'_>,
) -> Result<Option<TagStart<'s>>> {
    ctx.enter()?;
    let result = body.parse(tokens, ctx);
    ctx.exit();
    match result? {
        None => Err(Error::syntax(format!("'{}' tag was never closed", start.name))
            .with_line(start.line)
            .with_span(tokens.source(), start.span)),
        Some(tag) if is_end_of(start, &tag) => Ok(None),
        Some(tag) => Ok(Some(tag)),
    }
}

fn is_end_of(start: &TagStart<'_>, tag: &TagStart<'_>) -> bool {
    tag.name.strip_prefix("end") == Some(start.name)
}

/// The error for a tag that a block does not accept inside its body.
pub fn unknown_tag(start: &TagStart<'_>, tag: &TagStart<'_>) -> Error {
    let block = start.name;
    if tag.name == "else" {
        Error::syntax(format!("{block} tag does not expect 'else' tag"))
    } else if tag.name.starts_with("end") {
        Error::syntax(format!(
            "'{}' is not a valid delimiter for {block} tags. use end{block}",
            tag.name
        ))
    } else {
        Error::syntax(format!("unknown tag '{}'", tag.name))
    }
}

impl Document {
    pub(crate) fn parse(tokens: &mut Tokenizer<'_>, ctx: &mut ParseContext<'_>) -> Result<Self> {
        let mut body = BlockBody::new();
        ctx.enter()?;
        let result = body.parse(tokens, ctx);
        ctx.exit();
        match result? {
            None => Ok(Self { body }),
            Some(tag) if matches!(tag.name, "else" | "end") => {
                Err(Error::syntax(format!("unexpected outer '{}' tag", tag.name)))
            }
            Some(tag) => Err(Error::syntax(format!("unknown tag '{}'", tag.name))),
        }
    }
}
