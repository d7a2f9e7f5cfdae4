use crate::compile::tokenize::Tokenizer;
use crate::compile::{parse_body, ParseContext};
use crate::render::{Context, Flow};
use crate::tags::{err_syntax, Tag, TagInfo, TagStart};
use crate::types::node::BlockBody;
use crate::{Error, Result};

/// `{% comment %}`: parses its body but never renders it.
#[derive(Debug)]
struct Comment {
    info: TagInfo,
    body: BlockBody,
}

/// `{% raw %}`: outputs its content without interpreting it.
#[derive(Debug)]
struct Raw {
    info: TagInfo,
    body: String,
}

pub fn parse_comment(
    start: TagStart<'_>,
    tokens: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    let mut body = BlockBody::new();
    // Any tag is allowed inside a comment, even an unregistered one.
    while parse_body(&start, &mut body, tokens, ctx)?.is_some() {}
    Ok(Box::new(Comment {
        info: start.into(),
        body,
    }))
}

pub fn parse_raw(
    start: TagStart<'_>,
    tokens: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    if !start.markup.trim().is_empty() {
        return Err(err_syntax("raw", "raw"));
    }
    let (body, end) = tokens.take_verbatim("raw").ok_or_else(|| {
        Error::syntax("'raw' tag was never closed")
            .with_line(start.line)
            .with_span(tokens.source(), start.span)
    })?;

    let mut text = body.raw;
    if ctx.trim_whitespace {
        text = text.trim_start();
    }
    if end.trim_left() {
        text = text.trim_end();
    }
    ctx.trim_whitespace = end.trim_right();

    Ok(Box::new(Raw {
        info: start.into(),
        body: text.to_owned(),
    }))
}

impl Tag for Comment {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, _: &mut Context<'_>, _: &mut String) -> Result<Flow> {
        Ok(Flow::Normal)
    }

    fn blank(&self) -> bool {
        true
    }

    fn is_block(&self) -> bool {
        true
    }

    fn nodelist(&self) -> Vec<&BlockBody> {
        vec![&self.body]
    }
}

impl Tag for Raw {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, _: &mut Context<'_>, out: &mut String) -> Result<Flow> {
        out.push_str(&self.body);
        Ok(Flow::Normal)
    }

    fn blank(&self) -> bool {
        self.body.is_empty()
    }

    fn is_block(&self) -> bool {
        true
    }
}
