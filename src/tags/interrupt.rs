use crate::compile::tokenize::Tokenizer;
use crate::compile::ParseContext;
use crate::render::{Context, Flow};
use crate::tags::{Tag, TagInfo, TagStart};
use crate::Result;

/// `{% break %}` or `{% continue %}`: raises an interrupt for the innermost
/// enclosing loop.
#[derive(Debug)]
struct Interrupt {
    info: TagInfo,
    flow: Flow,
}

pub fn parse_break(
    start: TagStart<'_>,
    _: &mut Tokenizer<'_>,
    _: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    Ok(Box::new(Interrupt {
        info: start.into(),
        flow: Flow::Break,
    }))
}

pub fn parse_continue(
    start: TagStart<'_>,
    _: &mut Tokenizer<'_>,
    _: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    Ok(Box::new(Interrupt {
        info: start.into(),
        flow: Flow::Continue,
    }))
}

impl Tag for Interrupt {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, _: &mut Context<'_>, _: &mut String) -> Result<Flow> {
        Ok(self.flow)
    }
}
