use crate::compile::parser::{self, Parser};
use crate::compile::tokenize::Tokenizer;
use crate::compile::{parse_body, unknown_tag, ParseContext};
use crate::expr::Condition;
use crate::render::{Context, Flow};
use crate::tags::{err_syntax, Tag, TagInfo, TagStart};
use crate::types::node::BlockBody;
use crate::Result;

/// `{% if %}` and `{% unless %}` with any `elsif` and `else` branches.
#[derive(Debug)]
struct If {
    info: TagInfo,
    branches: Vec<Branch>,
    /// Whether the first condition is negated, as in `unless`.
    negate: bool,
    blank: bool,
}

#[derive(Debug)]
struct Branch {
    /// `None` for `else`.
    condition: Option<Condition>,
    body: BlockBody,
}

pub fn parse_if(
    start: TagStart<'_>,
    tokens: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    parse(start, tokens, ctx, false)
}

pub fn parse_unless(
    start: TagStart<'_>,
    tokens: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    parse(start, tokens, ctx, true)
}

fn parse(
    start: TagStart<'_>,
    tokens: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
    negate: bool,
) -> Result<Box<dyn Tag>> {
    let mut branches = Vec::new();
    let mut condition = Some(parse_condition(start.name, start.markup, ctx)?);
    loop {
        let mut body = BlockBody::new();
        let next = parse_body(&start, &mut body, tokens, ctx)?;
        branches.push(Branch { condition, body });
        match next {
            None => break,
            Some(tag) if tag.name == "elsif" => {
                condition = Some(parse_condition(start.name, tag.markup, ctx)?);
            }
            Some(tag) if tag.name == "else" => condition = None,
            Some(tag) => return Err(unknown_tag(&start, &tag)),
        }
    }
    let blank = branches.iter().all(|b| b.body.is_blank());
    Ok(Box::new(If {
        info: start.into(),
        branches,
        negate,
        blank,
    }))
}

/// Parses a condition with the parser selected by the error mode.
pub(crate) fn parse_condition(tag: &str, markup: &str, ctx: &mut ParseContext<'_>) -> Result<Condition> {
    ctx.parse_with(
        markup,
        |markup| {
            let mut p = Parser::new(markup)?;
            let condition = p.condition()?;
            parser::finish(&mut p)?;
            Ok(condition)
        },
        |markup| Condition::parse_lax(markup).ok_or_else(|| err_syntax(tag, &format!("{tag} [expression]"))),
    )
}

impl Tag for If {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, ctx: &mut Context<'_>, out: &mut String) -> Result<Flow> {
        ctx.stack(|ctx| {
            for (i, branch) in self.branches.iter().enumerate() {
                let selected = match &branch.condition {
                    Some(condition) => condition.evaluate(ctx)? != (self.negate && i == 0),
                    None => true,
                };
                if selected {
                    return branch.body.render(ctx, out);
                }
            }
            Ok(Flow::Normal)
        })
    }

    fn blank(&self) -> bool {
        self.blank
    }

    fn is_block(&self) -> bool {
        true
    }

    fn nodelist(&self) -> Vec<&BlockBody> {
        self.branches.iter().map(|b| &b.body).collect()
    }
}
