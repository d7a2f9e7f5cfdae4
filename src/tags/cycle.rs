use crate::compile::tokenize::Tokenizer;
use crate::compile::{parse_body, syntax, unknown_tag, ParseContext};
use crate::expr::Expr;
use crate::render::{Context, Flow};
use crate::tags::{err_syntax, Tag, TagInfo, TagStart};
use crate::types::node::BlockBody;
use crate::Result;

/// `{% cycle [group:] a, b, c %}`: outputs the next value in turn every
/// time it is rendered.
#[derive(Debug)]
struct Cycle {
    info: TagInfo,
    group: Group,
    values: Vec<Expr>,
}

/// The key under which a cycle remembers its position.
#[derive(Debug)]
enum Group {
    /// Cycles without a group are keyed by their values.
    Values(String),
    Named(Expr),
}

/// `{% ifchanged %}`: outputs its body unless it is the same as the last
/// time an `ifchanged` body was rendered.
#[derive(Debug)]
struct IfChanged {
    info: TagInfo,
    body: BlockBody,
}

pub fn parse_cycle(
    start: TagStart<'_>,
    _: &mut Tokenizer<'_>,
    _: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    let markup = start.markup;
    let (group, values) = if let Some(caps) = syntax::CYCLE_NAMED.captures(markup) {
        (Group::Named(Expr::parse(&caps[1])), values(&caps[2]))
    } else if syntax::CYCLE_SIMPLE.is_match(markup) {
        (Group::Values(markup.trim().to_owned()), values(markup))
    } else {
        return Err(err_syntax("cycle", "cycle [name :] var [, var2, var3 ...]"));
    };
    Ok(Box::new(Cycle {
        info: start.into(),
        group,
        values,
    }))
}

fn values(markup: &str) -> Vec<Expr> {
    markup
        .split(',')
        .filter_map(|part| syntax::QUOTED_FRAGMENT_RE.find(part))
        .map(|m| Expr::parse(m.as_str()))
        .collect()
}

pub fn parse_ifchanged(
    start: TagStart<'_>,
    tokens: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    let mut body = BlockBody::new();
    if let Some(tag) = parse_body(&start, &mut body, tokens, ctx)? {
        return Err(unknown_tag(&start, &tag));
    }
    Ok(Box::new(IfChanged {
        info: start.into(),
        body,
    }))
}

impl Tag for Cycle {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, ctx: &mut Context<'_>, out: &mut String) -> Result<Flow> {
        let key = match &self.group {
            Group::Values(key) => key.clone(),
            Group::Named(expr) => expr.evaluate(ctx)?.to_output(),
        };
        let iteration = ctx.registers().cycles.get(&key).copied().unwrap_or(0);
        // A shorter cycle sharing the group renders nothing past its end.
        if let Some(expr) = self.values.get(iteration) {
            expr.evaluate(ctx)?.render(out);
        }
        let next = match iteration + 1 {
            next if next >= self.values.len() => 0,
            next => next,
        };
        ctx.registers().cycles.insert(key, next);
        Ok(Flow::Normal)
    }
}

impl Tag for IfChanged {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, ctx: &mut Context<'_>, out: &mut String) -> Result<Flow> {
        let mut buf = String::new();
        let flow = ctx.stack(|ctx| self.body.render(ctx, &mut buf))?;
        let registers = ctx.registers();
        if registers.ifchanged.as_deref() != Some(buf.as_str()) {
            out.push_str(&buf);
            registers.ifchanged = Some(buf);
        }
        Ok(flow)
    }

    fn is_block(&self) -> bool {
        true
    }

    fn nodelist(&self) -> Vec<&BlockBody> {
        vec![&self.body]
    }
}
