use crate::compile::tokenize::Tokenizer;
use crate::compile::{parse_body, syntax, unknown_tag, ParseContext};
use crate::expr::Variable;
use crate::render::{Context, Flow};
use crate::tags::{err_syntax, Tag, TagInfo, TagStart};
use crate::types::node::BlockBody;
use crate::{Result, Value};

/// `{% assign var = expression | filters %}`
#[derive(Debug)]
struct Assign {
    info: TagInfo,
    to: String,
    from: Variable,
}

/// `{% capture var %}...{% endcapture %}`
#[derive(Debug)]
struct Capture {
    info: TagInfo,
    to: String,
    body: BlockBody,
}

pub fn parse_assign(
    start: TagStart<'_>,
    _: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    let caps = syntax::ASSIGN
        .captures(start.markup)
        .ok_or_else(|| err_syntax("assign", "assign [var] = [source]"))?;
    let from = Variable::parse(caps[2].trim_end(), start.line, ctx)?;
    Ok(Box::new(Assign {
        info: start.into(),
        to: caps[1].to_owned(),
        from,
    }))
}

pub fn parse_capture(
    start: TagStart<'_>,
    tokens: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    let caps = syntax::CAPTURE
        .captures(start.markup)
        .ok_or_else(|| err_syntax("capture", "capture [var]"))?;
    let to = caps[1].to_owned();
    let mut body = BlockBody::new();
    if let Some(tag) = parse_body(&start, &mut body, tokens, ctx)? {
        return Err(unknown_tag(&start, &tag));
    }
    Ok(Box::new(Capture {
        info: start.into(),
        to,
        body,
    }))
}

/// How much an assigned value counts towards the assign score.
fn assign_score(value: &Value) -> usize {
    match value {
        Value::String(s) => s.len(),
        Value::List(list) => 1 + list.iter().map(assign_score).sum::<usize>(),
        Value::Map(map) => 1 + map.values().map(assign_score).sum::<usize>(),
        _ => 1,
    }
}

impl Tag for Assign {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, ctx: &mut Context<'_>, _: &mut String) -> Result<Flow> {
        let value = self.from.evaluate(ctx)?;
        let score = assign_score(&value);
        ctx.assign(self.to.clone(), value);
        ctx.limits().add_assign_score(score)?;
        Ok(Flow::Normal)
    }

    fn blank(&self) -> bool {
        true
    }
}

impl Tag for Capture {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, ctx: &mut Context<'_>, _: &mut String) -> Result<Flow> {
        let mut buf = String::new();
        let flow = self.body.render(ctx, &mut buf)?;
        let score = buf.len();
        ctx.assign(self.to.clone(), Value::String(buf));
        ctx.limits().add_assign_score(score)?;
        Ok(flow)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_score_counts_children() {
        assert_eq!(assign_score(&Value::from("abc")), 3);
        assert_eq!(assign_score(&Value::from(42)), 1);
        assert_eq!(assign_score(&Value::from(["ab", "c"])), 4);
        assert_eq!(assign_score(&Value::from([("k", "vvv")])), 4);
    }
}
