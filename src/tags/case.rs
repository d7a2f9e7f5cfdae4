use crate::compile::tokenize::Tokenizer;
use crate::compile::{parse_body, syntax, unknown_tag, ParseContext};
use crate::expr::{Comparison, Expr, Operator};
use crate::render::{Context, Flow};
use crate::tags::{err_syntax, Tag, TagInfo, TagStart};
use crate::types::node::BlockBody;
use crate::Result;

#[derive(Debug)]
struct Case {
    info: TagInfo,
    /// The `when` comparisons in source order, each with the index of the
    /// body it renders. `None` stands for `else`.
    branches: Vec<(Option<Comparison>, usize)>,
    bodies: Vec<BlockBody>,
    blank: bool,
}

pub fn parse(
    start: TagStart<'_>,
    tokens: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    let left = match syntax::CASE.captures(start.markup) {
        Some(caps) => Expr::parse(&caps[1]),
        None => return Err(err_syntax("case", "case [condition]")),
    };

    let mut branches = Vec::new();
    let mut bodies = Vec::new();
    let mut blank = true;

    // Anything before the first `when` is parsed and then dropped.
    let mut body = BlockBody::new();
    loop {
        let next = parse_body(&start, &mut body, tokens, ctx)?;
        blank &= body.is_blank();
        if !bodies.is_empty() || !branches.is_empty() {
            bodies.push(body);
        }
        let tag = match next {
            None => break,
            Some(tag) => tag,
        };
        match tag.name {
            "when" => {
                let index = bodies.len();
                let mut markup = Some(tag.markup);
                while let Some(m) = markup {
                    let caps = syntax::WHEN.captures(m).ok_or_else(|| {
                        err_syntax("when", "when [condition] [or condition2...]")
                    })?;
                    let right = Expr::parse(&caps[1]);
                    branches.push((Some(Comparison::new(left.clone(), Operator::Eq, right)), index));
                    markup = caps.get(2).map(|m| m.as_str());
                }
            }
            "else" => {
                if !tag.markup.trim().is_empty() {
                    return Err(err_syntax("else", "else (no parameters)"));
                }
                branches.push((None, bodies.len()));
            }
            _ => return Err(unknown_tag(&start, &tag)),
        }
        body = BlockBody::new();
    }

    Ok(Box::new(Case {
        info: start.into(),
        branches,
        bodies,
        blank,
    }))
}

impl Tag for Case {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, ctx: &mut Context<'_>, out: &mut String) -> Result<Flow> {
        ctx.stack(|ctx| {
            let mut matched = false;
            for (comparison, index) in &self.branches {
                let body = &self.bodies[*index];
                match comparison {
                    None if !matched => return body.render(ctx, out),
                    None => {}
                    Some(comparison) => {
                        if comparison.evaluate(ctx)? {
                            matched = true;
                            match body.render(ctx, out)? {
                                Flow::Normal => {}
                                flow => return Ok(flow),
                            }
                        }
                    }
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
        self.bodies.iter().collect()
    }
}
