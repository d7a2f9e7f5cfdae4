use crate::compile::lex::Token;
use crate::compile::parser::{self, Parser};
use crate::compile::tokenize::Tokenizer;
use crate::compile::{parse_body, syntax, unknown_tag, ParseContext};
use crate::expr::Expr;
use crate::render::{Context, Flow};
use crate::tags::{err_syntax, Tag, TagInfo, TagStart};
use crate::types::node::BlockBody;
use crate::value::Items;
use crate::{Error, Result, Value};

/// Where a loop starts in its collection.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Offset {
    Expr(Expr),
    /// Resume where the previous loop with the same name stopped.
    Continue,
}

/// The header of a loop, shared with `tablerow`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LoopHeader {
    pub var: String,
    pub collection: Expr,
    /// `var-collection`, the key under which offsets are remembered.
    pub name: String,
    pub reversed: bool,
    pub limit: Option<Expr>,
    pub offset: Option<Offset>,
}

impl LoopHeader {
    fn new(var: &str, collection: Expr, collection_markup: &str) -> Self {
        Self {
            var: var.to_owned(),
            collection,
            name: format!("{var}-{collection_markup}"),
            reversed: false,
            limit: None,
            offset: None,
        }
    }

    /// Records a `limit` or `offset` attribute, ignoring any other.
    pub(crate) fn set_attribute(&mut self, key: &str, markup: &str) {
        match key {
            "limit" => self.limit = Some(Expr::parse(markup)),
            "offset" if markup == "continue" => self.offset = Some(Offset::Continue),
            "offset" => self.offset = Some(Offset::Expr(Expr::parse(markup))),
            _ => {}
        }
    }

    /// Evaluates the window of the collection this loop visits, recording
    /// where it stopped.
    pub(crate) fn segment(&self, ctx: &mut Context<'_>) -> Result<Items> {
        let from = match &self.offset {
            None => 0,
            Some(Offset::Continue) => ctx.registers().for_offsets.get(&self.name).copied().unwrap_or(0),
            Some(Offset::Expr(expr)) => expr.evaluate(ctx)?.to_int_lossy(),
        };
        let to = match &self.limit {
            Some(expr) => Some(expr.evaluate(ctx)?.to_int_lossy().saturating_add(from)),
            None => None,
        };
        let mut segment = self
            .collection
            .evaluate(ctx)?
            .to_items(from.max(0) as usize, to.map(|to| to.max(0) as usize));
        if self.reversed {
            segment.reverse();
        }
        let next = from.saturating_add(i64::try_from(segment.len()).unwrap_or(i64::MAX));
        ctx.registers().for_offsets.insert(self.name.clone(), next);
        Ok(segment)
    }
}

#[derive(Debug)]
struct For {
    info: TagInfo,
    header: LoopHeader,
    body: BlockBody,
    else_body: Option<BlockBody>,
}

pub fn parse(
    start: TagStart<'_>,
    tokens: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    let header = ctx.parse_with(start.markup, parse_strict, parse_lax)?;

    let mut body = BlockBody::new();
    let mut else_body = None;
    match parse_body(&start, &mut body, tokens, ctx)? {
        None => {}
        Some(tag) if tag.name == "else" => {
            let mut alt = BlockBody::new();
            if let Some(tag) = parse_body(&start, &mut alt, tokens, ctx)? {
                return Err(unknown_tag(&start, &tag));
            }
            else_body = Some(alt);
        }
        Some(tag) => return Err(unknown_tag(&start, &tag)),
    }

    Ok(Box::new(For {
        info: start.into(),
        header,
        body,
        else_body,
    }))
}

fn parse_lax(markup: &str) -> Result<LoopHeader> {
    let caps = syntax::FOR
        .captures(markup)
        .ok_or_else(|| err_syntax("for", "for [item] in [collection]"))?;
    let mut header = LoopHeader::new(&caps[1], Expr::parse(&caps[2]), &caps[2]);
    header.reversed = caps.get(3).is_some();
    for attr in syntax::TAG_ATTRIBUTES.captures_iter(markup) {
        header.set_attribute(&attr[1], &attr[2]);
    }
    Ok(header)
}

fn parse_strict(markup: &str) -> Result<LoopHeader> {
    let mut p = Parser::new(markup)?;
    let var = p.consume(Token::Ident)?;
    if !p.id("in") {
        return Err(Error::syntax("for loops require an 'in' clause"));
    }
    let (collection, collection_markup) = p.expression()?;
    let mut header = LoopHeader::new(var, collection, &collection_markup);
    header.reversed = p.id("reversed");
    while p.look(Token::Ident, 0) && p.look(Token::Colon, 1) {
        let key = if p.id("limit") {
            "limit"
        } else if p.id("offset") {
            "offset"
        } else {
            return Err(Error::syntax(
                "invalid attribute in for loop, valid attributes are limit and offset",
            ));
        };
        p.consume(Token::Colon)?;
        let (expr, markup) = p.expression()?;
        match (key, markup.as_str()) {
            ("offset", "continue") => header.offset = Some(Offset::Continue),
            ("offset", _) => header.offset = Some(Offset::Expr(expr)),
            _ => header.limit = Some(expr),
        }
    }
    parser::finish(&mut p)?;
    Ok(header)
}

/// The `forloop` object for one iteration.
fn forloop(name: &str, length: usize, index: usize, parent: &Value) -> Value {
    Value::from([
        ("name", Value::from(name)),
        ("length", Value::from(length)),
        ("index", Value::from(index + 1)),
        ("index0", Value::from(index)),
        ("rindex", Value::from(length - index)),
        ("rindex0", Value::from(length - index - 1)),
        ("first", Value::from(index == 0)),
        ("last", Value::from(index + 1 == length)),
        ("parentloop", parent.clone()),
    ])
}

impl Tag for For {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, ctx: &mut Context<'_>, out: &mut String) -> Result<Flow> {
        let segment = self.header.segment(ctx)?;
        if segment.is_empty() {
            return match &self.else_body {
                Some(body) => body.render(ctx, out),
                None => Ok(Flow::Normal),
            };
        }

        // Nothing to render however many items there are.
        if self.body.nodes.is_empty() {
            return Ok(Flow::Normal);
        }

        let length = segment.len();
        let parent = ctx.for_stack.last().cloned().unwrap_or_default();
        ctx.stack(|ctx| {
            let mut result = Ok(Flow::Normal);
            for (index, item) in segment.enumerate() {
                let state = forloop(&self.header.name, length, index, &parent);
                ctx.for_stack.push(state.clone());
                ctx.set(self.header.var.clone(), item);
                ctx.set("forloop", state);
                let flow = self.body.render(ctx, out);
                ctx.for_stack.pop();
                match flow {
                    Ok(Flow::Break) => break,
                    Ok(_) => {}
                    Err(err) => {
                        result = Err(err);
                        break;
                    }
                }
            }
            result
        })
    }

    fn is_block(&self) -> bool {
        true
    }

    fn nodelist(&self) -> Vec<&BlockBody> {
        let mut bodies = vec![&self.body];
        bodies.extend(&self.else_body);
        bodies
    }
}
