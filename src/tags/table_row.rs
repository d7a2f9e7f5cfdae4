use std::fmt::Write;

use crate::compile::tokenize::Tokenizer;
use crate::compile::{parse_body, syntax, unknown_tag, ParseContext};
use crate::expr::Expr;
use crate::render::{Context, Flow};
use crate::tags::{err_syntax, Tag, TagInfo, TagStart};
use crate::types::node::BlockBody;
use crate::{Result, Value};

/// `{% tablerow %}`, which lays a collection out as HTML table rows.
#[derive(Debug)]
struct TableRow {
    info: TagInfo,
    var: String,
    collection: Expr,
    cols: Option<Expr>,
    limit: Option<Expr>,
    offset: Option<Expr>,
    body: BlockBody,
}

pub fn parse(
    start: TagStart<'_>,
    tokens: &mut Tokenizer<'_>,
    ctx: &mut ParseContext<'_>,
) -> Result<Box<dyn Tag>> {
    let caps = syntax::TABLEROW.captures(start.markup).ok_or_else(|| {
        err_syntax("tablerow", "tablerow [item] in [collection] cols:3")
    })?;
    let mut tag = TableRow {
        info: start.into(),
        var: caps[1].to_owned(),
        collection: Expr::parse(&caps[2]),
        cols: None,
        limit: None,
        offset: None,
        body: BlockBody::new(),
    };
    for attr in syntax::TAG_ATTRIBUTES.captures_iter(start.markup) {
        let expr = Some(Expr::parse(&attr[2]));
        match &attr[1] {
            "cols" => tag.cols = expr,
            "limit" => tag.limit = expr,
            "offset" => tag.offset = expr,
            _ => {}
        }
    }

    if let Some(next) = parse_body(&start, &mut tag.body, tokens, ctx)? {
        return Err(unknown_tag(&start, &next));
    }
    Ok(Box::new(tag))
}

/// The zero-based row and column of the cell at `index`. Without a column
/// count everything is on the first row.
fn position(cols: usize, index: usize) -> (usize, usize) {
    match cols {
        0 => (0, index),
        _ => (index / cols, index % cols),
    }
}

/// The `tablerowloop` object for one cell.
fn tablerowloop(length: usize, cols: usize, index: usize) -> Value {
    let (row, col0) = position(cols, index);
    Value::from([
        ("length", Value::from(length)),
        ("cols", Value::from(cols)),
        ("row", Value::from(row + 1)),
        ("col", Value::from(col0 + 1)),
        ("col0", Value::from(col0)),
        ("col_first", Value::from(col0 == 0)),
        ("col_last", Value::from(col0 + 1 == cols)),
        ("index", Value::from(index + 1)),
        ("index0", Value::from(index)),
        ("rindex", Value::from(length - index)),
        ("rindex0", Value::from(length - index - 1)),
        ("first", Value::from(index == 0)),
        ("last", Value::from(index + 1 == length)),
    ])
}

impl TableRow {
    fn int(expr: &Option<Expr>, ctx: &Context<'_>) -> Result<Option<i64>> {
        match expr {
            Some(expr) => Ok(Some(expr.evaluate(ctx)?.to_int_lossy())),
            None => Ok(None),
        }
    }
}

impl Tag for TableRow {
    fn info(&self) -> &TagInfo {
        &self.info
    }

    fn render(&self, ctx: &mut Context<'_>, out: &mut String) -> Result<Flow> {
        let from = Self::int(&self.offset, ctx)?.unwrap_or(0);
        let to = Self::int(&self.limit, ctx)?.map(|limit| limit.saturating_add(from));
        let cols = Self::int(&self.cols, ctx)?.unwrap_or(0).max(0) as usize;
        let items = {
            let collection = self.collection.evaluate(ctx)?;
            if matches!(*collection, Value::None) {
                return Ok(Flow::Normal);
            }
            collection.to_items(from.max(0) as usize, to.map(|to| to.max(0) as usize))
        };

        let length = items.len();
        out.push_str("<tr class=\"row1\">\n");
        ctx.stack(|ctx| {
            for (index, item) in items.enumerate() {
                ctx.limits().check_pending(out.len())?;
                let (row, col0) = position(cols, index);
                ctx.set(self.var.clone(), item);
                ctx.set("tablerowloop", tablerowloop(length, cols, index));

                let _ = write!(out, "<td class=\"col{}\">", col0 + 1);
                let flow = self.body.render(ctx, out)?;
                out.push_str("</td>");

                if col0 + 1 == cols && index + 1 != length {
                    let _ = write!(out, "</tr>\n<tr class=\"row{}\">", row + 2);
                }
                if flow == Flow::Break {
                    break;
                }
            }
            Ok(())
        })?;
        out.push_str("</tr>\n");
        Ok(Flow::Normal)
    }

    fn is_block(&self) -> bool {
        true
    }

    fn nodelist(&self) -> Vec<&BlockBody> {
        vec![&self.body]
    }
}
