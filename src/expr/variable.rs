use crate::compile::lex::Token;
use crate::compile::parser::{self, Parser};
use crate::compile::{syntax, ParseContext};
use crate::expr::Expr;
use crate::render::Context;
use crate::value::Map;
use crate::{Result, Value};

/// An expression followed by a chain of filters, e.g. `name | append: "!"`.
///
/// This is the content of an output segment and the right hand side of an
/// `assign`.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub expr: Expr,
    pub filters: Vec<FilterCall>,
    pub markup: String,
    pub line: Option<usize>,
}

/// A single filter application.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<Expr>,
    /// Keyword arguments, passed to the filter as a trailing map.
    pub keywords: Vec<(String, Expr)>,
}

impl Variable {
    /// Parses a variable with the parser selected by the context's error
    /// mode.
    pub fn parse(markup: &str, line: Option<usize>, ctx: &mut ParseContext<'_>) -> Result<Self> {
        let (expr, filters) = ctx.parse_with(markup, parse_strict, |m| Ok(parse_lax(m)))?;
        Ok(Self {
            expr,
            filters,
            markup: markup.to_owned(),
            line,
        })
    }

    /// Evaluates the expression and applies each filter in turn.
    pub fn evaluate(&self, ctx: &Context<'_>) -> Result<Value> {
        let mut value = self.expr.evaluate(ctx)?.into_owned();
        for filter in &self.filters {
            let mut args = filter
                .args
                .iter()
                .map(|arg| arg.evaluate(ctx).map(|v| v.into_owned()))
                .collect::<Result<Vec<_>>>()?;
            if !filter.keywords.is_empty() {
                let mut map = Map::new();
                for (key, arg) in &filter.keywords {
                    map.insert(key.clone(), arg.evaluate(ctx)?.into_owned());
                }
                args.push(Value::Map(map));
            }
            value = ctx.apply_filter(&filter.name, value, args)?;
        }
        Ok(value)
    }
}

impl FilterCall {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            args: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

fn parse_lax(markup: &str) -> (Expr, Vec<FilterCall>) {
    let caps = match syntax::MARKUP_WITH_QUOTED_FRAGMENT.captures(markup) {
        Some(caps) => caps,
        None => return (Expr::Literal(Value::None), Vec::new()),
    };
    let expr = Expr::parse(&caps[1]);
    let mut filters = Vec::new();
    if let Some(rest) = syntax::FILTER_MARKUP.captures(&caps[2]) {
        for f in syntax::FILTER_PARSER.find_iter(&rest[1]) {
            let f = f.as_str();
            let name = match syntax::FILTER_NAME.find(f) {
                Some(name) => name.as_str(),
                None => continue,
            };
            let mut call = FilterCall::new(name);
            for arg in syntax::FILTER_ARGS.captures_iter(f) {
                match syntax::JUST_TAG_ATTRIBUTES.captures(&arg[1]) {
                    Some(kw) => call.keywords.push((kw[1].to_owned(), Expr::parse(&kw[2]))),
                    None => call.args.push(Expr::parse(&arg[1])),
                }
            }
            filters.push(call);
        }
    }
    (expr, filters)
}

fn parse_strict(markup: &str) -> Result<(Expr, Vec<FilterCall>)> {
    let mut p = Parser::new(markup)?;
    if p.look(Token::EndOfString, 0) {
        return Ok((Expr::Literal(Value::None), Vec::new()));
    }
    let (expr, _) = p.expression()?;
    let mut filters = Vec::new();
    while p.consume_if(Token::Pipe).is_some() {
        let mut call = FilterCall::new(p.consume(Token::Ident)?);
        if p.consume_if(Token::Colon).is_some() {
            loop {
                let arg = p.argument()?;
                match arg.keyword {
                    Some(key) => call.keywords.push((key.to_owned(), arg.expr)),
                    None => call.args.push(arg.expr),
                }
                if p.consume_if(Token::Comma).is_none() {
                    break;
                }
            }
        }
        filters.push(call);
    }
    parser::finish(&mut p)?;
    Ok((expr, filters))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[&str], keywords: &[(&str, &str)]) -> FilterCall {
        FilterCall {
            name: name.into(),
            args: args.iter().map(|a| Expr::parse(a)).collect(),
            keywords: keywords
                .iter()
                .map(|(k, v)| (k.to_string(), Expr::parse(v)))
                .collect(),
        }
    }

    #[test]
    fn lax_filters() {
        let (expr, filters) = parse_lax(r#" name | append: "a, b", x | truncate: 5, omission: '..' | upcase "#);
        assert_eq!(expr, Expr::parse("name"));
        assert_eq!(
            filters,
            [
                call("append", &[r#""a, b""#, "x"], &[]),
                call("truncate", &["5"], &[("omission", "'..'")]),
                call("upcase", &[], &[]),
            ]
        );
    }

    #[test]
    fn lax_empty() {
        assert_eq!(parse_lax("  "), (Expr::Literal(Value::None), Vec::new()));
    }

    #[test]
    fn lax_ignores_garbage() {
        let (expr, filters) = parse_lax("a | | b");
        assert_eq!(expr, Expr::parse("a"));
        assert_eq!(filters, [call("b", &[], &[])]);
    }

    #[test]
    fn strict_filters() {
        let (expr, filters) = parse_strict(r#"name | append: "a, b", x | truncate: 5, omission: '..' | upcase"#).unwrap();
        assert_eq!(expr, Expr::parse("name"));
        assert_eq!(
            filters,
            [
                call("append", &[r#""a, b""#, "x"], &[]),
                call("truncate", &["5"], &[("omission", "'..'")]),
                call("upcase", &[], &[]),
            ]
        );
    }

    #[test]
    fn strict_rejects_garbage() {
        let err = parse_strict("a | | b").unwrap_err();
        assert_eq!(err.message(), "expected id but found pipe");
        let err = parse_strict("a b").unwrap_err();
        assert_eq!(err.message(), "expected end_of_string but found id");
    }
}
