//! Expressions: literals, ranges and variable lookups, along with the
//! conditions and output variables built from them.

mod condition;
mod lookup;
mod variable;

pub use crate::expr::condition::{Comparison, Condition, Operator, Relation};
pub use crate::expr::lookup::{Lookup, Root, VariableLookup};
pub use crate::expr::variable::Variable;

use crate::compile::syntax;
use crate::render::Context;
use crate::value::ValueCow;
use crate::{Result, Value};

/// A single expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value, e.g. `'hello'`, `42` or `nil`.
    Literal(Value),
    /// The `blank` method literal.
    Blank,
    /// The `empty` method literal.
    Empty,
    /// An inclusive range whose endpoints are not both literals, e.g.
    /// `(1..num)`.
    Range(Box<Expr>, Box<Expr>),
    /// A variable lookup, e.g. `product.tags[0]`.
    Lookup(VariableLookup),
}

impl Expr {
    /// Parses an expression from a markup fragment, the way the lax parsers
    /// do. This never fails: anything unrecognised becomes a lookup.
    pub fn parse(markup: &str) -> Self {
        let markup = markup.trim();
        if let Some(expr) = Self::from_keyword(markup) {
            return expr;
        }
        if let Some(s) = unquote(markup) {
            return Self::Literal(Value::from(s));
        }
        if syntax::INTEGER.is_match(markup) {
            return match markup.parse::<i64>() {
                Ok(i) => Self::Literal(Value::Integer(i)),
                Err(_) => Self::Literal(Value::Float(parse_float(markup))),
            };
        }
        if let Some(caps) = syntax::RANGE.captures(markup) {
            return Self::range(Self::parse(&caps[1]), Self::parse(&caps[2]));
        }
        if syntax::FLOAT.is_match(markup) {
            return Self::Literal(Value::Float(parse_float(markup)));
        }
        Self::Lookup(VariableLookup::parse(markup))
    }

    /// Returns the literal a reserved word stands for.
    pub(crate) fn from_keyword(word: &str) -> Option<Self> {
        let expr = match word {
            "" | "nil" | "null" => Self::Literal(Value::None),
            "true" => Self::Literal(Value::Bool(true)),
            "false" => Self::Literal(Value::Bool(false)),
            "blank" => Self::Blank,
            "empty" => Self::Empty,
            _ => return None,
        };
        Some(expr)
    }

    /// Builds a range, folding it into a constant when neither endpoint
    /// needs evaluating.
    pub(crate) fn range(start: Self, end: Self) -> Self {
        match (&start, &end) {
            (Self::Literal(a), Self::Literal(b)) => {
                Self::Literal(Value::Range(a.to_int_lossy(), b.to_int_lossy()))
            }
            _ => Self::Range(Box::new(start), Box::new(end)),
        }
    }

    /// Evaluates this expression against the render context.
    pub fn evaluate<'a>(&'a self, ctx: &'a Context<'_>) -> Result<ValueCow<'a>> {
        match self {
            Self::Literal(value) => Ok(ValueCow::Borrowed(value)),
            Self::Blank | Self::Empty => Ok(ValueCow::Owned(Value::String(String::new()))),
            Self::Range(start, end) => {
                let start = start.evaluate(ctx)?.to_integer()?;
                let end = end.evaluate(ctx)?.to_integer()?;
                Ok(ValueCow::Owned(Value::Range(start, end)))
            }
            Self::Lookup(lookup) => lookup.evaluate(ctx),
        }
    }
}

/// Strips matching single or double quotes.
pub(crate) fn unquote(s: &str) -> Option<&str> {
    let quote = s.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    match s.len() >= 2 && s.ends_with(quote) {
        true => Some(&s[1..s.len() - 1]),
        false => None,
    }
}

/// Parses the longest float prefix, e.g. `1.5.2` is `1.5`.
fn parse_float(s: &str) -> f64 {
    let mut end = s.len();
    if let Some(first) = s.find('.') {
        if let Some(second) = s[first + 1..].find('.') {
            end = first + 1 + second;
        }
    }
    s[..end].trim_end_matches('.').parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literals() {
        assert_eq!(Expr::parse(""), Expr::Literal(Value::None));
        assert_eq!(Expr::parse("null"), Expr::Literal(Value::None));
        assert_eq!(Expr::parse("true"), Expr::Literal(Value::Bool(true)));
        assert_eq!(Expr::parse("blank"), Expr::Blank);
        assert_eq!(Expr::parse("'a b'"), Expr::Literal(Value::from("a b")));
        assert_eq!(Expr::parse(r#""x""#), Expr::Literal(Value::from("x")));
        assert_eq!(Expr::parse("-12"), Expr::Literal(Value::Integer(-12)));
        assert_eq!(Expr::parse("1.5"), Expr::Literal(Value::Float(1.5)));
        assert_eq!(Expr::parse("1.5.2"), Expr::Literal(Value::Float(1.5)));
    }

    #[test]
    fn parse_ranges() {
        assert_eq!(Expr::parse("(1..5)"), Expr::Literal(Value::Range(1, 5)));
        assert_eq!(
            Expr::parse("(1..n)"),
            Expr::Range(
                Box::new(Expr::Literal(Value::Integer(1))),
                Box::new(Expr::Lookup(VariableLookup::parse("n")))
            )
        );
    }

    #[test]
    fn parse_lookup() {
        assert_eq!(
            Expr::parse("a.b"),
            Expr::Lookup(VariableLookup::parse("a.b"))
        );
    }

    #[test]
    fn unquote_mismatched() {
        assert_eq!(unquote("'a\""), None);
        assert_eq!(unquote("'"), None);
        assert_eq!(unquote("''"), Some(""));
    }
}
