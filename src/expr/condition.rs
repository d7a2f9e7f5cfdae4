use std::cmp::Ordering;

use crate::compile::syntax;
use crate::expr::Expr;
use crate::render::Context;
use crate::{Error, Result, Value};

/// A comparison operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq,
    /// `!=` or `<>`
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Contains,
    /// Anything else the lax parser accepted, an error when evaluated.
    Unknown(String),
}

/// How a comparison joins the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    And,
    Or,
}

/// A single `left [op right]` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: Expr,
    pub operator: Option<Operator>,
    pub right: Option<Expr>,
}

/// A chain of comparisons joined by `and` and `or`.
///
/// The chain is evaluated strictly left to right with both relations at the
/// same precedence, so `true or false and false` is `(true or false) and
/// false`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub first: Comparison,
    pub rest: Vec<(Relation, Comparison)>,
}

impl Operator {
    pub fn parse(op: &str) -> Self {
        match op {
            "==" => Self::Eq,
            "!=" | "<>" => Self::Ne,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "contains" => Self::Contains,
            op => Self::Unknown(op.to_owned()),
        }
    }
}

impl Relation {
    pub(crate) fn parse(word: &str) -> Option<Self> {
        match word {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }
}

impl Comparison {
    /// A comparison that is true when `left` is truthy.
    pub fn truthy(left: Expr) -> Self {
        Self {
            left,
            operator: None,
            right: None,
        }
    }

    pub fn new(left: Expr, operator: Operator, right: Expr) -> Self {
        Self {
            left,
            operator: Some(operator),
            right: Some(right),
        }
    }

    /// Parses `left [op right]` from a single fragment of lax markup.
    fn parse_lax(markup: &str) -> Option<Self> {
        let caps = syntax::CONDITION.captures(markup)?;
        let left = Expr::parse(&caps[1]);
        let operator = caps.get(2).map(|m| Operator::parse(m.as_str()));
        let right = caps.get(3).map(|m| Expr::parse(m.as_str()));
        Some(match operator {
            Some(operator) => Self::new(left, operator, right.unwrap_or(Expr::Literal(Value::None))),
            None => Self::truthy(left),
        })
    }

    pub fn evaluate(&self, ctx: &Context<'_>) -> Result<bool> {
        let (operator, right) = match (&self.operator, &self.right) {
            (Some(operator), Some(right)) => (operator, right),
            _ => return Ok(self.left.evaluate(ctx)?.is_truthy()),
        };
        match operator {
            Operator::Eq => equal(&self.left, right, ctx),
            Operator::Ne => equal(&self.left, right, ctx).map(|eq| !eq),
            Operator::Contains => {
                let (left, right) = (self.left.evaluate(ctx)?, right.evaluate(ctx)?);
                Ok(contains(&left, &right))
            }
            Operator::Unknown(op) => Err(Error::argument(format!("unknown operator {op}"))),
            op => {
                let (left, right) = (self.left.evaluate(ctx)?, right.evaluate(ctx)?);
                let ordering = compare(&left, &right)?;
                Ok(ordering.map_or(false, |o| match op {
                    Operator::Lt => o.is_lt(),
                    Operator::Gt => o.is_gt(),
                    Operator::Le => o.is_le(),
                    Operator::Ge => o.is_ge(),
                    _ => false,
                }))
            }
        }
    }
}

impl Condition {
    pub fn new(first: Comparison) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    /// Parses a condition the lax way, splitting on `and` and `or` words.
    ///
    /// Returns `None` if any comparison in the chain is malformed.
    pub fn parse_lax(markup: &str) -> Option<Self> {
        let mut parts = Vec::new();
        let mut relations = Vec::new();
        let mut start = 0;
        for m in syntax::QUOTED_FRAGMENT_RE.find_iter(markup) {
            if let Some(relation) = Relation::parse(m.as_str()) {
                parts.push(&markup[start..m.start()]);
                relations.push(relation);
                start = m.end();
            }
        }
        parts.push(&markup[start..]);

        let mut parts = parts.into_iter();
        let first = Comparison::parse_lax(parts.next()?)?;
        let rest = relations
            .into_iter()
            .zip(parts)
            .map(|(relation, part)| Comparison::parse_lax(part).map(|c| (relation, c)))
            .collect::<Option<_>>()?;
        Some(Self { first, rest })
    }

    pub fn evaluate(&self, ctx: &Context<'_>) -> Result<bool> {
        let mut acc = self.first.evaluate(ctx)?;
        for (relation, comparison) in &self.rest {
            acc = match relation {
                Relation::And if !acc => false,
                Relation::Or if acc => true,
                _ => comparison.evaluate(ctx)?,
            };
        }
        Ok(acc)
    }
}

/// Equality, where `blank` and `empty` on either side test the other side.
fn equal(left: &Expr, right: &Expr, ctx: &Context<'_>) -> Result<bool> {
    match (left, right) {
        (Expr::Blank, Expr::Blank) | (Expr::Empty, Expr::Empty) => Ok(true),
        (Expr::Blank, other) | (other, Expr::Blank) => Ok(other.evaluate(ctx)?.is_blank()),
        (Expr::Empty, other) | (other, Expr::Empty) => Ok(other.evaluate(ctx)?.is_empty()),
        (left, right) => Ok(*left.evaluate(ctx)? == *right.evaluate(ctx)?),
    }
}

fn compare(left: &Value, right: &Value) -> Result<Option<Ordering>> {
    let ordering = match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
        (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => a.partial_cmp(b),
        (Value::Integer(_) | Value::Float(_) | Value::String(_), Value::Integer(_) | Value::Float(_) | Value::String(_)) => {
            return Err(Error::argument(format!(
                "comparison of {} with {} failed",
                left.human(),
                right.human()
            )))
        }
        _ => None,
    };
    Ok(ordering)
}

fn contains(left: &Value, right: &Value) -> bool {
    if !right.is_truthy() {
        return false;
    }
    match left {
        Value::String(s) => s.contains(&right.to_output()),
        Value::List(list) => list.contains(right),
        Value::Map(map) => match right {
            Value::String(key) => map.contains_key(key),
            _ => false,
        },
        Value::Range(a, b) => match right {
            Value::Integer(i) => a <= i && i <= b,
            Value::Float(f) => (*a as f64) <= *f && *f <= (*b as f64),
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lax_single() {
        let cond = Condition::parse_lax("a == 'b'").unwrap();
        assert_eq!(
            cond.first,
            Comparison::new(Expr::parse("a"), Operator::Eq, Expr::parse("'b'"))
        );
        assert!(cond.rest.is_empty());
    }

    #[test]
    fn parse_lax_chain() {
        let cond = Condition::parse_lax("a and b > 1 or c").unwrap();
        assert_eq!(cond.first, Comparison::truthy(Expr::parse("a")));
        assert_eq!(cond.rest.len(), 2);
        assert_eq!(cond.rest[0].0, Relation::And);
        assert_eq!(
            cond.rest[0].1,
            Comparison::new(Expr::parse("b"), Operator::Gt, Expr::parse("1"))
        );
        assert_eq!(cond.rest[1], (Relation::Or, Comparison::truthy(Expr::parse("c"))));
    }

    #[test]
    fn parse_lax_and_inside_string() {
        let cond = Condition::parse_lax("a == 'x and y'").unwrap();
        assert!(cond.rest.is_empty());
    }

    #[test]
    fn parse_lax_dangling_relation() {
        assert_eq!(Condition::parse_lax("a and"), None);
        assert_eq!(Condition::parse_lax(""), None);
    }

    #[test]
    fn unknown_operator() {
        assert_eq!(Operator::parse("=<"), Operator::Unknown("=<".into()));
        assert_eq!(Operator::parse("<>"), Operator::Ne);
    }

    #[test]
    fn compare_mixed() {
        assert_eq!(compare(&Value::Integer(1), &Value::Float(1.5)).unwrap(), Some(Ordering::Less));
        assert_eq!(compare(&Value::None, &Value::Integer(1)).unwrap(), None);
        let err = compare(&Value::Integer(1), &Value::from("a")).unwrap_err();
        assert_eq!(err.message(), "comparison of integer with string failed");
    }

    #[test]
    fn contains_values() {
        assert!(contains(&Value::from("hello"), &Value::from("ell")));
        assert!(contains(&Value::from("a1"), &Value::Integer(1)));
        assert!(!contains(&Value::from("hello"), &Value::None));
        assert!(contains(&Value::from(vec![1, 2]), &Value::Integer(2)));
        assert!(contains(&Value::Range(1, 5), &Value::Integer(5)));
        assert!(!contains(&Value::Integer(5), &Value::Integer(5)));
    }
}
