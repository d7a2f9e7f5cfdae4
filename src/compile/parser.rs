//! The strict expression parser, built on top of the [`Lexer`].
//!
//! [`Lexer`]: crate::compile::lex::Lexer

use crate::compile::lex::{self, Token};
use crate::expr::{Comparison, Condition, Expr, Lookup, Operator, Relation, Root, VariableLookup};
use crate::types::span::Span;
use crate::value::Command;
use crate::{Error, Result};

/// A recursive descent parser over the tokens of one piece of markup.
pub struct Parser<'source> {
    source: &'source str,
    tokens: Vec<(Token, Span)>,
    cursor: usize,
}

/// A parsed filter or tag argument, e.g. `x` or `limit: 3`.
#[derive(Debug)]
pub struct Argument<'source> {
    pub keyword: Option<&'source str>,
    pub expr: Expr,
}

impl<'source> Parser<'source> {
    /// Tokenizes the whole markup up front, failing on any character the
    /// lexer does not recognise.
    pub fn new(source: &'source str) -> Result<Self> {
        let tokens = lex::tokenize(source)?;
        Ok(Self {
            source,
            tokens,
            cursor: 0,
        })
    }

    fn peek(&self, ahead: usize) -> (Token, Span) {
        let i = (self.cursor + ahead).min(self.tokens.len() - 1);
        self.tokens[i]
    }

    fn text(&self, span: Span) -> &'source str {
        &self.source[span]
    }

    /// Whether the token `ahead` positions from the cursor is `tk`.
    pub fn look(&self, tk: Token, ahead: usize) -> bool {
        self.peek(ahead).0 == tk
    }

    /// Consumes a token of kind `tk`, returning its text.
    pub fn consume(&mut self, tk: Token) -> Result<&'source str> {
        let (found, span) = self.peek(0);
        if found != tk {
            return Err(Error::syntax(format!(
                "expected {} but found {}",
                tk.human(),
                found.human()
            )));
        }
        self.cursor += 1;
        Ok(self.text(span))
    }

    /// Consumes the next token whatever it is.
    fn bump(&mut self) -> &'source str {
        let (_, span) = self.peek(0);
        self.cursor += 1;
        self.text(span)
    }

    /// Consumes a token of kind `tk` if it is next.
    pub fn consume_if(&mut self, tk: Token) -> Option<&'source str> {
        match self.look(tk, 0) {
            true => Some(self.bump()),
            false => None,
        }
    }

    /// Consumes the identifier `word` if it is next.
    pub fn id(&mut self, word: &str) -> bool {
        let (tk, span) = self.peek(0);
        if tk == Token::Ident && self.text(span) == word {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Parses an expression, also returning its markup with whitespace
    /// removed.
    pub fn expression(&mut self) -> Result<(Expr, String)> {
        let (tk, span) = self.peek(0);
        let mut markup = String::new();
        let expr = match tk {
            Token::Ident => {
                let name = self.bump();
                markup.push_str(name);
                let lookups = self.variable_lookups(&mut markup)?;
                match Expr::from_keyword(name) {
                    Some(expr) if lookups.is_empty() => expr,
                    _ => Expr::Lookup(VariableLookup::new(Root::Name(name.to_owned()), lookups)),
                }
            }
            Token::OpenSquare => {
                markup.push_str(self.bump());
                let (inner, inner_markup) = self.expression()?;
                markup.push_str(&inner_markup);
                markup.push_str(self.consume(Token::CloseSquare)?);
                let lookups = self.variable_lookups(&mut markup)?;
                Expr::Lookup(VariableLookup::new(Root::Dynamic(Box::new(inner)), lookups))
            }
            Token::String | Token::Number => {
                let text = self.bump();
                markup.push_str(text);
                Expr::parse(text)
            }
            Token::OpenRound => {
                self.bump();
                let (start, start_markup) = self.expression()?;
                self.consume(Token::DotDot)?;
                let (end, end_markup) = self.expression()?;
                self.consume(Token::CloseRound)?;
                markup = format!("({start_markup}..{end_markup})");
                Expr::range(start, end)
            }
            tk => {
                let text = match self.text(span) {
                    "" => tk.human(),
                    text => text,
                };
                return Err(Error::syntax(format!("'{text}' is not a valid expression")));
            }
        };
        Ok((expr, markup))
    }

    fn variable_lookups(&mut self, markup: &mut String) -> Result<Vec<Lookup>> {
        let mut lookups = Vec::new();
        loop {
            if let Some(open) = self.consume_if(Token::OpenSquare) {
                markup.push_str(open);
                let (expr, inner) = self.expression()?;
                markup.push_str(&inner);
                markup.push_str(self.consume(Token::CloseSquare)?);
                lookups.push(Lookup::Dynamic(expr));
            } else if let Some(dot) = self.consume_if(Token::Dot) {
                let key = self.consume(Token::Ident)?;
                markup.push_str(dot);
                markup.push_str(key);
                lookups.push(match Command::from_name(key) {
                    Some(command) => Lookup::Command(command),
                    None => Lookup::Key(key.to_owned()),
                });
            } else {
                return Ok(lookups);
            }
        }
    }

    /// Parses an argument, which may be a keyword argument like `key: expr`.
    pub fn argument(&mut self) -> Result<Argument<'source>> {
        let mut keyword = None;
        if self.look(Token::Ident, 0) && self.look(Token::Colon, 1) {
            keyword = Some(self.bump());
            self.bump();
        }
        let (expr, _) = self.expression()?;
        Ok(Argument { keyword, expr })
    }

    /// Parses comparisons joined by `and` and `or`.
    pub fn condition(&mut self) -> Result<Condition> {
        let mut condition = Condition::new(self.comparison()?);
        loop {
            let relation = if self.id("and") {
                Relation::And
            } else if self.id("or") {
                Relation::Or
            } else {
                return Ok(condition);
            };
            condition.rest.push((relation, self.comparison()?));
        }
    }

    fn comparison(&mut self) -> Result<Comparison> {
        let (left, _) = self.expression()?;
        match self.consume_if(Token::Comparison) {
            Some(op) => {
                let (right, _) = self.expression()?;
                Ok(Comparison::new(left, Operator::parse(op), right))
            }
            None => Ok(Comparison::truthy(left)),
        }
    }
}

/// Shorthand for a parser that has consumed everything.
pub(crate) fn finish(p: &mut Parser<'_>) -> Result<()> {
    p.consume(Token::EndOfString).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn literal(value: impl Into<Value>) -> Expr {
        Expr::Literal(value.into())
    }

    fn expr(source: &str) -> Result<(Expr, String)> {
        let mut p = Parser::new(source)?;
        let result = p.expression()?;
        finish(&mut p)?;
        Ok(result)
    }

    #[test]
    fn expression_literals() {
        assert_eq!(expr("'a b'").unwrap().0, literal("a b"));
        assert_eq!(expr("-3").unwrap().0, literal(-3));
        assert_eq!(expr("2.5").unwrap().0, literal(2.5));
        assert_eq!(expr("true").unwrap().0, literal(true));
        assert_eq!(expr("empty").unwrap().0, Expr::Empty);
    }

    #[test]
    fn expression_lookup_markup() {
        let (e, markup) = expr("a . b [ 'c' ] . size").unwrap();
        assert_eq!(markup, "a.b['c'].size");
        assert_eq!(
            e,
            Expr::Lookup(VariableLookup::new(
                Root::Name("a".into()),
                vec![
                    Lookup::Key("b".into()),
                    Lookup::Dynamic(literal("c")),
                    Lookup::Command(Command::Size),
                ]
            ))
        );
    }

    #[test]
    fn expression_keyword_with_lookup() {
        let (e, _) = expr("true.size").unwrap();
        assert!(matches!(e, Expr::Lookup(_)));
    }

    #[test]
    fn expression_range() {
        let (e, markup) = expr("( 1 .. 6 )").unwrap();
        assert_eq!(markup, "(1..6)");
        assert_eq!(e, Expr::Literal(Value::Range(1, 6)));
    }

    #[test]
    fn expression_invalid() {
        let err = expr("| x").unwrap_err();
        assert_eq!(err.message(), "'|' is not a valid expression");
        let err = expr("").unwrap_err();
        assert_eq!(err.message(), "'end_of_string' is not a valid expression");
    }

    #[test]
    fn expression_trailing_tokens() {
        let err = expr("a b").unwrap_err();
        assert_eq!(err.message(), "expected end_of_string but found id");
    }

    #[test]
    fn argument_keyword() {
        let mut p = Parser::new("limit: 2").unwrap();
        let arg = p.argument().unwrap();
        assert_eq!(arg.keyword, Some("limit"));
        assert_eq!(arg.expr, literal(2));
    }

    #[test]
    fn condition_chain() {
        let mut p = Parser::new("a == 1 or b contains 'x' and c").unwrap();
        let cond = p.condition().unwrap();
        finish(&mut p).unwrap();
        assert_eq!(
            cond.first,
            Comparison::new(Expr::parse("a"), Operator::Eq, literal(1))
        );
        assert_eq!(cond.rest[0].0, Relation::Or);
        assert_eq!(cond.rest[1], (Relation::And, Comparison::truthy(Expr::parse("c"))));
    }
}
