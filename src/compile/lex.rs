use crate::types::span::Span;
use crate::{Error, Result};

/// A lexer that splits a single piece of tag or output markup into tokens.
///
/// This backs the strict expression parser. The parser calls
/// [`.next()?`][Lexer::next] repeatedly until [`Token::EndOfString`] is
/// returned, which is then returned for every further call.
pub struct Lexer<'source> {
    /// The markup being tokenized.
    pub source: &'source str,

    /// A cursor over the markup.
    cursor: usize,
}

/// The unit yielded by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `==`, `!=`, `<>`, `<`, `>`, `<=`, `>=` or `contains`
    Comparison,
    /// A single or double quoted string, e.g. `'hello'`
    String,
    /// An integer or float literal, e.g. `-12` or `1.5`
    Number,
    /// An identifier, e.g. `product`, `in-stock` or `available?`
    Ident,
    /// `..`
    DotDot,
    /// `|`
    Pipe,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `[`
    OpenSquare,
    /// `]`
    CloseSquare,
    /// `(`
    OpenRound,
    /// `)`
    CloseRound,
    /// `?`
    Question,
    /// `-`
    Dash,
    /// The end of the markup.
    EndOfString,
}

impl<'source> Lexer<'source> {
    /// Construct a new lexer.
    pub fn new(source: &'source str) -> Self {
        Self { source, cursor: 0 }
    }

    /// Returns the next token and its span.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<(Token, Span)> {
        let i = self.lex_while(self.cursor, char::is_whitespace);
        if i == self.source.len() {
            self.cursor = i;
            return Ok((Token::EndOfString, Span::from(i..i)));
        }

        let (tk, j) = match self.lex_comparison(i) {
            Some(j) => (Token::Comparison, j),
            None => self.lex_other(i)?,
        };
        self.cursor = j;
        Ok((tk, Span::from(i..j)))
    }

    fn lex_comparison(&self, i: usize) -> Option<usize> {
        let rest = &self.source[i..];
        for op in ["==", "!=", "<>", "<=", ">="] {
            if rest.starts_with(op) {
                return Some(i + 2);
            }
        }
        if rest.starts_with('<') || rest.starts_with('>') {
            return Some(i + 1);
        }
        let word = "contains";
        if rest.starts_with(word)
            && rest[word.len()..].starts_with(|c: char| c.is_whitespace())
        {
            return Some(i + word.len());
        }
        None
    }

    fn lex_other(&self, i: usize) -> Result<(Token, usize)> {
        let mut iter = self.source[i..].char_indices().map(|(d, c)| (i + d, c));

        // We've already checked that there is more markup remaining.
        let c = match iter.next() {
            Some((_, c)) => c,
            None => return Ok((Token::EndOfString, i)),
        };
        let peek = iter.next().map(|(_, c)| c);

        let tk = match c {
            q @ ('\'' | '"') => match self.source[i + 1..].find(q) {
                Some(n) => (Token::String, i + n + 2),
                None => return Err(err_unexpected_character(c)),
            },
            '-' if peek.map_or(false, |c| c.is_ascii_digit()) => {
                (Token::Number, self.lex_number(i + 1))
            }
            c if c.is_ascii_digit() => (Token::Number, self.lex_number(i)),
            c if is_ident_start(c) => (Token::Ident, self.lex_ident(i)),
            '.' if peek == Some('.') => (Token::DotDot, i + 2),
            '|' => (Token::Pipe, i + 1),
            '.' => (Token::Dot, i + 1),
            ':' => (Token::Colon, i + 1),
            ',' => (Token::Comma, i + 1),
            '[' => (Token::OpenSquare, i + 1),
            ']' => (Token::CloseSquare, i + 1),
            '(' => (Token::OpenRound, i + 1),
            ')' => (Token::CloseRound, i + 1),
            '?' => (Token::Question, i + 1),
            '-' => (Token::Dash, i + 1),
            c => return Err(err_unexpected_character(c)),
        };
        Ok(tk)
    }

    /// Lexes `\d+(\.\d+)?` starting at `i`.
    fn lex_number(&self, i: usize) -> usize {
        let j = self.lex_while(i, |c| c.is_ascii_digit());
        let rest = &self.source[j..];
        if rest.starts_with('.') && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
            self.lex_while(j + 1, |c| c.is_ascii_digit())
        } else {
            j
        }
    }

    /// Lexes an identifier with an optional trailing `?` starting at `i`.
    fn lex_ident(&self, i: usize) -> usize {
        let j = self.lex_while(i, is_ident);
        match self.source[j..].starts_with('?') {
            true => j + 1,
            false => j,
        }
    }

    fn lex_while<P>(&self, i: usize, pred: P) -> usize
    where
        P: Fn(char) -> bool,
    {
        self.source[i..]
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map(|(d, _)| i + d)
            .unwrap_or(self.source.len())
    }
}

impl Token {
    pub fn human(&self) -> &'static str {
        match self {
            Self::Comparison => "comparison",
            Self::String => "string",
            Self::Number => "number",
            Self::Ident => "id",
            Self::DotDot => "dotdot",
            Self::Pipe => "pipe",
            Self::Dot => "dot",
            Self::Colon => "colon",
            Self::Comma => "comma",
            Self::OpenSquare => "open_square",
            Self::CloseSquare => "close_square",
            Self::OpenRound => "open_round",
            Self::CloseRound => "close_round",
            Self::Question => "question",
            Self::Dash => "dash",
            Self::EndOfString => "end_of_string",
        }
    }
}

fn err_unexpected_character(c: char) -> Error {
    Error::syntax(format!("unexpected character {c}"))
}

/// Splits the markup into tokens, ending with [`Token::EndOfString`].
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let (tk, span) = lexer.next()?;
        tokens.push((tk, span));
        if tk == Token::EndOfString {
            return Ok(tokens);
        }
    }
}

#[cfg(feature = "unicode")]
fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

#[cfg(feature = "unicode")]
fn is_ident(c: char) -> bool {
    c == '-' || unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "unicode"))]
fn is_ident_start(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '_')
}

#[cfg(not(feature = "unicode"))]
fn is_ident(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '_' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_empty() {
        let tokens = lex("  ").unwrap();
        assert_eq!(tokens, [(Token::EndOfString, "")]);
    }

    #[test]
    fn lex_comparisons() {
        let tokens = lex("a == b != c <> d <= e >= f < g > h contains i").unwrap();
        let comparisons: Vec<_> = tokens
            .iter()
            .filter(|(tk, _)| *tk == Token::Comparison)
            .map(|(_, s)| *s)
            .collect();
        assert_eq!(
            comparisons,
            ["==", "!=", "<>", "<=", ">=", "<", ">", "contains"]
        );
    }

    #[test]
    fn lex_contains_needs_whitespace() {
        let tokens = lex("contains.size").unwrap();
        assert_eq!(
            tokens,
            [
                (Token::Ident, "contains"),
                (Token::Dot, "."),
                (Token::Ident, "size"),
                (Token::EndOfString, ""),
            ]
        );
    }

    #[test]
    fn lex_strings() {
        let tokens = lex(r#"'it"s' "a'b""#).unwrap();
        assert_eq!(
            tokens,
            [
                (Token::String, r#"'it"s'"#),
                (Token::String, r#""a'b""#),
                (Token::EndOfString, ""),
            ]
        );
    }

    #[test]
    fn lex_numbers() {
        let tokens = lex("1 -2 3.5 -0.25 4.").unwrap();
        assert_eq!(
            tokens,
            [
                (Token::Number, "1"),
                (Token::Number, "-2"),
                (Token::Number, "3.5"),
                (Token::Number, "-0.25"),
                (Token::Number, "4"),
                (Token::Dot, "."),
                (Token::EndOfString, ""),
            ]
        );
    }

    #[test]
    fn lex_range() {
        let tokens = lex("(1..num)").unwrap();
        assert_eq!(
            tokens,
            [
                (Token::OpenRound, "("),
                (Token::Number, "1"),
                (Token::DotDot, ".."),
                (Token::Ident, "num"),
                (Token::CloseRound, ")"),
                (Token::EndOfString, ""),
            ]
        );
    }

    #[test]
    fn lex_identifiers() {
        let tokens = lex("in-stock available? _x").unwrap();
        assert_eq!(
            tokens,
            [
                (Token::Ident, "in-stock"),
                (Token::Ident, "available?"),
                (Token::Ident, "_x"),
                (Token::EndOfString, ""),
            ]
        );
    }

    #[test]
    fn lex_specials() {
        let tokens = lex("a[0] | f: b, c").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|(tk, _)| *tk).collect();
        assert_eq!(
            kinds,
            [
                Token::Ident,
                Token::OpenSquare,
                Token::Number,
                Token::CloseSquare,
                Token::Pipe,
                Token::Ident,
                Token::Colon,
                Token::Ident,
                Token::Comma,
                Token::Ident,
                Token::EndOfString,
            ]
        );
    }

    #[test]
    fn lex_err_unexpected_character() {
        let err = lex("a % b").unwrap_err();
        assert_eq!(err.to_string(), "syntax error: unexpected character %");
    }

    #[test]
    fn lex_err_unterminated_string() {
        let err = lex("'abc").unwrap_err();
        assert_eq!(err.to_string(), "syntax error: unexpected character '");
    }

    fn lex(source: &str) -> Result<Vec<(Token, &str)>> {
        Ok(tokenize(source)?
            .into_iter()
            .map(|(tk, sp)| (tk, &source[sp]))
            .collect())
    }
}
