//! Splits template source into text, tag and output segments.

use crate::compile::syntax;
use crate::types::span::Span;
use crate::{Error, Result};

/// The kind of a raw template segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text.
    Text,
    /// A `{% ... %}` segment.
    Tag,
    /// A `{{ ... }}` segment.
    Output,
}

/// One raw segment of template source, delimiters included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub raw: &'a str,
    pub span: Span,
    pub line: Option<usize>,
}

impl<'a> Token<'a> {
    /// Whether the opening delimiter carries a trim marker, e.g. `{%-`.
    pub fn trim_left(&self) -> bool {
        self.kind != TokenKind::Text && self.raw.as_bytes().get(2) == Some(&b'-')
    }

    /// Whether the closing delimiter carries a trim marker, e.g. `-%}`.
    pub fn trim_right(&self) -> bool {
        let bytes = self.raw.as_bytes();
        self.kind != TokenKind::Text && bytes.len() >= 5 && bytes[bytes.len() - 3] == b'-'
    }

    /// The markup between the delimiters and any trim markers.
    pub fn inner(&self) -> &'a str {
        if self.kind == TokenKind::Text {
            return self.raw;
        }
        let mut inner = &self.raw[2..self.raw.len() - 2];
        if self.trim_left() {
            inner = &inner[1..];
        }
        if self.trim_right() && !inner.is_empty() {
            inner = &inner[..inner.len() - 1];
        }
        inner
    }
}

/// A lazy tokenizer over template source.
///
/// Only moves forward. Restarting means constructing a new tokenizer.
pub struct Tokenizer<'a> {
    source: &'a str,
    cursor: usize,
    /// The line the next token starts on, if tracked.
    line: Option<usize>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, line_numbers: bool) -> Self {
        Self {
            source,
            cursor: 0,
            line: line_numbers.then_some(1),
        }
    }

    /// The template source being tokenized.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The line the next token starts on, if tracked.
    pub fn line_number(&self) -> Option<usize> {
        self.line
    }

    /// Returns the next segment, or `None` at the end of input.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Token<'a>>> {
        let rest = &self.source[self.cursor..];
        if rest.is_empty() {
            return Ok(None);
        }

        let i = self.cursor;
        let j = match find_start(rest) {
            Some(0) => {
                let kind = match rest.as_bytes()[1] {
                    b'%' => TokenKind::Tag,
                    _ => TokenKind::Output,
                };
                let end = find_end(rest, kind).ok_or_else(|| self.err_unterminated(kind, rest))?;
                return Ok(Some(self.emit(kind, i + end)));
            }
            Some(n) => i + n,
            None => self.source.len(),
        };
        Ok(Some(self.emit(TokenKind::Text, j)))
    }

    /// Consumes everything up to and including the next `{% end<name> %}`
    /// tag, returning the verbatim content before it and the closing tag.
    ///
    /// Used by tags whose body must not be tokenized, like `raw`.
    pub fn take_verbatim(&mut self, name: &str) -> Option<(Token<'a>, Token<'a>)> {
        let re = match name {
            "raw" => &*syntax::END_RAW,
            _ => return None,
        };
        let rest = &self.source[self.cursor..];
        let m = re.find(rest)?;
        let body = self.emit(TokenKind::Text, self.cursor + m.start());
        let end = self.emit(TokenKind::Tag, self.cursor + m.len());
        Some((body, end))
    }

    fn emit(&mut self, kind: TokenKind, end: usize) -> Token<'a> {
        let span = Span::from(self.cursor..end);
        let raw = &self.source[span];
        let token = Token {
            kind,
            raw,
            span,
            line: self.line,
        };
        if let Some(line) = &mut self.line {
            *line += raw.matches('\n').count();
        }
        self.cursor = end;
        token
    }

    fn err_unterminated(&self, kind: TokenKind, rest: &str) -> Error {
        let what = match kind {
            TokenKind::Tag => "tag",
            _ => "variable",
        };
        let excerpt = rest.lines().next().unwrap_or(rest);
        Error::syntax(format!("{what} '{excerpt}' was not properly terminated"))
            .with_line(self.line)
            .with_span(self.source, self.cursor..self.cursor + excerpt.len())
    }
}

/// Finds the first `{{` or `{%` in `s`.
fn find_start(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while let Some(n) = s[i..].find('{') {
        let at = i + n;
        match bytes.get(at + 1) {
            Some(b'{' | b'%') => return Some(at),
            _ => i = at + 1,
        }
    }
    None
}

/// Finds the end of the tag or output segment starting at the beginning of
/// `s`, skipping over quoted strings.
fn find_end(s: &str, kind: TokenKind) -> Option<usize> {
    let close = match kind {
        TokenKind::Tag => "%}",
        _ => "}}",
    };
    let bytes = s.as_bytes();
    let mut i = 2;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'"' | b'\'') => match s[i + 1..].find(q as char) {
                Some(n) => i += n + 2,
                None => i += 1,
            },
            _ if bytes[i..].starts_with(close.as_bytes()) => return Some(i + 2),
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<(TokenKind, &str, Option<usize>)> {
        let mut tokens = Tokenizer::new(source, true);
        let mut v = Vec::new();
        while let Some(t) = tokens.next().unwrap() {
            v.push((t.kind, t.raw, t.line));
        }
        v
    }

    #[test]
    fn tokenize_empty() {
        assert_eq!(tokenize(""), Vec::new());
    }

    #[test]
    fn tokenize_text_only() {
        assert_eq!(
            tokenize("lorem { ipsum"),
            vec![(TokenKind::Text, "lorem { ipsum", Some(1))]
        );
    }

    #[test]
    fn tokenize_mixed() {
        assert_eq!(
            tokenize("a {{ b }}\n{% if c %}d{% endif %}"),
            vec![
                (TokenKind::Text, "a ", Some(1)),
                (TokenKind::Output, "{{ b }}", Some(1)),
                (TokenKind::Text, "\n", Some(1)),
                (TokenKind::Tag, "{% if c %}", Some(2)),
                (TokenKind::Text, "d", Some(2)),
                (TokenKind::Tag, "{% endif %}", Some(2)),
            ]
        );
    }

    #[test]
    fn tokenize_multiline_tag_counts_lines() {
        assert_eq!(
            tokenize("{% if\n a\n %}{{ x }}"),
            vec![
                (TokenKind::Tag, "{% if\n a\n %}", Some(1)),
                (TokenKind::Output, "{{ x }}", Some(3)),
            ]
        );
    }

    #[test]
    fn tokenize_skips_delimiters_in_strings() {
        assert_eq!(
            tokenize(r#"{{ "}}" | append: '%}' }}!"#),
            vec![
                (TokenKind::Output, r#"{{ "}}" | append: '%}' }}"#, Some(1)),
                (TokenKind::Text, "!", Some(1)),
            ]
        );
    }

    #[test]
    fn tokenize_unmatched_quote_is_ordinary() {
        assert_eq!(
            tokenize("{{ it's }}"),
            vec![(TokenKind::Output, "{{ it's }}", Some(1))]
        );
    }

    #[test]
    fn tokenize_without_line_numbers() {
        let mut tokens = Tokenizer::new("a\n{{ b }}", false);
        assert_eq!(tokens.next().unwrap().unwrap().line, None);
        assert_eq!(tokens.next().unwrap().unwrap().line, None);
    }

    #[test]
    fn tokenize_err_unterminated_tag() {
        let mut tokens = Tokenizer::new("lorem\n{% if x\nipsum", true);
        tokens.next().unwrap();
        let err = tokens.next().unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error (line 2): tag '{% if x' was not properly terminated"
        );
    }

    #[test]
    fn tokenize_err_unterminated_variable() {
        let err = Tokenizer::new("{{ x ", true).next().unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error (line 1): variable '{{ x ' was not properly terminated"
        );
    }

    #[test]
    fn token_trim_markers() {
        let mut tokens = Tokenizer::new("{%- if x -%}{{-y}}{%-%}", false);
        let t = tokens.next().unwrap().unwrap();
        assert!(t.trim_left() && t.trim_right());
        assert_eq!(t.inner(), " if x ");
        let t = tokens.next().unwrap().unwrap();
        assert!(t.trim_left() && !t.trim_right());
        assert_eq!(t.inner(), "y");
        let t = tokens.next().unwrap().unwrap();
        assert!(t.trim_left() && t.trim_right());
        assert_eq!(t.inner(), "");
    }

    #[test]
    fn take_verbatim_raw() {
        let mut tokens = Tokenizer::new("{% raw %}{{ x }{% endraw %}!", true);
        tokens.next().unwrap();
        let (body, end) = tokens.take_verbatim("raw").unwrap();
        assert_eq!(body.raw, "{{ x }");
        assert_eq!(end.raw, "{% endraw %}");
        assert_eq!(tokens.next().unwrap().unwrap().raw, "!");
    }
}
