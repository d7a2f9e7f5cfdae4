use std::cmp::max;
use std::fmt;
use std::io;

use crate::types::span::Span;

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed tag or expression, unterminated tag or variable, invalid
    /// attribute, unknown tag, or a structural mismatch like a stray `else`.
    Syntax,
    /// Block nesting or the render scope stack is too deep.
    StackLevel,
    /// A resource limit was exceeded during rendering.
    Memory,
    /// A variable lookup failed with strict variables enabled.
    UndefinedVariable,
    /// A host object did not provide a key with strict variables enabled.
    UndefinedDropMethod,
    /// An unknown filter was used with strict filters enabled.
    UndefinedFilter,
    /// An invalid argument was passed to an operation.
    Argument,
    /// Anything unexpected.
    Internal,
}

/// An error that can occur during template compilation or rendering.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    line: Option<usize>,
    name: Option<String>,
    span: Option<(String, Span)>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            line: None,
            name: None,
            span: None,
        }
    }

    pub(crate) fn syntax(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, msg)
    }

    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument, msg)
    }

    pub(crate) fn stack_level() -> Self {
        Self::new(ErrorKind::StackLevel, "nesting too deep")
    }

    pub(crate) fn memory() -> Self {
        Self::new(ErrorKind::Memory, "memory limits exceeded")
    }

    pub(crate) fn undefined_variable(key: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::UndefinedVariable,
            format!("undefined variable {key}"),
        )
    }

    pub(crate) fn undefined_drop_method(key: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::UndefinedDropMethod,
            format!("undefined method {key}"),
        )
    }

    pub(crate) fn undefined_filter(name: &str) -> Self {
        Self::new(
            ErrorKind::UndefinedFilter,
            format!("undefined filter {name}"),
        )
    }

    /// Attach a line number, unless the error already has one.
    pub(crate) fn with_line(mut self, line: Option<usize>) -> Self {
        if self.line.is_none() {
            self.line = line;
        }
        self
    }

    /// Attach a template name, unless the error already has one.
    pub(crate) fn with_template_name(mut self, name: Option<&str>) -> Self {
        if self.name.is_none() {
            self.name = name.map(String::from);
        }
        self
    }

    /// Attach the region of the template source that caused this error.
    pub(crate) fn with_span(mut self, source: &str, span: impl Into<Span>) -> Self {
        if self.span.is_none() && !source.is_empty() {
            self.span = Some((source.to_owned(), span.into()));
        }
        self
    }

    /// Append the markup a strict parse failed on to the message.
    pub(crate) fn with_markup_context(mut self, markup: &str) -> Self {
        self.msg = format!("{} in \"{}\"", self.msg, markup.trim());
        self
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message without any location information.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the line in the template source this error originated from.
    pub fn line_number(&self) -> Option<usize> {
        self.line
    }

    /// Returns the name of the template this error originated from.
    pub fn template_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn is_memory(&self) -> bool {
        self.kind == ErrorKind::Memory
    }

    fn fmt_prefix(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Syntax => f.write_str("syntax error")?,
            _ => f.write_str("error")?,
        }
        if let Some(line) = self.line {
            f.write_str(" (")?;
            if let Some(name) = &self.name {
                write!(f, "{name} ")?;
            }
            write!(f, "line {line})")?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Self::new(ErrorKind::Argument, msg.to_string())
    }
}

impl From<fmt::Error> for Error {
    fn from(err: fmt::Error) -> Self {
        Self::new(ErrorKind::Internal, err.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::new(ErrorKind::Internal, format!("io: {err}"))
    }
}

impl std::error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => {
                self.fmt_prefix(f)?;
                fmt_pretty(&self.msg, source, *span, f)
            }
            None => fmt::Display::fmt(self, f),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prefix(f)?;
        match &self.span {
            Some((source, span)) if f.alternate() => fmt_pretty(&self.msg, source, *span, f),
            _ => write!(f, ": {}", self.msg),
        }
    }
}

fn fmt_pretty(msg: &str, source: &str, span: Span, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<_> = source.split_terminator('\n').collect();
    let (line, col) = to_line_col(&lines, span.m);
    let width = max(1, width(&source[span]));
    let code = match lines.get(line).or_else(|| lines.last()) {
        Some(code) => code,
        None => "",
    };

    let num = (line + 1).to_string();
    let pad = width_of(&num);
    let pipe = "|";
    let underline = "^".repeat(width);

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
        msg = msg
    )
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, width(&line[..offset - n]));
        }
        n += len;
    }
    (lines.len(), lines.last().map(|l| width(l)).unwrap_or(0))
}

/// The display width of the first line of `s`.
fn width(s: &str) -> usize {
    width_of(s.split('\n').next().unwrap_or(s))
}

#[cfg(feature = "unicode")]
fn width_of(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn width_of(s: &str) -> usize {
    s.chars().count()
}
