use std::fmt;

use crate::expr::Expr;
use crate::render::Context;
use crate::value::{Command, ValueCow};
use crate::{Error, Result, Value};

/// A variable lookup, e.g. `product.variants[0].title`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableLookup {
    pub root: Root,
    pub lookups: Vec<Lookup>,
}

/// The first part of a lookup, resolved against the scopes.
#[derive(Debug, Clone, PartialEq)]
pub enum Root {
    /// A plain name, e.g. `product`.
    Name(String),
    /// A bracketed expression, e.g. `[key]` or `["product"]`.
    Dynamic(Box<Expr>),
}

/// A single step after the root.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// A dotted key, e.g. `.title`.
    Key(String),
    /// A dotted `.size`, `.first` or `.last`.
    Command(Command),
    /// A bracketed expression, e.g. `[0]` or `[key]`.
    Dynamic(Expr),
}

impl VariableLookup {
    pub fn new(root: Root, lookups: Vec<Lookup>) -> Self {
        Self { root, lookups }
    }

    /// Parses a lookup from markup, splitting it into names and bracketed
    /// parts.
    pub fn parse(markup: &str) -> Self {
        let mut parts = segments(markup).into_iter();
        let root = match parts.next() {
            Some(part) => match bracketed(part) {
                Some(inner) => Root::Dynamic(Box::new(Expr::parse(inner))),
                None => Root::Name(part.to_owned()),
            },
            None => Root::Name(String::new()),
        };
        let lookups = parts
            .map(|part| match bracketed(part) {
                Some(inner) => Lookup::Dynamic(Expr::parse(inner)),
                None => match Command::from_name(part) {
                    Some(command) => Lookup::Command(command),
                    None => Lookup::Key(part.to_owned()),
                },
            })
            .collect();
        Self { root, lookups }
    }

    /// The root name, if this lookup does not start with a bracket.
    pub fn name(&self) -> Option<&str> {
        match &self.root {
            Root::Name(name) => Some(name),
            Root::Dynamic(_) => None,
        }
    }

    pub fn evaluate<'a>(&'a self, ctx: &'a Context<'_>) -> Result<ValueCow<'a>> {
        let dynamic;
        let name: &str = match &self.root {
            Root::Name(name) => name,
            Root::Dynamic(expr) => {
                dynamic = expr.evaluate(ctx)?.to_output();
                &dynamic
            }
        };
        let mut value = match ctx.find_variable(name) {
            Some(value) => ValueCow::Borrowed(value),
            None if ctx.strict_variables() => return Err(Error::undefined_variable(name)),
            None => return Ok(ValueCow::Owned(Value::None)),
        };
        value = bind(value, ctx);

        for lookup in &self.lookups {
            let (key, command) = match lookup {
                Lookup::Key(key) => (Value::String(key.clone()), None),
                Lookup::Command(command) => (Value::String(command.name().to_owned()), Some(*command)),
                Lookup::Dynamic(expr) => (expr.evaluate(ctx)?.into_owned(), None),
            };
            value = match value {
                ValueCow::Borrowed(v) => match index(v, &key) {
                    Some(child) => ValueCow::Borrowed(child),
                    None => ValueCow::Owned(fallback(v, &key, command, ctx)?),
                },
                ValueCow::Owned(v) => match index(&v, &key) {
                    Some(child) => ValueCow::Owned(child.clone()),
                    None => ValueCow::Owned(fallback(&v, &key, command, ctx)?),
                },
            };
            value = bind(value, ctx);
        }
        Ok(value)
    }
}

impl fmt::Display for VariableLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Root::Name(name) => f.write_str(name)?,
            Root::Dynamic(expr) => write!(f, "[{expr:?}]")?,
        }
        for lookup in &self.lookups {
            match lookup {
                Lookup::Key(key) => write!(f, ".{key}")?,
                Lookup::Command(command) => write!(f, ".{}", command.name())?,
                Lookup::Dynamic(expr) => write!(f, "[{expr:?}]")?,
            }
        }
        Ok(())
    }
}

/// Splits markup into names and bracketed parts, e.g. `a[b[0]].c?` into
/// `a`, `[b[0]]` and `c?`. Brackets nest to any depth, an unbalanced `[` is
/// skipped along with any other punctuation.
fn segments(markup: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut chars = markup.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '[' {
            if let Some(end) = closing_bracket(&markup[i..]).map(|n| i + n) {
                segments.push(&markup[i..=end]);
                while chars.next_if(|&(j, _)| j <= end).is_some() {}
            }
        } else if is_segment(c) {
            let mut end = i + c.len_utf8();
            while let Some((j, c)) = chars.next_if(|&(_, c)| is_segment(c)) {
                end = j + c.len_utf8();
            }
            if let Some((j, _)) = chars.next_if(|&(_, c)| c == '?') {
                end = j + 1;
            }
            segments.push(&markup[i..end]);
        }
    }
    segments
}

fn is_segment(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// The index of the `]` that closes the `[` at the start of `s`.
fn closing_bracket(s: &str) -> Option<usize> {
    let mut depth = 0;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn bracketed(part: &str) -> Option<&str> {
    part.strip_prefix('[')?.strip_suffix(']')
}

static NIL: Value = Value::None;

/// Indexes into a map by string key or a list by integer.
fn index<'v>(value: &'v Value, key: &Value) -> Option<&'v Value> {
    match (value, key) {
        (Value::Map(map), Value::String(key)) => map.get(key),
        (Value::List(list), Value::Integer(i)) => {
            let len = list.len() as i64;
            let i = if *i < 0 { len + i } else { *i };
            match (0..len).contains(&i) {
                true => list.get(i as usize),
                false => Some(&NIL),
            }
        }
        _ => None,
    }
}

fn fallback(value: &Value, key: &Value, command: Option<Command>, ctx: &Context<'_>) -> Result<Value> {
    if let Value::Object(obj) = value {
        if let Some(v) = obj.get(&key.to_output()) {
            return Ok(v);
        }
    }
    if let Some(v) = command.and_then(|c| value.command(c)) {
        return Ok(v);
    }
    match (ctx.strict_variables(), value) {
        (false, _) => Ok(Value::None),
        (true, Value::Object(_)) => Err(Error::undefined_drop_method(key.to_output())),
        (true, _) => Err(Error::undefined_variable(key.to_output())),
    }
}

fn bind<'a>(value: ValueCow<'a>, ctx: &Context<'_>) -> ValueCow<'a> {
    if let Value::Object(obj) = &*value {
        if let Some(bound) = obj.bind(ctx) {
            return ValueCow::Owned(bound);
        }
    }
    value
}
