//! Patterns used by the lax parsers, which match markup by fragment rather
//! than tokenizing it.

use once_cell::sync::Lazy;
use regex::Regex;

/// A quoted string, or a run of characters that are not whitespace, commas,
/// pipes or quotes (possibly with quoted strings inside).
const QUOTED_FRAGMENT: &str = r#"(?:"[^"]*"|'[^']*'|(?:[^\s,|'"]|"[^"]*"|'[^']*')+)"#;

/// A character that can appear in an assignment target.
const VARIABLE_SIGNATURE: &str = r"(?:\(?[\w\-.\[\]]\)?)";

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => panic!("invalid built-in pattern `{pattern}`: {err}"),
    }
}

macro_rules! pattern {
    ($($name:ident = $pattern:expr;)+) => {
        $(
            pub static $name: Lazy<Regex> = Lazy::new(|| compile(&$pattern));
        )+
    };
}

pattern! {
    QUOTED_FRAGMENT_RE = QUOTED_FRAGMENT;
    TAG_ATTRIBUTES = format!(r"(\w[\w-]*)\s*:\s*({QUOTED_FRAGMENT})");
    JUST_TAG_ATTRIBUTES = format!(r"\A(\w[\w-]*)\s*:\s*({QUOTED_FRAGMENT})\z");

    FULL_TAG = r"(?s)\A\s*(\w+)\s*(.*)\z";
    END_RAW = r"\{%-?\s*endraw\s*-?%\}";

    INTEGER = r"\A-?\d+\z";
    FLOAT = r"\A-?\d[\d.]+\z";
    RANGE = r"\A\((\S+)\.\.(\S+)\)\z";

    MARKUP_WITH_QUOTED_FRAGMENT = format!(r"(?s)({QUOTED_FRAGMENT})(.*)");
    FILTER_MARKUP = r"(?s)\|\s*(.*)";
    FILTER_PARSER = format!(r"(?:\s+|{QUOTED_FRAGMENT}|,)+");
    FILTER_NAME = r"\w+";
    FILTER_ARGS = format!(r"(?::|,)\s*((?:\w+\s*:\s*)?{QUOTED_FRAGMENT})");

    CONDITION = format!(r"({QUOTED_FRAGMENT})\s*([=!<>a-z_]+)?\s*({QUOTED_FRAGMENT})?");
    FOR = format!(r"\A([\w-]+)\s+in\s+({QUOTED_FRAGMENT}+)\s*(reversed)?");
    TABLEROW = format!(r"(\w+)\s+in\s+({QUOTED_FRAGMENT}+)");
    CASE = format!(r"({QUOTED_FRAGMENT})");
    WHEN = format!(r"(?s)\A\s*({QUOTED_FRAGMENT})(?:(?:\s+or\s+|\s*,\s*)({QUOTED_FRAGMENT}.*))?");
    ASSIGN = format!(r"(?s)({VARIABLE_SIGNATURE}+)\s*=\s*(.*)\s*");
    CAPTURE = format!(r"({VARIABLE_SIGNATURE}+)");
    CYCLE_SIMPLE = format!(r"\A{QUOTED_FRAGMENT}+");
    CYCLE_NAMED = format!(r"(?s)\A({QUOTED_FRAGMENT})\s*:\s*(.*)");
}
