//! The s-expression value and its canonical text.

use std::fmt::{self, Write as _};

use indexmap::IndexMap;
use logos::Logos;
use smol_str::SmolStr;

use super::lexer::SexpToken;

/// One s-expression value.
///
/// `Display` renders the canonical text that [`super::parse_sexp`] reads back:
///
/// ```text
/// nil true false 42 -1.5 "text" sym :keyword [a b] {:k v} (head a b)
/// ```
///
/// Symbols and keys that would not read back bare are quoted like strings,
/// as in `#"a b"`, `#"nil"` and `{:"" 1}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexp {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(SmolStr),
    List(Vec<Sexp>),
    /// Keyed map; keys are written with a leading `:`
    Map(IndexMap<SmolStr, Sexp>),
    /// `(head args...)`
    Call { head: SmolStr, args: Vec<Sexp> },
}

impl Sexp {
    pub fn symbol(text: impl Into<SmolStr>) -> Self {
        Sexp::Symbol(text.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Sexp::Str(text.into())
    }

    pub fn call(head: impl Into<SmolStr>, args: Vec<Sexp>) -> Self {
        Sexp::Call {
            head: head.into(),
            args,
        }
    }

    /// The head of a call form
    pub fn head(&self) -> Option<&str> {
        match self {
            Sexp::Call { head, .. } => Some(head),
            _ => None,
        }
    }

    /// Arguments of a call form, elements of a list
    pub fn items(&self) -> &[Sexp] {
        match self {
            Sexp::Call { args, .. } => args,
            Sexp::List(items) => items,
            _ => &[],
        }
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::Nil => f.write_str("nil"),
            Sexp::Bool(value) => write!(f, "{value}"),
            Sexp::Int(value) => write!(f, "{value}"),
            Sexp::Float(value) => write!(f, "{value:?}"),
            Sexp::Str(text) => write_quoted(f, text),
            Sexp::Symbol(text) => write_symbol(f, text),
            Sexp::List(items) => {
                f.write_char('[')?;
                write_separated(f, items)?;
                f.write_char(']')
            }
            Sexp::Map(entries) => {
                f.write_char('{')?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write_key(f, key)?;
                    write!(f, " {value}")?;
                }
                f.write_char('}')
            }
            Sexp::Call { head, args } => {
                f.write_char('(')?;
                write_symbol(f, head)?;
                if !args.is_empty() {
                    f.write_char(' ')?;
                    write_separated(f, args)?;
                }
                f.write_char(')')
            }
        }
    }
}

fn write_separated(f: &mut fmt::Formatter<'_>, items: &[Sexp]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// True when `text` lexes back as exactly one token of one of `kinds`
fn lexes_whole(text: &str, kinds: &[SexpToken]) -> bool {
    let mut lexer = SexpToken::lexer(text);
    let first = lexer.next();
    first.is_some_and(|token| token.is_ok_and(|kind| kinds.contains(&kind)))
        && lexer.span().end == text.len()
}

fn write_symbol(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if lexes_whole(text, &[SexpToken::Symbol, SexpToken::Keyword]) {
        f.write_str(text)
    } else {
        f.write_char('#')?;
        write_quoted(f, text)
    }
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    f.write_char(':')?;
    if lexes_whole(&format!(":{key}"), &[SexpToken::Keyword]) {
        f.write_str(key)
    } else {
        write_quoted(f, key)
    }
}

/// Control characters other than `\n \t \r` are written as `\oNNN`
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in text.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c.is_ascii_control() => write!(f, "\\o{:03o}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}
