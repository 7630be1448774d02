//! Recursive-descent reader for s-expression text.

use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;

use super::Sexp;
use super::lexer::{Lexeme, SexpLexer, SexpToken};
use crate::parser::ErrorCode;

/// Malformed s-expression text; `offset` is the byte offset of the problem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message} at offset {offset}")]
pub struct SexpError {
    pub code: ErrorCode,
    pub message: String,
    pub offset: usize,
}

impl SexpError {
    fn new(code: ErrorCode, detail: impl std::fmt::Display, offset: usize) -> Self {
        Self {
            code,
            message: format!("{} {detail}", code.default_message()),
            offset,
        }
    }

    fn unexpected(lexeme: &Lexeme<'_>) -> Self {
        match lexeme.kind {
            Some(kind) => Self::new(ErrorCode::E0602, kind.describe(), lexeme.offset),
            None => Self::new(ErrorCode::E0601, format!("'{}'", lexeme.text), lexeme.offset),
        }
    }
}

/// Read exactly one value; anything after it is an error
pub fn parse_sexp(text: &str) -> Result<Sexp, SexpError> {
    let mut reader = Reader {
        lexer: SexpLexer::new(text),
        end: text.len(),
    };
    let value = reader.value()?;
    match reader.lexer.next() {
        None => Ok(value),
        Some(extra) => Err(SexpError::unexpected(&extra)),
    }
}

struct Reader<'a> {
    lexer: SexpLexer<'a>,
    end: usize,
}

impl<'a> Reader<'a> {
    fn next(&mut self, context: &str) -> Result<Lexeme<'a>, SexpError> {
        self.lexer.next().ok_or_else(|| {
            SexpError::new(ErrorCode::E0603, format!("in {context}"), self.end)
        })
    }

    fn value(&mut self) -> Result<Sexp, SexpError> {
        let lexeme = self.next("value")?;
        self.value_from(lexeme)
    }

    /// The next element, or `None` at `close`
    fn element(&mut self, close: SexpToken, context: &str) -> Result<Option<Sexp>, SexpError> {
        let lexeme = self.next(context)?;
        if lexeme.kind == Some(close) {
            return Ok(None);
        }
        self.value_from(lexeme).map(Some)
    }

    fn value_from(&mut self, lexeme: Lexeme<'a>) -> Result<Sexp, SexpError> {
        let Some(kind) = lexeme.kind else {
            return Err(SexpError::unexpected(&lexeme));
        };
        match kind {
            SexpToken::LParen => self.call(),
            SexpToken::LBrack => {
                let mut items = Vec::new();
                while let Some(item) = self.element(SexpToken::RBrack, "list")? {
                    items.push(item);
                }
                Ok(Sexp::List(items))
            }
            SexpToken::LBrace => self.map(),
            SexpToken::Str => unescape(&lexeme, 1).map(Sexp::Str),
            SexpToken::Int => lexeme
                .text
                .parse()
                .map(Sexp::Int)
                .map_err(|_| SexpError::new(ErrorCode::E0605, lexeme.text, lexeme.offset)),
            SexpToken::Float => match lexeme.text.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Sexp::Float(value)),
                _ => Err(SexpError::new(ErrorCode::E0605, lexeme.text, lexeme.offset)),
            },
            SexpToken::True => Ok(Sexp::Bool(true)),
            SexpToken::False => Ok(Sexp::Bool(false)),
            SexpToken::Nil => Ok(Sexp::Nil),
            SexpToken::Keyword | SexpToken::Symbol => Ok(Sexp::Symbol(lexeme.text.into())),
            SexpToken::QuotedSymbol | SexpToken::QuotedKeyword => symbol_text(&lexeme).map(Sexp::Symbol),
            SexpToken::RParen | SexpToken::RBrack | SexpToken::RBrace => {
                Err(SexpError::unexpected(&lexeme))
            }
        }
    }

    /// `(head args...)` after the `(`; the head must be a symbol
    fn call(&mut self) -> Result<Sexp, SexpError> {
        let lexeme = self.next("call")?;
        let head = match lexeme.kind {
            Some(SexpToken::Symbol | SexpToken::Keyword) => SmolStr::new(lexeme.text),
            Some(SexpToken::QuotedSymbol | SexpToken::QuotedKeyword) => symbol_text(&lexeme)?,
            _ => return Err(SexpError::unexpected(&lexeme)),
        };
        let mut args = Vec::new();
        while let Some(arg) = self.element(SexpToken::RParen, "call")? {
            args.push(arg);
        }
        Ok(Sexp::Call { head, args })
    }

    /// `{:key value ...}` after the `{`
    fn map(&mut self) -> Result<Sexp, SexpError> {
        let mut entries = IndexMap::new();
        loop {
            let key = self.next("map")?;
            match key.kind {
                Some(SexpToken::RBrace) => return Ok(Sexp::Map(entries)),
                Some(SexpToken::Keyword) => {
                    let name = SmolStr::new(&key.text[1..]);
                    let value = self.value()?;
                    entries.insert(name, value);
                }
                Some(SexpToken::QuotedKeyword) => {
                    let name = unescape(&key, 2)?;
                    let value = self.value()?;
                    entries.insert(name.into(), value);
                }
                _ => return Err(SexpError::unexpected(&key)),
            }
        }
    }
}

/// The text of a quoted symbol; a quoted keyword keeps its leading `:`
fn symbol_text(lexeme: &Lexeme<'_>) -> Result<SmolStr, SexpError> {
    let text = unescape(lexeme, 2)?;
    Ok(match lexeme.kind {
        Some(SexpToken::QuotedKeyword) => format!(":{text}").into(),
        _ => text.into(),
    })
}

/// Resolve the escapes of a quoted token; `skip` is the width of its opening, up to the `"`
fn unescape(lexeme: &Lexeme<'_>, skip: usize) -> Result<String, SexpError> {
    let body = &lexeme.text[skip..lexeme.text.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices();
    while let Some((_, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((at, escape)) = chars.next() else {
            break;
        };
        // `at` indexes the escape letter in the body; report the backslash
        let offset = lexeme.offset + skip - 1 + at;
        match escape {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'o' => {
                let digits: String = chars.by_ref().take(3).map(|(_, d)| d).collect();
                let code = (digits.len() == 3 && digits.chars().all(|d| d.is_digit(8)))
                    .then(|| u32::from_str_radix(&digits, 8).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match code {
                    Some(c) => out.push(c),
                    None => {
                        return Err(SexpError::new(
                            ErrorCode::E0604,
                            format!("'\\o{digits}'"),
                            offset,
                        ));
                    }
                }
            }
            other => {
                return Err(SexpError::new(
                    ErrorCode::E0604,
                    format!("'\\{other}'"),
                    offset,
                ));
            }
        }
    }
    Ok(out)
}
