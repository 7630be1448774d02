//! Values handed to the builder by grammar actions.
//!
//! A grammar action may pass a raw value, a token or an already built node in
//! any position that takes an expression. [`BuildInput`] names each case and
//! [`BuildInput::into_expr`] turns it into a model node.

use smol_str::SmolStr;

use super::error::{BuildError, BuildResult};
use crate::model::{Expr, ExprKind, KeyedEntry};
use crate::parser::{Number, Radix, Token, TokenKind, TokenValue, parse_number};

/// The two symbolic literals a raw value can stand for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Undef,
    Default,
}

/// A builder argument: a raw value, a token or a node
#[derive(Debug, Clone, PartialEq)]
pub enum BuildInput {
    /// Absent value; becomes `Nop`
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(SmolStr),
    Symbol(Symbol),
    List(Vec<BuildInput>),
    /// Key/value pairs; built as a hash literal sorted by key
    Map(Vec<(SmolStr, BuildInput)>),
    Regex(SmolStr),
    Expr(Expr),
    Token(Token),
}

impl BuildInput {
    pub fn is_nil(&self) -> bool {
        match self {
            BuildInput::Nil => true,
            BuildInput::Expr(expr) => matches!(expr.kind, ExprKind::Nop),
            _ => false,
        }
    }

    /// Convert into a model node
    pub fn into_expr(self) -> BuildResult<Expr> {
        let kind = match self {
            BuildInput::Nil => ExprKind::Nop,
            BuildInput::Bool(value) => ExprKind::LiteralBoolean(value),
            BuildInput::Int(value) => ExprKind::LiteralInteger {
                value,
                radix: Radix::Decimal,
            },
            BuildInput::Float(value) => ExprKind::LiteralFloat(value),
            BuildInput::Str(value) => ExprKind::LiteralString(value),
            BuildInput::Symbol(Symbol::Undef) => ExprKind::LiteralUndef,
            BuildInput::Symbol(Symbol::Default) => ExprKind::LiteralDefault,
            BuildInput::List(values) => ExprKind::LiteralList(
                values
                    .into_iter()
                    .map(BuildInput::into_expr)
                    .collect::<BuildResult<_>>()?,
            ),
            BuildInput::Map(mut entries) => {
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                let entries = entries
                    .into_iter()
                    .map(|(key, value)| {
                        Ok(KeyedEntry {
                            key: Expr::new(ExprKind::LiteralString(key)),
                            value: value.into_expr()?,
                            range: None,
                        })
                    })
                    .collect::<BuildResult<_>>()?;
                ExprKind::LiteralHash(entries)
            }
            BuildInput::Regex(pattern) => ExprKind::LiteralRegex(pattern),
            BuildInput::Expr(expr) => return Ok(expr),
            BuildInput::Token(token) => return token_expr(&token),
        };
        Ok(Expr::new(kind))
    }

    /// The plain text of a name-like input
    pub fn text(&self) -> Option<&str> {
        match self {
            BuildInput::Str(text) | BuildInput::Regex(text) => Some(text),
            BuildInput::Expr(expr) => expr.name_text(),
            BuildInput::Token(token) => Some(token.text()),
            _ => None,
        }
    }
}

/// Convert a value token into a positioned node
pub(super) fn token_expr(token: &Token) -> BuildResult<Expr> {
    let text = || match &token.value {
        TokenValue::Text(text) => text.clone(),
        _ => SmolStr::new(token.text()),
    };
    let kind = match token.kind {
        TokenKind::NAME | TokenKind::WORD => ExprKind::QualifiedName(text()),
        TokenKind::CLASSREF => ExprKind::QualifiedReference(text()),
        TokenKind::NUMBER => return number_from_token(token),
        TokenKind::STRING => ExprKind::LiteralString(text()),
        TokenKind::REGEX => ExprKind::LiteralRegex(text()),
        TokenKind::BOOLEAN => ExprKind::LiteralBoolean(matches!(token.value, TokenValue::Boolean(true))),
        TokenKind::VARIABLE => {
            ExprKind::Variable(Expr::with_range(ExprKind::QualifiedName(text()), token.range).boxed())
        }
        TokenKind::DEFAULT => ExprKind::LiteralDefault,
        TokenKind::UNDEF => ExprKind::LiteralUndef,
        kind if kind.is_keyword() => ExprKind::ReservedWord {
            word: text(),
            future: false,
        },
        kind => {
            return Err(BuildError::NotAnExpression {
                what: format!("Token {kind}"),
                position: Some(token.position()),
            });
        }
    };
    Ok(Expr::with_range(kind, token.range))
}

/// Convert a `NUMBER` token, keeping the radix of integers
pub fn number_from_token(token: &Token) -> BuildResult<Expr> {
    let text = token.text();
    let number = parse_number(text).map_err(|code| BuildError::Number {
        code,
        text: SmolStr::new(text),
        position: Some(token.position()),
    })?;
    Ok(Expr::with_range(number_kind(number), token.range))
}

pub(super) fn number_kind(number: Number) -> ExprKind {
    match number {
        Number::Integer { value, radix } => ExprKind::LiteralInteger { value, radix },
        Number::Float(value) => ExprKind::LiteralFloat(value),
    }
}

impl From<Expr> for BuildInput {
    fn from(expr: Expr) -> Self {
        BuildInput::Expr(expr)
    }
}

impl From<Option<Expr>> for BuildInput {
    fn from(expr: Option<Expr>) -> Self {
        expr.map_or(BuildInput::Nil, BuildInput::Expr)
    }
}

impl From<Token> for BuildInput {
    fn from(token: Token) -> Self {
        BuildInput::Token(token)
    }
}

impl From<bool> for BuildInput {
    fn from(value: bool) -> Self {
        BuildInput::Bool(value)
    }
}

impl From<i64> for BuildInput {
    fn from(value: i64) -> Self {
        BuildInput::Int(value)
    }
}

impl From<f64> for BuildInput {
    fn from(value: f64) -> Self {
        BuildInput::Float(value)
    }
}

impl From<&str> for BuildInput {
    fn from(value: &str) -> Self {
        BuildInput::Str(value.into())
    }
}

impl From<String> for BuildInput {
    fn from(value: String) -> Self {
        BuildInput::Str(value.into())
    }
}

impl From<SmolStr> for BuildInput {
    fn from(value: SmolStr) -> Self {
        BuildInput::Str(value)
    }
}

impl From<Symbol> for BuildInput {
    fn from(value: Symbol) -> Self {
        BuildInput::Symbol(value)
    }
}

impl<T: Into<BuildInput>> From<Vec<T>> for BuildInput {
    fn from(values: Vec<T>) -> Self {
        BuildInput::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<()> for BuildInput {
    fn from(_: ()) -> Self {
        BuildInput::Nil
    }
}
