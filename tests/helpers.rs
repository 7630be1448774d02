//! Shared lexing and building helpers for the integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use pops::parser::{Token, TokenKind, tokenize};
use pops::{Builder, LocatorRef};

pub const FILE: &str = "site.pp";

/// All tokens of `source`, `EOF` excluded
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens =
        tokenize(source, FILE).unwrap_or_else(|e| panic!("failed to lex {source:?}: {e}"));
    if tokens.last().is_some_and(|t| t.kind == TokenKind::EOF) {
        tokens.pop();
    }
    tokens
}

/// Token kinds of `source`, `EOF` excluded
pub fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

/// A builder reporting against the locator the tokens were scanned with
pub fn builder_for(tokens: &[Token]) -> Builder {
    match tokens.first() {
        Some(token) => Builder::new(LocatorRef::clone(token.locator())),
        None => Builder::detached(),
    }
}

/// Shared handle check used by sub-locator tests
pub fn same_locator(a: &LocatorRef, b: &LocatorRef) -> bool {
    Rc::ptr_eq(a, b)
}
