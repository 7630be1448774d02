//! # pops
//!
//! Front end for a Puppet-style configuration language: positions, a
//! context-sensitive lexer, the structural model with its builder, and
//! conversions out of the model.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! transform → legacy tree, s-expression dump and reader
//!   ↓
//! model     → Expr/ExprKind, visitor, Program, Builder
//!   ↓
//! parser    → tokens, keyword tables, lexer (code, strings, heredoc, EPP)
//!   ↓
//! base      → Locator, SubLocator, SourcePosition, TextRange
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → model → transform)
// ============================================================================

/// Foundation types: locators and source positions
pub mod base;

/// Lexer, tokens, diagnostics
pub mod parser;

/// Structural model and builder
pub mod model;

/// Legacy tree and s-expression conversions
pub mod transform;

mod error;

pub use error::{Error, Result};

// Re-export commonly needed items
pub use parser::keywords;

pub use base::{Locate, Locator, LocatorRef, SourcePosition, SubLocator, TextRange, TextSize};
pub use model::builder::Builder;
pub use model::{Expr, ExprKind, Program};
pub use parser::{Lexer, LexerOptions, SyntaxError, Token, TokenKind, tokenize, tokenize_epp};
