//! Tokenizer for manifests and templates
//!
//! This module turns source text into a flat token stream:
//! - **lexer** - the context-sensitive scanner (code, strings, here-docs, templates)
//! - **token** - token kinds and values, each token carrying its locator
//! - **errors** - coded diagnostics with severity, hints and related locations
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer → Token { kind, value, range, locator }
//!     ↓            (here-doc bodies re-lexed over a SubLocator)
//! Builder → Structural model
//! ```
//!
//! The lexer never builds trees. Grammar-driven construction of the model is
//! done by callers through [`crate::model::builder`].

pub mod errors;
pub mod keywords;
mod lexer;
pub mod number;
mod options;
pub mod token;

pub use errors::{ErrorCode, RelatedInfo, Severity, SyntaxError, SyntaxErrorBuilder, located};
pub use lexer::{EscapeSet, Lexer, tokenize, tokenize_epp};
pub use number::{Number, Radix, parse_number};
pub use options::LexerOptions;
pub use token::{SubLocation, Token, TokenKind, TokenValue};
