//! Diagnostics for the lexer
//!
//! This module provides the error handling shared by the lexer and the layers above it:
//! - Categorized error codes for filtering and documentation
//! - Severity so recoverable problems can be collected as warnings
//! - Suggestions/hints for common mistakes
//! - Related locations (e.g., "here-doc started here" for a missing end tag)

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::{RelatedInfo, Severity, SyntaxError, SyntaxErrorBuilder, located};
