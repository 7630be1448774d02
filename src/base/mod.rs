//! Foundation types for the front end.
//!
//! This module provides the position machinery used by every other layer:
//! - [`Locator`], [`SubLocator`] - offset to line/column translation
//! - [`Position`], [`Span`] - line/column pairs
//! - [`SourcePosition`] - file, line, column and raw range of a diagnostic
//! - [`TextRange`], [`TextSize`] - raw byte offsets
//!
//! This module has NO dependencies on other modules of the crate.

mod locator;
mod position;

pub use locator::{Locate, Locator, LocatorRef, SubLocator, compute_line_index};
pub use position::{Position, SourcePosition, Span};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
