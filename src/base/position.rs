//! Position tracking for tokens, model nodes and diagnostics.
//!
//! Lines and columns are 1-based. Columns count characters, not bytes, so a
//! diagnostic on a line holding multi-byte text points at the right glyph.

use std::fmt;
use std::sync::Arc;

use text_size::{TextRange, TextSize};

/// A line/column pair (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A start/end pair of line/column positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span from line/column coordinates
    pub fn from_coords(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Check if a position falls within this span
    pub fn contains(&self, position: Position) -> bool {
        position >= self.start && position <= self.end
    }
}

/// A fully resolved source position: file, line, column and the raw range it came from.
///
/// This is what diagnostics carry. It is computed on demand from a byte range
/// and a locator, never stored on tokens or nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    /// Name of the source (file path or a synthetic name)
    pub file: Arc<str>,
    /// 1-based line
    pub line: usize,
    /// 1-based character column
    pub column: usize,
    /// Raw byte range in the text the locator describes
    pub range: TextRange,
}

impl SourcePosition {
    pub fn new(file: Arc<str>, line: usize, column: usize, range: TextRange) -> Self {
        Self {
            file,
            line,
            column,
            range,
        }
    }

    pub fn offset(&self) -> TextSize {
        self.range.start()
    }

    pub fn length(&self) -> TextSize {
        self.range.len()
    }

    pub fn line_col(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}
