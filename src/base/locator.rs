//! Offset to line/column translation.
//!
//! ```text
//! source text ──► Locator (line index, built once, O(n))
//!                   │
//!                   ├─ line_for_offset    binary search + last-line cache
//!                   ├─ column_for_offset  character based, 1-based
//!                   └─ char_offset/char_length  byte ↔ character conversion
//!
//! here-doc body ──► SubLocator(Locator of the body, leading line count/offset/margin)
//!                   answers in the coordinates of the enclosing document
//! ```
//!
//! All offsets handed to a locator are raw byte offsets into the text it was
//! built from. Character offsets only come out of [`Locate::char_offset`] and
//! [`Locate::char_length`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use text_size::{TextRange, TextSize};

use super::position::{Position, SourcePosition, Span};

/// Shared handle to a locator. Tokens and model positions refer to their locator through this.
pub type LocatorRef = Rc<dyn Locate>;

/// Position queries over a piece of source text.
pub trait Locate: fmt::Debug {
    /// The text the offsets refer to
    fn source(&self) -> &str;

    /// Name of the source (file path or synthetic name)
    fn file(&self) -> &Arc<str>;

    /// Byte offsets of the first character of each line; entry 0 is always 0
    fn line_index(&self) -> &[TextSize];

    /// The plain locator over the same text, without any shifting
    fn base(&self) -> &Locator;

    /// 1-based line containing `offset`
    fn line_for_offset(&self, offset: TextSize) -> usize;

    /// Byte offset of `offset` relative to the start of its line
    fn offset_on_line(&self, offset: TextSize) -> usize;

    /// 1-based character column of `offset`
    fn column_for_offset(&self, offset: TextSize) -> usize;

    /// Character index corresponding to the byte offset
    fn char_offset(&self, offset: TextSize) -> usize;

    /// Number of characters between two byte offsets
    fn char_length(&self, offset: TextSize, end: TextSize) -> usize;

    /// The text covered by `offset..offset + length`, clamped to the source
    fn extract_text(&self, offset: TextSize, length: TextSize) -> &str {
        let source = self.source();
        let start = usize::from(offset).min(source.len());
        let end = (start + usize::from(length)).min(source.len());
        source.get(start..end).unwrap_or("")
    }

    /// Resolve a raw range into a file/line/column position
    fn position(&self, range: TextRange) -> SourcePosition {
        let offset = range.start();
        SourcePosition::new(
            Arc::clone(self.file()),
            self.line_for_offset(offset),
            self.column_for_offset(offset),
            range,
        )
    }

    /// Line/column of both ends of a range
    fn span(&self, range: TextRange) -> Span {
        let at = |offset| Position::new(self.line_for_offset(offset), self.column_for_offset(offset));
        Span::new(at(range.start()), at(range.end()))
    }
}

/// Compute the byte offsets at which each line starts.
pub fn compute_line_index(source: &str) -> Vec<TextSize> {
    let mut starts = vec![TextSize::new(0)];
    starts.extend(
        source
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| TextSize::new((i + 1) as u32)),
    );
    starts
}

/// Number of characters in a byte slice, tolerant of offsets that split a character.
fn count_chars(bytes: &[u8]) -> usize {
    bytes.iter().filter(|b| (**b & 0xC0) != 0x80).count()
}

/// Locator over a complete source text.
///
/// Not `Sync`: the last-line cache is interior mutable and meant for
/// sequential use by one scanner.
pub struct Locator {
    source: Arc<str>,
    file: Arc<str>,
    line_index: Arc<[TextSize]>,
    /// Character offset at the start of each line, `None` for pure ASCII text
    char_line_starts: Option<Vec<usize>>,
    last_line: Cell<usize>,
}

impl Locator {
    pub fn new(source: impl Into<Arc<str>>, file: impl Into<Arc<str>>) -> Self {
        let source = source.into();
        let line_index: Arc<[TextSize]> = compute_line_index(&source).into();
        Self::from_parts(source, file, line_index)
    }

    /// Rebuild a locator from previously computed parts without rescanning for lines.
    pub fn from_parts(
        source: impl Into<Arc<str>>,
        file: impl Into<Arc<str>>,
        line_index: Arc<[TextSize]>,
    ) -> Self {
        let source = source.into();
        let char_line_starts = if source.is_ascii() {
            None
        } else {
            let bytes = source.as_bytes();
            let mut starts = Vec::with_capacity(line_index.len());
            let mut chars = 0;
            let mut prev = 0;
            for start in line_index.iter() {
                let start = usize::from(*start).min(bytes.len());
                chars += count_chars(&bytes[prev..start]);
                starts.push(chars);
                prev = start;
            }
            Some(starts)
        };
        Self {
            source,
            file: file.into(),
            line_index,
            char_line_starts,
            last_line: Cell::new(0),
        }
    }

    /// Shared handle to the source text
    pub fn source_arc(&self) -> &Arc<str> {
        &self.source
    }

    /// Shared handle to the line index
    pub fn line_index_arc(&self) -> &Arc<[TextSize]> {
        &self.line_index
    }

    /// Zero-based index of the line containing `offset`
    fn line_slot(&self, offset: usize) -> usize {
        let starts = &self.line_index;
        let cached = self.last_line.get();
        if let Some(start) = starts.get(cached) {
            let start = usize::from(*start);
            let next = starts.get(cached + 1).map_or(usize::MAX, |s| usize::from(*s));
            if start <= offset && offset < next {
                return cached;
            }
        }
        let slot = starts
            .partition_point(|s| usize::from(*s) <= offset)
            .saturating_sub(1);
        self.last_line.set(slot);
        slot
    }

    fn line_start(&self, slot: usize) -> usize {
        self.line_index.get(slot).map_or(0, |s| usize::from(*s))
    }

    /// Characters between the start of line `slot` and `offset`
    fn chars_on_line(&self, slot: usize, offset: usize) -> usize {
        let start = self.line_start(slot);
        let bytes = self.source.as_bytes();
        let end = offset.min(bytes.len()).max(start);
        match self.char_line_starts {
            None => end - start,
            Some(_) => count_chars(&bytes[start.min(bytes.len())..end]),
        }
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("file", &self.file)
            .field("len", &self.source.len())
            .field("lines", &self.line_index.len())
            .finish()
    }
}

impl Locate for Locator {
    fn source(&self) -> &str {
        &self.source
    }

    fn file(&self) -> &Arc<str> {
        &self.file
    }

    fn line_index(&self) -> &[TextSize] {
        &self.line_index
    }

    fn base(&self) -> &Locator {
        self
    }

    fn line_for_offset(&self, offset: TextSize) -> usize {
        self.line_slot(usize::from(offset)) + 1
    }

    fn offset_on_line(&self, offset: TextSize) -> usize {
        let offset = usize::from(offset);
        offset - self.line_start(self.line_slot(offset)).min(offset)
    }

    fn column_for_offset(&self, offset: TextSize) -> usize {
        let offset = usize::from(offset);
        self.chars_on_line(self.line_slot(offset), offset) + 1
    }

    fn char_offset(&self, offset: TextSize) -> usize {
        let offset = usize::from(offset);
        match &self.char_line_starts {
            None => offset,
            Some(starts) => {
                let slot = self.line_slot(offset);
                starts.get(slot).copied().unwrap_or(0) + self.chars_on_line(slot, offset)
            }
        }
    }

    fn char_length(&self, offset: TextSize, end: TextSize) -> usize {
        self.char_offset(end).saturating_sub(self.char_offset(offset))
    }
}

/// Locator for a fragment lifted out of a larger document.
///
/// Scanning happens over the fragment's own text; answers are shifted into
/// the enclosing document by the number of lines preceding the fragment, the
/// byte offset of the fragment and the margin removed from each line.
pub struct SubLocator {
    inner: Locator,
    leading_line_count: usize,
    leading_offset: usize,
    leading_line_margin: usize,
}

impl SubLocator {
    pub fn new(
        text: impl Into<Arc<str>>,
        file: impl Into<Arc<str>>,
        leading_line_count: usize,
        leading_offset: usize,
        leading_line_margin: usize,
    ) -> Self {
        Self {
            inner: Locator::new(text, file),
            leading_line_count,
            leading_offset,
            leading_line_margin,
        }
    }

    pub fn leading_line_count(&self) -> usize {
        self.leading_line_count
    }

    pub fn leading_offset(&self) -> usize {
        self.leading_offset
    }

    pub fn leading_line_margin(&self) -> usize {
        self.leading_line_margin
    }
}

impl fmt::Debug for SubLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubLocator")
            .field("inner", &self.inner)
            .field("leading_line_count", &self.leading_line_count)
            .field("leading_offset", &self.leading_offset)
            .field("leading_line_margin", &self.leading_line_margin)
            .finish()
    }
}

impl Locate for SubLocator {
    fn source(&self) -> &str {
        self.inner.source()
    }

    fn file(&self) -> &Arc<str> {
        self.inner.file()
    }

    fn line_index(&self) -> &[TextSize] {
        self.inner.line_index()
    }

    fn base(&self) -> &Locator {
        &self.inner
    }

    fn line_for_offset(&self, offset: TextSize) -> usize {
        self.inner.line_for_offset(offset) + self.leading_line_count
    }

    fn offset_on_line(&self, offset: TextSize) -> usize {
        self.inner.offset_on_line(offset) + self.leading_line_margin
    }

    fn column_for_offset(&self, offset: TextSize) -> usize {
        self.inner.column_for_offset(offset) + self.leading_line_margin
    }

    fn char_offset(&self, offset: TextSize) -> usize {
        let inner_line = self.inner.line_for_offset(offset) - 1;
        self.inner.char_offset(offset) + inner_line * self.leading_line_margin + self.leading_offset
    }

    fn char_length(&self, offset: TextSize, end: TextSize) -> usize {
        let lines = self
            .inner
            .line_for_offset(end)
            .saturating_sub(self.inner.line_for_offset(offset));
        self.inner.char_length(offset, end) + lines * self.leading_line_margin
    }
}
