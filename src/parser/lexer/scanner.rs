//! Cursor over the text being lexed.

use std::sync::Arc;

/// Byte-position cursor with character-aware peeking
#[derive(Debug, Clone)]
pub(super) struct Scanner {
    text: Arc<str>,
    pos: usize,
}

impl Scanner {
    pub(super) fn new(text: Arc<str>) -> Self {
        Self { text, pos: 0 }
    }

    pub(super) fn text(&self) -> &str {
        &self.text
    }

    pub(super) fn pos(&self) -> usize {
        self.pos
    }

    pub(super) fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.text.len());
    }

    pub(super) fn is_eos(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub(super) fn rest(&self) -> &str {
        self.text.get(self.pos..).unwrap_or("")
    }

    pub(super) fn slice(&self, start: usize, end: usize) -> &str {
        self.text.get(start..end).unwrap_or("")
    }

    pub(super) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The character `n` characters ahead of the cursor
    pub(super) fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub(super) fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Advance by a number of bytes
    pub(super) fn advance(&mut self, bytes: usize) {
        self.set_pos(self.pos + bytes);
    }

    /// Advance past one character and return it
    pub(super) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Advance while the predicate holds; returns the number of bytes skipped
    pub(super) fn skip_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.pos - start
    }

    /// Absolute offset of the next occurrence of `needle` at or after `from`
    pub(super) fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        self.text
            .get(from..)
            .and_then(|rest| rest.find(needle))
            .map(|i| i + from)
    }

    /// Up to five characters after the cursor, for error messages
    pub(super) fn followed_by(&self) -> String {
        if self.is_eos() {
            return "<eof>".to_string();
        }
        self.rest()
            .chars()
            .take(5)
            .flat_map(|c| match c {
                '\n' => "\\n".chars().collect::<Vec<_>>(),
                '\r' => "\\r".chars().collect(),
                '\t' => "\\t".chars().collect(),
                c => vec![c],
            })
            .collect()
    }
}

/// Blanks skipped between tokens: spaces, tabs, carriage returns and other non-newline whitespace
pub(super) fn is_blank(c: char) -> bool {
    c != '\n' && c.is_whitespace()
}

/// `\w` of the language: ASCII letters, digits and underscore
pub(super) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
