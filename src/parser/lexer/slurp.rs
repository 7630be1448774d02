//! String body scanning and escape processing.

use super::Lexer;
use crate::parser::errors::{ErrorCode, SyntaxError};
use crate::parser::token::{Token, TokenKind};

/// The set of escape sequences honoured when slurping text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EscapeSet(u16);

impl EscapeSet {
    const BACKSLASH: u16 = 1;
    const DOLLAR: u16 = 1 << 1;
    const SQUOTE: u16 = 1 << 2;
    const DQUOTE: u16 = 1 << 3;
    const CR: u16 = 1 << 4;
    const LF: u16 = 1 << 5;
    const TAB: u16 = 1 << 6;
    const SPACE: u16 = 1 << 7;
    const UNICODE: u16 = 1 << 8;
    const LINE_BREAK: u16 = 1 << 9;

    pub const NONE: EscapeSet = EscapeSet(0);
    pub const SINGLE_QUOTED: EscapeSet = EscapeSet(Self::BACKSLASH | Self::SQUOTE);
    pub const DOUBLE_QUOTED: EscapeSet = EscapeSet(
        Self::BACKSLASH
            | Self::DOLLAR
            | Self::SQUOTE
            | Self::DQUOTE
            | Self::CR
            | Self::LF
            | Self::TAB
            | Self::SPACE
            | Self::UNICODE
            | Self::LINE_BREAK,
    );
    pub const UNQUOTED: EscapeSet = EscapeSet(
        Self::BACKSLASH
            | Self::DOLLAR
            | Self::CR
            | Self::LF
            | Self::TAB
            | Self::SPACE
            | Self::UNICODE
            | Self::LINE_BREAK,
    );

    /// Every escape a here-doc flag can switch on
    pub const ALL_HEREDOC: EscapeSet = Self::UNQUOTED;

    fn bit(c: char) -> u16 {
        match c {
            '\\' => Self::BACKSLASH,
            '$' => Self::DOLLAR,
            '\'' => Self::SQUOTE,
            '"' => Self::DQUOTE,
            'r' => Self::CR,
            'n' => Self::LF,
            't' => Self::TAB,
            's' => Self::SPACE,
            'u' => Self::UNICODE,
            '\n' => Self::LINE_BREAK,
            _ => 0,
        }
    }

    /// Map a here-doc flag letter to the escape it enables
    pub fn heredoc_flag(flag: char) -> Option<char> {
        match flag {
            't' | 'r' | 'n' | 's' | 'u' | '$' => Some(flag),
            'L' => Some('\n'),
            _ => None,
        }
    }

    pub fn allows(self, c: char) -> bool {
        let bit = Self::bit(c);
        bit != 0 && self.0 & bit == bit
    }

    pub fn with(self, c: char) -> Self {
        EscapeSet(self.0 | Self::bit(c))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// How text is collected until a terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum SlurpMode {
    /// Until an unescaped `'`
    Single,
    /// Until an unescaped `"`, `$` or `${`
    Double,
    /// Until `$` or `${` unless protected by `\$`, or end of text
    Unquoted,
    /// Until `$` or `${` (backslash never protects a dollar), or end of text
    UnquotedNoEscape,
    /// Everything up to the end of text
    #[default]
    All,
}

/// What stopped a slurp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Terminator {
    Quote,
    Dollar,
    DollarBrace,
    End,
}

impl Lexer {
    /// Collect text from the cursor until the mode's terminator, processing escapes.
    ///
    /// The cursor ends after the terminator. Returns `None` and leaves the
    /// cursor untouched when a quoted string is not closed.
    pub(super) fn slurp(
        &mut self,
        mode: SlurpMode,
        escapes: EscapeSet,
        warn_unrecognized: bool,
    ) -> Result<Option<(String, Terminator)>, SyntaxError> {
        let start = self.scn.pos();
        let quote = match mode {
            SlurpMode::Single => Some('\''),
            SlurpMode::Double => Some('"'),
            _ => None,
        };
        let dollar_stops = !matches!(mode, SlurpMode::Single | SlurpMode::All);
        let mut text = String::new();

        loop {
            let Some(c) = self.scn.peek() else {
                if quote.is_some() {
                    self.scn.set_pos(start);
                    return Ok(None);
                }
                return Ok(Some((text, Terminator::End)));
            };
            if Some(c) == quote {
                self.scn.advance(1);
                return Ok(Some((text, Terminator::Quote)));
            }
            if c == '$' && dollar_stops {
                self.scn.advance(1);
                if self.scn.peek() == Some('{') {
                    self.scn.advance(1);
                    return Ok(Some((text, Terminator::DollarBrace)));
                }
                return Ok(Some((text, Terminator::Dollar)));
            }
            if c != '\\' {
                self.scn.bump();
                text.push(c);
                continue;
            }

            let escape_at = self.scn.pos();
            self.scn.advance(1);
            let Some(ch) = self.scn.peek() else {
                text.push('\\');
                continue;
            };
            if ch == '\r' && self.scn.peek_nth(1) == Some('\n') && escapes.allows('\n') {
                self.scn.advance(2);
                continue;
            }
            if ch == '$' && mode == SlurpMode::UnquotedNoEscape {
                // the dollar is handled as a terminator on the next round
                text.push('\\');
                continue;
            }
            if !escapes.allows(ch) {
                if warn_unrecognized && ch != '\\' && ch != '\n' {
                    let message = format!("Unrecognized escape sequence '\\{}'", ch);
                    self.warning(ErrorCode::E0112, message, escape_at);
                }
                self.scn.bump();
                text.push('\\');
                text.push(ch);
                continue;
            }
            match ch {
                'u' => self.unicode_escape(&mut text, escape_at)?,
                '\n' => {
                    self.scn.advance(1);
                }
                _ => {
                    self.scn.bump();
                    text.push(match ch {
                        'r' => '\r',
                        'n' => '\n',
                        't' => '\t',
                        's' => ' ',
                        other => other,
                    });
                }
            }
        }
    }

    /// Decode `\uXXXX` or `\u{X..XXXXXX}`; the cursor is at the `u`
    fn unicode_escape(&mut self, text: &mut String, escape_at: usize) -> Result<(), SyntaxError> {
        let rest = &self.scn.rest()[1..];
        let decoded = if let Some(braced) = rest.strip_prefix('{') {
            let digits = braced.bytes().take_while(u8::is_ascii_hexdigit).count();
            if (1..=6).contains(&digits) && braced.as_bytes().get(digits) == Some(&b'}') {
                u32::from_str_radix(&braced[..digits], 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(|c| (c, digits + 3))
            } else {
                None
            }
        } else if rest.len() >= 4 && rest.as_bytes()[..4].iter().all(u8::is_ascii_hexdigit) {
            u32::from_str_radix(&rest[..4], 16)
                .ok()
                .and_then(char::from_u32)
                .map(|c| (c, 5))
        } else {
            None
        };
        match decoded {
            Some((c, consumed)) => {
                text.push(c);
                self.scn.advance(consumed);
                Ok(())
            }
            None => Err(self.error(ErrorCode::E0111, escape_at)),
        }
    }

    /// A single quoted string; the cursor is at the opening quote
    pub(super) fn single_quoted(&mut self, out: &mut Vec<Token>) -> Result<(), SyntaxError> {
        let before = self.scn.pos();
        self.scn.advance(1);
        match self.slurp(SlurpMode::Single, EscapeSet::SINGLE_QUOTED, false)? {
            Some((text, _)) => {
                let end = self.scn.pos();
                self.push_text(out, TokenKind::STRING, text, before, end);
                Ok(())
            }
            None => Err(self.unclosed_quote(before, '\'')),
        }
    }

    /// Error for a quote that is never closed; the cursor is after the quote
    pub(super) fn unclosed_quote(&self, quote_at: usize, quote: char) -> SyntaxError {
        let message = format!(
            "Unclosed quote after \"{}\" followed by '{}'",
            quote,
            self.scn.followed_by()
        );
        self.error_msg(ErrorCode::E0101, message, quote_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_sets() {
        assert!(EscapeSet::SINGLE_QUOTED.allows('\''));
        assert!(!EscapeSet::SINGLE_QUOTED.allows('n'));
        assert!(EscapeSet::DOUBLE_QUOTED.allows('"'));
        assert!(!EscapeSet::UNQUOTED.allows('"'));
        assert!(EscapeSet::UNQUOTED.allows('$'));
        assert!(!EscapeSet::NONE.allows('\\'));
        assert!(!EscapeSet::DOUBLE_QUOTED.allows('x'));
    }

    #[test]
    fn test_heredoc_flags() {
        let set = ['t', 'L']
            .into_iter()
            .filter_map(EscapeSet::heredoc_flag)
            .fold(EscapeSet::NONE.with('\\'), EscapeSet::with);
        assert!(set.allows('t'));
        assert!(set.allows('\n'));
        assert!(!set.allows('n'));
        assert_eq!(EscapeSet::heredoc_flag('x'), None);
    }
}
