//! Code mode: one scan step at the cursor.

use super::Lexer;
use super::epp::EppMode;
use super::scanner::{is_blank, is_word_char};
use crate::parser::errors::{ErrorCode, SyntaxError};
use crate::parser::number::validate_number;
use crate::parser::token::{Token, TokenKind, TokenValue};

impl Lexer {
    /// Scan at the cursor and append the resulting tokens (possibly none, for blanks and comments)
    pub(super) fn lex_token(&mut self, out: &mut Vec<Token>) -> Result<(), SyntaxError> {
        use TokenKind::*;

        let before = self.scn.pos();
        let Some(c) = self.scn.peek() else {
            return Ok(());
        };
        let la1 = self.scn.peek_nth(1);
        let la2 = self.scn.peek_nth(2);

        match c {
            '[' => {
                let preceded_by_space = self.scn.text()[..before]
                    .chars()
                    .next_back()
                    .is_some_and(char::is_whitespace);
                let kind = if before == 0 || preceded_by_space { LISTSTART } else { LBRACK };
                self.emit(out, kind, 1);
            }
            ']' => self.emit(out, RBRACK, 1),
            '(' => {
                let line_start = self.ctx.line_lexical_start.min(before);
                let only_blanks = self.scn.slice(line_start, before).chars().all(is_blank);
                self.emit(out, if only_blanks { WSLPAREN } else { LPAREN }, 1);
            }
            ')' => self.emit(out, RPAREN, 1),
            '{' => {
                let kind = if self.ctx.after == Some(QMARK) { SELBRACE } else { LBRACE };
                self.ctx.brace_count += 1;
                self.emit(out, kind, 1);
            }
            '}' => {
                self.ctx.brace_count = self.ctx.brace_count.saturating_sub(1);
                self.emit(out, RBRACE, 1);
            }
            ',' => self.emit(out, COMMA, 1),
            ';' => self.emit(out, SEMIC, 1),
            '.' => self.emit(out, DOT, 1),
            '?' => self.emit(out, QMARK, 1),
            '*' => self.emit(out, TIMES, 1),
            '=' => match la1 {
                Some('=') => self.emit(out, ISEQUAL, 2),
                Some('~') => self.emit(out, MATCH, 2),
                Some('>') => self.emit(out, FARROW, 2),
                _ => self.emit(out, EQUALS, 1),
            },
            '+' => match la1 {
                Some('=') => self.emit(out, APPENDS, 2),
                Some('>') => self.emit(out, PARROW, 2),
                _ => self.emit(out, PLUS, 1),
            },
            '-' => match (la1, la2) {
                (Some('='), _) => self.emit(out, DELETES, 2),
                (Some('>'), _) => self.emit(out, IN_EDGE, 2),
                (Some('%'), Some('>')) if self.ctx.epp_mode.is_some() => {
                    self.scn.advance(3);
                    self.close_template_tag(out, before, true)?;
                }
                _ => self.emit(out, MINUS, 1),
            },
            '%' => {
                if la1 == Some('>') && self.ctx.epp_mode.is_some() {
                    self.scn.advance(2);
                    self.close_template_tag(out, before, false)?;
                } else {
                    self.emit(out, MODULO, 1);
                }
            }
            '!' => match la1 {
                Some('=') => self.emit(out, NOTEQUAL, 2),
                Some('~') => self.emit(out, NOMATCH, 2),
                _ => self.emit(out, NOT, 1),
            },
            '<' => match (la1, la2) {
                (Some('<'), Some('|')) => self.emit(out, LLCOLLECT, 3),
                (Some('<'), _) => self.emit(out, LSHIFT, 2),
                (Some('='), _) => self.emit(out, LESSEQUAL, 2),
                (Some('-'), _) => self.emit(out, OUT_EDGE, 2),
                (Some('~'), _) => self.emit(out, OUT_EDGE_SUB, 2),
                (Some('|'), _) => self.emit(out, LCOLLECT, 2),
                _ => self.emit(out, LESSTHAN, 1),
            },
            '>' => match la1 {
                Some('=') => self.emit(out, GREATEREQUAL, 2),
                Some('>') => self.emit(out, RSHIFT, 2),
                _ => self.emit(out, GREATERTHAN, 1),
            },
            '|' => match (la1, la2) {
                (Some('>'), Some('>')) => self.emit(out, RRCOLLECT, 3),
                (Some('>'), _) => self.emit(out, RCOLLECT, 2),
                _ => self.emit(out, PIPE, 1),
            },
            '~' => match la1 {
                Some('>') => self.emit(out, IN_EDGE_SUB, 2),
                _ => self.emit(out, TILDE, 1),
            },
            '@' => match la1 {
                Some('@') => self.emit(out, ATAT, 2),
                Some('(') => self.heredoc(out)?,
                _ => self.emit(out, AT, 1),
            },
            '"' => self.interpolate_dq(out)?,
            '\'' => self.single_quoted(out)?,
            '#' => {
                self.scn.skip_while(|c| c != '\n');
            }
            '/' => {
                if la1 == Some('*') {
                    match self.scn.find_from(before + 2, "*/") {
                        Some(end) => self.scn.set_pos(end + 2),
                        None => return Err(self.error(ErrorCode::E0102, before)),
                    }
                } else if let Some((pattern, end)) = self.scan_regex(before) {
                    self.scn.set_pos(end);
                    self.push_text(out, REGEX, pattern, before, end);
                } else {
                    self.emit(out, DIV, 1);
                }
            }
            '$' => {
                let name_start = before + 1;
                let end = scan_variable_name(self.scn.text(), name_start).unwrap_or(name_start);
                let name = self.scn.slice(name_start, end).to_string();
                self.scn.set_pos(end);
                self.push_text(out, VARIABLE, name, before, end);
            }
            '0'..='9' => {
                let end = scan_number(self.scn.text(), before);
                let text = self.scn.slice(before, end).to_string();
                if let Err(code) = validate_number(&text) {
                    return Err(self.error_msg(code, number_message(code, &text), before));
                }
                self.scn.set_pos(end);
                self.push_text(out, NUMBER, text, before, end);
            }
            'a'..='z' | '_' => self.bare_word(out, before)?,
            'A'..='Z' => self.class_reference(out, before, ErrorCode::E0109)?,
            ':' => {
                if la1 != Some(':') {
                    self.emit(out, COLON, 1);
                } else {
                    match la2 {
                        Some('a'..='z' | '_') => self.bare_word(out, before)?,
                        Some('A'..='Z') => self.class_reference(out, before, ErrorCode::E0110)?,
                        _ => {
                            self.scn.advance(2);
                            self.push_text(out, OTHER, "::", before, before + 2);
                        }
                    }
                }
            }
            '\n' => {
                let next = match self.ctx.newline_jump.take() {
                    Some(jump) => jump,
                    None => before + 1,
                };
                self.scn.set_pos(next);
                self.ctx.line_lexical_start = next;
            }
            c if is_blank(c) => {
                self.scn.skip_while(is_blank);
            }
            c if !c.is_ascii() && unicode_ident::is_xid_start(c) => {
                return Err(SyntaxError::builder(ErrorCode::E0107)
                    .message(format!("Illegal name '{}'", c))
                    .at(self.position_at(before))
                    .hint("names must start with an ASCII letter or underscore")
                    .build());
            }
            c => {
                self.scn.bump();
                let end = self.scn.pos();
                self.push_text(out, OTHER, c.to_string(), before, end);
            }
        }
        Ok(())
    }

    /// A name, keyword or word; the cursor is at its first character (or a leading `::`)
    fn bare_word(&mut self, out: &mut Vec<Token>, before: usize) -> Result<(), SyntaxError> {
        let Some(end) = scan_bare_word(self.scn.text(), before) else {
            return Err(self.error(ErrorCode::E0107, before));
        };
        let value = self.scn.slice(before, end).to_string();
        self.scn.set_pos(end);
        if self.scn.starts_with("::") {
            let message = format!("Illegal fully qualified name '{}::'", value);
            return Err(self.error_msg(ErrorCode::E0108, message, before));
        }

        if let Some(keyword) = self.keywords.lookup(&value, self.options.tasks) {
            let token_value = match keyword {
                TokenKind::BOOLEAN => TokenValue::Boolean(value == "true"),
                _ => TokenValue::None,
            };
            self.push(out, keyword, token_value, before, end);
        } else if is_name(&value) {
            self.push_text(out, TokenKind::NAME, value, before, end);
        } else {
            self.push_text(out, TokenKind::WORD, value, before, end);
        }
        Ok(())
    }

    /// A capitalized reference; `trailing` is reported when it ends with a dangling `::`
    fn class_reference(
        &mut self,
        out: &mut Vec<Token>,
        before: usize,
        trailing: ErrorCode,
    ) -> Result<(), SyntaxError> {
        let Some(end) = scan_class_reference(self.scn.text(), before) else {
            return Err(self.error(ErrorCode::E0107, before));
        };
        let value = self.scn.slice(before, end).to_string();
        self.scn.set_pos(end);
        if self.scn.starts_with("::") {
            let message = format!("Illegal fully qualified class reference '{}::'", value);
            return Err(self.error_msg(trailing, message, before));
        }
        self.push_text(out, TokenKind::CLASSREF, value, before, end);
        Ok(())
    }

    /// A `/pattern/` when the previous token allows one; returns the pattern and end offset
    fn scan_regex(&self, before: usize) -> Option<(String, usize)> {
        if !self.ctx.after.is_none_or(TokenKind::allows_regex_after) {
            return None;
        }
        let text = self.scn.text();
        let first_line_end = text[before + 1..].find('\n').map(|i| before + 1 + i);
        let mut close = before;
        loop {
            close = self.scn.find_from(close + 1, "/")?;
            if first_line_end.is_some_and(|nl| nl < close) {
                return None;
            }
            let backslashes = text[before + 1..close]
                .bytes()
                .rev()
                .take_while(|b| *b == b'\\')
                .count();
            if backslashes % 2 == 0 {
                break;
            }
        }
        let pattern = text[before + 1..close].replace("\\/", "/");
        Some((pattern, close + 1))
    }

    /// Leave a template tag; `%>` ends a render expression, `-%>` also trims the following line break
    fn close_template_tag(
        &mut self,
        out: &mut Vec<Token>,
        before: usize,
        trim: bool,
    ) -> Result<(), SyntaxError> {
        let end = self.scn.pos();
        if self.ctx.epp_mode == Some(EppMode::Expr) {
            let kind = if trim { TokenKind::EPP_END_TRIM } else { TokenKind::EPP_END };
            self.push(out, kind, TokenValue::None, before, end);
        }
        self.ctx.epp_mode = Some(EppMode::Text);
        self.interpolate_epp(out, trim)
    }
}

/// `((::)?[a-z_]([\w-]*\w)?)+` starting at `start`
fn scan_bare_word(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut end = None;
    let mut i = start;
    loop {
        let mut j = i;
        if bytes[j..].starts_with(b"::") {
            j += 2;
        }
        match bytes.get(j) {
            Some(b) if b.is_ascii_lowercase() || *b == b'_' => j += 1,
            _ => break,
        }
        let segment = j;
        while bytes.get(j).is_some_and(|b| is_word_char(*b as char) || *b == b'-') {
            j += 1;
        }
        while j > segment && bytes[j - 1] == b'-' {
            j -= 1;
        }
        i = j;
        end = Some(j);
    }
    end
}

/// `((::)?[A-Z]\w*)+` starting at `start`
fn scan_class_reference(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut end = None;
    let mut i = start;
    loop {
        let mut j = i;
        if bytes[j..].starts_with(b"::") {
            j += 2;
        }
        if !bytes.get(j).is_some_and(u8::is_ascii_uppercase) {
            break;
        }
        j += 1;
        while bytes.get(j).is_some_and(|b| is_word_char(*b as char)) {
            j += 1;
        }
        i = j;
        end = Some(j);
    }
    end
}

/// `(::)?(\w+::)*\w+` starting at `start` (just after the `$`)
pub(super) fn scan_variable_name(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let words = |from: usize| {
        bytes
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| is_word_char(**b as char)).count())
    };
    let mut j = start;
    if bytes.get(j..).is_some_and(|rest| rest.starts_with(b"::")) {
        j += 2;
    }
    let n = words(j);
    if n == 0 {
        return None;
    }
    j += n;
    while bytes[j..].starts_with(b"::") {
        let n = words(j + 2);
        if n == 0 {
            break;
        }
        j += 2 + n;
    }
    Some(j)
}

/// Word characters, plus `.` before a digit and `-` in an exponent
fn scan_number(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let hex = bytes.get(start) == Some(&b'0') && matches!(bytes.get(start + 1), Some(b'x' | b'X'));
    let next_is_digit = |i: usize| bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
    let mut j = start;
    while let Some(&b) = bytes.get(j) {
        let take = is_word_char(b as char)
            || (!hex && b == b'.' && next_is_digit(j))
            || (!hex && b == b'-' && matches!(bytes[j - 1], b'e' | b'E') && next_is_digit(j));
        if !take {
            break;
        }
        j += 1;
    }
    j
}

/// `(::)?[a-z]\w*(::[a-z]\w*)*`
pub(crate) fn is_name(value: &str) -> bool {
    let value = value.strip_prefix("::").unwrap_or(value);
    value.split("::").all(|segment| {
        let mut chars = segment.chars();
        chars.next().is_some_and(|c| c.is_ascii_lowercase()) && chars.all(is_word_char)
    })
}

fn number_message(code: ErrorCode, text: &str) -> String {
    match code {
        ErrorCode::E0104 => format!("Not a valid hex number {}", text),
        ErrorCode::E0105 => format!("Not a valid octal number {}", text),
        ErrorCode::E0106 => format!("Not a valid decimal number {}", text),
        _ => format!("Illegal number '{}'", text),
    }
}
