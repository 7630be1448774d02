//! Here-docs: `@(tag[:syntax][/escapes])` followed by lines of text up to the end tag.
//!
//! The body is lexed by a fresh lexer in unquoted mode over the processed
//! text, with a [`SubLocator`] that maps its positions back into the
//! enclosing document. The body begins on the line after the opening
//! `@(...)`, or after the previous here-doc's end line when several here-docs
//! start on one line.

use std::rc::Rc;
use std::sync::Arc;

use text_size::TextSize;

use super::Lexer;
use super::slurp::EscapeSet;
use crate::base::{LocatorRef, SubLocator};
use crate::parser::errors::{ErrorCode, SyntaxError};
use crate::parser::token::{SubLocation, Token, TokenKind, TokenValue};

/// The parsed `@(...)` header
#[derive(Debug, PartialEq, Eq)]
struct HeredocHeader {
    tag: String,
    syntax: String,
    escapes: EscapeSet,
    interpolate: bool,
}

/// A matched end line
#[derive(Debug, PartialEq, Eq)]
struct EndTag {
    margin: usize,
    trim: bool,
}

impl Lexer {
    /// The cursor is at the `@` of `@(`
    pub(super) fn heredoc(&mut self, out: &mut Vec<Token>) -> Result<(), SyntaxError> {
        let before = self.scn.pos();
        let Some(close) = self.scn.find_from(before + 2, ")") else {
            self.scn.advance(2);
            let message = format!("Unclosed parenthesis after '@(' followed by '{}'", self.scn.followed_by());
            return Err(self.error_msg(ErrorCode::E0201, message, before));
        };
        let header_text = self.scn.slice(before + 2, close).to_string();
        let header = parse_header(&header_text).map_err(|code| self.error(code, before))?;
        if header.syntax.split('+').any(str::is_empty) {
            self.warning(ErrorCode::E0208, ErrorCode::E0208.default_message(), before);
        }
        let after_header = close + 1;

        let body_start = match self.ctx.newline_jump {
            Some(jump) => jump,
            None => match self.scn.find_from(after_header, "\n") {
                Some(nl) => nl + 1,
                None => return Err(self.error(ErrorCode::E0206, before)),
            },
        };

        let text = self.scn.text();
        let mut line_start = body_start;
        let (end_line_start, end_line_end, end_tag) = loop {
            if line_start >= text.len() {
                return Err(SyntaxError::builder(ErrorCode::E0207)
                    .message(format!("Heredoc without end-tagged line, expected '{}'", header.tag))
                    .at(self.position_at(text.len()))
                    .related("here-doc started here", self.position_at(before))
                    .build());
            }
            let line_end = text[line_start..].find('\n').map_or(text.len(), |i| line_start + i);
            if let Some(end_tag) = match_end_tag(&text[line_start..line_end], &header.tag) {
                break (line_start, (line_end + 1).min(text.len()), end_tag);
            }
            line_start = line_end + 1;
        };

        let mut lines: Vec<String> = text[body_start..end_line_start]
            .split_inclusive('\n')
            .map(|line| strip_margin(line, end_tag.margin).to_string())
            .collect();
        if end_tag.trim {
            if let Some(last) = lines.last_mut() {
                if last.ends_with('\n') {
                    last.pop();
                    if last.ends_with('\r') {
                        last.pop();
                    }
                }
            }
        }
        let body: String = lines.concat();

        let body_offset = TextSize::new(body_start as u32);
        let leading_lines = self.locator.line_for_offset(body_offset) - 1;
        let leading_offset = self.locator.char_offset(body_offset);
        let sub_locator = Rc::new(SubLocator::new(
            body.as_str(),
            Arc::clone(self.locator.file()),
            leading_lines,
            leading_offset,
            end_tag.margin,
        ));

        self.push_text(out, TokenKind::HEREDOC, header.syntax.as_str(), before, after_header);
        let location = SubLocation {
            lines,
            locator: Rc::clone(&sub_locator),
        };
        self.push(
            out,
            TokenKind::SUBLOCATE,
            TokenValue::SubLocate(Rc::new(location)),
            body_start,
            end_line_start,
        );

        let mut sub = Lexer::with_options(self.options.clone());
        let locator: LocatorRef = sub_locator;
        sub.lex_unquoted_string(&body, Some(locator), header.escapes, header.interpolate);
        sub.started = true;
        let mut body_tokens = Vec::new();
        sub.interpolate_uq(&mut body_tokens)?;
        self.diagnostics.append(&mut sub.diagnostics);
        out.append(&mut body_tokens);

        self.ctx.newline_jump = Some(end_line_end);
        self.scn.set_pos(after_header);
        Ok(())
    }
}

/// Parse `tag[:syntax][/escapes]` (the text between the parentheses)
fn parse_header(header: &str) -> Result<HeredocHeader, ErrorCode> {
    let is_space = |c: char| c.is_whitespace();
    let (tag, interpolate, rest) = if let Some(quoted) = header.strip_prefix('"') {
        let end = quoted.find('"').ok_or(ErrorCode::E0202)?;
        (&quoted[..end], true, &quoted[end + 1..])
    } else {
        let end = header.find([':', '/', '\r', '\n']).unwrap_or(header.len());
        (header[..end].trim_end(), false, &header[end..])
    };
    if tag.is_empty() {
        return Err(ErrorCode::E0203);
    }

    let mut rest = rest.trim_start_matches(is_space);
    let mut syntax = String::new();
    if let Some(after_colon) = rest.strip_prefix(':') {
        let after_colon = after_colon.trim_start_matches(is_space);
        let len = after_colon
            .char_indices()
            .take_while(|(i, c)| match i {
                0 => c.is_ascii_lowercase(),
                _ => c.is_ascii_alphanumeric() || *c == '_' || *c == '+',
            })
            .count();
        if len < 2 {
            return Err(ErrorCode::E0202);
        }
        syntax.push_str(&after_colon[..len]);
        rest = after_colon[len..].trim_start_matches(is_space);
    }

    let mut escapes = EscapeSet::NONE;
    if let Some(after_slash) = rest.strip_prefix('/') {
        let flags_len = after_slash
            .find(|c: char| c.is_whitespace())
            .unwrap_or(after_slash.len());
        escapes = parse_escape_flags(&after_slash[..flags_len])?;
        rest = after_slash[flags_len..].trim_start_matches(is_space);
    }
    if !rest.is_empty() {
        return Err(ErrorCode::E0202);
    }

    Ok(HeredocHeader {
        tag: tag.to_string(),
        syntax,
        escapes,
        interpolate,
    })
}

/// Flags after `/`; an empty flag list turns on every escape
fn parse_escape_flags(flags: &str) -> Result<EscapeSet, ErrorCode> {
    if flags.is_empty() {
        return Ok(EscapeSet::ALL_HEREDOC);
    }
    let mut seen = String::new();
    let mut escapes = EscapeSet::NONE.with('\\');
    for flag in flags.chars() {
        if seen.contains(flag) {
            return Err(ErrorCode::E0205);
        }
        seen.push(flag);
        let escape = EscapeSet::heredoc_flag(flag).ok_or(ErrorCode::E0204)?;
        escapes = escapes.with(escape);
    }
    Ok(escapes)
}

/// `[ \t]*(|[ \t]*)?(-[ \t]*)?TAG[ \t]*\r?` against one line without its `\n`
fn match_end_tag(line: &str, tag: &str) -> Option<EndTag> {
    let blank = [' ', '\t'];
    let line = line.strip_suffix('\r').unwrap_or(line);
    let rest = line.trim_start_matches(blank);
    let leading = line.len() - rest.len();
    let (rest, pipe) = match rest.strip_prefix('|') {
        Some(after) => (after.trim_start_matches(blank), true),
        None => (rest, false),
    };
    let (rest, trim) = match rest.strip_prefix('-') {
        Some(after) => (after.trim_start_matches(blank), true),
        None => (rest, false),
    };
    let rest = rest.strip_prefix(tag)?;
    if !rest.trim_matches(blank).is_empty() {
        return None;
    }
    Some(EndTag {
        margin: if pipe { leading } else { 0 },
        trim,
    })
}

/// Remove up to `margin` leading blanks
fn strip_margin(line: &str, margin: usize) -> &str {
    let blanks = line
        .bytes()
        .take(margin)
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    &line[blanks..]
}
