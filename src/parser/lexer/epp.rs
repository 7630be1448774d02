//! Template (EPP) text between code tags.

use super::Lexer;
use super::scanner::Scanner;
use crate::parser::errors::{ErrorCode, SyntaxError};
use crate::parser::token::{Token, TokenKind, TokenValue};

/// Where the lexer is relative to template tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EppMode {
    /// Rendering literal text
    Text,
    /// Inside `<% ... %>`
    Epp,
    /// Inside `<%= ... %>`
    Expr,
}

/// What ended a stretch of template text
#[derive(Debug, PartialEq, Eq)]
enum TextEnd {
    /// End of input
    Eos,
    /// `<%` or `<%-`
    Code,
    /// `<%=`
    Render,
}

impl Lexer {
    /// Scan template text from the cursor and switch into code or render mode
    pub(super) fn interpolate_epp(
        &mut self,
        out: &mut Vec<Token>,
        skip_leading: bool,
    ) -> Result<(), SyntaxError> {
        let before = self.scn.pos();
        let (text, end) = scan_template_text(&mut self.scn, skip_leading)
            .map_err(|(code, at)| self.error(code, at))?;
        let after_text = self.scn.pos();

        if !text.is_empty() {
            let text_end = match end {
                TextEnd::Eos => after_text,
                TextEnd::Code | TextEnd::Render => self.tag_start(after_text),
            };
            self.push_text(out, TokenKind::RENDER_STRING, text, before, text_end);
        }
        match end {
            TextEnd::Eos => {
                self.ctx.epp_mode = Some(EppMode::Text);
                self.ctx.epp_open_position = None;
            }
            TextEnd::Code => {
                self.ctx.epp_mode = Some(EppMode::Epp);
                self.ctx.epp_open_position = Some(self.tag_start(after_text));
            }
            TextEnd::Render => {
                self.ctx.epp_mode = Some(EppMode::Expr);
                let tag = self.tag_start(after_text);
                self.ctx.epp_open_position = Some(tag);
                self.push(out, TokenKind::RENDER_EXPR, TokenValue::None, after_text, after_text);
            }
        }
        Ok(())
    }

    /// Offset of the `<%` that ends at `after`
    fn tag_start(&self, after: usize) -> usize {
        self.scn.text()[..after].rfind("<%").unwrap_or(after)
    }
}

/// Strip blanks and at most one line break at the start of `text`
fn trim_leading_break(text: &str) -> &str {
    let text = text.trim_start_matches([' ', '\t']);
    let text = text.strip_prefix('\r').unwrap_or(text);
    text.strip_prefix('\n').unwrap_or(text)
}

/// Remove a trailing `<%` and the blanks before it
fn trim_tag_and_blanks(text: &mut String) {
    text.truncate(text.len().saturating_sub(2));
    let keep = text.trim_end_matches([' ', '\t']).len();
    text.truncate(keep);
}

/// Collect text up to the next code tag.
///
/// Handles `<%%` (literal `<%`), `%%>` (literal `%>`) and `<%# ... %>`
/// comments. The cursor ends after the opening tag (`<%`, `<%-` or `<%=`).
fn scan_template_text(
    scn: &mut Scanner,
    mut skip_leading: bool,
) -> Result<(String, TextEnd), (ErrorCode, usize)> {
    let mut text = String::new();
    loop {
        let start = scn.pos();
        let Some(open) = scn.find_from(start, "<%") else {
            let rest = scn.rest();
            let rest = if skip_leading { trim_leading_break(rest) } else { rest };
            text.push_str(&rest.replace("%%>", "%>"));
            scn.set_pos(scn.text().len());
            return Ok((text, TextEnd::Eos));
        };
        let part = scn.slice(start, open + 2);
        let part = if skip_leading { trim_leading_break(part) } else { part };
        text.push_str(&part.replace("%%>", "%>"));
        skip_leading = false;
        scn.set_pos(open + 2);

        match scn.peek() {
            None => {
                // the text ends with `<%`
                return Err((ErrorCode::E0303, open));
            }
            Some('%') => {
                // `<%%` renders as `<%`
                scn.advance(1);
            }
            Some('-') => {
                scn.advance(1);
                trim_tag_and_blanks(&mut text);
                return Ok((text, TextEnd::Code));
            }
            Some('=') => {
                scn.advance(1);
                text.truncate(text.len() - 2);
                return Ok((text, TextEnd::Render));
            }
            Some('#') => {
                if scn.peek_nth(1) == Some('-') {
                    trim_tag_and_blanks(&mut text);
                } else {
                    text.truncate(text.len() - 2);
                }
                let comment_start = scn.pos();
                let Some(close) = find_comment_end(scn.text(), comment_start) else {
                    return Err((ErrorCode::E0302, open));
                };
                let trimmed_end = scn.slice(close.saturating_sub(1), close) == "-";
                scn.set_pos(close + 2);
                skip_leading = trimmed_end;
            }
            Some(_) => {
                text.truncate(text.len() - 2);
                return Ok((text, TextEnd::Code));
            }
        }
    }
}

/// Offset of the `%>` closing a comment: the first `%>` not preceded by `%`
fn find_comment_end(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut search = from + 1;
    loop {
        let i = text.get(search..)?.find("%>")? + search;
        if bytes[i - 1] != b'%' {
            return Some(i);
        }
        search = i + 1;
    }
}
