//! String interpolation: `"...${expr}..."`, `"...$name..."` and unquoted text.

use super::Lexer;
use super::code::scan_variable_name;
use super::slurp::{EscapeSet, SlurpMode, Terminator};
use crate::parser::errors::SyntaxError;
use crate::parser::token::{Token, TokenKind, TokenValue};

impl Lexer {
    /// A double quoted string; the cursor is at the opening quote
    pub(super) fn interpolate_dq(&mut self, out: &mut Vec<Token>) -> Result<(), SyntaxError> {
        let before = self.scn.pos();
        self.scn.advance(1);
        let warn = self.options.warn_on_unrecognized_escapes;
        self.interpolate(out, SlurpMode::Double, EscapeSet::DOUBLE_QUOTED, warn, before)
    }

    /// Unquoted text from the cursor to the end of input
    pub(super) fn interpolate_uq(&mut self, out: &mut Vec<Token>) -> Result<(), SyntaxError> {
        let before = self.scn.pos();
        let (mode, escapes) = (self.ctx.uq_slurp, self.ctx.escapes);
        self.interpolate(out, mode, escapes, false, before)
    }

    /// Emit `STRING`, or `DQPRE (expr|VARIABLE) (DQMID (expr|VARIABLE))* DQPOST`
    fn interpolate(
        &mut self,
        out: &mut Vec<Token>,
        mode: SlurpMode,
        escapes: EscapeSet,
        warn: bool,
        string_start: usize,
    ) -> Result<(), SyntaxError> {
        let mut segment_start = string_start;
        let mut first = true;
        loop {
            let (mut text, mut terminator) = self.slurp_segment(mode, escapes, warn, string_start)?;
            loop {
                let after_dollar = self.scn.pos();
                let kind = if first { TokenKind::DQPRE } else { TokenKind::DQMID };
                match terminator {
                    Terminator::Quote | Terminator::End => {
                        let kind = if first { TokenKind::STRING } else { TokenKind::DQPOST };
                        let end = self.scn.pos();
                        self.push_text(out, kind, text, segment_start, end);
                        return Ok(());
                    }
                    Terminator::DollarBrace => {
                        let count = self.ctx.brace_count;
                        self.ctx.brace_count += 1;
                        self.push_text(out, kind, text, segment_start, after_dollar);
                        self.enqueue_until(out, count)?;
                        break;
                    }
                    Terminator::Dollar => {
                        if let Some(end) = scan_variable_name(self.scn.text(), after_dollar) {
                            let name = self.scn.slice(after_dollar, end).to_string();
                            self.push_text(out, kind, text, segment_start, after_dollar - 1);
                            self.scn.set_pos(end);
                            self.push_text(out, TokenKind::VARIABLE, name, after_dollar - 1, end);
                            break;
                        }
                        // a lone `$` is plain text
                        text.push('$');
                        let (more, next) = self.slurp_segment(mode, escapes, warn, string_start)?;
                        text.push_str(&more);
                        terminator = next;
                    }
                }
            }
            first = false;
            segment_start = self.scn.pos();
        }
    }

    fn slurp_segment(
        &mut self,
        mode: SlurpMode,
        escapes: EscapeSet,
        warn: bool,
        string_start: usize,
    ) -> Result<(String, Terminator), SyntaxError> {
        match self.slurp(mode, escapes, warn)? {
            Some(segment) => Ok(segment),
            None => Err(self.unclosed_quote(string_start, '"')),
        }
    }

    /// Lex code inside `${ ... }` until the brace that closes it; the closing brace is not emitted.
    ///
    /// A lone name, number or keyword right after `${` (or one followed by `.`
    /// or `[`) denotes a variable and is rewritten to a `VARIABLE` token.
    fn enqueue_until(&mut self, out: &mut Vec<Token>, brace_count: usize) -> Result<(), SyntaxError> {
        let mut tokens: Vec<Token> = Vec::new();
        loop {
            if self.scn.is_eos() {
                out.append(&mut tokens);
                return Ok(());
            }
            let mut batch = Vec::new();
            self.lex_token(&mut batch)?;
            if let [closing] = batch.as_slice() {
                if closing.kind == TokenKind::RBRACE && self.ctx.brace_count == brace_count {
                    let variable_like = tokens.len() == 1
                        || matches!(tokens.get(1).map(|t| t.kind), Some(TokenKind::DOT | TokenKind::LBRACK));
                    if let Some(first) = tokens.first_mut().filter(|_| variable_like) {
                        transform_to_variable(first);
                    }
                    out.append(&mut tokens);
                    return Ok(());
                }
            }
            if let Some(last) = batch.last() {
                self.ctx.after = Some(last.kind);
            }
            tokens.append(&mut batch);
        }
    }
}

/// Rewrite a name-like token to the variable it denotes inside `${}`
fn transform_to_variable(token: &mut Token) {
    let eligible = matches!(token.kind, TokenKind::NUMBER | TokenKind::NAME | TokenKind::WORD)
        || token.kind.is_keyword();
    if eligible {
        let name = token.source_text().to_string();
        token.kind = TokenKind::VARIABLE;
        token.value = TokenValue::Text(name.into());
    }
}
