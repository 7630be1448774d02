//! Context-sensitive lexer.
//!
//! ```text
//! lex_string ─────────► code mode ──"/'───► string slurping ──${──► code mode (until matching })
//!                          │  └──@(──► here-doc ──► sub-lexer over SubLocator (unquoted mode)
//!                          │
//! lex_epp_string ─────► template text ──<% / <%=──► code mode ──%> / -%>──► template text
//!
//! lex_unquoted_string ► unquoted mode ──$ / ${──► code mode
//! ```
//!
//! Tokens are pulled one at a time with [`Lexer::next_token`]. A scan step may
//! produce several tokens at once (string interpolation, here-docs, template
//! switches); those are held in a pending queue and handed out in order.
//! Nested scans run to completion on the call stack and return their tokens
//! as a batch that is spliced into the queue.

mod code;
mod epp;
mod heredoc;
mod interpolation;
mod scanner;
mod slurp;

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use tracing::{debug, trace, warn};

use super::errors::{ErrorCode, Severity, SyntaxError};
use super::keywords::{KEYWORDS, KeywordTable};
use super::options::LexerOptions;
use super::token::{Token, TokenKind, TokenValue};
use crate::base::{Locate, Locator, LocatorRef};

use epp::EppMode;
use scanner::Scanner;
pub use slurp::EscapeSet;
use slurp::SlurpMode;

/// How scanning starts when the first token is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartMode {
    Code,
    Unquoted,
    Template,
}

/// State consulted by context-sensitive scanning rules
#[derive(Debug, Default)]
struct LexingContext {
    /// Kind of the most recently emitted token
    after: Option<TokenKind>,
    /// Depth of open `{` (including `${` in strings)
    brace_count: usize,
    /// Offset where the current line's tokens start
    line_lexical_start: usize,
    /// Where scanning continues after the next newline when here-doc bodies were consumed
    newline_jump: Option<usize>,
    /// Escapes honoured in unquoted mode
    escapes: EscapeSet,
    /// How unquoted text is slurped
    uq_slurp: SlurpMode,
    epp_mode: Option<EppMode>,
    /// Offset of the currently open template code tag
    epp_open_position: Option<usize>,
}

/// The lexer
pub struct Lexer {
    options: LexerOptions,
    keywords: &'static KeywordTable,
    scn: Scanner,
    locator: LocatorRef,
    queue: VecDeque<Token>,
    ctx: LexingContext,
    diagnostics: Vec<SyntaxError>,
    start_mode: StartMode,
    started: bool,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn new() -> Self {
        Self::with_options(LexerOptions::default())
    }

    pub fn with_options(options: LexerOptions) -> Self {
        let empty: Arc<str> = Arc::from("");
        Self {
            options,
            keywords: &KEYWORDS,
            scn: Scanner::new(Arc::clone(&empty)),
            locator: Rc::new(Locator::new(empty, "")),
            queue: VecDeque::new(),
            ctx: LexingContext::default(),
            diagnostics: Vec::new(),
            start_mode: StartMode::Code,
            started: false,
        }
    }

    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    /// The locator for the text currently being lexed
    pub fn locator(&self) -> &LocatorRef {
        &self.locator
    }

    /// Warnings collected so far
    pub fn diagnostics(&self) -> &[SyntaxError] {
        &self.diagnostics
    }

    /// Prepare to lex source text in code mode
    pub fn lex_string(&mut self, source: &str, file: &str) -> Result<(), SyntaxError> {
        self.reset(source, file, StartMode::Code);
        self.assert_not_bom(source.as_bytes())
    }

    /// Prepare to lex a template (EPP) text
    pub fn lex_epp_string(&mut self, source: &str, file: &str) -> Result<(), SyntaxError> {
        self.reset(source, file, StartMode::Template);
        self.assert_not_bom(source.as_bytes())
    }

    /// Prepare to lex raw file content; rejects byte order marks and invalid UTF-8
    pub fn lex_bytes(&mut self, bytes: &[u8], file: &str) -> Result<(), SyntaxError> {
        self.reset("", file, StartMode::Code);
        self.assert_not_bom(bytes)?;
        match std::str::from_utf8(bytes) {
            Ok(source) => self.lex_string(source, file),
            Err(e) => {
                let valid = e.valid_up_to();
                let locator = Locator::new(String::from_utf8_lossy(&bytes[..valid]), file);
                let at = TextRange::empty(TextSize::new(valid as u32));
                Err(SyntaxError::builder(ErrorCode::E0114)
                    .message(format!("Input is not valid UTF-8 after byte {}", valid))
                    .at(locator.position(at))
                    .build())
            }
        }
    }

    /// Prepare to lex text that is neither quoted nor code, e.g. a here-doc body.
    ///
    /// With `interpolate`, `$name` and `${...}` are expanded; `escapes` decides
    /// which backslash sequences are processed and whether `\$` protects a dollar.
    pub fn lex_unquoted_string(
        &mut self,
        text: &str,
        locator: Option<LocatorRef>,
        escapes: EscapeSet,
        interpolate: bool,
    ) {
        self.reset(text, "", StartMode::Unquoted);
        if let Some(locator) = locator {
            self.locator = locator;
        }
        self.ctx.escapes = escapes;
        self.ctx.uq_slurp = if !interpolate {
            SlurpMode::All
        } else if escapes.allows('$') {
            SlurpMode::Unquoted
        } else {
            SlurpMode::UnquotedNoEscape
        };
    }

    fn reset(&mut self, source: &str, file: &str, start_mode: StartMode) {
        debug!(file = %file, len = source.len(), mode = ?start_mode, "lexing source");
        let text: Arc<str> = Arc::from(source);
        self.scn = Scanner::new(Arc::clone(&text));
        self.locator = Rc::new(Locator::new(text, file));
        self.queue.clear();
        self.ctx = LexingContext::default();
        self.diagnostics.clear();
        self.start_mode = start_mode;
        self.started = false;
    }

    /// Pull the next token; returns an `EOF` token once input is exhausted
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        if !self.started {
            self.started = true;
            let mut batch = Vec::new();
            match self.start_mode {
                StartMode::Code => {}
                StartMode::Unquoted => self.interpolate_uq(&mut batch)?,
                StartMode::Template => {
                    self.ctx.epp_mode = Some(EppMode::Text);
                    self.push(&mut batch, TokenKind::EPP_START, TokenValue::None, 0, 0);
                    self.interpolate_epp(&mut batch, false)?;
                }
            }
            self.queue.extend(batch);
        }
        loop {
            if let Some(token) = self.queue.pop_front() {
                self.ctx.after = Some(token.kind);
                trace!(kind = %token.kind, offset = u32::from(token.offset()), "token");
                return Ok(token);
            }
            if self.scn.is_eos() {
                if let Some(open) = self.ctx.epp_open_position {
                    return Err(self.error(ErrorCode::E0301, open));
                }
                let end = self.scn.text().len();
                return Ok(self.token(TokenKind::EOF, TokenValue::None, end, end));
            }
            let mut batch = Vec::new();
            self.lex_token(&mut batch)?;
            self.queue.extend(batch);
        }
    }

    /// Scan everything; the last token is `EOF`
    pub fn fullscan(&mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::EOF;
            tokens.push(token);
            if done {
                break;
            }
        }
        debug!(tokens = tokens.len(), warnings = self.diagnostics.len(), "scan complete");
        Ok(tokens)
    }

    // =========================================================================
    // Token and diagnostic construction
    // =========================================================================

    fn token(&self, kind: TokenKind, value: TokenValue, start: usize, end: usize) -> Token {
        let range = TextRange::new(TextSize::new(start as u32), TextSize::new(end.max(start) as u32));
        Token::new(kind, value, range, Rc::clone(&self.locator))
    }

    fn push(&self, out: &mut Vec<Token>, kind: TokenKind, value: TokenValue, start: usize, end: usize) {
        out.push(self.token(kind, value, start, end));
    }

    fn push_text(
        &self,
        out: &mut Vec<Token>,
        kind: TokenKind,
        text: impl Into<SmolStr>,
        start: usize,
        end: usize,
    ) {
        self.push(out, kind, TokenValue::Text(text.into()), start, end);
    }

    /// Emit a fixed-text token of `len` bytes at the cursor
    fn emit(&mut self, out: &mut Vec<Token>, kind: TokenKind, len: usize) {
        let start = self.scn.pos();
        self.scn.advance(len);
        self.push(out, kind, TokenValue::None, start, self.scn.pos());
    }

    fn position_at(&self, offset: usize) -> crate::base::SourcePosition {
        self.locator
            .position(TextRange::empty(TextSize::new(offset as u32)))
    }

    fn error(&self, code: ErrorCode, offset: usize) -> SyntaxError {
        SyntaxError::builder(code).at(self.position_at(offset)).build()
    }

    fn error_msg(&self, code: ErrorCode, message: impl Into<String>, offset: usize) -> SyntaxError {
        SyntaxError::builder(code)
            .message(message)
            .at(self.position_at(offset))
            .build()
    }

    fn warning(&mut self, code: ErrorCode, message: impl Into<String>, offset: usize) {
        let diagnostic = SyntaxError::builder(code)
            .message(message)
            .severity(Severity::Warning)
            .at(self.position_at(offset))
            .build();
        warn!(code = %code, "{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn assert_not_bom(&self, bytes: &[u8]) -> Result<(), SyntaxError> {
        let Some((name, size)) = byte_order_mark(bytes) else {
            return Ok(());
        };
        let shown = bytes[..size]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        Err(self.error_msg(
            ErrorCode::E0113,
            format!(
                "Illegal {} Byte Order mark at beginning of input: [{}] - remove these from the puppet source",
                name, shown
            ),
            0,
        ))
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started && self.queue.is_empty() && self.scn.is_eos() && self.ctx.after == Some(TokenKind::EOF) {
            return None;
        }
        let result = self.next_token();
        match &result {
            Ok(token) if token.kind == TokenKind::EOF => self.ctx.after = Some(TokenKind::EOF),
            Err(_) => {
                self.scn.set_pos(self.scn.text().len());
                self.queue.clear();
                self.ctx.epp_open_position = None;
                self.ctx.after = Some(TokenKind::EOF);
            }
            Ok(_) => {}
        }
        Some(result)
    }
}

/// Detect a byte order mark and return its name and length
fn byte_order_mark(bytes: &[u8]) -> Option<(&'static str, usize)> {
    const MARKS: &[(&[u8], &str)] = &[
        (&[0x00, 0x00, 0xFE, 0xFF], "UTF-32BE"),
        (&[0xFF, 0xFE, 0x00, 0x00], "UTF-32LE"),
        (&[0xDD, 0x73, 0x66, 0x73], "UTF-EBCDIC"),
        (&[0x84, 0x31, 0x95, 0x33], "GB-18030"),
        (&[0xEF, 0xBB, 0xBF], "UTF-8"),
        (&[0xF7, 0x64, 0x4C], "UTF-1"),
        (&[0x0E, 0xFE, 0xFF], "SCSU"),
        (&[0xFB, 0xEE, 0x28], "BOCU"),
        (&[0xFE, 0xFF], "UTF-16BE"),
        (&[0xFF, 0xFE], "UTF-16LE"),
    ];
    MARKS
        .iter()
        .find(|(mark, _)| bytes.starts_with(mark))
        .map(|(mark, name)| (*name, mark.len()))
}

/// Lex source text in code mode and return all tokens including `EOF`
pub fn tokenize(source: &str, file: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Lexer::new();
    lexer.lex_string(source, file)?;
    lexer.fullscan()
}

/// Lex a template text and return all tokens including `EOF`
pub fn tokenize_epp(source: &str, file: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Lexer::new();
    lexer.lex_epp_string(source, file)?;
    lexer.fullscan()
}

#[cfg(test)]
mod tests;
