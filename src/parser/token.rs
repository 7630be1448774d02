//! Token kinds and token values produced by the lexer.
//!
//! A token is a small value: kind, value, raw byte range and a handle to the
//! locator that can turn the range into a line and column when a diagnostic
//! needs one.

use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::base::{LocatorRef, SourcePosition, SubLocator};

/// All token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
#[allow(non_camel_case_types)]
pub enum TokenKind {
    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    LBRACK,       // [
    LISTSTART,    // [ after whitespace or at start of input
    RBRACK,       // ]
    LBRACE,       // {
    SELBRACE,     // { after ?
    RBRACE,       // }
    LPAREN,       // (
    WSLPAREN,     // ( with only whitespace before it on its line
    RPAREN,       // )
    COMMA,        // ,
    SEMIC,        // ;
    COLON,        // :
    DOT,          // .
    QMARK,        // ?
    TILDE,        // ~
    AT,           // @
    ATAT,         // @@
    PIPE,         // |

    // =========================================================================
    // OPERATORS
    // =========================================================================
    EQUALS,       // =
    APPENDS,      // +=
    DELETES,      // -=
    ISEQUAL,      // ==
    NOTEQUAL,     // !=
    MATCH,        // =~
    NOMATCH,      // !~
    GREATEREQUAL, // >=
    GREATERTHAN,  // >
    LESSEQUAL,    // <=
    LESSTHAN,     // <
    FARROW,       // =>
    PARROW,       // +>
    LSHIFT,       // <<
    RSHIFT,       // >>
    LLCOLLECT,    // <<|
    LCOLLECT,     // <|
    RRCOLLECT,    // |>>
    RCOLLECT,     // |>
    PLUS,         // +
    MINUS,        // -
    DIV,          // /
    TIMES,        // *
    MODULO,       // %
    NOT,          // !
    IN_EDGE,      // ->
    IN_EDGE_SUB,  // ~>
    OUT_EDGE,     // <-
    OUT_EDGE_SUB, // <~

    // =========================================================================
    // VALUES
    // =========================================================================
    NAME,
    WORD,
    CLASSREF,
    NUMBER,
    VARIABLE,
    STRING,
    DQPRE,
    DQMID,
    DQPOST,
    REGEX,
    BOOLEAN,
    HEREDOC,
    SUBLOCATE,
    OTHER,

    // =========================================================================
    // TEMPLATE
    // =========================================================================
    EPP_START,
    EPP_END,      // %>
    EPP_END_TRIM, // -%>
    RENDER_STRING,
    RENDER_EXPR,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    CASE,
    CLASS,
    DEFAULT,
    DEFINE,
    IF,
    ELSIF,
    ELSE,
    INHERITS,
    NODE,
    AND,
    OR,
    UNDEF,
    IN,
    UNLESS,
    FUNCTION,
    TYPE,
    ATTR,
    PRIVATE,
    APPLICATION,
    CONSUMES,
    PRODUCES,
    SITE,
    PLAN,

    EOF,
}

impl TokenKind {
    /// The fixed source text of punctuation, operators and keywords
    pub fn literal(self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            LBRACK | LISTSTART => "[",
            RBRACK => "]",
            LBRACE | SELBRACE => "{",
            RBRACE => "}",
            LPAREN | WSLPAREN => "(",
            RPAREN => ")",
            COMMA => ",",
            SEMIC => ";",
            COLON => ":",
            DOT => ".",
            QMARK => "?",
            TILDE => "~",
            AT => "@",
            ATAT => "@@",
            PIPE => "|",
            EQUALS => "=",
            APPENDS => "+=",
            DELETES => "-=",
            ISEQUAL => "==",
            NOTEQUAL => "!=",
            MATCH => "=~",
            NOMATCH => "!~",
            GREATEREQUAL => ">=",
            GREATERTHAN => ">",
            LESSEQUAL => "<=",
            LESSTHAN => "<",
            FARROW => "=>",
            PARROW => "+>",
            LSHIFT => "<<",
            RSHIFT => ">>",
            LLCOLLECT => "<<|",
            LCOLLECT => "<|",
            RRCOLLECT => "|>>",
            RCOLLECT => "|>",
            PLUS => "+",
            MINUS => "-",
            DIV => "/",
            TIMES => "*",
            MODULO => "%",
            NOT => "!",
            IN_EDGE => "->",
            IN_EDGE_SUB => "~>",
            OUT_EDGE => "<-",
            OUT_EDGE_SUB => "<~",
            EPP_END => "%>",
            EPP_END_TRIM => "-%>",
            CASE => "case",
            CLASS => "class",
            DEFAULT => "default",
            DEFINE => "define",
            IF => "if",
            ELSIF => "elsif",
            ELSE => "else",
            INHERITS => "inherits",
            NODE => "node",
            AND => "and",
            OR => "or",
            UNDEF => "undef",
            IN => "in",
            UNLESS => "unless",
            FUNCTION => "function",
            TYPE => "type",
            ATTR => "attr",
            PRIVATE => "private",
            APPLICATION => "application",
            CONSUMES => "consumes",
            PRODUCES => "produces",
            SITE => "site",
            PLAN => "plan",
            _ => return None,
        })
    }

    /// Check if this is a reserved word
    pub fn is_keyword(self) -> bool {
        (self >= TokenKind::CASE && self <= TokenKind::PLAN) || self == TokenKind::BOOLEAN
    }

    /// Whether a `/` following this token may start a regular expression
    pub fn allows_regex_after(self) -> bool {
        use TokenKind::*;
        !matches!(
            self,
            RPAREN
                | RBRACK
                | RRCOLLECT
                | RCOLLECT
                | NAME
                | CLASSREF
                | NUMBER
                | STRING
                | BOOLEAN
                | DQPRE
                | DQMID
                | DQPOST
                | HEREDOC
                | REGEX
                | VARIABLE
                | WORD
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The here-doc body lines and the locator placing them in the outer document
#[derive(Debug)]
pub struct SubLocation {
    /// Processed body lines, each with its line break
    pub lines: Vec<String>,
    pub locator: Rc<SubLocator>,
}

/// The value carried by a token
#[derive(Debug, Clone)]
pub enum TokenValue {
    /// Punctuation, operators, keywords and markers; the text follows from the kind
    None,
    /// Names, words, numbers (raw text), string fragments, variables, regex patterns, here-doc syntax
    Text(SmolStr),
    Boolean(bool),
    SubLocate(Rc<SubLocation>),
}

impl PartialEq for TokenValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::SubLocate(a), Self::SubLocate(b)) => a.lines == b.lines,
            _ => false,
        }
    }
}

/// A token with its kind, value, raw range and locator
#[derive(Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub range: TextRange,
    locator: LocatorRef,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue, range: TextRange, locator: LocatorRef) -> Self {
        Self {
            kind,
            value,
            range,
            locator,
        }
    }

    pub fn offset(&self) -> TextSize {
        self.range.start()
    }

    pub fn length(&self) -> TextSize {
        self.range.len()
    }

    pub fn locator(&self) -> &LocatorRef {
        &self.locator
    }

    /// The token's value as text: the carried text, the boolean, or the kind's literal
    pub fn text(&self) -> &str {
        match &self.value {
            TokenValue::Text(text) => text,
            TokenValue::Boolean(true) => "true",
            TokenValue::Boolean(false) => "false",
            TokenValue::None | TokenValue::SubLocate(_) => self.kind.literal().unwrap_or(""),
        }
    }

    /// The exact source text the token was scanned from
    pub fn source_text(&self) -> &str {
        self.locator.extract_text(self.offset(), self.length())
    }

    /// File, line and column of the token; computed on each call
    pub fn position(&self) -> SourcePosition {
        self.locator.position(self.range)
    }

    pub fn line(&self) -> usize {
        self.locator.line_for_offset(self.offset())
    }

    pub fn column(&self) -> usize {
        self.locator.column_for_offset(self.offset())
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value && self.range == other.range
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TokenValue::None => write!(f, "{}@{:?}", self.kind, self.range),
            TokenValue::SubLocate(sub) => {
                write!(f, "{}({:?})@{:?}", self.kind, sub.lines, self.range)
            }
            _ => write!(f, "{}({:?})@{:?}", self.kind, self.text(), self.range),
        }
    }
}
