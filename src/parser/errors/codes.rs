//! Error code definitions for front-end diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (quotes, comments, numbers, names, escapes)
//! - E02xx: Here-doc errors
//! - E03xx: Template (EPP) errors
//! - E04xx: Builder errors
//! - E05xx: Legacy tree transformation errors
//! - E06xx: S-expression reader errors
//! - E09xx: Internal errors

use std::fmt;

/// Error codes for front-end diagnostics
///
/// Each error code represents one kind of problem, enabling filtering and
/// matching on diagnostics without inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Unclosed quote
    E0101,
    /// Unclosed multiline comment
    E0102,
    /// Illegal number
    E0103,
    /// Not a valid hex number
    E0104,
    /// Not a valid octal number
    E0105,
    /// Not a valid decimal number
    E0106,
    /// Illegal name or bare word
    E0107,
    /// Illegal fully qualified name
    E0108,
    /// Illegal class reference
    E0109,
    /// Illegal fully qualified class reference
    E0110,
    /// Malformed unicode escape
    E0111,
    /// Unrecognized escape sequence (warning)
    E0112,
    /// Byte order mark at start of input
    E0113,
    /// Input is not valid UTF-8
    E0114,

    // =========================================================================
    // E02xx: Here-doc errors
    // =========================================================================
    /// Unclosed parenthesis after `@(`
    E0201,
    /// Malformed `@(tag[:syntax][/escapes])`
    E0202,
    /// Empty end tag
    E0203,
    /// Escape flag not in `t r n s u L $`
    E0204,
    /// Escape flag given more than once
    E0205,
    /// No text lines after the here-doc line
    E0206,
    /// End-tagged line never found
    E0207,
    /// Empty segment in syntax between `+` (warning)
    E0208,

    // =========================================================================
    // E03xx: Template errors
    // =========================================================================
    /// Reached end of input inside a code tag
    E0301,
    /// Unterminated `<%#` comment
    E0302,
    /// `<%` at end of input
    E0303,

    // =========================================================================
    // E04xx: Builder errors
    // =========================================================================
    /// Left-hand side of an assignment is not assignable
    E0401,
    /// Functor of a call is not a name
    E0402,
    /// Argument list following a name that is not a statement call
    E0403,
    /// Construct not supported by the builder
    E0404,
    /// Builder input cannot be turned into a node
    E0405,

    // =========================================================================
    // E05xx: Legacy tree transformation errors
    // =========================================================================
    /// Resource construct has no legacy form
    E0501,
    /// Variant has no legacy form
    E0502,
    /// Expression not allowed in a collection query
    E0503,
    /// Expression not allowed as a node name
    E0504,
    /// Illegal hash key
    E0505,
    /// Left-hand side cannot be assigned in the legacy tree
    E0506,
    /// `unless` with an `else` branch
    E0507,
    /// Unacceptable function, method or type name
    E0508,

    // =========================================================================
    // E06xx: S-expression reader errors
    // =========================================================================
    /// Character that starts no token
    E0601,
    /// Token not valid here
    E0602,
    /// Input ended inside a form
    E0603,
    /// Bad escape in a string
    E0604,
    /// Number out of range
    E0605,

    // =========================================================================
    // E09xx: Internal errors
    // =========================================================================
    /// Internal error
    E0999,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexical
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0104 => "E0104",
            Self::E0105 => "E0105",
            Self::E0106 => "E0106",
            Self::E0107 => "E0107",
            Self::E0108 => "E0108",
            Self::E0109 => "E0109",
            Self::E0110 => "E0110",
            Self::E0111 => "E0111",
            Self::E0112 => "E0112",
            Self::E0113 => "E0113",
            Self::E0114 => "E0114",
            // Here-doc
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
            Self::E0205 => "E0205",
            Self::E0206 => "E0206",
            Self::E0207 => "E0207",
            Self::E0208 => "E0208",
            // Template
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
            // Builder
            Self::E0401 => "E0401",
            Self::E0402 => "E0402",
            Self::E0403 => "E0403",
            Self::E0404 => "E0404",
            Self::E0405 => "E0405",
            // Legacy transform
            Self::E0501 => "E0501",
            Self::E0502 => "E0502",
            Self::E0503 => "E0503",
            Self::E0504 => "E0504",
            Self::E0505 => "E0505",
            Self::E0506 => "E0506",
            Self::E0507 => "E0507",
            Self::E0508 => "E0508",
            // S-expression
            Self::E0601 => "E0601",
            Self::E0602 => "E0602",
            Self::E0603 => "E0603",
            Self::E0604 => "E0604",
            Self::E0605 => "E0605",
            // Internal
            Self::E0999 => "E0999",
        }
    }

    /// Get a short description of the error category
    pub fn category_description(&self) -> &'static str {
        match self.as_str().as_bytes()[2] {
            b'1' => "lexical error",
            b'2' => "heredoc error",
            b'3' => "template error",
            b'4' => "build error",
            b'5' => "transformation error",
            b'6' => "s-expression error",
            _ => "internal error",
        }
    }

    /// Get the default message for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            // Lexical
            Self::E0101 => "Unclosed quote",
            Self::E0102 => "Unclosed multiline comment",
            Self::E0103 => "Illegal number",
            Self::E0104 => "Not a valid hex number",
            Self::E0105 => "Not a valid octal number",
            Self::E0106 => "Not a valid decimal number",
            Self::E0107 => "Illegal name or bare word",
            Self::E0108 => "Illegal fully qualified name",
            Self::E0109 => "Illegal class reference",
            Self::E0110 => "Illegal fully qualified class reference",
            Self::E0111 => {
                "Unicode escape '\\u' was not followed by 4 hex digits or 1-6 hex digits in {} or was > 10ffff"
            }
            Self::E0112 => "Unrecognized escape sequence",
            Self::E0113 => "Illegal Byte Order mark at beginning of input",
            Self::E0114 => "Input is not valid UTF-8",
            // Here-doc
            Self::E0201 => "Unclosed parenthesis after '@('",
            Self::E0202 => "Invalid syntax in heredoc expected @(endtag[:syntax][/escapes])",
            Self::E0203 => "Heredoc with an empty endtag",
            Self::E0204 => "Invalid heredoc escape char. Only t, r, n, s, u, L, $ allowed",
            Self::E0205 => "An escape char for @() may only appear once",
            Self::E0206 => "Heredoc without any following lines of text",
            Self::E0207 => "Heredoc without end-tagged line",
            Self::E0208 => "Heredoc syntax specification has empty segment between '+'",
            // Template
            Self::E0301 => "Unbalanced epp tag, reached <eof> without closing tag.",
            Self::E0302 => "Reaching end after opening <%# without seeing %>",
            Self::E0303 => "Unbalanced embedded expression - opening <% and reaching end of input",
            // Builder
            Self::E0401 => "Illegal left-hand side of assignment",
            Self::E0402 => "Functor of a call must be a name",
            Self::E0403 => "Arguments given to a name that is not a call",
            Self::E0404 => "Unsupported construct",
            Self::E0405 => "Value cannot be used as an expression",
            // Legacy transform
            Self::E0501 => "Resource constructs are unsupported; use the current evaluator",
            Self::E0502 => "Expression has no legacy form",
            Self::E0503 => "Not a valid expression in a collection query",
            Self::E0504 => "Illegal expression - unacceptable as a node name",
            Self::E0505 => "Illegal hash key expression",
            Self::E0506 => "LHS is not an expression that can be assigned to",
            Self::E0507 => "Unsupported syntax, unless can not have an else clause",
            Self::E0508 => "Unacceptable name",
            // S-expression
            Self::E0601 => "unexpected character",
            Self::E0602 => "unexpected token",
            Self::E0603 => "unexpected end of input",
            Self::E0604 => "invalid escape",
            Self::E0605 => "number out of range",
            // Internal
            Self::E0999 => "internal error",
        }
    }

    /// Check if this is a lexical error (including here-doc and template scanning)
    pub fn is_lexical(&self) -> bool {
        matches!(self.as_str().as_bytes()[2], b'1' | b'2' | b'3')
    }

    /// Check if this code is only ever reported as a warning
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::E0112 | Self::E0208)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
