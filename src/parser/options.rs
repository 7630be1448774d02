//! Lexer configuration.

/// Options controlling how source text is lexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerOptions {
    /// Lex `plan` as a keyword
    pub tasks: bool,
    /// Collect warnings for unrecognized escapes in double quoted and here-doc text
    pub warn_on_unrecognized_escapes: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            tasks: false,
            warn_on_unrecognized_escapes: true,
        }
    }
}

impl LexerOptions {
    pub fn with_tasks(mut self, tasks: bool) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_escape_warnings(mut self, warn: bool) -> Self {
        self.warn_on_unrecognized_escapes = warn;
        self
    }
}
