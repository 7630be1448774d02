//! Reserved words of the language.
//!
//! The table is built once per process and shared read-only by every lexer.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use super::token::TokenKind;

/// Keyword lookup shared by all lexer instances
#[derive(Debug)]
pub struct KeywordTable {
    keywords: FxHashMap<&'static str, TokenKind>,
    task_keywords: FxHashMap<&'static str, TokenKind>,
}

impl KeywordTable {
    fn build() -> Self {
        let keywords = [
            ("case", TokenKind::CASE),
            ("class", TokenKind::CLASS),
            ("default", TokenKind::DEFAULT),
            ("define", TokenKind::DEFINE),
            ("if", TokenKind::IF),
            ("elsif", TokenKind::ELSIF),
            ("else", TokenKind::ELSE),
            ("inherits", TokenKind::INHERITS),
            ("node", TokenKind::NODE),
            ("and", TokenKind::AND),
            ("or", TokenKind::OR),
            ("undef", TokenKind::UNDEF),
            ("false", TokenKind::BOOLEAN),
            ("true", TokenKind::BOOLEAN),
            ("in", TokenKind::IN),
            ("unless", TokenKind::UNLESS),
            ("function", TokenKind::FUNCTION),
            ("type", TokenKind::TYPE),
            ("attr", TokenKind::ATTR),
            ("private", TokenKind::PRIVATE),
            ("application", TokenKind::APPLICATION),
            ("consumes", TokenKind::CONSUMES),
            ("produces", TokenKind::PRODUCES),
            ("site", TokenKind::SITE),
        ]
        .into_iter()
        .collect();
        let task_keywords = [("plan", TokenKind::PLAN)].into_iter().collect();
        Self {
            keywords,
            task_keywords,
        }
    }

    /// Look up a name; task keywords only count when `tasks` is on
    pub fn lookup(&self, name: &str, tasks: bool) -> Option<TokenKind> {
        self.keywords
            .get(name)
            .or_else(|| tasks.then(|| self.task_keywords.get(name)).flatten())
            .copied()
    }

    /// Check if a name is reserved (in any mode)
    pub fn is_reserved(&self, name: &str) -> bool {
        self.keywords.contains_key(name) || self.task_keywords.contains_key(name)
    }
}

/// The process-wide keyword table
pub static KEYWORDS: LazyLock<KeywordTable> = LazyLock::new(KeywordTable::build);
