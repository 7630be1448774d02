//! Logos-based tokenizer for s-expression text.

use logos::Logos;

/// A token with its kind, text and byte offset; `kind` is `None` for input no rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Lexeme<'a> {
    pub kind: Option<SexpToken>,
    pub text: &'a str,
    pub offset: usize,
}

pub(super) struct SexpLexer<'a> {
    inner: logos::Lexer<'a, SexpToken>,
}

impl<'a> SexpLexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: SexpToken::lexer(input),
        }
    }
}

impl<'a> Iterator for SexpLexer<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.inner.next()?;
        Some(Lexeme {
            kind: token.ok(),
            text: self.inner.slice(),
            offset: self.inner.span().start,
        })
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r";[^\n]*")]
pub(super) enum SexpToken {
    // =========================================================================
    // DELIMITERS
    // =========================================================================
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBrack,

    #[token("]")]
    RBrack,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    // =========================================================================
    // SCALARS
    // =========================================================================
    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,

    #[regex(r"-?[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", priority = 4)]
    #[regex(r"-?[0-9]+[eE][+-]?[0-9]+", priority = 4)]
    Float,

    /// No leading zeros; `010` reads as a symbol
    #[regex(r"-?(0|[1-9][0-9]*)", priority = 3)]
    Int,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("nil")]
    Nil,

    /// `#"any text"`; a symbol that does not read back bare
    #[regex(r#"#"([^"\\]|\\.)*""#, priority = 3)]
    QuotedSymbol,

    /// `:"any text"`
    #[regex(r#":"([^"\\]|\\.)*""#, priority = 3)]
    QuotedKeyword,

    /// `:name`; a map key, or a symbol anywhere else
    #[regex(r#":[^\s()\[\]{}";]+"#, priority = 2)]
    Keyword,

    #[regex(r#"[^\s()\[\]{}";]+"#, priority = 1)]
    Symbol,
}

impl SexpToken {
    /// How the token reads in an error message
    pub fn describe(self) -> &'static str {
        match self {
            SexpToken::LParen => "'('",
            SexpToken::RParen => "')'",
            SexpToken::LBrack => "'['",
            SexpToken::RBrack => "']'",
            SexpToken::LBrace => "'{'",
            SexpToken::RBrace => "'}'",
            SexpToken::Str => "string",
            SexpToken::Float => "float",
            SexpToken::Int => "integer",
            SexpToken::True | SexpToken::False => "boolean",
            SexpToken::Nil => "nil",
            SexpToken::Keyword | SexpToken::QuotedKeyword => "keyword",
            SexpToken::Symbol | SexpToken::QuotedSymbol => "symbol",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Option<SexpToken>> {
        SexpLexer::new(input).map(|l| l.kind).collect()
    }

    #[test]
    fn test_lex_call() {
        assert_eq!(
            kinds("(+ 1 -2.5e3)"),
            [
                Some(SexpToken::LParen),
                Some(SexpToken::Symbol),
                Some(SexpToken::Int),
                Some(SexpToken::Float),
                Some(SexpToken::RParen),
            ]
        );
    }

    #[test]
    fn test_lex_quoted_symbols() {
        assert_eq!(
            kinds(r#"#"a b" :"c d" || #x"#),
            [
                Some(SexpToken::QuotedSymbol),
                Some(SexpToken::QuotedKeyword),
                Some(SexpToken::Symbol),
                Some(SexpToken::Symbol),
            ]
        );
    }

    #[test]
    fn test_lex_words_prefer_literals_only_when_whole() {
        assert_eq!(
            kinds("true truex nil 12a 010 :k $x"),
            [
                Some(SexpToken::True),
                Some(SexpToken::Symbol),
                Some(SexpToken::Nil),
                Some(SexpToken::Symbol),
                Some(SexpToken::Symbol),
                Some(SexpToken::Keyword),
                Some(SexpToken::Symbol),
            ]
        );
    }

    #[test]
    fn test_lex_comment_and_offsets() {
        let lexemes: Vec<_> = SexpLexer::new("; note\n  \"a\\\"b\"").collect();
        assert_eq!(lexemes.len(), 1);
        assert_eq!(lexemes[0].kind, Some(SexpToken::Str));
        assert_eq!(lexemes[0].offset, 9);
        assert_eq!(lexemes[0].text, "\"a\\\"b\"");
    }

    #[test]
    fn test_lex_unterminated_string_is_an_error() {
        assert_eq!(kinds("\"abc").first(), Some(&None));
    }
}
