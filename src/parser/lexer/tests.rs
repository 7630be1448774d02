#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use rstest::rstest;

use super::*;
use crate::parser::errors::ErrorCode;
use crate::parser::token::TokenKind::*;

fn lex(source: &str) -> Vec<Token> {
    tokenize(source, "test.pp").unwrap_or_else(|e| panic!("failed to lex {source:?}: {e}"))
}

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source)
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| *k != EOF)
        .collect()
}

fn texts(source: &str) -> Vec<(TokenKind, String)> {
    lex(source)
        .into_iter()
        .filter(|t| t.kind != EOF)
        .map(|t| (t.kind, t.text().to_string()))
        .collect()
}

fn epp_kinds(source: &str) -> Vec<(TokenKind, String)> {
    tokenize_epp(source, "test.epp")
        .unwrap_or_else(|e| panic!("failed to lex template {source:?}: {e}"))
        .into_iter()
        .filter(|t| t.kind != EOF)
        .map(|t| (t.kind, t.text().to_string()))
        .collect()
}

fn lex_error(source: &str) -> SyntaxError {
    match tokenize(source, "test.pp") {
        Ok(tokens) => panic!("expected an error for {source:?}, got {tokens:?}"),
        Err(e) => e,
    }
}

// =============================================================================
// Punctuation and operators
// =============================================================================

#[rstest]
#[case("=>", FARROW)]
#[case("+=", APPENDS)]
#[case("-=", DELETES)]
#[case("==", ISEQUAL)]
#[case("=~", MATCH)]
#[case("!=", NOTEQUAL)]
#[case("!~", NOMATCH)]
#[case(">=", GREATEREQUAL)]
#[case("<=", LESSEQUAL)]
#[case("->", IN_EDGE)]
#[case("<-", OUT_EDGE)]
#[case("~>", IN_EDGE_SUB)]
#[case("<~", OUT_EDGE_SUB)]
#[case("<<", LSHIFT)]
#[case("<<|", LLCOLLECT)]
#[case("<|", LCOLLECT)]
#[case(">>", RSHIFT)]
#[case("|>>", RRCOLLECT)]
#[case("|>", RCOLLECT)]
#[case("+>", PARROW)]
#[case("@@", ATAT)]
#[case("%", MODULO)]
#[case("*", TIMES)]
#[case("?", QMARK)]
#[case(":", COLON)]
#[case("|", PIPE)]
#[case("~", TILDE)]
fn test_operator(#[case] source: &str, #[case] expected: TokenKind) {
    assert_eq!(kinds(source), vec![expected]);
}

#[test]
fn test_token_lengths_cover_source() {
    let tokens = lex("$a <<| x |>>");
    let ranges: Vec<_> = tokens
        .iter()
        .map(|t| (u32::from(t.offset()), u32::from(t.length())))
        .collect();
    assert_eq!(ranges, vec![(0, 2), (3, 3), (7, 1), (9, 3), (12, 0)]);
}

#[rstest]
#[case("[1]", LISTSTART)]
#[case("$a [1]", LISTSTART)]
#[case("$a[1]", LBRACK)]
fn test_list_start(#[case] source: &str, #[case] expected: TokenKind) {
    assert!(kinds(source).contains(&expected));
}

#[test]
fn test_paren_after_blanks_only() {
    assert_eq!(kinds("  (1)"), vec![WSLPAREN, NUMBER, RPAREN]);
    assert_eq!(kinds("f(1)"), vec![NAME, LPAREN, NUMBER, RPAREN]);
    assert_eq!(kinds("f\n(1)"), vec![NAME, WSLPAREN, NUMBER, RPAREN]);
}

#[test]
fn test_selector_brace() {
    assert_eq!(kinds("$x ? { 1 => 2 }"), vec![VARIABLE, QMARK, SELBRACE, NUMBER, FARROW, NUMBER, RBRACE]);
    assert_eq!(kinds("if $x { }"), vec![IF, VARIABLE, LBRACE, RBRACE]);
}

// =============================================================================
// Names, keywords, numbers
// =============================================================================

#[test]
fn test_names_words_and_references() {
    assert_eq!(
        texts("foo ::foo::bar foo-bar _x Foo::Bar"),
        vec![
            (NAME, "foo".to_string()),
            (NAME, "::foo::bar".to_string()),
            (WORD, "foo-bar".to_string()),
            (WORD, "_x".to_string()),
            (CLASSREF, "Foo::Bar".to_string()),
        ]
    );
}

#[test]
fn test_keywords() {
    assert_eq!(kinds("class define node"), vec![CLASS, DEFINE, NODE]);
    let tokens = lex("true false");
    assert_eq!(tokens[0].value, TokenValue::Boolean(true));
    assert_eq!(tokens[1].value, TokenValue::Boolean(false));
}

#[test]
fn test_plan_keyword_needs_tasks() {
    assert_eq!(kinds("plan"), vec![NAME]);
    let mut lexer = Lexer::with_options(LexerOptions::default().with_tasks(true));
    lexer.lex_string("plan", "").unwrap();
    assert_eq!(lexer.next_token().unwrap().kind, PLAN);
}

#[rstest]
#[case("foo::", ErrorCode::E0108)]
#[case("Foo::", ErrorCode::E0109)]
#[case("::Foo::", ErrorCode::E0110)]
#[case("038", ErrorCode::E0105)]
#[case("0x1g", ErrorCode::E0104)]
#[case("1.2.3", ErrorCode::E0106)]
#[case("3g", ErrorCode::E0103)]
#[case("/* open", ErrorCode::E0102)]
#[case("\"open", ErrorCode::E0101)]
#[case("'open", ErrorCode::E0101)]
#[case("\"\\u{110000}\"", ErrorCode::E0111)]
#[case("\"\\u12\"", ErrorCode::E0111)]
#[case("é", ErrorCode::E0107)]
fn test_lexical_errors(#[case] source: &str, #[case] code: ErrorCode) {
    assert_eq!(lex_error(source).code, code);
}

#[test]
fn test_numbers_keep_raw_text() {
    assert_eq!(
        texts("010 0x1F 1.5e-3 42"),
        vec![
            (NUMBER, "010".to_string()),
            (NUMBER, "0x1F".to_string()),
            (NUMBER, "1.5e-3".to_string()),
            (NUMBER, "42".to_string()),
        ]
    );
}

#[test]
fn test_variables() {
    assert_eq!(
        texts("$x $::top $a::b $"),
        vec![
            (VARIABLE, "x".to_string()),
            (VARIABLE, "::top".to_string()),
            (VARIABLE, "a::b".to_string()),
            (VARIABLE, "".to_string()),
        ]
    );
}

// =============================================================================
// Comments and regular expressions
// =============================================================================

#[test]
fn test_comments_are_skipped() {
    assert_eq!(kinds("1 # one\n/* two\n */ 3"), vec![NUMBER, NUMBER]);
}

#[test]
fn test_regex_depends_on_previous_token() {
    assert_eq!(texts("$x =~ /a\\/b/"), vec![
        (VARIABLE, "x".to_string()),
        (MATCH, "=~".to_string()),
        (REGEX, "a/b".to_string()),
    ]);
    assert_eq!(kinds("4 / 2 / 1"), vec![NUMBER, DIV, NUMBER, DIV, NUMBER]);
    assert_eq!(kinds("/x\n/"), vec![DIV, NAME, DIV]);
}

#[test]
fn test_escaped_slash_does_not_carry_regex_over_a_newline() {
    assert_eq!(
        kinds("$x = /a\\/\nb/"),
        vec![VARIABLE, EQUALS, DIV, NAME, OTHER, DIV, NAME, DIV]
    );
    assert_eq!(texts("$x = /a\\/b\\//"), vec![
        (VARIABLE, "x".to_string()),
        (EQUALS, "=".to_string()),
        (REGEX, "a/b/".to_string()),
    ]);
}

// =============================================================================
// Strings
// =============================================================================

#[test]
fn test_single_quoted_escapes() {
    assert_eq!(texts(r"'a\nb\'c\\d'"), vec![(STRING, "a\\nb'c\\d".to_string())]);
}

#[test]
fn test_double_quoted_escapes() {
    assert_eq!(
        texts(r#""a\tb\"c\$d\u00e9\u{1F600}\s""#),
        vec![(STRING, "a\tb\"c$d\u{e9}\u{1F600} ".to_string())]
    );
    assert_eq!(texts("\"a\\\nb\""), vec![(STRING, "ab".to_string())]);
}

#[test]
fn test_unrecognized_escape_warns_and_is_kept() {
    let mut lexer = Lexer::new();
    lexer.lex_string(r#""a\qb""#, "").unwrap();
    let tokens = lexer.fullscan().unwrap();
    assert_eq!(tokens[0].text(), "a\\qb");
    assert_eq!(lexer.diagnostics().len(), 1);
    assert_eq!(lexer.diagnostics()[0].code, ErrorCode::E0112);
    assert!(!lexer.diagnostics()[0].severity.is_error());

    let mut quiet = Lexer::with_options(LexerOptions::default().with_escape_warnings(false));
    quiet.lex_string(r#""a\qb""#, "").unwrap();
    quiet.fullscan().unwrap();
    assert!(quiet.diagnostics().is_empty());
}

#[test]
fn test_unclosed_quote_message() {
    let error = lex_error("$a = \"abc");
    assert_eq!(error.message, "Unclosed quote after \"\"\" followed by 'abc'");
    assert_eq!(error.column(), Some(6));
}

#[test]
fn test_interpolated_expression() {
    let tokens = lex("\"a${1+1}b\"");
    let shape: Vec<_> = tokens.iter().map(|t| (t.kind, t.text().to_string())).collect();
    assert_eq!(
        shape,
        vec![
            (DQPRE, "a".to_string()),
            (NUMBER, "1".to_string()),
            (PLUS, "+".to_string()),
            (NUMBER, "1".to_string()),
            (DQPOST, "b".to_string()),
            (EOF, "".to_string()),
        ]
    );
    assert_eq!(u32::from(tokens[0].length()), 4);
}

#[test]
fn test_interpolated_variables() {
    assert_eq!(
        texts("\"$x and ${y}\""),
        vec![
            (DQPRE, "".to_string()),
            (VARIABLE, "x".to_string()),
            (DQMID, " and ".to_string()),
            (VARIABLE, "y".to_string()),
            (DQPOST, "".to_string()),
        ]
    );
}

#[test]
fn test_interpolated_names_become_variables() {
    assert_eq!(
        kinds("\"${x[1]}${x.y}${x + 1}${10}\""),
        vec![
            DQPRE, VARIABLE, LBRACK, NUMBER, RBRACK, DQMID, VARIABLE, DOT, NAME, DQMID, NAME, PLUS,
            NUMBER, DQMID, VARIABLE, DQPOST
        ]
    );
}

#[rstest]
#[case("\"$\"", "$")]
#[case("\"a$%b\"", "a$%b")]
#[case("\"a$$\"", "a$$")]
fn test_interpolation_false_starts(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(texts(source), vec![(STRING, expected.to_string())]);
}

#[test]
fn test_nested_interpolation() {
    assert_eq!(
        kinds("\"a${ \"b${c}\" }d\""),
        vec![DQPRE, DQPRE, VARIABLE, DQPOST, DQPOST]
    );
}

// =============================================================================
// Here-docs
// =============================================================================

#[test]
fn test_heredoc_plain() {
    let tokens = lex("$a = @(END)\nText\nEND\n");
    let shape: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(shape, vec![VARIABLE, EQUALS, HEREDOC, SUBLOCATE, STRING, EOF]);
    assert_eq!(tokens[4].text(), "Text\n");
    match &tokens[3].value {
        TokenValue::SubLocate(sub) => assert_eq!(sub.lines, vec!["Text\n".to_string()]),
        other => panic!("expected sub-location, got {other:?}"),
    }
}

#[test]
fn test_heredoc_margin_and_trim() {
    let tokens = lex("@(END:json)\n    a\n     b\n    |- END\n");
    assert_eq!(tokens[0].text(), "json");
    assert_eq!(tokens[2].text(), "a\n b");
}

#[test]
fn test_heredoc_escapes() {
    assert_eq!(lex("@(END/t)\na\\tb\\n\nEND")[2].text(), "a\tb\\n\n");
    assert_eq!(lex("@(END)\na\\tb\nEND")[2].text(), "a\\tb\n");
}

#[test]
fn test_heredoc_interpolation_positions() {
    let tokens = lex("$a = @(\"END\")\n  hi $x\n  | END\n$b");
    let shape: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(shape, vec![VARIABLE, EQUALS, HEREDOC, SUBLOCATE, DQPRE, VARIABLE, DQPOST, VARIABLE, EOF]);
    let x = &tokens[5];
    assert_eq!(x.text(), "x");
    assert_eq!(x.line(), 2);
    assert_eq!(x.column(), 6);
    assert_eq!(tokens[7].line(), 4);
}

#[test]
fn test_two_heredocs_on_one_line() {
    let tokens = lex("f(@(A), @(B))\na\nA\nb\nB\n");
    let strings: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind == STRING)
        .map(|t| t.text().to_string())
        .collect();
    assert_eq!(strings, vec!["a\n".to_string(), "b\n".to_string()]);
    assert_eq!(tokens.last().map(|t| t.kind), Some(EOF));
}

#[rstest]
#[case("@(END", ErrorCode::E0201)]
#[case("@(END:J)\nx\nEND", ErrorCode::E0202)]
#[case("@()\nx\n", ErrorCode::E0203)]
#[case("@(END/q)\nx\nEND", ErrorCode::E0204)]
#[case("@(END/tt)\nx\nEND", ErrorCode::E0205)]
#[case("@(END)", ErrorCode::E0206)]
#[case("@(END)\nx\n", ErrorCode::E0207)]
fn test_heredoc_errors(#[case] source: &str, #[case] code: ErrorCode) {
    assert_eq!(lex_error(source).code, code);
}

#[test]
fn test_heredoc_missing_end_points_at_start() {
    let error = lex_error("\n$a = @(END)\nx\n");
    assert!(error.has_related());
    assert_eq!(error.related[0].position.line, 2);
}

// =============================================================================
// Templates
// =============================================================================

#[test]
fn test_epp_render_expression() {
    assert_eq!(
        epp_kinds("hello <%= $x %> world"),
        vec![
            (EPP_START, "".to_string()),
            (RENDER_STRING, "hello ".to_string()),
            (RENDER_EXPR, "".to_string()),
            (VARIABLE, "x".to_string()),
            (EPP_END, "%>".to_string()),
            (RENDER_STRING, " world".to_string()),
        ]
    );
}

#[test]
fn test_epp_code_and_trim() {
    assert_eq!(
        epp_kinds("<% if $x { -%>\nyes\n<% } %>"),
        vec![
            (EPP_START, "".to_string()),
            (IF, "if".to_string()),
            (VARIABLE, "x".to_string()),
            (LBRACE, "{".to_string()),
            (RENDER_STRING, "yes\n".to_string()),
            (RBRACE, "}".to_string()),
        ]
    );
}

#[test]
fn test_epp_comment_and_literal_tags() {
    assert_eq!(epp_kinds("<%#%>"), vec![(EPP_START, "".to_string())]);
    assert_eq!(
        epp_kinds("a <%% b %%>"),
        vec![(EPP_START, "".to_string()), (RENDER_STRING, "a <% b %>".to_string())]
    );
}

#[test]
fn test_epp_unbalanced_tag() {
    let error = tokenize_epp("text <% $x", "").unwrap_err();
    assert_eq!(error.code, ErrorCode::E0301);
    let error = tokenize_epp("text <%# note", "").unwrap_err();
    assert_eq!(error.code, ErrorCode::E0302);
}

// =============================================================================
// Input handling and iteration
// =============================================================================

#[test]
fn test_byte_order_marks_are_rejected() {
    let mut lexer = Lexer::new();
    let error = lexer.lex_bytes(&[0xEF, 0xBB, 0xBF, b'x'], "bom.pp").unwrap_err();
    assert_eq!(error.code, ErrorCode::E0113);
    assert!(error.message.contains("[EF BB BF]"));

    let error = lexer.lex_bytes(&[0xFF, 0xFE, b'x', 0], "bom.pp").unwrap_err();
    assert!(error.message.contains("UTF-16LE"));
}

#[test]
fn test_invalid_utf8_is_rejected() {
    let mut lexer = Lexer::new();
    let error = lexer.lex_bytes(b"ab\xFFcd", "bad.pp").unwrap_err();
    assert_eq!(error.code, ErrorCode::E0114);
}

#[test]
fn test_empty_input_yields_eof() {
    assert_eq!(lex("").len(), 1);
    assert_eq!(lex("  \n # only a comment").len(), 1);
}

#[test]
fn test_iterator_stops_after_eof() {
    let mut lexer = Lexer::new();
    lexer.lex_string("a b", "").unwrap();
    let kinds: Vec<_> = lexer.by_ref().map(|t| t.unwrap().kind).collect();
    assert_eq!(kinds, vec![NAME, NAME, EOF]);
    assert!(lexer.next().is_none());
}

#[test]
fn test_token_positions() {
    let tokens = lex("a\n  'é' c");
    assert_eq!((tokens[1].line(), tokens[1].column()), (2, 3));
    assert_eq!((tokens[2].line(), tokens[2].column()), (2, 7));
    assert_eq!(tokens[1].position().to_string(), "test.pp:2:3");
}

#[test]
fn test_unquoted_modes() {
    let mut lexer = Lexer::new();
    lexer.lex_unquoted_string("x $y \\$z", None, EscapeSet::UNQUOTED, true);
    let shape: Vec<_> = lexer
        .fullscan()
        .unwrap()
        .into_iter()
        .map(|t| (t.kind, t.text().to_string()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (DQPRE, "x ".to_string()),
            (VARIABLE, "y".to_string()),
            (DQPOST, " $z".to_string()),
            (EOF, "".to_string()),
        ]
    );

    lexer.lex_unquoted_string("x $y", None, EscapeSet::NONE, false);
    assert_eq!(lexer.next_token().unwrap().text(), "x $y");
}
