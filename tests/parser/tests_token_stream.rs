#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

//! Token streams seen through the public lexer API.

use pops::parser::{ErrorCode, Lexer, LexerOptions, TokenKind::*, TokenValue, tokenize_epp};
use rstest::rstest;

use crate::helpers::{FILE, kinds, lex, same_locator};

#[rstest]
#[case("include foo, bar", vec![NAME, NAME, COMMA, NAME])]
#[case("$a = [1]", vec![VARIABLE, EQUALS, LISTSTART, NUMBER, RBRACK])]
#[case("$a[1] = 2", vec![VARIABLE, LBRACK, NUMBER, RBRACK, EQUALS, NUMBER])]
#[case("User <| title == 'x' |>", vec![CLASSREF, LCOLLECT, NAME, ISEQUAL, STRING, RCOLLECT])]
#[case("$x ? { default => 1 }", vec![VARIABLE, QMARK, SELBRACE, DEFAULT, FARROW, NUMBER, RBRACE])]
#[case("node /web/ {}", vec![NODE, REGEX, LBRACE, RBRACE])]
#[case("10 / 2", vec![NUMBER, DIV, NUMBER])]
#[case("File['a'] -> Service[b]", vec![CLASSREF, LBRACK, STRING, RBRACK, IN_EDGE, CLASSREF, LBRACK, NAME, RBRACK])]
#[case("plan x", vec![NAME, NAME])]
fn test_statement_token_kinds(#[case] source: &str, #[case] expected: Vec<pops::TokenKind>) {
    assert_eq!(kinds(source), expected);
}

#[test]
fn test_tasks_option_turns_plan_into_a_keyword() {
    let mut lexer = Lexer::with_options(LexerOptions::default().with_tasks(true));
    lexer.lex_string("plan x", FILE).unwrap();
    let kinds: Vec<_> = lexer.fullscan().unwrap().into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![PLAN, NAME, EOF]);
}

#[test]
fn test_interpolated_expression_keeps_outer_positions() {
    let tokens = lex("$s = \"a${1+1}b\"");
    let shape: Vec<_> = tokens.iter().map(|t| (t.kind, t.text().to_string())).collect();
    assert_eq!(
        shape,
        vec![
            (VARIABLE, "s".to_string()),
            (EQUALS, "=".to_string()),
            (DQPRE, "a".to_string()),
            (NUMBER, "1".to_string()),
            (PLUS, "+".to_string()),
            (NUMBER, "1".to_string()),
            (DQPOST, "b".to_string()),
        ]
    );
    assert_eq!(tokens[3].position().to_string(), "site.pp:1:10");
    assert!(tokens.iter().all(|t| same_locator(t.locator(), tokens[0].locator())));
}

#[test]
fn test_heredoc_body_tokens_use_their_own_locator() {
    let tokens = lex("$a = @(\"END\")\n  hi $x\n  | END\n$b");
    let shape: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(shape, vec![VARIABLE, EQUALS, HEREDOC, SUBLOCATE, DQPRE, VARIABLE, DQPOST, VARIABLE]);

    let TokenValue::SubLocate(sub) = &tokens[3].value else {
        panic!("expected a sub-location, got {:?}", tokens[3].value);
    };
    assert_eq!(sub.lines, vec!["hi $x\n".to_string()]);

    let body_var = &tokens[5];
    assert!(!same_locator(body_var.locator(), tokens[0].locator()));
    assert_eq!(body_var.position().to_string(), "site.pp:2:6");
    assert!(same_locator(tokens[7].locator(), tokens[0].locator()));
    assert_eq!(tokens[7].line(), 4);
}

#[test]
fn test_heredoc_syntax_and_margin() {
    let tokens = lex("@(END:json)\n    {\"a\": 1}\n    | END\n");
    assert_eq!(tokens[0].kind, HEREDOC);
    assert_eq!(tokens[0].text(), "json");
    assert_eq!(tokens[2].kind, STRING);
    assert_eq!(tokens[2].text(), "{\"a\": 1}\n");
}

#[rstest]
#[case("@(END:J)\nx\nEND", ErrorCode::E0202)]
#[case("@(END)\nx\n", ErrorCode::E0207)]
fn test_heredoc_errors_carry_a_position(#[case] source: &str, #[case] code: ErrorCode) {
    let error = pops::tokenize(source, FILE).unwrap_err();
    assert_eq!(error.code, code);
    assert!(error.position.is_some());
    assert!(error.to_string().starts_with("site.pp:"), "{error}");
}

#[rstest]
#[case("hello <%= $x %> world", vec![EPP_START, RENDER_STRING, RENDER_EXPR, VARIABLE, EPP_END, RENDER_STRING])]
#[case("<%#%>", vec![EPP_START])]
#[case("<%# note -%>\ntext", vec![EPP_START, RENDER_STRING])]
#[case("<% $a = 1 -%>\n<%= $a -%>\n", vec![EPP_START, VARIABLE, EQUALS, NUMBER, RENDER_EXPR, VARIABLE, EPP_END_TRIM])]
fn test_template_token_kinds(#[case] source: &str, #[case] expected: Vec<pops::TokenKind>) {
    let kinds: Vec<_> = tokenize_epp(source, "t.epp")
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| *k != EOF)
        .collect();
    assert_eq!(kinds, expected);
}

#[test]
fn test_lexer_is_reusable_across_inputs() {
    let mut lexer = Lexer::new();
    lexer.lex_string(r#""a\qb""#, FILE).unwrap();
    lexer.fullscan().unwrap();
    assert_eq!(lexer.diagnostics().len(), 1);

    lexer.lex_string("$b", "other.pp").unwrap();
    let tokens: Vec<_> = lexer.by_ref().map(|t| t.unwrap()).collect();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].position().to_string(), "other.pp:1:1");
    assert!(lexer.diagnostics().is_empty());
}
