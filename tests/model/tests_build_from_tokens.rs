#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

//! Building model nodes from scanned tokens the way a grammar driver does.

use std::sync::Arc;

use pops::model::builder::{
    BuildError, BuildInput, ResourceShape, number_from_token, positioned, record_position,
    resource_shape,
};
use pops::model::{AssignmentOp, DefinitionKind, ExprKind};
use pops::parser::{Radix, TokenKind, TokenValue};
use pops::transform::dump;
use pops::{Builder, Locate, LocatorRef};
use rstest::rstest;

use crate::helpers::{builder_for, lex};

#[test]
fn test_assignment_of_octal_number() {
    let tokens = lex("$a = 010");
    let b = builder_for(&tokens);
    let value = number_from_token(&tokens[2]).unwrap();
    assert_eq!(
        value.kind,
        ExprKind::LiteralInteger {
            value: 8,
            radix: Radix::Octal
        }
    );

    let assignment = b
        .assign(AssignmentOp::Assign, tokens[0].clone(), value)
        .unwrap();
    let assignment = positioned(assignment, &tokens[0], &tokens[2]);
    assert_eq!(dump(&assignment).to_string(), "(= $a 010)");
    assert_eq!(u32::from(assignment.offset().unwrap()), 0);
    assert_eq!(u32::from(assignment.length().unwrap()), 8);

    let locator = tokens[0].locator();
    let position = assignment.position(locator.as_ref()).unwrap();
    assert_eq!(position.to_string(), "site.pp:1:1");
}

#[test]
fn test_record_position_keeps_the_first_range() {
    let tokens = lex("foo bar");
    let b = builder_for(&tokens);
    let mut name = b.fqn(tokens[0].clone()).unwrap();
    record_position(&mut name, &tokens[1], &tokens[1]);
    assert_eq!(u32::from(name.offset().unwrap()), 0);
    assert_eq!(u32::from(name.length().unwrap()), 3);
}

#[test]
fn test_statement_call_swallows_following_arguments() {
    let tokens = lex("include foo, bar");
    let b = builder_for(&tokens);
    let items = vec![
        BuildInput::from(tokens[0].clone()),
        BuildInput::List(vec![tokens[1].clone().into(), tokens[3].clone().into()]),
    ];
    let statements = b.transform_calls(items).unwrap();
    assert_eq!(statements.len(), 1);
    assert_eq!(dump(&statements[0]).to_string(), "(invoke include foo bar)");
    assert_eq!(u32::from(statements[0].length().unwrap()), 16);
}

#[test]
fn test_import_is_rejected_with_its_position() {
    let tokens = lex("\nimport 'x'");
    let b = builder_for(&tokens);
    let items = vec![
        BuildInput::from(tokens[0].clone()),
        BuildInput::from(tokens[1].clone()),
    ];
    let error = b.transform_calls(items).unwrap_err();
    assert!(matches!(error, BuildError::Unsupported { .. }));
    assert_eq!(
        error.to_string(),
        "site.pp:2:1: E0404: The 'import' construct is not supported"
    );
}

#[test]
fn test_arguments_after_a_plain_name_are_rejected() {
    let tokens = lex("foo a, b");
    let b = builder_for(&tokens);
    let items = vec![
        BuildInput::from(tokens[0].clone()),
        BuildInput::List(vec![tokens[1].clone().into(), tokens[3].clone().into()]),
    ];
    let error = b.transform_calls(items).unwrap_err();
    assert!(matches!(error, BuildError::ArgsToNonCall { .. }), "{error}");
}

#[rstest]
#[case("user", ResourceShape::Resource)]
#[case("User", ResourceShape::Defaults)]
#[case("class", ResourceShape::Class)]
#[case("42", ResourceShape::Error)]
fn test_resource_shape_of_tokens(#[case] source: &str, #[case] expected: ResourceShape) {
    let token = lex(source).remove(0);
    assert_eq!(resource_shape(&BuildInput::from(token)), expected);
}

#[rstest]
#[case("User", &["x"], ResourceShape::Override)]
#[case("Resource", &["User"], ResourceShape::Defaults)]
#[case("Resource", &["User", "x"], ResourceShape::Override)]
fn test_resource_shape_of_access(
    #[case] type_name: &str,
    #[case] keys: &[&str],
    #[case] expected: ResourceShape,
) {
    let b = Builder::detached();
    let access = b.access(b.fqr(type_name).unwrap(), keys.to_vec()).unwrap();
    assert_eq!(resource_shape(&BuildInput::from(access)), expected);
}

#[test]
fn test_heredoc_built_from_its_tokens() {
    let tokens = lex("$j = @(END:json)\n  [1]\n  | END\n");
    assert_eq!(tokens[2].kind, TokenKind::HEREDOC);
    let TokenValue::SubLocate(sub) = &tokens[3].value else {
        panic!("expected a sub-location, got {:?}", tokens[3].value);
    };
    let b = builder_for(&tokens);
    let body = b
        .sublocate(tokens[4].clone(), sub.locator.clone())
        .unwrap();
    let heredoc = b.heredoc(body, Some(tokens[2].text())).unwrap();
    assert_eq!(
        dump(&heredoc).to_string(),
        r#"(heredoc (syntax "json") "[1]\n")"#
    );

    let ExprKind::Heredoc { text, .. } = &heredoc.kind else {
        panic!("expected a heredoc");
    };
    let ExprKind::SubLocated(sub_expr) = &text.kind else {
        panic!("expected a sub-located body");
    };
    let position = sub_expr.expr.position(sub_expr.locator.as_ref()).unwrap();
    assert_eq!((position.line, position.column), (2, 3));
}

#[test]
fn test_program_indexes_definitions_from_tokens() {
    let tokens = lex("class web { }\ndefine site::vhost() { }");
    let b = builder_for(&tokens);
    let mut class = b.host_class(tokens[1].text(), vec![], None, ()).unwrap();
    record_position(&mut class, &tokens[0], &tokens[3]);
    let mut define = b.definition(tokens[5].text(), vec![], ()).unwrap();
    record_position(&mut define, &tokens[4], &tokens[9]);

    let program = b.program(vec![class, define]).unwrap();
    let index: Vec<_> = program
        .definitions
        .iter()
        .map(|d| (d.kind, d.name.to_string()))
        .collect();
    assert_eq!(
        index,
        vec![
            (DefinitionKind::Class, "web".to_string()),
            (DefinitionKind::ResourceType, "site::vhost".to_string()),
        ]
    );

    let found = program.find_definition("Site::Vhost").unwrap();
    let position = program.position_of(found).unwrap();
    assert_eq!(position.to_string(), "site.pp:2:1");
    assert_eq!(program.locator().line_index().len(), 2);
}

#[test]
fn test_program_shares_the_lexed_source() {
    let tokens = lex("$a = 1\n$b = 2");
    let b = builder_for(&tokens);
    let program = b.program(b.var("a").unwrap()).unwrap();
    let lexed = tokens[0].locator().base();
    assert!(Arc::ptr_eq(program.locator().source_arc(), lexed.source_arc()));
    assert!(Arc::ptr_eq(program.locator().line_index_arc(), lexed.line_index_arc()));
    assert_eq!(program.source_text(), "$a = 1\n$b = 2");
}

#[test]
fn test_heredoc_program_keeps_the_body_text() {
    let tokens = lex("$j = @(END)\n  hi\n  | END\n");
    let TokenValue::SubLocate(sub) = &tokens[3].value else {
        panic!("expected a sub-location, got {:?}", tokens[3].value);
    };
    let body_locator: LocatorRef = sub.locator.clone();
    let body_builder = Builder::new(body_locator);
    let program = body_builder.program(body_builder.var("x").unwrap()).unwrap();
    assert_eq!(program.source_text(), sub.locator.source());
    assert!(Arc::ptr_eq(
        program.locator().source_arc(),
        sub.locator.base().source_arc()
    ));
}
