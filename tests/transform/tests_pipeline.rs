#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

//! Tokens to model to legacy tree and s-expression text.

use pops::model::builder::{BuildInput, number_from_token, positioned};
use pops::model::{ArithmeticOp, AssignmentOp, ComparisonOp, ResourceForm};
use pops::parser::tokenize;
use pops::transform::legacy::{LegacyKind, LegacyLocation};
use pops::transform::{Sexp, TransformError, dump, dump_program, parse_sexp, to_legacy};
use pops::{Builder, Error};

use crate::helpers::{FILE, builder_for, lex};

/// `$name = <number>` built from one line of source, positioned by its tokens
fn assign_number(source: &str) -> pops::Result<pops::Program> {
    let tokens = tokenize(source, FILE)?;
    let b = builder_for(&tokens);
    let value = number_from_token(&tokens[2])?;
    let assignment = b.assign(AssignmentOp::Assign, tokens[0].clone(), value)?;
    let assignment = positioned(assignment, &tokens[0], &tokens[2]);
    Ok(b.program(assignment)?)
}

#[test]
fn test_octal_assignment_to_legacy_tree() {
    let program = assign_number("$a = 010").unwrap();
    let legacy = to_legacy(&program).unwrap();

    let at = |column| {
        Some(LegacyLocation {
            file: FILE.into(),
            line: 1,
            column,
        })
    };
    assert_eq!(legacy.location, at(1));
    let LegacyKind::VarDef {
        name,
        value,
        appends,
    } = &legacy.kind
    else {
        panic!("expected a VarDef, got {legacy:?}");
    };
    assert!(!appends);
    assert_eq!(name.kind, LegacyKind::Name("a".into()));
    assert_eq!(value.kind, LegacyKind::Name("010".into()));
    assert_eq!(value.location, at(6));
}

#[test]
fn test_program_dump_reads_back() {
    let program = assign_number("$big = 0x1F").unwrap();
    let dumped = dump_program(&program);
    assert_eq!(dumped.to_string(), "(= $big 0x1F)");
    assert_eq!(parse_sexp(&dumped.to_string()).unwrap(), dumped);
}

#[test]
fn test_errors_convert_into_the_crate_error() {
    let error = assign_number("$a = 'open").unwrap_err();
    assert!(matches!(error, Error::Syntax(_)), "{error}");
    assert!(error.to_string().starts_with("site.pp:1:"), "{error}");
    assert!(error.to_string().contains("E0101"), "{error}");

    let error = assign_number("1 = 2").unwrap_err();
    assert!(matches!(error, Error::Build(_)), "{error}");
    assert_eq!(
        error.to_string(),
        "site.pp:1:1: E0401: Illegal attempt to assign to 'LiteralInteger'"
    );

    let error: Error = parse_sexp("(= $a").unwrap_err().into();
    assert_eq!(error.to_string(), "E0603: unexpected end of input in call at offset 5");
}

#[test]
fn test_resources_stop_at_the_legacy_boundary() {
    let tokens = lex("file { '/tmp': }");
    let b = builder_for(&tokens);
    let body = b.resource_body(tokens[2].clone(), vec![]).unwrap();
    let resource = b
        .resource(ResourceForm::Regular, tokens[0].clone(), vec![body])
        .unwrap();
    let resource = positioned(resource, &tokens[0], &tokens[4]);
    let program = b.program(vec![resource]).unwrap();

    let error = to_legacy(&program).unwrap_err();
    assert!(matches!(error.inner(), TransformError::UnsupportedResource { .. }));
    let error = Error::from(error);
    assert_eq!(
        error.to_string(),
        "site.pp:1:1: E0501: Resource constructs are unsupported; use the current evaluator: Resource"
    );

    assert_eq!(
        dump_program(&program).to_string(),
        r#"(block (resource file (body "/tmp")))"#
    );
}

#[test]
fn test_collect_query_in_both_trees() {
    let tokens = lex("User <| title == 'x' |>");
    let b = builder_for(&tokens);
    let test = b
        .comparison(ComparisonOp::Eq, tokens[2].clone(), tokens[4].clone())
        .unwrap();
    let test = positioned(test, &tokens[2], &tokens[4]);
    let query = b.virtual_query(test).unwrap();
    let collect = b.collect(tokens[0].clone(), query, vec![]).unwrap();
    assert_eq!(dump(&collect).to_string(), r#"(collect User (<| (== title "x")))"#);

    let program = b.program(collect).unwrap();
    let legacy = to_legacy(&program).unwrap();
    let LegacyKind::Collection {
        type_name, query, ..
    } = &legacy.kind
    else {
        panic!("expected a Collection, got {legacy:?}");
    };
    assert_eq!(type_name, "user");
    let query = query.as_deref().unwrap();
    let LegacyKind::CollExpr { oper, parens, .. } = &query.kind else {
        panic!("expected a CollExpr, got {query:?}");
    };
    assert_eq!((oper.as_str(), *parens), ("==", false));
    assert_eq!(query.location.as_ref().map(|l| l.column), Some(9));
}

#[test]
fn test_template_builds_a_lambda_without_legacy_form() {
    let b = Builder::detached();
    let body = vec![
        BuildInput::from(b.render_string("hello ")),
        BuildInput::from(b.render_expr(b.var("x").unwrap()).unwrap()),
        BuildInput::from(b.render_string(" world")),
    ];
    let template = b.epp(None, body).unwrap();
    assert_eq!(
        dump(&template).to_string(),
        r#"(lambda (epp (block (render-s "hello ") (render $x) (render-s " world"))))"#
    );

    let program = b.program(template).unwrap();
    let error = to_legacy(&program).unwrap_err();
    assert!(matches!(error, TransformError::NoLegacyForm { kind: "Epp" }), "{error}");
}

#[test]
fn test_dumped_trees_read_back_unchanged() {
    let b = Builder::detached();
    let corpus = vec![
        b.assign(
            AssignmentOp::Append,
            b.var("list").unwrap(),
            b.list(vec![1_i64, 2]).unwrap(),
        )
        .unwrap(),
        b.if_expr(
            b.comparison(ComparisonOp::Ge, b.var("n").unwrap(), 2.5).unwrap(),
            b.call_named("notice", false, vec![b.literal_string("big\tvalue")])
                .unwrap(),
            b.arithmetic(ArithmeticOp::Mod, 7_i64, 3_i64).unwrap(),
        )
        .unwrap(),
        b.number("0777").unwrap(),
        b.heredoc(b.literal_string("line\n"), Some("yaml")).unwrap(),
        b.hash(vec![b.key_entry("k", b.literal(()).unwrap()).unwrap()]),
    ];
    for expr in corpus {
        let dumped = dump(&expr);
        let text = dumped.to_string();
        let reread = parse_sexp(&text).unwrap();
        assert_eq!(reread, dumped, "{text}");
        assert!(matches!(reread, Sexp::Call { .. } | Sexp::Symbol(_)), "{text}");
    }
}
