#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::rc::Rc;

use text_size::{TextRange, TextSize};

use super::*;
use crate::base::{Locator, SubLocator};

fn name(text: &str) -> Expr {
    Expr::new(ExprKind::QualifiedName(text.into()))
}

fn int(value: i64) -> Expr {
    Expr::new(ExprKind::LiteralInteger {
        value,
        radix: Radix::Decimal,
    })
}

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(TextSize::new(start), TextSize::new(end))
}

fn class(name: &str, body: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::HostClassDefinition {
        definition: NamedDefinition {
            name: name.into(),
            parameters: vec![],
            body: Some(Expr::new(ExprKind::Block(body)).boxed()),
        },
        parent_class: None,
    })
}

#[test]
fn test_children_in_source_order() {
    let expr = Expr::new(ExprKind::If {
        test: name("a").boxed(),
        then_expr: int(1).boxed(),
        else_expr: Expr::nop().boxed(),
    });
    let kinds: Vec<_> = expr.children().iter().map(|c| c.kind_name()).collect();
    assert_eq!(kinds, ["QualifiedName", "LiteralInteger", "Nop"]);
}

#[test]
fn test_children_of_resource_include_titles_and_values() {
    let expr = Expr::new(ExprKind::Resource {
        form: ResourceForm::Regular,
        type_name: name("file").boxed(),
        bodies: vec![ResourceBody {
            title: Some(Expr::new(ExprKind::LiteralString("/tmp".into()))),
            operations: vec![Operation::Attribute(AttributeOperation {
                name: "ensure".into(),
                op: AttributeOp::Set,
                value: name("present"),
                range: None,
            })],
            range: None,
        }],
    });
    let texts: Vec<_> = expr.children().iter().map(|c| c.name_text().unwrap()).collect();
    assert_eq!(texts, ["file", "/tmp", "present"]);
}

#[test]
fn test_leaves_have_no_children() {
    assert!(int(1).children().is_empty());
    assert!(Expr::new(ExprKind::LiteralUndef).children().is_empty());
}

#[test]
fn test_visitor_reaches_every_depth() {
    struct Names(Vec<String>);
    impl<'a> ExprVisitor<'a> for Names {
        fn visit_expr(&mut self, expr: &'a Expr) {
            if let ExprKind::QualifiedName(n) = &expr.kind {
                self.0.push(n.to_string());
            }
            walk_expr(self, expr);
        }
    }

    let expr = Expr::new(ExprKind::Arithmetic {
        op: ArithmeticOp::Add,
        left: name("a").boxed(),
        right: Expr::new(ExprKind::Not(
            Expr::new(ExprKind::Parenthesized(name("b").boxed())).boxed(),
        ))
        .boxed(),
    });
    let mut names = Names(vec![]);
    names.visit_expr(&expr);
    assert_eq!(names.0, ["a", "b"]);
}

#[test]
fn test_position_is_derived_through_locator() {
    let locator = Locator::new("a\n  $b = 1", "init.pp");
    let expr = Expr::with_range(ExprKind::LiteralUndef, range(4, 6));
    let position = expr.position(&locator).unwrap();
    assert_eq!((position.line, position.column), (2, 3));
    assert_eq!(expr.offset(), Some(TextSize::new(4)));
    assert_eq!(expr.length(), Some(TextSize::new(2)));
}

#[test]
fn test_synthetic_node_has_no_position() {
    let locator = Locator::new("abc", "init.pp");
    assert!(int(1).position(&locator).is_none());
    assert!(!int(1).is_positioned());
}

#[test]
fn test_reference_value_is_lowercase() {
    let expr = Expr::new(ExprKind::QualifiedReference("Foo::Bar".into()));
    assert_eq!(expr.name_text(), Some("Foo::Bar"));
    assert_eq!(expr.reference_value().as_deref(), Some("foo::bar"));
    assert_eq!(name("x").reference_value(), None);
}

#[test]
fn test_sublocated_equality_compares_source() {
    let a = Rc::new(SubLocator::new("x\n", "f.pp", 2, 10, 0));
    let b = Rc::new(SubLocator::new("x\n", "f.pp", 2, 10, 0));
    let c = Rc::new(SubLocator::new("y\n", "f.pp", 2, 10, 0));
    let sub = |locator: &Rc<SubLocator>| SubLocatedExpr {
        expr: name("x").boxed(),
        locator: Rc::clone(locator),
    };
    assert_eq!(sub(&a), sub(&a));
    assert_eq!(sub(&a), sub(&b));
    assert_ne!(sub(&a), sub(&c));
}

// ============================================================================
// Program
// ============================================================================

#[test]
fn test_program_rebuilds_and_memoizes_locator() {
    let source = "class a {\n}\n";
    let locator = Locator::new(source, "site.pp");
    let body = Expr::with_range(
        ExprKind::HostClassDefinition {
            definition: NamedDefinition {
                name: "a".into(),
                parameters: vec![],
                body: None,
            },
            parent_class: None,
        },
        range(0, 11),
    );
    let program = Program::new(body, &locator);
    drop(locator);

    assert_eq!(program.source_text(), source);
    assert_eq!(program.source_ref(), "site.pp");
    assert_eq!(program.line_offsets().len(), 3);

    let first = program.locator();
    let second = program.locator();
    assert!(Rc::ptr_eq(&first, &second));

    let position = program.position_of(&program.body).unwrap();
    assert_eq!(position.to_string(), "site.pp:1:1");
}

#[test]
fn test_program_indexes_definitions_at_any_depth() {
    let locator = Locator::new("", "x.pp");
    let inner = Expr::new(ExprKind::TypeAlias {
        name: "MyType".into(),
        type_expr: Expr::new(ExprKind::QualifiedReference("Integer".into())).boxed(),
    });
    let nested_if = Expr::new(ExprKind::If {
        test: name("x").boxed(),
        then_expr: class("b", vec![]).boxed(),
        else_expr: Expr::nop().boxed(),
    });
    let body = Expr::new(ExprKind::Block(vec![class("a", vec![inner]), nested_if]));
    let program = Program::new(body, &locator);

    let index: Vec<_> = program
        .definitions
        .iter()
        .map(|d| (d.kind, d.name.as_str()))
        .collect();
    assert_eq!(
        index,
        [
            (DefinitionKind::Class, "a"),
            (DefinitionKind::TypeAlias, "MyType"),
            (DefinitionKind::Class, "b"),
        ]
    );
    assert!(program.find_definition("B").is_some());
    assert!(program.find_definition("c").is_none());
}

#[test]
fn test_node_definition_is_indexed_by_host_names() {
    let node = Expr::new(ExprKind::NodeDefinition {
        host_matches: vec![
            Expr::new(ExprKind::LiteralString("web1".into())),
            Expr::new(ExprKind::LiteralDefault),
        ],
        parent: None,
        body: None,
    });
    let definition = DefinitionRef::of(&node).unwrap();
    assert_eq!(definition.kind, DefinitionKind::Node);
    assert_eq!(definition.name, "web1,LiteralDefault");
}
