//! Head-tagged s-expression form of the structural model.

use tracing::debug;

use super::Sexp;
use crate::model::{
    AttributeOp, Call, Expr, ExprKind, NamedDefinition, Operation, Parameter, Program, QueryKind,
    ResourceForm,
};
use crate::parser::Radix;
use crate::parser::number::format_integer;

/// Dump a program's body
pub fn dump_program(program: &Program) -> Sexp {
    debug!(source = program.source_ref(), "dumping program");
    dump(&program.body)
}

/// Dump one expression, e.g. `$a = 2 + 2` as `(= $a (+ 2 2))`
pub fn dump(expr: &Expr) -> Sexp {
    use ExprKind::*;

    match &expr.kind {
        Nop => Sexp::symbol(":nop"),

        Arithmetic { op, left, right } => binary(op.as_str(), left, right),
        Assignment { op, left, right } => binary(op.as_str(), left, right),
        Relationship { op, left, right } => binary(op.as_str(), left, right),
        Comparison { op, left, right } => binary(op.as_str(), left, right),
        Match { op, left, right } => binary(op.as_str(), left, right),
        In { left, right } => binary("in", left, right),
        And { left, right } => binary("&&", left, right),
        Or { left, right } => binary("||", left, right),
        Access { left, keys } => Sexp::call("slice", prepend(dump(left), keys)),
        NamedAccess { left, right } => binary(".", left, right),
        Not(e) => Sexp::call("!", vec![dump(e)]),
        UnaryMinus(e) => Sexp::call("-", vec![dump(e)]),
        Unfold(e) => Sexp::call("unfold", vec![dump(e)]),
        Parenthesized(e) => dump(e),

        Text(e) => Sexp::call("str", vec![dump(e)]),
        Variable(e) => match &e.kind {
            QualifiedName(name) => Sexp::symbol(format!("${name}")),
            LiteralInteger {
                value,
                radix: Radix::Decimal,
            } => Sexp::symbol(format!("${value}")),
            _ => Sexp::call("$", vec![dump(e)]),
        },
        ConcatenatedString(parts) => Sexp::call("cat", dump_all(parts)),
        Heredoc { syntax, text } => {
            let mut args = Vec::with_capacity(2);
            if let Some(syntax) = syntax {
                args.push(Sexp::call("syntax", vec![Sexp::string(syntax.as_str())]));
            }
            args.push(dump(text));
            Sexp::call("heredoc", args)
        }
        SubLocated(sub) => dump(&sub.expr),

        LiteralList(values) => Sexp::List(dump_all(values)),
        LiteralHash(entries) => Sexp::call(
            "hash",
            entries
                .iter()
                .map(|e| Sexp::call("=>", vec![dump(&e.key), dump(&e.value)]))
                .collect(),
        ),
        Block(statements) => Sexp::call("block", dump_all(statements)),

        If {
            test,
            then_expr,
            else_expr,
        } => conditional("if", test, then_expr, else_expr),
        Unless {
            test,
            then_expr,
            else_expr,
        } => conditional("unless", test, then_expr, else_expr),
        Case { test, options } => {
            let mut args = vec![dump(test)];
            args.extend(options.iter().map(|o| {
                Sexp::call(
                    "when",
                    vec![
                        Sexp::List(dump_all(&o.values)),
                        Sexp::call("then", vec![dump(&o.body)]),
                    ],
                )
            }));
            Sexp::call("case", args)
        }
        Selector { left, selectors } => {
            let mut args = vec![dump(left)];
            args.extend(
                selectors
                    .iter()
                    .map(|s| Sexp::call("=>", vec![dump(&s.matching), dump(&s.value)])),
            );
            Sexp::call("?", args)
        }

        CallFunction(call) | CallNamedFunction(call) => {
            let head = if call.rval_required { "call" } else { "invoke" };
            Sexp::call(head, call_args(call))
        }
        CallMethod(call) => Sexp::call("call-method", call_args(call)),
        Lambda(lambda) => {
            let mut args = Vec::new();
            if !lambda.parameters.is_empty() {
                args.push(parameters(&lambda.parameters));
            }
            if let Some(return_type) = &lambda.return_type {
                args.push(Sexp::call("returns", vec![dump(return_type)]));
            }
            args.extend(lambda.body.as_deref().map(dump));
            Sexp::call("lambda", args)
        }

        FunctionDefinition {
            definition,
            return_type,
        } => {
            let returns = return_type
                .as_deref()
                .map(|t| Sexp::call("returns", vec![dump(t)]));
            named("function", definition, returns)
        }
        ResourceTypeDefinition(definition) => named("define", definition, None),
        Application(definition) => named("application", definition, None),
        HostClassDefinition {
            definition,
            parent_class,
        } => {
            let inherits = parent_class
                .as_ref()
                .map(|p| Sexp::call("inherits", vec![Sexp::symbol(p.clone())]));
            named("class", definition, inherits)
        }
        TypeAlias { name, type_expr } => Sexp::call(
            "type-alias",
            vec![Sexp::symbol(name.clone()), dump(type_expr)],
        ),
        TypeMapping {
            type_expr,
            mapping_expr,
        } => binary("type-mapping", type_expr, mapping_expr),
        TypeDefinition { name, parent, body } => {
            let mut args = vec![Sexp::symbol(name.clone())];
            if let Some(parent) = parent {
                args.push(Sexp::call("inherits", vec![Sexp::symbol(parent.clone())]));
            }
            args.extend(body.as_deref().map(dump));
            Sexp::call("type-definition", args)
        }
        NodeDefinition {
            host_matches,
            parent,
            body,
        } => {
            let mut args = vec![Sexp::call("matches", dump_all(host_matches))];
            if let Some(parent) = parent {
                args.push(Sexp::call("parent", vec![dump(parent)]));
            }
            args.extend(body.as_deref().map(dump));
            Sexp::call("node", args)
        }
        SiteDefinition { body } => Sexp::call("site", body.as_deref().map(dump).into_iter().collect()),
        CapabilityMapping {
            kind,
            component,
            capability,
            mappings,
        } => {
            let mut args = vec![dump(component), Sexp::symbol(capability.clone())];
            args.extend(mappings.iter().map(operation));
            Sexp::call(kind.clone(), args)
        }

        Resource {
            form,
            type_name,
            bodies,
        } => {
            let mut args = vec![dump(type_name)];
            args.extend(bodies.iter().map(|body| {
                let mut parts = vec![body.title.as_ref().map_or(Sexp::Nil, dump)];
                parts.extend(body.operations.iter().map(operation));
                Sexp::call("body", parts)
            }));
            Sexp::call(form_head(*form, "resource"), args)
        }
        ResourceDefaults {
            form,
            type_ref,
            operations,
        } => Sexp::call(
            form_head(*form, "resource-defaults"),
            with_operations(dump(type_ref), operations),
        ),
        ResourceOverride {
            form,
            resources,
            operations,
        } => Sexp::call(
            form_head(*form, "override"),
            with_operations(dump(resources), operations),
        ),
        Collect {
            type_expr,
            query,
            operations,
        } => {
            let head = match query.kind {
                QueryKind::Virtual => "<|",
                QueryKind::Exported => "<<|",
            };
            let query = Sexp::call(head, query.expr.as_deref().map(dump).into_iter().collect());
            let mut args = vec![dump(type_expr), query];
            args.extend(operations.iter().map(operation));
            Sexp::call("collect", args)
        }

        Epp { body, .. } => Sexp::call("epp", body.as_deref().map(dump).into_iter().collect()),
        RenderString(text) => Sexp::call("render-s", vec![Sexp::string(text.as_str())]),
        Render(e) => Sexp::call("render", vec![dump(e)]),

        LiteralString(text) => Sexp::string(text.as_str()),
        LiteralInteger {
            value,
            radix: Radix::Decimal,
        } => Sexp::Int(*value),
        LiteralInteger { value, radix } => Sexp::symbol(format_integer(*value, *radix)),
        LiteralFloat(value) => Sexp::Float(*value),
        LiteralBoolean(value) => Sexp::Bool(*value),
        LiteralRegex(pattern) => Sexp::call("regex", vec![Sexp::string(pattern.as_str())]),
        LiteralUndef => Sexp::symbol(":undef"),
        LiteralDefault => Sexp::symbol(":default"),
        QualifiedName(name) | QualifiedReference(name) => Sexp::symbol(name.clone()),
        ReservedWord { word, .. } => Sexp::call("reserved", vec![Sexp::string(word.as_str())]),
    }
}

fn dump_all(exprs: &[Expr]) -> Vec<Sexp> {
    exprs.iter().map(dump).collect()
}

fn binary(head: &str, left: &Expr, right: &Expr) -> Sexp {
    Sexp::call(head, vec![dump(left), dump(right)])
}

fn prepend(first: Sexp, rest: &[Expr]) -> Vec<Sexp> {
    let mut args = Vec::with_capacity(rest.len() + 1);
    args.push(first);
    args.extend(rest.iter().map(dump));
    args
}

/// `(if test (then x) (else y))`; a `Nop` else is left out
fn conditional(head: &str, test: &Expr, then_expr: &Expr, else_expr: &Expr) -> Sexp {
    let mut args = vec![dump(test), Sexp::call("then", vec![dump(then_expr)])];
    if !matches!(else_expr.kind, ExprKind::Nop) {
        args.push(Sexp::call("else", vec![dump(else_expr)]));
    }
    Sexp::call(head, args)
}

fn call_args(call: &Call) -> Vec<Sexp> {
    let mut args = prepend(dump(&call.functor), &call.arguments);
    args.extend(call.lambda.as_deref().map(dump));
    args
}

fn parameters(parameters: &[Parameter]) -> Sexp {
    Sexp::call("parameters", parameters.iter().map(parameter).collect())
}

/// `(param $x (type T) (value V))`; a captures-rest parameter is `*$x`
fn parameter(parameter: &Parameter) -> Sexp {
    let prefix = if parameter.captures_rest { "*$" } else { "$" };
    let mut args = vec![Sexp::symbol(format!("{prefix}{}", parameter.name))];
    if let Some(type_expr) = &parameter.type_expr {
        args.push(Sexp::call("type", vec![dump(type_expr)]));
    }
    if let Some(value) = &parameter.value {
        args.push(Sexp::call("value", vec![dump(value)]));
    }
    Sexp::call("param", args)
}

/// `(head name (parameters ...) extra body)`
fn named(head: &str, definition: &NamedDefinition, extra: Option<Sexp>) -> Sexp {
    let mut args = vec![Sexp::symbol(definition.name.clone())];
    if !definition.parameters.is_empty() {
        args.push(parameters(&definition.parameters));
    }
    args.extend(extra);
    args.extend(definition.body.as_deref().map(dump));
    Sexp::call(head, args)
}

fn operation(operation: &Operation) -> Sexp {
    match operation {
        Operation::Attribute(op) => {
            let head = match op.op {
                AttributeOp::Set => "=>",
                AttributeOp::Append => "+>",
            };
            Sexp::call(head, vec![Sexp::symbol(op.name.clone()), dump(&op.value)])
        }
        Operation::Attributes(op) => Sexp::call("attributes", vec![dump(&op.expr)]),
    }
}

fn with_operations(first: Sexp, operations: &[Operation]) -> Vec<Sexp> {
    let mut args = vec![first];
    args.extend(operations.iter().map(operation));
    args
}

fn form_head(form: ResourceForm, base: &str) -> String {
    match form {
        ResourceForm::Regular => base.to_string(),
        ResourceForm::Virtual => format!("virtual-{base}"),
        ResourceForm::Exported => format!("exported-{base}"),
    }
}
