//! Traversal over the structural model.

use super::{Expr, ExprKind, Operation, Parameter};

/// Visitor over expressions.
///
/// The default `visit_expr` descends into all children; override it to stop
/// or to act before/after descending with [`walk_expr`].
pub trait ExprVisitor<'a> {
    fn visit_expr(&mut self, expr: &'a Expr) {
        walk_expr(self, expr);
    }
}

/// Call `visit_expr` on each direct child of `expr`, in source order
pub fn walk_expr<'a, V: ExprVisitor<'a> + ?Sized>(visitor: &mut V, expr: &'a Expr) {
    use ExprKind::*;

    let mut visit = |e: &'a Expr| visitor.visit_expr(e);
    match &expr.kind {
        Nop | LiteralString(_) | LiteralInteger { .. } | LiteralFloat(_) | LiteralBoolean(_)
        | LiteralRegex(_) | LiteralUndef | LiteralDefault | QualifiedName(_)
        | QualifiedReference(_) | ReservedWord { .. } | RenderString(_) => {}

        Arithmetic { left, right, .. }
        | Assignment { left, right, .. }
        | Relationship { left, right, .. }
        | Comparison { left, right, .. }
        | Match { left, right, .. }
        | In { left, right }
        | And { left, right }
        | Or { left, right }
        | NamedAccess { left, right } => {
            visit(left);
            visit(right);
        }
        Access { left, keys } => {
            visit(left);
            keys.iter().for_each(visit);
        }
        Not(e) | UnaryMinus(e) | Unfold(e) | Parenthesized(e) | Text(e) | Variable(e)
        | Render(e) => visit(e),
        ConcatenatedString(parts) | LiteralList(parts) | Block(parts) => {
            parts.iter().for_each(visit);
        }
        Heredoc { text, .. } => visit(text),
        SubLocated(sub) => visit(&sub.expr),
        LiteralHash(entries) => {
            for entry in entries {
                visit(&entry.key);
                visit(&entry.value);
            }
        }
        If { test, then_expr, else_expr } | Unless { test, then_expr, else_expr } => {
            visit(test);
            visit(then_expr);
            visit(else_expr);
        }
        Case { test, options } => {
            visit(test);
            for option in options {
                option.values.iter().for_each(&mut visit);
                visit(&option.body);
            }
        }
        Selector { left, selectors } => {
            visit(left);
            for entry in selectors {
                visit(&entry.matching);
                visit(&entry.value);
            }
        }
        CallFunction(call) | CallNamedFunction(call) | CallMethod(call) => {
            visit(&call.functor);
            call.arguments.iter().for_each(&mut visit);
            if let Some(lambda) = &call.lambda {
                visit(lambda);
            }
        }
        Lambda(lambda) => {
            walk_parameters(&lambda.parameters, &mut visit);
            if let Some(return_type) = &lambda.return_type {
                visit(return_type);
            }
            if let Some(body) = &lambda.body {
                visit(body);
            }
        }
        FunctionDefinition { definition, return_type } => {
            walk_parameters(&definition.parameters, &mut visit);
            if let Some(return_type) = return_type {
                visit(return_type);
            }
            if let Some(body) = &definition.body {
                visit(body);
            }
        }
        ResourceTypeDefinition(definition)
        | Application(definition)
        | HostClassDefinition { definition, .. } => {
            walk_parameters(&definition.parameters, &mut visit);
            if let Some(body) = &definition.body {
                visit(body);
            }
        }
        TypeAlias { type_expr, .. } => visit(type_expr),
        TypeMapping { type_expr, mapping_expr } => {
            visit(type_expr);
            visit(mapping_expr);
        }
        TypeDefinition { body, .. } | SiteDefinition { body } => {
            if let Some(body) = body {
                visit(body);
            }
        }
        NodeDefinition { host_matches, parent, body } => {
            host_matches.iter().for_each(&mut visit);
            if let Some(parent) = parent {
                visit(parent);
            }
            if let Some(body) = body {
                visit(body);
            }
        }
        CapabilityMapping { component, mappings, .. } => {
            visit(component);
            walk_operations(mappings, &mut visit);
        }
        Resource { type_name, bodies, .. } => {
            visit(type_name);
            for body in bodies {
                if let Some(title) = &body.title {
                    visit(title);
                }
                walk_operations(&body.operations, &mut visit);
            }
        }
        ResourceDefaults { type_ref: target, operations, .. }
        | ResourceOverride { resources: target, operations, .. } => {
            visit(target);
            walk_operations(operations, &mut visit);
        }
        Collect { type_expr, query, operations } => {
            visit(type_expr);
            if let Some(query) = &query.expr {
                visit(query);
            }
            walk_operations(operations, &mut visit);
        }
        Epp { body, .. } => {
            if let Some(body) = body {
                visit(body);
            }
        }
    }
}

fn walk_parameters<'a>(parameters: &'a [Parameter], visit: &mut impl FnMut(&'a Expr)) {
    for parameter in parameters {
        if let Some(type_expr) = &parameter.type_expr {
            visit(type_expr);
        }
        if let Some(value) = &parameter.value {
            visit(value);
        }
    }
}

fn walk_operations<'a>(operations: &'a [Operation], visit: &mut impl FnMut(&'a Expr)) {
    for operation in operations {
        match operation {
            Operation::Attribute(op) => visit(&op.value),
            Operation::Attributes(op) => visit(&op.expr),
        }
    }
}
