//! Calls, lambdas and interpolated text.

use smol_str::SmolStr;

use super::{BuildError, BuildInput, BuildResult, Builder, PositionSource, record_position};
use crate::model::{Call, Expr, ExprKind, LambdaExpr, Parameter};
use crate::parser::Radix;

/// Names that may be called without parentheses as a statement, e.g. `include foo, bar`
pub const STATEMENT_CALLS: &[&str] = &[
    "include", "require", "realize", "contain", "tag", "debug", "info", "notice", "warning", "err",
    "fail",
];

/// A name that used to start a statement call and is now rejected
const UNSUPPORTED_CALLS: &[&str] = &["import"];

impl Builder {
    /// `name(args)`; a plain string is taken as the function name
    pub fn call_named(
        &self,
        functor: impl Into<BuildInput>,
        rval_required: bool,
        arguments: Vec<Expr>,
    ) -> BuildResult<Expr> {
        let functor = self.fqn(functor)?;
        if !matches!(
            functor.kind,
            ExprKind::QualifiedName(_) | ExprKind::QualifiedReference(_)
        ) {
            return Err(BuildError::NonNameFunctor {
                kind: functor.kind_name(),
                position: self.position(functor.range),
            });
        }
        Ok(self.node(ExprKind::CallNamedFunction(Call {
            rval_required,
            functor: functor.boxed(),
            arguments,
            lambda: None,
        })))
    }

    /// A call of something that evaluates to a callable
    pub fn call_function(
        &self,
        functor: impl Into<BuildInput>,
        rval_required: bool,
        arguments: Vec<Expr>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::CallFunction(Call {
            rval_required,
            functor: self.boxed(functor)?,
            arguments,
            lambda: None,
        })))
    }

    /// `receiver.name(args)`; `functor` is the `NamedAccess`
    pub fn call_method(
        &self,
        functor: impl Into<BuildInput>,
        arguments: Vec<Expr>,
        lambda: Option<Expr>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::CallMethod(Call {
            rval_required: true,
            functor: self.boxed(functor)?,
            arguments,
            lambda: lambda.map(Box::new),
        })))
    }

    /// Attach a lambda to a call built earlier
    pub fn with_lambda(&self, mut call: Expr, lambda: Expr) -> Expr {
        if let ExprKind::CallFunction(c) | ExprKind::CallNamedFunction(c) | ExprKind::CallMethod(c) =
            &mut call.kind
        {
            c.lambda = Some(lambda.boxed());
        }
        call
    }

    pub fn lambda(
        &self,
        parameters: Vec<Parameter>,
        body: impl Into<BuildInput>,
        return_type: Option<Expr>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Lambda(LambdaExpr {
            parameters,
            body: self.body(body)?,
            return_type: return_type.map(Box::new),
        })))
    }

    /// Rewrite a statement list so that a statement-call name swallows what follows it.
    ///
    /// Each item is a statement, or a list of expressions when the grammar saw a
    /// comma-separated sequence. `include foo, bar` arrives as `[include, [foo, bar]]`
    /// and leaves as one call of `include` with two arguments. A list after
    /// anything else is an error.
    pub fn transform_calls(&self, items: Vec<BuildInput>) -> BuildResult<Vec<Expr>> {
        let mut statements: Vec<Expr> = Vec::with_capacity(items.len());
        for item in items {
            let call_name = statements.last().and_then(statement_call_name);
            match (call_name, item) {
                (Some(name), item) => {
                    if UNSUPPORTED_CALLS.contains(&name.as_str()) {
                        let position = self.position(statements.last().and_then(|s| s.range));
                        return Err(BuildError::Unsupported {
                            what: name,
                            position,
                        });
                    }
                    let mut arguments = match item {
                        BuildInput::List(values) => self.exprs(values)?,
                        single => vec![single.into_expr()?],
                    };
                    for argument in &mut arguments {
                        if let ExprKind::CallNamedFunction(call) = &mut argument.kind {
                            call.rval_required = true;
                        }
                    }
                    let Some(name_expr) = statements.pop() else {
                        continue;
                    };
                    let last = arguments.last().and_then(PositionSource::source_range);
                    let start = name_expr.range;
                    let mut call = self.call_named(name_expr, false, arguments)?;
                    record_position(&mut call, &start, &last);
                    statements.push(call);
                }
                (None, BuildInput::List(_)) => {
                    let last = statements.last();
                    return Err(BuildError::ArgsToNonCall {
                        name: last.and_then(|s| s.name_text()).map(SmolStr::new),
                        position: self.position(last.and_then(|s| s.range)),
                    });
                }
                (None, item) => {
                    let mut statement = item.into_expr()?;
                    if let ExprKind::CallNamedFunction(call) = &mut statement.kind {
                        call.rval_required = false;
                    }
                    statements.push(statement);
                }
            }
        }
        Ok(statements)
    }

    /// Interpolated text: `${expr}` inside a string.
    ///
    /// A bare name or decimal number at the head of the expression is read as
    /// a variable, so `"${x.each}"` means `"${$x.each}"`.
    pub fn text(&self, expr: impl Into<BuildInput>) -> BuildResult<Expr> {
        let expr = interpolate(self.expr(expr)?);
        Ok(self.node(ExprKind::Text(expr.boxed())))
    }
}

/// The name of a statement call, when `expr` is one
fn statement_call_name(expr: &Expr) -> Option<SmolStr> {
    match &expr.kind {
        ExprKind::QualifiedName(name)
            if STATEMENT_CALLS.contains(&name.as_str())
                || UNSUPPORTED_CALLS.contains(&name.as_str()) =>
        {
            Some(name.clone())
        }
        _ => None,
    }
}

fn interpolate(expr: Expr) -> Expr {
    let Expr { kind, range } = expr;
    let kind = match kind {
        kind @ (ExprKind::QualifiedName(_)
        | ExprKind::LiteralInteger {
            radix: Radix::Decimal,
            ..
        }) => ExprKind::Variable(Expr { kind, range }.boxed()),
        ExprKind::Access { left, keys } => ExprKind::Access {
            left: interpolate_head(left),
            keys,
        },
        ExprKind::NamedAccess { left, right } => ExprKind::NamedAccess {
            left: interpolate_head(left),
            right,
        },
        ExprKind::CallMethod(mut call) => {
            call.functor = interpolate_head(call.functor);
            ExprKind::CallMethod(call)
        }
        kind => kind,
    };
    Expr { kind, range }
}

fn interpolate_head(expr: Box<Expr>) -> Box<Expr> {
    if is_interpolation_rewritable(&expr) {
        interpolate(*expr).boxed()
    } else {
        expr
    }
}

fn is_interpolation_rewritable(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Access { .. }
            | ExprKind::NamedAccess { .. }
            | ExprKind::CallMethod(_)
            | ExprKind::QualifiedName(_)
            | ExprKind::LiteralInteger {
                radix: Radix::Decimal,
                ..
            }
    )
}
