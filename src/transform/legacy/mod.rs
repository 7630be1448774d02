//! Conversion of the structural model into the legacy tree.
//!
//! ```text
//! Expr ──► LegacyTransformer::transform ──► LegacyNode
//!            ├─ query     (collect expressions: == != and or parens)
//!            └─ hostname  (node definitions: names strings numbers default regex)
//! ```
//!
//! Most variants map one to one. The exceptions are kept as the old
//! evaluator expects them:
//! - numbers become `Name` nodes holding their radix-formatted text
//! - hash literals merge duplicate keys, last write wins, first position kept
//! - resource constructs are refused, the current evaluator handles them
//!
//! The first failing rule is wrapped once in [`TransformError::At`] with the
//! position of the innermost positioned node on the failing path.

mod ast;
mod error;

use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::base::Locate;
use crate::model::{
    AssignmentOp, AttributeOp, CaseOption, ComparisonOp, Expr, ExprKind, KeyedEntry, LambdaExpr,
    Operation, Parameter, Program, QueryKind,
};
use crate::parser::number::{format_float, format_integer};

pub use ast::{
    BooleanOp, CollectionForm, FunctionType, LegacyHashEntry, LegacyKind, LegacyLocation,
    LegacyNode, LegacyParam,
};
pub use error::{TransformError, TransformResult};

/// Convert a whole program, resolving positions through its own locator
pub fn to_legacy(program: &Program) -> TransformResult<LegacyNode> {
    let locator = program.locator();
    debug!(
        source = program.source_ref(),
        definitions = program.definitions.len(),
        "transforming to legacy tree"
    );
    LegacyTransformer::new(locator.as_ref()).transform(&program.body)
}

/// Single-dispatch converter; `locator` resolves the positions copied onto legacy nodes
#[derive(Clone, Copy, Default)]
pub struct LegacyTransformer<'l> {
    locator: Option<&'l dyn Locate>,
}

impl<'l> LegacyTransformer<'l> {
    pub fn new(locator: &'l dyn Locate) -> Self {
        Self {
            locator: Some(locator),
        }
    }

    /// A transformer that copies no positions
    pub fn detached() -> Self {
        Self { locator: None }
    }

    pub fn transform(&self, expr: &Expr) -> TransformResult<LegacyNode> {
        trace!(kind = expr.kind_name(), "legacy transform");
        match self.transform_kind(expr) {
            Ok(node) => Ok(self.stamp(node, expr)),
            Err(error) => Err(self.wrap(error, expr)),
        }
    }

    fn transform_all(&self, exprs: &[Expr]) -> TransformResult<Vec<LegacyNode>> {
        exprs.iter().map(|e| self.transform(e)).collect()
    }

    fn boxed(&self, expr: &Expr) -> TransformResult<Box<LegacyNode>> {
        self.transform(expr).map(Box::new)
    }

    /// An optional body; a missing one is `Nop`
    fn body(&self, body: Option<&Expr>) -> TransformResult<Box<LegacyNode>> {
        match body {
            Some(body) => self.boxed(body),
            None => Ok(LegacyNode::nop().boxed()),
        }
    }

    fn stamp(&self, mut node: LegacyNode, expr: &Expr) -> LegacyNode {
        if node.location.is_none() {
            if let (Some(locator), Some(range)) = (self.locator, expr.range) {
                let position = locator.position(range);
                node.location = Some(LegacyLocation {
                    file: position.file,
                    line: position.line,
                    column: position.column,
                });
            }
        }
        node
    }

    fn wrap(&self, error: TransformError, expr: &Expr) -> TransformError {
        match (error, self.locator, expr.range) {
            (error @ TransformError::At { .. }, _, _) => error,
            (error, Some(locator), Some(range)) => TransformError::At {
                position: locator.position(range),
                error: Box::new(error),
            },
            (error, _, _) => error,
        }
    }

    fn transform_kind(&self, expr: &Expr) -> TransformResult<LegacyNode> {
        use ExprKind::*;

        let no_legacy_form = || TransformError::NoLegacyForm {
            kind: expr.kind_name(),
        };
        let kind = match &expr.kind {
            Nop => LegacyKind::Nop,

            // ----------------------------------------------------------------
            // Operators
            // ----------------------------------------------------------------
            Arithmetic { op, left, right } => LegacyKind::Arithmetic {
                operator: *op,
                lval: self.boxed(left)?,
                rval: self.boxed(right)?,
            },
            Assignment { op, left, right } => self.assignment(*op, left, right)?,
            Relationship { op, left, right } => LegacyKind::Relationship {
                operator: *op,
                lval: self.boxed(left)?,
                rval: self.boxed(right)?,
            },
            Comparison { op, left, right } => LegacyKind::Comparison {
                operator: *op,
                lval: self.boxed(left)?,
                rval: self.boxed(right)?,
            },
            Match { op, left, right } => LegacyKind::Match {
                operator: *op,
                lval: self.boxed(left)?,
                rval: self.boxed(right)?,
            },
            In { left, right } => LegacyKind::In {
                lval: self.boxed(left)?,
                rval: self.boxed(right)?,
            },
            And { left, right } => LegacyKind::BooleanOp {
                operator: BooleanOp::And,
                lval: self.boxed(left)?,
                rval: self.boxed(right)?,
            },
            Or { left, right } => LegacyKind::BooleanOp {
                operator: BooleanOp::Or,
                lval: self.boxed(left)?,
                rval: self.boxed(right)?,
            },
            Access { left, keys } => self.access(left, keys)?,
            Not(e) => LegacyKind::Not(self.boxed(e)?),
            UnaryMinus(e) => LegacyKind::Minus(self.boxed(e)?),
            Parenthesized(e) | Text(e) => return self.transform(e),
            NamedAccess { .. } | Unfold(_) => return Err(no_legacy_form()),

            // ----------------------------------------------------------------
            // Strings and variables
            // ----------------------------------------------------------------
            Variable(e) => LegacyKind::Variable(variable_name(e).ok_or_else(no_legacy_form)?),
            ConcatenatedString(parts) => LegacyKind::Concat(self.transform_all(parts)?),
            Heredoc { text, .. } => return self.transform(text),
            SubLocated(sub) => {
                return LegacyTransformer::new(sub.locator.as_ref()).transform(&sub.expr);
            }

            // ----------------------------------------------------------------
            // Collections and blocks
            // ----------------------------------------------------------------
            LiteralList(values) => LegacyKind::Array(self.transform_all(values)?),
            LiteralHash(entries) => LegacyKind::Hash(self.hash(entries)?),
            Block(statements) => LegacyKind::Block(self.transform_all(statements)?),

            // ----------------------------------------------------------------
            // Control flow
            // ----------------------------------------------------------------
            If {
                test,
                then_expr,
                else_expr,
            } => LegacyKind::If {
                test: self.boxed(test)?,
                statements: self.boxed(then_expr)?,
                else_branch: match else_expr.kind {
                    Nop => None,
                    _ => Some(self.boxed(else_expr)?),
                },
            },
            Unless {
                test,
                then_expr,
                else_expr,
            } => {
                if !matches!(else_expr.kind, Nop) {
                    return Err(TransformError::UnlessWithElse);
                }
                let test = self.stamp(LegacyNode::new(LegacyKind::Not(self.boxed(test)?)), test);
                LegacyKind::If {
                    test: test.boxed(),
                    statements: self.boxed(then_expr)?,
                    else_branch: None,
                }
            }
            Case { test, options } => LegacyKind::Case {
                test: self.boxed(test)?,
                options: options
                    .iter()
                    .map(|o| self.case_option(o))
                    .collect::<TransformResult<_>>()?,
            },
            Selector { left, selectors } => {
                if !is_selectable(left) {
                    return Err(TransformError::NoLegacyForm {
                        kind: left.kind_name(),
                    });
                }
                let mut values = Vec::with_capacity(selectors.len());
                for entry in selectors {
                    values.push(LegacyNode::new(LegacyKind::ResourceParam {
                        param: self.boxed(&entry.matching)?,
                        value: self.boxed(&entry.value)?,
                        add: false,
                    }));
                }
                LegacyKind::Selector {
                    param: self.boxed(left)?,
                    values,
                }
            }

            // ----------------------------------------------------------------
            // Calls
            // ----------------------------------------------------------------
            CallNamedFunction(call) => {
                let ExprKind::QualifiedName(name) = &call.functor.kind else {
                    return Err(TransformError::UnacceptableName {
                        role: "function",
                        kind: call.functor.kind_name(),
                    });
                };
                LegacyKind::Function {
                    name: name.clone(),
                    arguments: self.transform_all(&call.arguments)?,
                    ftype: if call.rval_required {
                        FunctionType::Rvalue
                    } else {
                        FunctionType::Statement
                    },
                    lambda: call.lambda.as_deref().map(|l| self.boxed(l)).transpose()?,
                }
            }
            CallMethod(call) => {
                let ExprKind::NamedAccess { left, right } = &call.functor.kind else {
                    return Err(TransformError::UnacceptableName {
                        role: "method call",
                        kind: call.functor.kind_name(),
                    });
                };
                let ExprKind::QualifiedName(name) = &right.kind else {
                    return Err(TransformError::UnacceptableName {
                        role: "method",
                        kind: right.kind_name(),
                    });
                };
                LegacyKind::MethodCall {
                    receiver: self.boxed(left)?,
                    name: name.clone(),
                    arguments: self.transform_all(&call.arguments)?,
                    lambda: call.lambda.as_deref().map(|l| self.boxed(l)).transpose()?,
                }
            }
            Lambda(lambda) => self.lambda(lambda)?,
            CallFunction(_) => return Err(no_legacy_form()),

            // ----------------------------------------------------------------
            // Definitions
            // ----------------------------------------------------------------
            HostClassDefinition {
                definition,
                parent_class,
            } => LegacyKind::Hostclass {
                name: definition.name.clone(),
                arguments: self.parameters(&definition.parameters)?,
                parent: parent_class.clone(),
                code: self.body(definition.body.as_deref())?,
            },
            ResourceTypeDefinition(definition) => LegacyKind::Definition {
                name: definition.name.clone(),
                arguments: self.parameters(&definition.parameters)?,
                code: self.body(definition.body.as_deref())?,
            },
            NodeDefinition {
                host_matches,
                parent,
                body,
            } => LegacyKind::Node {
                names: host_matches
                    .iter()
                    .map(|m| self.hostname(m))
                    .collect::<TransformResult<_>>()?,
                parent: parent.as_deref().map(|p| self.boxed(p)).transpose()?,
                code: self.body(body.as_deref())?,
            },
            FunctionDefinition { .. }
            | Application(_)
            | TypeAlias { .. }
            | TypeMapping { .. }
            | TypeDefinition { .. }
            | SiteDefinition { .. }
            | CapabilityMapping { .. } => return Err(no_legacy_form()),

            // ----------------------------------------------------------------
            // Resources
            // ----------------------------------------------------------------
            Resource { .. } | ResourceDefaults { .. } | ResourceOverride { .. } => {
                return Err(TransformError::UnsupportedResource {
                    kind: expr.kind_name(),
                });
            }
            Collect {
                type_expr,
                query,
                operations,
            } => {
                let Some(type_name) = type_expr.reference_value() else {
                    return Err(TransformError::UnacceptableName {
                        role: "collection type",
                        kind: type_expr.kind_name(),
                    });
                };
                let form = match query.kind {
                    QueryKind::Exported => CollectionForm::Exported,
                    QueryKind::Virtual => CollectionForm::Virtual,
                };
                let query = match query.expr.as_deref() {
                    Some(q) if !matches!(q.kind, Nop) => Some(self.query(q)?.boxed()),
                    _ => None,
                };
                LegacyKind::Collection {
                    type_name: type_name.into(),
                    form,
                    query,
                    overrides: self.operations(operations)?,
                }
            }

            // ----------------------------------------------------------------
            // Templates
            // ----------------------------------------------------------------
            Epp { .. } | RenderString(_) | Render(_) => return Err(no_legacy_form()),

            // ----------------------------------------------------------------
            // Literals and names
            // ----------------------------------------------------------------
            LiteralString(value) => LegacyKind::String(value.clone()),
            LiteralInteger { value, radix } => LegacyKind::Name(format_integer(*value, *radix).into()),
            LiteralFloat(value) => LegacyKind::Name(format_float(*value).into()),
            LiteralBoolean(value) => LegacyKind::Boolean(*value),
            LiteralRegex(pattern) => LegacyKind::Regex(pattern.clone()),
            LiteralUndef => LegacyKind::Undef,
            LiteralDefault => LegacyKind::Default,
            QualifiedName(name) => LegacyKind::Name(name.clone()),
            QualifiedReference(name) => LegacyKind::Type(name.clone()),
            ReservedWord { word, .. } => LegacyKind::String(word.clone()),
        };
        Ok(LegacyNode::new(kind))
    }

    /// Assignment targets a variable or an access; `-=` has no legacy form
    fn assignment(&self, op: AssignmentOp, left: &Expr, right: &Expr) -> TransformResult<LegacyKind> {
        if op == AssignmentOp::Delete {
            return Err(TransformError::NoLegacyForm {
                kind: "Assignment(-=)",
            });
        }
        let name = match &left.kind {
            ExprKind::Variable(inner) => match variable_name(inner) {
                Some(name) => self.stamp(LegacyNode::new(LegacyKind::Name(name)), left),
                None => {
                    return Err(self.wrap(
                        TransformError::IllegalAssignment {
                            kind: inner.kind_name(),
                        },
                        left,
                    ));
                }
            },
            ExprKind::Access { .. } => self.transform(left)?,
            _ => {
                return Err(self.wrap(
                    TransformError::IllegalAssignment {
                        kind: left.kind_name(),
                    },
                    left,
                ));
            }
        };
        Ok(LegacyKind::VarDef {
            name: name.boxed(),
            value: self.boxed(right)?,
            appends: op == AssignmentOp::Append,
        })
    }

    /// `Name[..]` and `Type[..]` are references; `$x[..]` and `$x[..][..]` are accesses
    fn access(&self, left: &Expr, keys: &[Expr]) -> TransformResult<LegacyKind> {
        match &left.kind {
            ExprKind::QualifiedName(type_name) | ExprKind::QualifiedReference(type_name) => {
                Ok(LegacyKind::ResourceReference {
                    type_name: type_name.clone(),
                    title: LegacyNode::new(LegacyKind::Array(self.transform_all(keys)?)).boxed(),
                })
            }
            ExprKind::Variable(_) | ExprKind::Access { .. } => Ok(LegacyKind::HashOrArrayAccess {
                variable: self.boxed(left)?,
                key: match keys.first() {
                    Some(key) => self.boxed(key)?,
                    None => LegacyNode::nop().boxed(),
                },
            }),
            _ => Err(TransformError::NoLegacyForm {
                kind: left.kind_name(),
            }),
        }
    }

    /// Bare names are keys by their text, so `a` and `'a'` are the same key
    fn hash(&self, entries: &[KeyedEntry]) -> TransformResult<Vec<LegacyHashEntry>> {
        let mut merged: Vec<LegacyHashEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            let key = match &entry.key.kind {
                ExprKind::QualifiedName(name) => self.stamp(
                    LegacyNode::new(LegacyKind::String(name.clone())),
                    &entry.key,
                ),
                ExprKind::LiteralString(_) | ExprKind::ConcatenatedString(_) => {
                    self.transform(&entry.key)?
                }
                _ => {
                    return Err(self.wrap(
                        TransformError::IllegalHashKey {
                            kind: entry.key.kind_name(),
                        },
                        &entry.key,
                    ));
                }
            };
            let value = self.transform(&entry.value)?;
            match merged.iter_mut().find(|e| e.key.kind == key.kind) {
                Some(existing) => existing.value = value,
                None => merged.push(LegacyHashEntry { key, value }),
            }
        }
        Ok(merged)
    }

    fn case_option(&self, option: &CaseOption) -> TransformResult<LegacyNode> {
        Ok(LegacyNode::new(LegacyKind::CaseOpt {
            values: self.transform_all(&option.values)?,
            statements: self.boxed(&option.body)?,
        }))
    }

    fn lambda(&self, lambda: &LambdaExpr) -> TransformResult<LegacyKind> {
        if let Some(return_type) = &lambda.return_type {
            return Err(self.wrap(
                TransformError::NoLegacyForm {
                    kind: "Lambda return type",
                },
                return_type,
            ));
        }
        Ok(LegacyKind::Lambda {
            parameters: self.parameters(&lambda.parameters)?,
            children: self.body(lambda.body.as_deref())?,
        })
    }

    /// Parameters keep their name and default; types and captures have no legacy form
    fn parameters(&self, parameters: &[Parameter]) -> TransformResult<Vec<LegacyParam>> {
        parameters
            .iter()
            .map(|p| {
                if p.captures_rest || p.type_expr.is_some() {
                    return Err(TransformError::NoLegacyForm {
                        kind: "typed or captures-rest Parameter",
                    });
                }
                Ok(LegacyParam {
                    name: p.name.clone(),
                    value: p.value.as_ref().map(|v| self.transform(v)).transpose()?,
                })
            })
            .collect()
    }

    fn operations(&self, operations: &[Operation]) -> TransformResult<Vec<LegacyNode>> {
        operations
            .iter()
            .map(|operation| match operation {
                Operation::Attribute(op) => {
                    let param = LegacyNode::new(LegacyKind::Name(op.name.clone()));
                    Ok(LegacyNode::new(LegacyKind::ResourceParam {
                        param: param.boxed(),
                        value: self.boxed(&op.value)?,
                        add: op.op == AttributeOp::Append,
                    }))
                }
                Operation::Attributes(op) => Err(self.wrap(
                    TransformError::NoLegacyForm {
                        kind: "AttributesOperation",
                    },
                    &op.expr,
                )),
            })
            .collect()
    }

    // ========================================================================
    // Collection queries
    // ========================================================================

    /// Only `==` and `!=` joined by `and`/`or`, optionally in parentheses
    pub fn query(&self, expr: &Expr) -> TransformResult<LegacyNode> {
        match self.query_kind(expr) {
            Ok(node) => Ok(self.stamp(node, expr)),
            Err(error) => Err(self.wrap(error, expr)),
        }
    }

    fn query_kind(&self, expr: &Expr) -> TransformResult<LegacyNode> {
        let coll_expr = |left: &Expr, oper: &str, right: &Expr| -> TransformResult<LegacyNode> {
            Ok(LegacyNode::new(LegacyKind::CollExpr {
                test1: self.query(left)?.boxed(),
                oper: oper.into(),
                test2: self.query(right)?.boxed(),
                parens: false,
            }))
        };
        match &expr.kind {
            ExprKind::Comparison { op, left, right }
                if matches!(op, ComparisonOp::Eq | ComparisonOp::Ne) =>
            {
                coll_expr(left, op.as_str(), right)
            }
            ExprKind::Comparison { op, .. } => Err(TransformError::IllegalQuery {
                kind: op.as_str(),
            }),
            ExprKind::And { left, right } => coll_expr(left, BooleanOp::And.as_str(), right),
            ExprKind::Or { left, right } => coll_expr(left, BooleanOp::Or.as_str(), right),
            ExprKind::Parenthesized(inner) => {
                let mut node = self.query(inner)?;
                if let LegacyKind::CollExpr { parens, .. } = &mut node.kind {
                    *parens = true;
                }
                Ok(node)
            }
            ExprKind::Variable(_)
            | ExprKind::QualifiedName(_)
            | ExprKind::LiteralInteger { .. }
            | ExprKind::LiteralString(_)
            | ExprKind::ConcatenatedString(_) => self.transform(expr),
            _ => Err(TransformError::IllegalQuery {
                kind: expr.kind_name(),
            }),
        }
    }

    // ========================================================================
    // Node names
    // ========================================================================

    pub fn hostname(&self, expr: &Expr) -> TransformResult<LegacyNode> {
        let (value, regex) = match &expr.kind {
            ExprKind::QualifiedName(name) | ExprKind::LiteralString(name) => (name.clone(), false),
            ExprKind::LiteralInteger { value, radix } => (format_integer(*value, *radix).into(), false),
            ExprKind::LiteralDefault => ("default".into(), false),
            ExprKind::LiteralRegex(pattern) => (pattern.clone(), true),
            _ => {
                return Err(self.wrap(
                    TransformError::IllegalHostname {
                        kind: expr.kind_name(),
                    },
                    expr,
                ));
            }
        };
        Ok(self.stamp(LegacyNode::new(LegacyKind::HostName { value, regex }), expr))
    }
}

/// The name of `$name` or `$0`
fn variable_name(inner: &Expr) -> Option<SmolStr> {
    match &inner.kind {
        ExprKind::QualifiedName(name) => Some(name.clone()),
        ExprKind::LiteralInteger { value, .. } => Some(value.to_string().into()),
        _ => None,
    }
}

/// Selector subjects the old grammar accepted
fn is_selectable(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::CallNamedFunction(_)
            | ExprKind::Access { .. }
            | ExprKind::Variable(_)
            | ExprKind::ConcatenatedString(_)
            | ExprKind::LiteralString(_)
            | ExprKind::LiteralInteger { .. }
            | ExprKind::LiteralFloat(_)
            | ExprKind::LiteralBoolean(_)
            | ExprKind::LiteralRegex(_)
            | ExprKind::LiteralUndef
            | ExprKind::LiteralDefault
            | ExprKind::QualifiedName(_)
            | ExprKind::QualifiedReference(_)
    )
}
