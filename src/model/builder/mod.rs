//! Construction of model nodes from grammar actions.
//!
//! A grammar driver calls one builder function per reduce action, passing
//! tokens, raw values or nodes it built earlier. Positions are recorded
//! afterwards with [`record_position`], keyed by the first and last token of
//! the reduced rule.
//!
//! ## Architecture
//!
//! ```text
//! Grammar action ── BuildInput ──→ Builder::xxx(..) ──→ Expr
//!                                         │
//!                            record_position(expr, start, end)
//!                                         │
//!                 Builder::program(body) ─┴→ Program (body + definition index)
//! ```

mod calls;
mod definitions;
mod error;
mod input;

use std::rc::Rc;

use smol_str::SmolStr;
use text_size::TextRange;
use tracing::{debug, trace};

use super::{
    ArithmeticOp, AssignmentOp, AttributeOp, AttributeOperation, AttributesOperation, CaseOption,
    ComparisonOp, Expr, ExprKind, KeyedEntry, LambdaExpr, MatchOp, Operation, Parameter, Program,
    Query, QueryKind, RelationshipOp, ResourceBody, ResourceForm, SelectorEntry, SubLocatedExpr,
};
use crate::base::{Locator, LocatorRef, SourcePosition, SubLocator};
use crate::parser::{Token, TokenKind, parse_number};

pub use calls::STATEMENT_CALLS;
pub use error::{BuildError, BuildResult};
pub use input::{BuildInput, Symbol, number_from_token};

// ============================================================================
// Positions
// ============================================================================

/// Something that may carry a raw source range
pub trait PositionSource {
    fn source_range(&self) -> Option<TextRange>;
}

/// A model part whose range can be recorded
pub trait Ranged: PositionSource {
    fn range_mut(&mut self) -> &mut Option<TextRange>;
}

impl PositionSource for Token {
    fn source_range(&self) -> Option<TextRange> {
        Some(self.range)
    }
}

impl PositionSource for TextRange {
    fn source_range(&self) -> Option<TextRange> {
        Some(*self)
    }
}

impl<T: PositionSource> PositionSource for Option<T> {
    fn source_range(&self) -> Option<TextRange> {
        self.as_ref().and_then(PositionSource::source_range)
    }
}

impl PositionSource for Operation {
    fn source_range(&self) -> Option<TextRange> {
        self.range()
    }
}

macro_rules! ranged {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PositionSource for $ty {
                fn source_range(&self) -> Option<TextRange> {
                    self.range
                }
            }

            impl Ranged for $ty {
                fn range_mut(&mut self) -> &mut Option<TextRange> {
                    &mut self.range
                }
            }
        )+
    };
}

ranged!(
    Expr,
    KeyedEntry,
    SelectorEntry,
    CaseOption,
    Query,
    Parameter,
    AttributeOperation,
    AttributesOperation,
    ResourceBody,
);

/// Record the range from the start of `start` to the end of `end`.
///
/// Does nothing when `target` already has a range or `start` has none. When
/// `end` has no range, or ends before `start` begins, the range of `start`
/// alone is used.
pub fn record_position<T: Ranged + ?Sized>(
    target: &mut T,
    start: &dyn PositionSource,
    end: &dyn PositionSource,
) {
    if target.range_mut().is_none() {
        restamp_position(target, start, end);
    }
}

/// Like [`record_position`], but overwrites an existing range
pub fn restamp_position<T: Ranged + ?Sized>(
    target: &mut T,
    start: &dyn PositionSource,
    end: &dyn PositionSource,
) {
    let Some(start) = start.source_range() else {
        return;
    };
    let end = end
        .source_range()
        .map(|end| end.end())
        .filter(|end| *end >= start.start())
        .unwrap_or(start.end());
    *target.range_mut() = Some(TextRange::new(start.start(), end));
}

/// [`record_position`] on an owned value
pub fn positioned<T: Ranged>(
    mut target: T,
    start: &dyn PositionSource,
    end: &dyn PositionSource,
) -> T {
    record_position(&mut target, start, end);
    target
}

// ============================================================================
// Resource shapes
// ============================================================================

/// What a resource body block means given the expression before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceShape {
    /// `name { title: ... }` creates resources
    Resource,
    /// `Name { ... }` or `Resource[name] { ... }` sets defaults
    Defaults,
    /// `Name[title] { ... }` overrides existing resources
    Override,
    /// `class { title: ... }`
    Class,
    Error,
}

/// Classify the expression in front of a resource body
pub fn resource_shape(input: &BuildInput) -> ResourceShape {
    match input {
        BuildInput::Str(word) if word == "class" => ResourceShape::Class,
        BuildInput::Token(token) => match token.kind {
            TokenKind::CLASS => ResourceShape::Class,
            TokenKind::NAME => ResourceShape::Resource,
            TokenKind::CLASSREF => ResourceShape::Defaults,
            _ => ResourceShape::Error,
        },
        BuildInput::Expr(expr) => expr_shape(expr),
        _ => ResourceShape::Error,
    }
}

fn expr_shape(expr: &Expr) -> ResourceShape {
    match &expr.kind {
        ExprKind::QualifiedName(name) if name == "class" => ResourceShape::Class,
        ExprKind::QualifiedName(_) => ResourceShape::Resource,
        ExprKind::QualifiedReference(_) => ResourceShape::Defaults,
        ExprKind::Access { left, keys } => {
            let into_resource = matches!(
                &left.kind,
                ExprKind::QualifiedReference(name) if name.eq_ignore_ascii_case("resource")
            );
            if into_resource && keys.len() == 1 {
                ResourceShape::Defaults
            } else {
                ResourceShape::Override
            }
        }
        _ => ResourceShape::Error,
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds model nodes, reporting errors against one locator.
///
/// A builder without a locator still builds; its errors then say that no
/// position is available.
#[derive(Default)]
pub struct Builder {
    locator: Option<LocatorRef>,
}

impl Builder {
    pub fn new(locator: LocatorRef) -> Self {
        Self {
            locator: Some(locator),
        }
    }

    /// A builder for synthetic nodes
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn locator(&self) -> Option<&LocatorRef> {
        self.locator.as_ref()
    }

    /// File, line and column of a range, when both it and a locator are known
    pub fn position(&self, range: Option<TextRange>) -> Option<SourcePosition> {
        let locator = self.locator.as_ref()?;
        range.map(|r| locator.position(r))
    }

    fn node(&self, kind: ExprKind) -> Expr {
        trace!(kind = kind.name(), "build");
        Expr::new(kind)
    }

    fn expr(&self, input: impl Into<BuildInput>) -> BuildResult<Expr> {
        input.into().into_expr()
    }

    fn boxed(&self, input: impl Into<BuildInput>) -> BuildResult<Box<Expr>> {
        self.expr(input).map(Box::new)
    }

    fn exprs<I>(&self, inputs: I) -> BuildResult<Vec<Expr>>
    where
        I: IntoIterator,
        I::Item: Into<BuildInput>,
    {
        inputs.into_iter().map(|i| self.expr(i)).collect()
    }

    fn optional(&self, input: impl Into<BuildInput>) -> BuildResult<Option<Box<Expr>>> {
        let input = input.into();
        if input.is_nil() {
            Ok(None)
        } else {
            self.boxed(input).map(Some)
        }
    }

    /// Wrap the finished body; definitions are indexed at any depth
    pub fn program(&self, body: impl Into<BuildInput>) -> BuildResult<Program> {
        let body = self.statements(body)?;
        let program = match &self.locator {
            Some(locator) => Program::new(body, locator.as_ref()),
            None => Program::new(body, &Locator::new("", "")),
        };
        debug!(
            source = program.source_ref(),
            definitions = program.definitions.len(),
            "program built"
        );
        Ok(program)
    }

    // ------------------------------------------------------------------------
    // Literals and names
    // ------------------------------------------------------------------------

    /// Any raw value, token or node
    pub fn literal(&self, input: impl Into<BuildInput>) -> BuildResult<Expr> {
        self.expr(input)
    }

    pub fn nop(&self) -> Expr {
        self.node(ExprKind::Nop)
    }

    pub fn literal_string(&self, text: impl Into<SmolStr>) -> Expr {
        self.node(ExprKind::LiteralString(text.into()))
    }

    /// Number text such as `010`, `0x1F` or `1.5e3`
    pub fn number(&self, text: &str) -> BuildResult<Expr> {
        let number = parse_number(text).map_err(|code| BuildError::Number {
            code,
            text: SmolStr::new(text),
            position: None,
        })?;
        Ok(self.node(input::number_kind(number)))
    }

    pub fn name(&self, name: impl Into<SmolStr>) -> Expr {
        self.node(ExprKind::QualifiedName(name.into()))
    }

    /// A number when the text is one, a name otherwise
    pub fn name_or_number(&self, text: &str) -> Expr {
        match parse_number(text) {
            Ok(number) => self.node(input::number_kind(number)),
            Err(_) => self.name(text),
        }
    }

    /// A qualified name, unless the input already is one
    pub fn fqn(&self, input: impl Into<BuildInput>) -> BuildResult<Expr> {
        match input.into() {
            BuildInput::Str(name) => Ok(self.name(name)),
            other => other.into_expr(),
        }
    }

    /// A qualified reference, unless the input already is one
    pub fn fqr(&self, input: impl Into<BuildInput>) -> BuildResult<Expr> {
        match input.into() {
            BuildInput::Str(name) => Ok(self.node(ExprKind::QualifiedReference(name))),
            BuildInput::Expr(Expr {
                kind: ExprKind::QualifiedName(name),
                range,
            }) => Ok(Expr {
                kind: ExprKind::QualifiedReference(name),
                range,
            }),
            other => other.into_expr(),
        }
    }

    pub fn reserved_word(&self, word: impl Into<SmolStr>, future: bool) -> Expr {
        self.node(ExprKind::ReservedWord {
            word: word.into(),
            future,
        })
    }

    /// `$name`; a plain string becomes the variable's name
    pub fn var(&self, input: impl Into<BuildInput>) -> BuildResult<Expr> {
        let name = self.fqn(input)?;
        Ok(self.node(ExprKind::Variable(name.boxed())))
    }

    pub fn list(&self, values: impl Into<BuildInput>) -> BuildResult<Expr> {
        match values.into() {
            BuildInput::List(values) => Ok(self.node(ExprKind::LiteralList(self.exprs(values)?))),
            BuildInput::Nil => Ok(self.node(ExprKind::LiteralList(Vec::new()))),
            single => Ok(self.node(ExprKind::LiteralList(vec![single.into_expr()?]))),
        }
    }

    pub fn key_entry(
        &self,
        key: impl Into<BuildInput>,
        value: impl Into<BuildInput>,
    ) -> BuildResult<KeyedEntry> {
        Ok(KeyedEntry {
            key: self.expr(key)?,
            value: self.expr(value)?,
            range: None,
        })
    }

    pub fn hash(&self, entries: Vec<KeyedEntry>) -> Expr {
        self.node(ExprKind::LiteralHash(entries))
    }

    // ------------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------------

    /// A statement sequence.
    ///
    /// Lists and maps become a block, an absent value becomes `Nop` and a single
    /// statement is used as is.
    pub fn statements(&self, input: impl Into<BuildInput>) -> BuildResult<Expr> {
        match input.into() {
            BuildInput::List(statements) => self.block(statements),
            map @ BuildInput::Map(_) => Ok(self.node(ExprKind::Block(vec![map.into_expr()?]))),
            other => other.into_expr(),
        }
    }

    /// A body that may be absent
    pub fn body(&self, input: impl Into<BuildInput>) -> BuildResult<Option<Box<Expr>>> {
        let input = input.into();
        if matches!(input, BuildInput::Nil) {
            Ok(None)
        } else {
            self.statements(input).map(|e| Some(Box::new(e)))
        }
    }

    pub fn block<I>(&self, statements: I) -> BuildResult<Expr>
    where
        I: IntoIterator,
        I::Item: Into<BuildInput>,
    {
        Ok(self.node(ExprKind::Block(self.exprs(statements)?)))
    }

    /// A block for several statements, the statement itself for one
    pub fn block_or_expression(&self, mut statements: Vec<Expr>) -> Expr {
        match statements.len() {
            0 => self.nop(),
            1 => statements.remove(0),
            _ => self.node(ExprKind::Block(statements)),
        }
    }

    // ------------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------------

    pub fn arithmetic(
        &self,
        op: ArithmeticOp,
        left: impl Into<BuildInput>,
        right: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Arithmetic {
            op,
            left: self.boxed(left)?,
            right: self.boxed(right)?,
        }))
    }

    pub fn comparison(
        &self,
        op: ComparisonOp,
        left: impl Into<BuildInput>,
        right: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Comparison {
            op,
            left: self.boxed(left)?,
            right: self.boxed(right)?,
        }))
    }

    pub fn matches(
        &self,
        op: MatchOp,
        left: impl Into<BuildInput>,
        right: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Match {
            op,
            left: self.boxed(left)?,
            right: self.boxed(right)?,
        }))
    }

    pub fn relationship(
        &self,
        op: RelationshipOp,
        left: impl Into<BuildInput>,
        right: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Relationship {
            op,
            left: self.boxed(left)?,
            right: self.boxed(right)?,
        }))
    }

    /// `left = right`, `left += right` or `left -= right`.
    ///
    /// Only variables, access expressions and lists can be assigned to.
    pub fn assign(
        &self,
        op: AssignmentOp,
        left: impl Into<BuildInput>,
        right: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        let left = self.expr(left)?;
        if !matches!(
            left.kind,
            ExprKind::Variable(_) | ExprKind::Access { .. } | ExprKind::LiteralList(_)
        ) {
            return Err(BuildError::IllegalAssignment {
                kind: left.kind_name(),
                position: self.position(left.range),
            });
        }
        Ok(self.node(ExprKind::Assignment {
            op,
            left: left.boxed(),
            right: self.boxed(right)?,
        }))
    }

    pub fn in_op(
        &self,
        left: impl Into<BuildInput>,
        right: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::In {
            left: self.boxed(left)?,
            right: self.boxed(right)?,
        }))
    }

    pub fn and(
        &self,
        left: impl Into<BuildInput>,
        right: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::And {
            left: self.boxed(left)?,
            right: self.boxed(right)?,
        }))
    }

    pub fn or(
        &self,
        left: impl Into<BuildInput>,
        right: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Or {
            left: self.boxed(left)?,
            right: self.boxed(right)?,
        }))
    }

    pub fn not(&self, expr: impl Into<BuildInput>) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Not(self.boxed(expr)?)))
    }

    pub fn minus(&self, expr: impl Into<BuildInput>) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::UnaryMinus(self.boxed(expr)?)))
    }

    pub fn unfold(&self, expr: impl Into<BuildInput>) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Unfold(self.boxed(expr)?)))
    }

    pub fn paren(&self, expr: impl Into<BuildInput>) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Parenthesized(self.boxed(expr)?)))
    }

    /// `left[keys...]`
    pub fn access<I>(&self, left: impl Into<BuildInput>, keys: I) -> BuildResult<Expr>
    where
        I: IntoIterator,
        I::Item: Into<BuildInput>,
    {
        Ok(self.node(ExprKind::Access {
            left: self.boxed(left)?,
            keys: self.exprs(keys)?,
        }))
    }

    /// `left.right`
    pub fn dot(
        &self,
        left: impl Into<BuildInput>,
        right: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::NamedAccess {
            left: self.boxed(left)?,
            right: self.boxed(right)?,
        }))
    }

    // ------------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------------

    pub fn if_expr(
        &self,
        test: impl Into<BuildInput>,
        then_expr: impl Into<BuildInput>,
        else_expr: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::If {
            test: self.boxed(test)?,
            then_expr: self.statements(then_expr)?.boxed(),
            else_expr: self.statements(else_expr)?.boxed(),
        }))
    }

    pub fn unless_expr(
        &self,
        test: impl Into<BuildInput>,
        then_expr: impl Into<BuildInput>,
        else_expr: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Unless {
            test: self.boxed(test)?,
            then_expr: self.statements(then_expr)?.boxed(),
            else_expr: self.statements(else_expr)?.boxed(),
        }))
    }

    pub fn case_expr(
        &self,
        test: impl Into<BuildInput>,
        options: Vec<CaseOption>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Case {
            test: self.boxed(test)?,
            options,
        }))
    }

    /// `values: { body }`; a single value is accepted in place of a list
    pub fn when_expr(
        &self,
        values: impl Into<BuildInput>,
        body: impl Into<BuildInput>,
    ) -> BuildResult<CaseOption> {
        let values = match values.into() {
            BuildInput::List(values) => self.exprs(values)?,
            single => vec![single.into_expr()?],
        };
        Ok(CaseOption {
            values,
            body: self.statements(body)?,
            range: None,
        })
    }

    pub fn selector(
        &self,
        left: impl Into<BuildInput>,
        selectors: Vec<SelectorEntry>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Selector {
            left: self.boxed(left)?,
            selectors,
        }))
    }

    /// `matching => value` inside a selector
    pub fn map_entry(
        &self,
        matching: impl Into<BuildInput>,
        value: impl Into<BuildInput>,
    ) -> BuildResult<SelectorEntry> {
        Ok(SelectorEntry {
            matching: self.expr(matching)?,
            value: self.expr(value)?,
            range: None,
        })
    }

    // ------------------------------------------------------------------------
    // Strings and templates
    // ------------------------------------------------------------------------

    /// Concatenation of string fragments and interpolated text
    pub fn string<I>(&self, segments: I) -> BuildResult<Expr>
    where
        I: IntoIterator,
        I::Item: Into<BuildInput>,
    {
        Ok(self.node(ExprKind::ConcatenatedString(self.exprs(segments)?)))
    }

    pub fn heredoc(&self, text: impl Into<BuildInput>, syntax: Option<&str>) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Heredoc {
            syntax: syntax.filter(|s| !s.is_empty()).map(SmolStr::new),
            text: self.boxed(text)?,
        }))
    }

    /// Tie an expression lexed from a here-doc body to the body's locator
    pub fn sublocate(&self, expr: impl Into<BuildInput>, locator: Rc<SubLocator>) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::SubLocated(SubLocatedExpr {
            expr: self.boxed(expr)?,
            locator,
        })))
    }

    /// A template: a lambda whose body renders.
    ///
    /// `parameters` is `None` when the template declares no parameter list.
    pub fn epp(
        &self,
        parameters: Option<Vec<Parameter>>,
        body: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        let parameters_specified = parameters.is_some();
        let epp = self.node(ExprKind::Epp {
            parameters_specified,
            body: self.body(body)?,
        });
        Ok(self.node(ExprKind::Lambda(LambdaExpr {
            parameters: parameters.unwrap_or_default(),
            body: Some(epp.boxed()),
            return_type: None,
        })))
    }

    pub fn render_string(&self, text: impl Into<SmolStr>) -> Expr {
        self.node(ExprKind::RenderString(text.into()))
    }

    /// `<%= expr %>`
    pub fn render_expr(&self, expr: impl Into<BuildInput>) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Render(self.boxed(expr)?)))
    }

    // ------------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------------

    pub fn resource(
        &self,
        form: ResourceForm,
        type_name: impl Into<BuildInput>,
        bodies: Vec<ResourceBody>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Resource {
            form,
            type_name: self.boxed(type_name)?,
            bodies,
        }))
    }

    pub fn resource_body(
        &self,
        title: impl Into<BuildInput>,
        operations: Vec<Operation>,
    ) -> BuildResult<ResourceBody> {
        let title = self.optional(title)?.map(|t| *t);
        Ok(ResourceBody {
            title,
            operations,
            range: None,
        })
    }

    pub fn resource_defaults(
        &self,
        form: ResourceForm,
        type_ref: impl Into<BuildInput>,
        operations: Vec<Operation>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::ResourceDefaults {
            form,
            type_ref: self.boxed(type_ref)?,
            operations,
        }))
    }

    pub fn resource_override(
        &self,
        form: ResourceForm,
        resources: impl Into<BuildInput>,
        operations: Vec<Operation>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::ResourceOverride {
            form,
            resources: self.boxed(resources)?,
            operations,
        }))
    }

    /// Mark a resource construct built earlier as virtual or exported
    pub fn set_form(&self, expr: &mut Expr, new_form: ResourceForm) {
        if let ExprKind::Resource { form, .. }
        | ExprKind::ResourceDefaults { form, .. }
        | ExprKind::ResourceOverride { form, .. } = &mut expr.kind
        {
            *form = new_form;
        }
    }

    /// `Type <| query |> { operations }`; a plain string names the type
    pub fn collect(
        &self,
        type_expr: impl Into<BuildInput>,
        query: Query,
        operations: Vec<Operation>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Collect {
            type_expr: self.fqr(type_expr)?.boxed(),
            query,
            operations,
        }))
    }

    /// `<<| expr |>>`; an absent or `Nop` expression collects everything
    pub fn exported_query(&self, expr: impl Into<BuildInput>) -> BuildResult<Query> {
        self.query(QueryKind::Exported, expr)
    }

    /// `<| expr |>`
    pub fn virtual_query(&self, expr: impl Into<BuildInput>) -> BuildResult<Query> {
        self.query(QueryKind::Virtual, expr)
    }

    fn query(&self, kind: QueryKind, expr: impl Into<BuildInput>) -> BuildResult<Query> {
        Ok(Query {
            kind,
            expr: self.optional(expr)?,
            range: None,
        })
    }

    /// `name => value` or `name +> value`
    pub fn attribute_op(
        &self,
        name: impl Into<SmolStr>,
        op: AttributeOp,
        value: impl Into<BuildInput>,
    ) -> BuildResult<Operation> {
        Ok(Operation::Attribute(AttributeOperation {
            name: name.into(),
            op,
            value: self.expr(value)?,
            range: None,
        }))
    }

    /// `* => expr`
    pub fn attributes_op(&self, expr: impl Into<BuildInput>) -> BuildResult<Operation> {
        Ok(Operation::Attributes(AttributesOperation {
            expr: self.expr(expr)?,
            range: None,
        }))
    }
}
