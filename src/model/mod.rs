//! Structural model: the typed tree built from tokens.
//!
//! Every node is an [`Expr`]: a [`ExprKind`] variant plus an optional raw
//! source range. The range is `None` for synthetic nodes; line and column are
//! derived on demand through a locator (see [`Program::locator`]).
//!
//! Children are owned (`Box<Expr>` / `Vec<Expr>`), so the tree is strictly
//! single-rooted and acyclic. Parts that are positioned but are not
//! expressions on their own (hash entries, case options, parameters,
//! attribute operations, resource bodies) are separate structs.

pub mod builder;
mod ops;
mod program;
mod visit;

use std::rc::Rc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::base::{Locate, SourcePosition, SubLocator};
use crate::parser::Radix;

pub use ops::{ArithmeticOp, AssignmentOp, AttributeOp, ComparisonOp, MatchOp, RelationshipOp};
pub use program::{DefinitionKind, DefinitionRef, Program};
pub use visit::{ExprVisitor, walk_expr};

// ============================================================================
// Expressions
// ============================================================================

/// A node of the structural model
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub range: Option<TextRange>,
}

/// The closed set of model variants
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Nop,

    // ------------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------------
    Arithmetic { op: ArithmeticOp, left: Box<Expr>, right: Box<Expr> },
    Assignment { op: AssignmentOp, left: Box<Expr>, right: Box<Expr> },
    Relationship { op: RelationshipOp, left: Box<Expr>, right: Box<Expr> },
    Comparison { op: ComparisonOp, left: Box<Expr>, right: Box<Expr> },
    Match { op: MatchOp, left: Box<Expr>, right: Box<Expr> },
    In { left: Box<Expr>, right: Box<Expr> },
    And { left: Box<Expr>, right: Box<Expr> },
    Or { left: Box<Expr>, right: Box<Expr> },
    /// `left[keys...]`
    Access { left: Box<Expr>, keys: Vec<Expr> },
    /// `left.right`
    NamedAccess { left: Box<Expr>, right: Box<Expr> },
    Not(Box<Expr>),
    UnaryMinus(Box<Expr>),
    /// `*expr`
    Unfold(Box<Expr>),
    Parenthesized(Box<Expr>),

    // ------------------------------------------------------------------------
    // Strings and variables
    // ------------------------------------------------------------------------
    /// An interpolated expression inside a string
    Text(Box<Expr>),
    /// `$name`; the inner expression is usually a `QualifiedName`
    Variable(Box<Expr>),
    ConcatenatedString(Vec<Expr>),
    Heredoc { syntax: Option<SmolStr>, text: Box<Expr> },
    /// An expression whose positions refer to a here-doc body
    SubLocated(SubLocatedExpr),

    // ------------------------------------------------------------------------
    // Collections and blocks
    // ------------------------------------------------------------------------
    LiteralList(Vec<Expr>),
    LiteralHash(Vec<KeyedEntry>),
    Block(Vec<Expr>),

    // ------------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------------
    If { test: Box<Expr>, then_expr: Box<Expr>, else_expr: Box<Expr> },
    Unless { test: Box<Expr>, then_expr: Box<Expr>, else_expr: Box<Expr> },
    Case { test: Box<Expr>, options: Vec<CaseOption> },
    Selector { left: Box<Expr>, selectors: Vec<SelectorEntry> },

    // ------------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------------
    CallFunction(Call),
    CallNamedFunction(Call),
    CallMethod(Call),
    Lambda(LambdaExpr),

    // ------------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------------
    FunctionDefinition { definition: NamedDefinition, return_type: Option<Box<Expr>> },
    ResourceTypeDefinition(NamedDefinition),
    Application(NamedDefinition),
    HostClassDefinition { definition: NamedDefinition, parent_class: Option<SmolStr> },
    TypeAlias { name: SmolStr, type_expr: Box<Expr> },
    TypeMapping { type_expr: Box<Expr>, mapping_expr: Box<Expr> },
    TypeDefinition { name: SmolStr, parent: Option<SmolStr>, body: Option<Box<Expr>> },
    NodeDefinition { host_matches: Vec<Expr>, parent: Option<Box<Expr>>, body: Option<Box<Expr>> },
    SiteDefinition { body: Option<Box<Expr>> },
    /// `Component produces|consumes Capability { mappings }`
    CapabilityMapping {
        kind: SmolStr,
        component: Box<Expr>,
        capability: SmolStr,
        mappings: Vec<Operation>,
    },

    // ------------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------------
    Resource { form: ResourceForm, type_name: Box<Expr>, bodies: Vec<ResourceBody> },
    ResourceDefaults { form: ResourceForm, type_ref: Box<Expr>, operations: Vec<Operation> },
    ResourceOverride { form: ResourceForm, resources: Box<Expr>, operations: Vec<Operation> },
    /// `Type <| query |> { operations }`
    Collect { type_expr: Box<Expr>, query: Query, operations: Vec<Operation> },

    // ------------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------------
    Epp { parameters_specified: bool, body: Option<Box<Expr>> },
    RenderString(SmolStr),
    Render(Box<Expr>),

    // ------------------------------------------------------------------------
    // Literals and names
    // ------------------------------------------------------------------------
    LiteralString(SmolStr),
    LiteralInteger { value: i64, radix: Radix },
    LiteralFloat(f64),
    LiteralBoolean(bool),
    LiteralRegex(SmolStr),
    LiteralUndef,
    LiteralDefault,
    QualifiedName(SmolStr),
    /// A capitalized type reference as written; compare through its lowercase form
    QualifiedReference(SmolStr),
    ReservedWord { word: SmolStr, future: bool },
}

impl Expr {
    /// An unpositioned node
    pub fn new(kind: ExprKind) -> Self {
        Self { kind, range: None }
    }

    pub fn with_range(kind: ExprKind, range: TextRange) -> Self {
        Self {
            kind,
            range: Some(range),
        }
    }

    pub fn nop() -> Self {
        Self::new(ExprKind::Nop)
    }

    pub fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }

    pub fn is_positioned(&self) -> bool {
        self.range.is_some()
    }

    pub fn offset(&self) -> Option<TextSize> {
        self.range.map(|r| r.start())
    }

    pub fn length(&self) -> Option<TextSize> {
        self.range.map(|r| r.len())
    }

    /// File, line and column through `locator`; `None` for synthetic nodes
    pub fn position(&self, locator: &dyn Locate) -> Option<SourcePosition> {
        self.range.map(|r| locator.position(r))
    }

    /// The variant name, e.g. `"LiteralString"`
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// The text of a name-like node (`QualifiedName`, `QualifiedReference`, `LiteralString`, `ReservedWord`)
    pub fn name_text(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::QualifiedName(name)
            | ExprKind::QualifiedReference(name)
            | ExprKind::LiteralString(name)
            | ExprKind::ReservedWord { word: name, .. } => Some(name),
            _ => None,
        }
    }

    /// Lowercase value of a qualified reference; `Foo::Bar` is `foo::bar`
    pub fn reference_value(&self) -> Option<String> {
        match &self.kind {
            ExprKind::QualifiedReference(name) => Some(name.to_lowercase()),
            _ => None,
        }
    }

    /// The owned child expressions in source order
    pub fn children(&self) -> Vec<&Expr> {
        let mut collector = ChildCollector(Vec::new());
        walk_expr(&mut collector, self);
        collector.0
    }
}

struct ChildCollector<'a>(Vec<&'a Expr>);

impl<'a> ExprVisitor<'a> for ChildCollector<'a> {
    fn visit_expr(&mut self, expr: &'a Expr) {
        self.0.push(expr);
    }
}

impl ExprKind {
    /// The variant name
    pub fn name(&self) -> &'static str {
        use ExprKind::*;
        match self {
            Nop => "Nop",
            Arithmetic { .. } => "Arithmetic",
            Assignment { .. } => "Assignment",
            Relationship { .. } => "Relationship",
            Comparison { .. } => "Comparison",
            Match { .. } => "Match",
            In { .. } => "In",
            And { .. } => "And",
            Or { .. } => "Or",
            Access { .. } => "Access",
            NamedAccess { .. } => "NamedAccess",
            Not(_) => "Not",
            UnaryMinus(_) => "UnaryMinus",
            Unfold(_) => "Unfold",
            Parenthesized(_) => "Parenthesized",
            Text(_) => "Text",
            Variable(_) => "Variable",
            ConcatenatedString(_) => "ConcatenatedString",
            Heredoc { .. } => "Heredoc",
            SubLocated(_) => "SubLocated",
            LiteralList(_) => "LiteralList",
            LiteralHash(_) => "LiteralHash",
            Block(_) => "Block",
            If { .. } => "If",
            Unless { .. } => "Unless",
            Case { .. } => "Case",
            Selector { .. } => "Selector",
            CallFunction(_) => "CallFunction",
            CallNamedFunction(_) => "CallNamedFunction",
            CallMethod(_) => "CallMethod",
            Lambda(_) => "Lambda",
            FunctionDefinition { .. } => "FunctionDefinition",
            ResourceTypeDefinition(_) => "ResourceTypeDefinition",
            Application(_) => "Application",
            HostClassDefinition { .. } => "HostClassDefinition",
            TypeAlias { .. } => "TypeAlias",
            TypeMapping { .. } => "TypeMapping",
            TypeDefinition { .. } => "TypeDefinition",
            NodeDefinition { .. } => "NodeDefinition",
            SiteDefinition { .. } => "SiteDefinition",
            CapabilityMapping { .. } => "CapabilityMapping",
            Resource { .. } => "Resource",
            ResourceDefaults { .. } => "ResourceDefaults",
            ResourceOverride { .. } => "ResourceOverride",
            Collect { .. } => "Collect",
            Epp { .. } => "Epp",
            RenderString(_) => "RenderString",
            Render(_) => "Render",
            LiteralString(_) => "LiteralString",
            LiteralInteger { .. } => "LiteralInteger",
            LiteralFloat(_) => "LiteralFloat",
            LiteralBoolean(_) => "LiteralBoolean",
            LiteralRegex(_) => "LiteralRegex",
            LiteralUndef => "LiteralUndef",
            LiteralDefault => "LiteralDefault",
            QualifiedName(_) => "QualifiedName",
            QualifiedReference(_) => "QualifiedReference",
            ReservedWord { .. } => "ReservedWord",
        }
    }
}

// ============================================================================
// Positioned parts
// ============================================================================

/// `key => value` in a hash literal
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedEntry {
    pub key: Expr,
    pub value: Expr,
    pub range: Option<TextRange>,
}

/// `matching => value` in a selector
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorEntry {
    pub matching: Expr,
    pub value: Expr,
    pub range: Option<TextRange>,
}

/// `values: { body }` in a case expression
#[derive(Debug, Clone, PartialEq)]
pub struct CaseOption {
    pub values: Vec<Expr>,
    pub body: Expr,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// `<<| |>>`
    Exported,
    /// `<| |>`
    Virtual,
}

/// The query part of a collect expression
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub kind: QueryKind,
    pub expr: Option<Box<Expr>>,
    pub range: Option<TextRange>,
}

/// A parameter of a definition or lambda
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: SmolStr,
    pub value: Option<Expr>,
    pub type_expr: Option<Expr>,
    pub captures_rest: bool,
    pub range: Option<TextRange>,
}

/// `name => value` or `name +> value`
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeOperation {
    pub name: SmolStr,
    pub op: AttributeOp,
    pub value: Expr,
    pub range: Option<TextRange>,
}

/// `* => hash`
#[derive(Debug, Clone, PartialEq)]
pub struct AttributesOperation {
    pub expr: Expr,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Attribute(AttributeOperation),
    Attributes(AttributesOperation),
}

impl Operation {
    pub fn range(&self) -> Option<TextRange> {
        match self {
            Operation::Attribute(op) => op.range,
            Operation::Attributes(op) => op.range,
        }
    }
}

/// `title: operations` of a resource expression
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceBody {
    pub title: Option<Expr>,
    pub operations: Vec<Operation>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceForm {
    #[default]
    Regular,
    /// `@type { ... }`
    Virtual,
    /// `@@type { ... }`
    Exported,
}

impl ResourceForm {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceForm::Regular => "regular",
            ResourceForm::Virtual => "virtual",
            ResourceForm::Exported => "exported",
        }
    }
}

// ============================================================================
// Shared variant payloads
// ============================================================================

/// A call; `rval_required` tells whether the result is used as a value
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub rval_required: bool,
    pub functor: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub lambda: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub parameters: Vec<Parameter>,
    pub body: Option<Box<Expr>>,
    pub return_type: Option<Box<Expr>>,
}

/// Name, parameters and body shared by classes, defined types, functions and applications
#[derive(Debug, Clone, PartialEq)]
pub struct NamedDefinition {
    pub name: SmolStr,
    pub parameters: Vec<Parameter>,
    pub body: Option<Box<Expr>>,
}

/// An expression lexed from a here-doc body, with the locator for its positions
#[derive(Debug, Clone)]
pub struct SubLocatedExpr {
    pub expr: Box<Expr>,
    pub locator: Rc<SubLocator>,
}

impl PartialEq for SubLocatedExpr {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
            && (Rc::ptr_eq(&self.locator, &other.locator)
                || (self.locator.source() == other.locator.source()
                    && self.locator.leading_offset() == other.locator.leading_offset()))
    }
}

#[cfg(test)]
mod tests;
