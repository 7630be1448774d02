//! The legacy tree: the looser node shapes consumed by the older evaluator.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::model::{ArithmeticOp, ComparisonOp, MatchOp, RelationshipOp};

/// File, line and column copied from the model node a legacy node came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegacyLocation {
    pub file: Arc<str>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyNode {
    pub kind: LegacyKind,
    pub location: Option<LegacyLocation>,
}

impl LegacyNode {
    pub fn new(kind: LegacyKind) -> Self {
        Self {
            kind,
            location: None,
        }
    }

    pub fn nop() -> Self {
        Self::new(LegacyKind::Nop)
    }

    pub fn boxed(self) -> Box<LegacyNode> {
        Box::new(self)
    }

    pub fn is_nop(&self) -> bool {
        matches!(self.kind, LegacyKind::Nop)
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// `and` / `or` of a boolean operator node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    And,
    Or,
}

impl BooleanOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOp::And => "and",
            BooleanOp::Or => "or",
        }
    }
}

/// Whether a function call is used for its value or as a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionType {
    Rvalue,
    Statement,
}

/// `<| |>` or `<<| |>>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionForm {
    Virtual,
    Exported,
}

/// `[name]` or `[name, default]` of a definition or lambda
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyParam {
    pub name: SmolStr,
    pub value: Option<LegacyNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyHashEntry {
    pub key: LegacyNode,
    pub value: LegacyNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegacyKind {
    Name(SmolStr),
    Type(SmolStr),
    String(SmolStr),
    Concat(Vec<LegacyNode>),
    Boolean(bool),
    Undef,
    Default,
    Regex(SmolStr),
    Variable(SmolStr),
    /// `$x[key]`; `variable` is a `Variable` or another access
    HashOrArrayAccess { variable: Box<LegacyNode>, key: Box<LegacyNode> },
    ResourceReference { type_name: SmolStr, title: Box<LegacyNode> },
    Minus(Box<LegacyNode>),
    Not(Box<LegacyNode>),
    Arithmetic { operator: ArithmeticOp, lval: Box<LegacyNode>, rval: Box<LegacyNode> },
    Comparison { operator: ComparisonOp, lval: Box<LegacyNode>, rval: Box<LegacyNode> },
    Match { operator: MatchOp, lval: Box<LegacyNode>, rval: Box<LegacyNode> },
    In { lval: Box<LegacyNode>, rval: Box<LegacyNode> },
    BooleanOp { operator: BooleanOp, lval: Box<LegacyNode>, rval: Box<LegacyNode> },
    Relationship { operator: RelationshipOp, lval: Box<LegacyNode>, rval: Box<LegacyNode> },
    /// `name = value` or `name += value`; `name` is a `Name` or a `HashOrArrayAccess`
    VarDef { name: Box<LegacyNode>, value: Box<LegacyNode>, appends: bool },
    ResourceParam { param: Box<LegacyNode>, value: Box<LegacyNode>, add: bool },
    Array(Vec<LegacyNode>),
    Hash(Vec<LegacyHashEntry>),
    If { test: Box<LegacyNode>, statements: Box<LegacyNode>, else_branch: Option<Box<LegacyNode>> },
    Case { test: Box<LegacyNode>, options: Vec<LegacyNode> },
    CaseOpt { values: Vec<LegacyNode>, statements: Box<LegacyNode> },
    Selector { param: Box<LegacyNode>, values: Vec<LegacyNode> },
    Function {
        name: SmolStr,
        arguments: Vec<LegacyNode>,
        ftype: FunctionType,
        lambda: Option<Box<LegacyNode>>,
    },
    MethodCall {
        receiver: Box<LegacyNode>,
        name: SmolStr,
        arguments: Vec<LegacyNode>,
        lambda: Option<Box<LegacyNode>>,
    },
    Lambda { parameters: Vec<LegacyParam>, children: Box<LegacyNode> },
    Hostclass {
        name: SmolStr,
        arguments: Vec<LegacyParam>,
        parent: Option<SmolStr>,
        code: Box<LegacyNode>,
    },
    Definition { name: SmolStr, arguments: Vec<LegacyParam>, code: Box<LegacyNode> },
    Node { names: Vec<LegacyNode>, parent: Option<Box<LegacyNode>>, code: Box<LegacyNode> },
    /// A node name; `regex` when it came from a regular expression
    HostName { value: SmolStr, regex: bool },
    Collection {
        type_name: SmolStr,
        form: CollectionForm,
        query: Option<Box<LegacyNode>>,
        overrides: Vec<LegacyNode>,
    },
    CollExpr { test1: Box<LegacyNode>, oper: SmolStr, test2: Box<LegacyNode>, parens: bool },
    Block(Vec<LegacyNode>),
    Nop,
}

impl LegacyKind {
    pub fn name(&self) -> &'static str {
        use LegacyKind::*;
        match self {
            Name(_) => "Name",
            Type(_) => "Type",
            String(_) => "String",
            Concat(_) => "Concat",
            Boolean(_) => "Boolean",
            Undef => "Undef",
            Default => "Default",
            Regex(_) => "Regex",
            Variable(_) => "Variable",
            HashOrArrayAccess { .. } => "HashOrArrayAccess",
            ResourceReference { .. } => "ResourceReference",
            Minus(_) => "Minus",
            Not(_) => "Not",
            Arithmetic { .. } => "Arithmetic",
            Comparison { .. } => "Comparison",
            Match { .. } => "Match",
            In { .. } => "In",
            BooleanOp { .. } => "BooleanOp",
            Relationship { .. } => "Relationship",
            VarDef { .. } => "VarDef",
            ResourceParam { .. } => "ResourceParam",
            Array(_) => "Array",
            Hash(_) => "Hash",
            If { .. } => "If",
            Case { .. } => "Case",
            CaseOpt { .. } => "CaseOpt",
            Selector { .. } => "Selector",
            Function { .. } => "Function",
            MethodCall { .. } => "MethodCall",
            Lambda { .. } => "Lambda",
            Hostclass { .. } => "Hostclass",
            Definition { .. } => "Definition",
            Node { .. } => "Node",
            HostName { .. } => "HostName",
            Collection { .. } => "Collection",
            CollExpr { .. } => "CollExpr",
            Block(_) => "Block",
            Nop => "Nop",
        }
    }
}
