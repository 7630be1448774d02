//! The root of a parsed unit.
//!
//! A `Program` keeps the source text, its name and the line index so that
//! positions can be resolved long after the lexer and its locator are gone.

use std::cell::OnceCell;
use std::rc::Rc;
use std::sync::Arc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::{Expr, ExprKind, ExprVisitor, walk_expr};
use crate::base::{Locate, Locator, SourcePosition};

/// What kind of definition a [`DefinitionRef`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Class,
    ResourceType,
    Function,
    Node,
    Site,
    Application,
    TypeAlias,
    TypeMapping,
    TypeDefinition,
    CapabilityMapping,
}

/// A non-owning entry in the definition index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionRef {
    pub kind: DefinitionKind,
    pub name: SmolStr,
    pub range: Option<TextRange>,
}

impl DefinitionRef {
    /// The index entry for a definition node; `None` for other expressions
    pub fn of(expr: &Expr) -> Option<Self> {
        let (kind, name): (DefinitionKind, SmolStr) = match &expr.kind {
            ExprKind::HostClassDefinition { definition, .. } => {
                (DefinitionKind::Class, definition.name.clone())
            }
            ExprKind::ResourceTypeDefinition(definition) => {
                (DefinitionKind::ResourceType, definition.name.clone())
            }
            ExprKind::FunctionDefinition { definition, .. } => {
                (DefinitionKind::Function, definition.name.clone())
            }
            ExprKind::Application(definition) => {
                (DefinitionKind::Application, definition.name.clone())
            }
            ExprKind::NodeDefinition { host_matches, .. } => {
                let hosts = host_matches
                    .iter()
                    .map(|m| m.name_text().unwrap_or(m.kind_name()))
                    .collect::<Vec<_>>()
                    .join(",");
                (DefinitionKind::Node, hosts.into())
            }
            ExprKind::SiteDefinition { .. } => (DefinitionKind::Site, SmolStr::new_static("site")),
            ExprKind::TypeAlias { name, .. } => (DefinitionKind::TypeAlias, name.clone()),
            ExprKind::TypeDefinition { name, .. } => (DefinitionKind::TypeDefinition, name.clone()),
            ExprKind::TypeMapping { type_expr, .. } => (
                DefinitionKind::TypeMapping,
                type_expr.name_text().unwrap_or_default().into(),
            ),
            ExprKind::CapabilityMapping { capability, .. } => {
                (DefinitionKind::CapabilityMapping, capability.clone())
            }
            _ => return None,
        };
        Some(Self {
            kind,
            name,
            range: expr.range,
        })
    }
}

/// Collects definition entries at any depth
#[derive(Default)]
struct DefinitionCollector(Vec<DefinitionRef>);

impl<'a> ExprVisitor<'a> for DefinitionCollector {
    fn visit_expr(&mut self, expr: &'a Expr) {
        if let Some(definition) = DefinitionRef::of(expr) {
            self.0.push(definition);
        }
        walk_expr(self, expr);
    }
}

/// A finished unit: body, definition index and everything needed to rebuild its locator
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Expr,
    pub definitions: Vec<DefinitionRef>,
    source_text: Arc<str>,
    source_ref: Arc<str>,
    line_offsets: Arc<[TextSize]>,
    locator: OnceCell<Rc<Locator>>,
}

impl Program {
    /// Wrap a body, indexing its definitions and sharing the locator's source data
    pub fn new(body: Expr, locator: &dyn Locate) -> Self {
        let mut collector = DefinitionCollector::default();
        collector.visit_expr(&body);
        let base = locator.base();
        Self::from_parts(
            body,
            collector.0,
            Arc::clone(base.source_arc()),
            Arc::clone(base.file()),
            Arc::clone(base.line_index_arc()),
        )
    }

    pub fn from_parts(
        body: Expr,
        definitions: Vec<DefinitionRef>,
        source_text: Arc<str>,
        source_ref: Arc<str>,
        line_offsets: Arc<[TextSize]>,
    ) -> Self {
        Self {
            body,
            definitions,
            source_text,
            source_ref,
            line_offsets,
            locator: OnceCell::new(),
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Name of the source, usually a file path
    pub fn source_ref(&self) -> &str {
        &self.source_ref
    }

    pub fn line_offsets(&self) -> &[TextSize] {
        &self.line_offsets
    }

    /// The locator for this program's source, built on first use
    pub fn locator(&self) -> Rc<Locator> {
        Rc::clone(self.locator.get_or_init(|| {
            Rc::new(Locator::from_parts(
                Arc::clone(&self.source_text),
                Arc::clone(&self.source_ref),
                Arc::clone(&self.line_offsets),
            ))
        }))
    }

    /// Position of a node of this program
    pub fn position_of(&self, expr: &Expr) -> Option<SourcePosition> {
        expr.position(self.locator().as_ref())
    }

    /// Find a definition by name through the index
    pub fn find_definition(&self, name: &str) -> Option<&Expr> {
        let entry = self
            .definitions
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))?;
        let mut finder = DefinitionFinder {
            entry,
            found: None,
        };
        finder.visit_expr(&self.body);
        finder.found
    }
}

struct DefinitionFinder<'a, 'e> {
    entry: &'e DefinitionRef,
    found: Option<&'a Expr>,
}

impl<'a> ExprVisitor<'a> for DefinitionFinder<'a, '_> {
    fn visit_expr(&mut self, expr: &'a Expr) {
        if self.found.is_some() {
            return;
        }
        if DefinitionRef::of(expr).as_ref() == Some(self.entry) {
            self.found = Some(expr);
            return;
        }
        walk_expr(self, expr);
    }
}
