//! Definitions: classes, defined types, functions, nodes, types and applications.

use smol_str::SmolStr;

use super::{BuildInput, BuildResult, Builder};
use crate::model::{Expr, ExprKind, NamedDefinition, Operation, Parameter};

impl Builder {
    /// A parameter; `value` is the default, `type_expr` the declared type
    pub fn param(
        &self,
        name: impl Into<SmolStr>,
        value: Option<Expr>,
        type_expr: Option<Expr>,
        captures_rest: bool,
    ) -> Parameter {
        Parameter {
            name: name.into(),
            value,
            type_expr,
            captures_rest,
            range: None,
        }
    }

    fn named(
        &self,
        name: impl Into<SmolStr>,
        parameters: Vec<Parameter>,
        body: impl Into<BuildInput>,
    ) -> BuildResult<NamedDefinition> {
        Ok(NamedDefinition {
            name: name.into(),
            parameters,
            body: self.body(body)?,
        })
    }

    /// `class name(params) inherits parent { body }`
    pub fn host_class(
        &self,
        name: impl Into<SmolStr>,
        parameters: Vec<Parameter>,
        parent_class: Option<&str>,
        body: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::HostClassDefinition {
            definition: self.named(name, parameters, body)?,
            parent_class: parent_class.map(SmolStr::new),
        }))
    }

    /// `define name(params) { body }`
    pub fn definition(
        &self,
        name: impl Into<SmolStr>,
        parameters: Vec<Parameter>,
        body: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::ResourceTypeDefinition(
            self.named(name, parameters, body)?,
        )))
    }

    /// `function name(params) >> ReturnType { body }`
    pub fn function(
        &self,
        name: impl Into<SmolStr>,
        parameters: Vec<Parameter>,
        body: impl Into<BuildInput>,
        return_type: Option<Expr>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::FunctionDefinition {
            definition: self.named(name, parameters, body)?,
            return_type: return_type.map(Box::new),
        }))
    }

    /// `application name(params) { body }`
    pub fn application(
        &self,
        name: impl Into<SmolStr>,
        parameters: Vec<Parameter>,
        body: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::Application(
            self.named(name, parameters, body)?,
        )))
    }

    /// `node hosts inherits parent { body }`
    pub fn node_definition(
        &self,
        host_matches: Vec<Expr>,
        parent: Option<Expr>,
        body: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::NodeDefinition {
            host_matches,
            parent: parent.map(Box::new),
            body: self.body(body)?,
        }))
    }

    pub fn site(&self, body: impl Into<BuildInput>) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::SiteDefinition {
            body: self.body(body)?,
        }))
    }

    /// `type Name = TypeExpr`
    pub fn type_alias(
        &self,
        name: impl Into<SmolStr>,
        type_expr: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::TypeAlias {
            name: name.into(),
            type_expr: self.boxed(type_expr)?,
        }))
    }

    /// `type TypeExpr = MappingExpr`
    pub fn type_mapping(
        &self,
        type_expr: impl Into<BuildInput>,
        mapping_expr: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::TypeMapping {
            type_expr: self.boxed(type_expr)?,
            mapping_expr: self.boxed(mapping_expr)?,
        }))
    }

    /// `type Name inherits Parent { body }`
    pub fn type_definition(
        &self,
        name: impl Into<SmolStr>,
        parent: Option<&str>,
        body: impl Into<BuildInput>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::TypeDefinition {
            name: name.into(),
            parent: parent.map(SmolStr::new),
            body: self.body(body)?,
        }))
    }

    /// `Component produces Capability { mappings }`; `kind` is `produces` or `consumes`
    pub fn capability_mapping(
        &self,
        kind: impl Into<SmolStr>,
        component: impl Into<BuildInput>,
        capability: impl Into<SmolStr>,
        mappings: Vec<Operation>,
    ) -> BuildResult<Expr> {
        Ok(self.node(ExprKind::CapabilityMapping {
            kind: kind.into(),
            component: self.boxed(component)?,
            capability: capability.into(),
            mappings,
        }))
    }
}
