//! Kind-specific vertex handles
//!
//! Each handle is a thin newtype over [`VertexRef`] and derefs to it, so
//! structural navigation is always available next to the kind accessors.

use std::ops::Deref;

use super::traits::{Invocable, Named, Typeable};
use super::vertex_ref::VertexRef;
use crate::shared::constants::{keys, literal_types, reserved};
use crate::shared::models::NodeKind;
use crate::shared::utils::type_names::canonical_type;

macro_rules! vertex_handle {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq)]
            pub struct $name<'g>(pub VertexRef<'g>);

            impl<'g> Deref for $name<'g> {
                type Target = VertexRef<'g>;

                fn deref(&self) -> &Self::Target {
                    &self.0
                }
            }

            impl<'g> $name<'g> {
                pub fn vertex(&self) -> VertexRef<'g> {
                    self.0
                }
            }
        )+
    };
}

vertex_handle! {
    /// Class, interface, enum or trigger
    TypeDeclVertex,
    MethodVertex,
    BlockVertex,
    /// `if` / `else if` / `else` chain
    IfElseVertex,
    ConditionVertex,
    /// for, foreach, while, do-while
    LoopVertex,
    SwitchVertex,
    WhenVertex,
    TryCatchVertex,
    VariableDeclarationVertex,
    /// Method call, constructor call, `this(...)`, `super(...)`
    InvocationVertex,
    VariableVertex,
    LiteralVertex,
}

/// Closed classification of a vertex by kind
#[derive(Debug, Clone, Copy)]
pub enum TypedVertex<'g> {
    TypeDecl(TypeDeclVertex<'g>),
    Method(MethodVertex<'g>),
    Block(BlockVertex<'g>),
    IfElse(IfElseVertex<'g>),
    Condition(ConditionVertex<'g>),
    Loop(LoopVertex<'g>),
    Switch(SwitchVertex<'g>),
    When(WhenVertex<'g>),
    TryCatch(TryCatchVertex<'g>),
    VariableDeclaration(VariableDeclarationVertex<'g>),
    Invocation(InvocationVertex<'g>),
    Variable(VariableVertex<'g>),
    Literal(LiteralVertex<'g>),
    Statement(VertexRef<'g>),
    Expression(VertexRef<'g>),
    Other(VertexRef<'g>),
}

impl<'g> TypedVertex<'g> {
    pub fn classify(v: VertexRef<'g>) -> Self {
        let label = v.label();
        match label {
            l if l.is_type_declaration() => TypedVertex::TypeDecl(TypeDeclVertex(v)),
            NodeKind::Method => TypedVertex::Method(MethodVertex(v)),
            NodeKind::BlockStatement => TypedVertex::Block(BlockVertex(v)),
            NodeKind::IfElseBlockStatement => TypedVertex::IfElse(IfElseVertex(v)),
            NodeKind::StandardCondition => TypedVertex::Condition(ConditionVertex(v)),
            l if l.is_loop() => TypedVertex::Loop(LoopVertex(v)),
            NodeKind::SwitchStatement => TypedVertex::Switch(SwitchVertex(v)),
            l if l.is_when_block() => TypedVertex::When(WhenVertex(v)),
            NodeKind::TryCatchFinallyBlockStatement => TypedVertex::TryCatch(TryCatchVertex(v)),
            NodeKind::VariableDeclaration | NodeKind::FieldDeclaration => {
                TypedVertex::VariableDeclaration(VariableDeclarationVertex(v))
            }
            l if l.is_invocable() => TypedVertex::Invocation(InvocationVertex(v)),
            NodeKind::VariableExpression => TypedVertex::Variable(VariableVertex(v)),
            NodeKind::LiteralExpression => TypedVertex::Literal(LiteralVertex(v)),
            l if l.is_simple_statement() || l.is_compound_statement() => TypedVertex::Statement(v),
            l if l.is_expression() => TypedVertex::Expression(v),
            _ => TypedVertex::Other(v),
        }
    }

    pub fn vertex(&self) -> VertexRef<'g> {
        match self {
            TypedVertex::TypeDecl(h) => h.0,
            TypedVertex::Method(h) => h.0,
            TypedVertex::Block(h) => h.0,
            TypedVertex::IfElse(h) => h.0,
            TypedVertex::Condition(h) => h.0,
            TypedVertex::Loop(h) => h.0,
            TypedVertex::Switch(h) => h.0,
            TypedVertex::When(h) => h.0,
            TypedVertex::TryCatch(h) => h.0,
            TypedVertex::VariableDeclaration(h) => h.0,
            TypedVertex::Invocation(h) => h.0,
            TypedVertex::Variable(h) => h.0,
            TypedVertex::Literal(h) => h.0,
            TypedVertex::Statement(v) | TypedVertex::Expression(v) | TypedVertex::Other(v) => *v,
        }
    }
}

// ════════════════════════════════════════════════════════════════
// Declarations
// ════════════════════════════════════════════════════════════════

impl<'g> TypeDeclVertex<'g> {
    /// Qualified name (`Outer.Inner`)
    pub fn qualified_name(&self) -> &'g str {
        self.defining_type().or_else(|| self.0.name()).unwrap_or("")
    }

    pub fn super_class_name(&self) -> Option<&'g str> {
        self.prop_str(keys::SUPER_CLASS_NAME)
    }

    pub fn interface_names(&self) -> &'g [String] {
        self.prop_list(keys::INTERFACE_NAMES)
    }

    pub fn outer_type(&self) -> Option<&'g str> {
        self.prop_str(keys::OUTER_TYPE)
    }

    pub fn is_interface(&self) -> bool {
        self.is(NodeKind::UserInterface)
    }

    pub fn methods(&self) -> Vec<MethodVertex<'g>> {
        self.children_with_label(NodeKind::Method)
            .into_iter()
            .map(MethodVertex)
            .collect()
    }

    pub fn field_declarations(&self) -> Vec<VariableDeclarationVertex<'g>> {
        self.children_with_label(NodeKind::FieldDeclarationStatements)
            .into_iter()
            .flat_map(|stmts| stmts.children_with_label(NodeKind::FieldDeclaration))
            .map(VariableDeclarationVertex)
            .collect()
    }

    pub fn properties(&self) -> Vec<VertexRef<'g>> {
        self.children_with_label(NodeKind::PropertyDeclaration)
    }

    pub fn inner_types(&self) -> Vec<TypeDeclVertex<'g>> {
        self.children()
            .into_iter()
            .filter(|c| c.label().is_type_declaration())
            .map(TypeDeclVertex)
            .collect()
    }
}

/// Declared parameter of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: String,
    /// Canonical type
    pub ty: String,
}

impl<'g> MethodVertex<'g> {
    pub fn return_type(&self) -> String {
        canonical_type(self.prop_str(keys::RETURN_TYPE).unwrap_or("void"))
    }

    pub fn arity(&self) -> usize {
        self.prop_int(keys::ARITY).unwrap_or(0) as usize
    }

    pub fn parameters(&self) -> Vec<ParameterInfo> {
        self.children_with_label(NodeKind::Parameter)
            .into_iter()
            .map(|p| ParameterInfo {
                name: p.name().unwrap_or("").to_string(),
                ty: canonical_type(p.prop_str(keys::TYPE).unwrap_or("Object")),
            })
            .collect()
    }

    pub fn body(&self) -> Option<BlockVertex<'g>> {
        self.last_child()
            .filter(|c| c.is(NodeKind::BlockStatement))
            .map(BlockVertex)
    }

    pub fn is_static(&self) -> bool {
        self.prop_bool(keys::IS_STATIC)
    }

    pub fn is_constructor(&self) -> bool {
        self.prop_bool(keys::IS_CONSTRUCTOR)
    }

    pub fn is_abstract(&self) -> bool {
        self.prop_bool(keys::IS_ABSTRACT)
    }

    pub fn is_synthetic(&self) -> bool {
        self.prop_bool(keys::IS_SYNTHETIC)
    }

    pub fn synthetic_kind(&self) -> Option<&'g str> {
        self.prop_str(keys::SYNTHETIC_KIND)
    }

    /// Property backing a synthetic accessor
    pub fn property_name(&self) -> Option<&'g str> {
        self.prop_str(keys::PROPERTY_NAME)
    }

    pub fn is_static_block_invoker(&self) -> bool {
        self.0
            .name()
            .is_some_and(|n| n == reserved::STATIC_BLOCK_INVOKER)
    }

    /// `Type.name(P1,P2)`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.parameters().into_iter().map(|p| p.ty).collect();
        format!(
            "{}.{}({})",
            self.defining_type().unwrap_or(""),
            self.0.name().unwrap_or(""),
            params.join(",")
        )
    }
}

impl<'g> BlockVertex<'g> {
    pub fn statements(&self) -> Vec<VertexRef<'g>> {
        self.children()
    }
}

// ════════════════════════════════════════════════════════════════
// Control constructs
// ════════════════════════════════════════════════════════════════

impl<'g> IfElseVertex<'g> {
    /// `(condition, block)` per `if` / `else if`
    pub fn branches(&self) -> Vec<(ConditionVertex<'g>, BlockVertex<'g>)> {
        self.children_with_label(NodeKind::IfBlockStatement)
            .into_iter()
            .filter_map(|b| Some((ConditionVertex(b.child(0)?), BlockVertex(b.child(1)?))))
            .collect()
    }

    pub fn else_block(&self) -> Option<BlockVertex<'g>> {
        self.last_child()
            .filter(|c| c.is(NodeKind::BlockStatement))
            .map(BlockVertex)
    }
}

impl<'g> ConditionVertex<'g> {
    pub fn expression(&self) -> Option<VertexRef<'g>> {
        self.child(0)
    }
}

impl<'g> LoopVertex<'g> {
    pub fn kind(&self) -> NodeKind {
        self.label()
    }

    pub fn condition(&self) -> Option<ConditionVertex<'g>> {
        self.children()
            .into_iter()
            .find(|c| c.is(NodeKind::StandardCondition))
            .map(ConditionVertex)
    }

    fn blocks(&self) -> Vec<BlockVertex<'g>> {
        self.children_with_label(NodeKind::BlockStatement)
            .into_iter()
            .map(BlockVertex)
            .collect()
    }

    /// Loop body (first block child)
    pub fn body(&self) -> Option<BlockVertex<'g>> {
        self.blocks().into_iter().find(|b| !b.is_implicit())
    }

    /// Classic `for` initializer
    pub fn init(&self) -> Option<VertexRef<'g>> {
        if self.kind() != NodeKind::ForLoopStatement || !self.prop_bool(keys::HAS_INIT) {
            return None;
        }
        self.child(0)
    }

    /// Classic `for` update expression statement
    pub fn update(&self) -> Option<VertexRef<'g>> {
        if self.kind() != NodeKind::ForLoopStatement || !self.prop_bool(keys::HAS_UPDATE) {
            return None;
        }
        let index = self.prop_bool(keys::HAS_INIT) as usize + self.prop_bool(keys::HAS_CONDITION) as usize;
        self.child(index)
    }

    /// foreach loop variable declaration statements
    pub fn loop_variable(&self) -> Option<VertexRef<'g>> {
        if self.kind() != NodeKind::ForEachStatement {
            return None;
        }
        self.child(0)
    }

    /// foreach iterated collection
    pub fn iterable(&self) -> Option<VertexRef<'g>> {
        if self.kind() != NodeKind::ForEachStatement {
            return None;
        }
        self.child(1)
    }
}

impl<'g> SwitchVertex<'g> {
    pub fn discriminant(&self) -> Option<VertexRef<'g>> {
        self.child(0)
    }

    pub fn when_blocks(&self) -> Vec<WhenVertex<'g>> {
        self.children()
            .into_iter()
            .filter(|c| c.label().is_when_block())
            .map(WhenVertex)
            .collect()
    }
}

impl<'g> WhenVertex<'g> {
    pub fn block(&self) -> Option<BlockVertex<'g>> {
        self.last_child()
            .filter(|c| c.is(NodeKind::BlockStatement))
            .map(BlockVertex)
    }

    /// Literal and identifier cases of a value when-block
    pub fn cases(&self) -> Vec<VertexRef<'g>> {
        self.children()
            .into_iter()
            .filter(|c| matches!(c.label(), NodeKind::LiteralCase | NodeKind::IdentifierCase))
            .collect()
    }
}

impl<'g> TryCatchVertex<'g> {
    pub fn try_block(&self) -> Option<BlockVertex<'g>> {
        self.child(0).map(BlockVertex)
    }

    pub fn catches(&self) -> Vec<VertexRef<'g>> {
        self.children_with_label(NodeKind::CatchBlockStatement)
    }

    pub fn finally_block(&self) -> Option<BlockVertex<'g>> {
        if !self.prop_bool(keys::HAS_FINALLY) {
            return None;
        }
        self.last_child().map(BlockVertex)
    }
}

// ════════════════════════════════════════════════════════════════
// Declarations and expressions
// ════════════════════════════════════════════════════════════════

impl<'g> VariableDeclarationVertex<'g> {
    pub fn initializer(&self) -> Option<VertexRef<'g>> {
        self.child(0)
    }
}

impl<'g> InvocationVertex<'g> {
    /// Receiver of a method call (`EmptyReferenceExpression` when unqualified)
    pub fn receiver(&self) -> Option<VertexRef<'g>> {
        if self.is(NodeKind::MethodCallExpression) {
            self.child(0)
        } else {
            None
        }
    }

    /// Dotted receiver names (`a.b.m()` → `["a", "b"]`)
    pub fn receiver_names(&self) -> &'g [String] {
        match self.receiver() {
            Some(r) if r.is(NodeKind::ReferenceExpression) => r.prop_list(keys::NAMES),
            _ => &[],
        }
    }

    pub fn full_method_name(&self) -> Option<&'g str> {
        self.prop_str(keys::FULL_METHOD_NAME)
    }

    /// Type created by `new T(...)`
    pub fn created_type(&self) -> Option<String> {
        if self.is(NodeKind::NewObjectExpression) {
            self.prop_str(keys::TYPE).map(canonical_type)
        } else {
            None
        }
    }
}

impl<'g> VariableVertex<'g> {
    pub fn qualifier(&self) -> Option<VertexRef<'g>> {
        self.child(0)
    }

    pub fn qualifier_names(&self) -> &'g [String] {
        match self.qualifier() {
            Some(q) if q.is(NodeKind::ReferenceExpression) => q.prop_list(keys::NAMES),
            _ => &[],
        }
    }

    pub fn is_unqualified(&self) -> bool {
        self.qualifier()
            .map_or(true, |q| q.is(NodeKind::EmptyReferenceExpression))
    }
}

impl<'g> LiteralVertex<'g> {
    pub fn literal_type(&self) -> &'g str {
        self.prop_str(keys::LITERAL_TYPE).unwrap_or(literal_types::NULL)
    }

    pub fn text(&self) -> &'g str {
        self.prop_str(keys::VALUE).unwrap_or("")
    }
}

// ════════════════════════════════════════════════════════════════
// Capabilities
// ════════════════════════════════════════════════════════════════

impl<'g> Named<'g> for MethodVertex<'g> {
    fn name(&self) -> Option<&'g str> {
        self.0.name()
    }
}

impl<'g> Named<'g> for TypeDeclVertex<'g> {
    fn name(&self) -> Option<&'g str> {
        self.0.name()
    }
}

impl<'g> Named<'g> for VariableVertex<'g> {
    fn name(&self) -> Option<&'g str> {
        self.0.name()
    }
}

impl<'g> Named<'g> for VariableDeclarationVertex<'g> {
    fn name(&self) -> Option<&'g str> {
        self.0.name()
    }
}

impl<'g> Typeable<'g> for VariableDeclarationVertex<'g> {
    fn declared_type(&self) -> Option<String> {
        self.prop_str(keys::TYPE).map(canonical_type)
    }
}

impl<'g> Typeable<'g> for MethodVertex<'g> {
    fn declared_type(&self) -> Option<String> {
        Some(self.return_type())
    }
}

impl<'g> Typeable<'g> for LiteralVertex<'g> {
    fn declared_type(&self) -> Option<String> {
        use crate::shared::utils::type_names as t;
        let ty = match self.literal_type() {
            literal_types::STRING => t::STRING,
            literal_types::INTEGER => t::INTEGER,
            literal_types::LONG => t::LONG,
            literal_types::DECIMAL => t::DECIMAL,
            literal_types::TRUE | literal_types::FALSE => t::BOOLEAN,
            _ => return None,
        };
        Some(ty.to_string())
    }
}

impl<'g> Invocable<'g> for InvocationVertex<'g> {
    fn method_name(&self) -> Option<&'g str> {
        match self.label() {
            NodeKind::MethodCallExpression => self.prop_str(keys::METHOD_NAME),
            _ => Some(reserved::CONSTRUCTOR_NAME),
        }
    }

    fn arguments(&self) -> Vec<VertexRef<'g>> {
        let children = self.children();
        if self.is(NodeKind::MethodCallExpression) {
            children.into_iter().skip(1).collect()
        } else {
            children
        }
    }
}
