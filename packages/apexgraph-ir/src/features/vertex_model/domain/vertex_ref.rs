//! Untyped vertex view with structural navigation

use std::fmt;

use crate::features::property_graph::{GraphStore, VertexId};
use crate::shared::constants::keys;
use crate::shared::models::{NodeKind, PropertyValue};

use super::handles::{MethodVertex, TypeDeclVertex, TypedVertex};

#[derive(Clone, Copy)]
pub struct VertexRef<'g> {
    pub store: &'g GraphStore,
    pub id: VertexId,
}

impl<'g> VertexRef<'g> {
    pub fn new(store: &'g GraphStore, id: VertexId) -> Self {
        Self { store, id }
    }

    pub fn label(&self) -> NodeKind {
        // ids handed out by the store always resolve
        self.store.label(self.id).unwrap_or(NodeKind::BlockStatement)
    }

    pub fn is(&self, label: NodeKind) -> bool {
        self.store.is(self.id, label)
    }

    pub fn prop(&self, key: &str) -> Option<&'g PropertyValue> {
        self.store.property(self.id, key)
    }

    pub fn prop_str(&self, key: &str) -> Option<&'g str> {
        self.store.prop_str(self.id, key)
    }

    pub fn prop_bool(&self, key: &str) -> bool {
        self.store.prop_bool(self.id, key)
    }

    pub fn prop_int(&self, key: &str) -> Option<i64> {
        self.store.prop_int(self.id, key)
    }

    pub fn prop_list(&self, key: &str) -> &'g [String] {
        self.store.prop_list(self.id, key)
    }

    pub fn name(&self) -> Option<&'g str> {
        self.prop_str(keys::NAME)
    }

    pub fn defining_type(&self) -> Option<&'g str> {
        self.prop_str(keys::DEFINING_TYPE)
    }

    pub fn begin_line(&self) -> u32 {
        self.store.begin_line(self.id)
    }

    pub fn is_standard(&self) -> bool {
        self.prop_bool(keys::IS_STANDARD)
    }

    pub fn is_implicit(&self) -> bool {
        self.prop_bool(keys::IS_IMPLICIT)
    }

    pub fn end_scopes(&self) -> Vec<NodeKind> {
        self.store.end_scopes(self.id)
    }

    fn wrap(&self, id: VertexId) -> VertexRef<'g> {
        VertexRef::new(self.store, id)
    }

    pub fn children(&self) -> Vec<VertexRef<'g>> {
        self.store
            .children(self.id)
            .into_iter()
            .map(|c| self.wrap(c))
            .collect()
    }

    pub fn child(&self, index: usize) -> Option<VertexRef<'g>> {
        self.store.child_at(self.id, index).map(|c| self.wrap(c))
    }

    pub fn last_child(&self) -> Option<VertexRef<'g>> {
        self.children().pop()
    }

    pub fn children_with_label(&self, label: NodeKind) -> Vec<VertexRef<'g>> {
        self.children().into_iter().filter(|c| c.is(label)).collect()
    }

    pub fn parent(&self) -> Option<VertexRef<'g>> {
        self.store.parent(self.id).map(|p| self.wrap(p))
    }

    pub fn child_index(&self) -> usize {
        self.prop_int(keys::CHILD_INDEX).unwrap_or(0) as usize
    }

    /// Other children of the same parent, in order
    pub fn siblings(&self) -> Vec<VertexRef<'g>> {
        match self.parent() {
            Some(p) => p.children().into_iter().filter(|c| c.id != self.id).collect(),
            None => Vec::new(),
        }
    }

    pub fn enclosing(&self, label: NodeKind) -> Option<VertexRef<'g>> {
        self.store.enclosing(self.id, label).map(|v| self.wrap(v))
    }

    pub fn enclosing_method(&self) -> Option<MethodVertex<'g>> {
        self.enclosing(NodeKind::Method).map(MethodVertex)
    }

    /// Nearest enclosing class, interface, enum or trigger
    pub fn enclosing_type(&self) -> Option<TypeDeclVertex<'g>> {
        std::iter::once(self.id)
            .chain(self.store.ancestors(self.id))
            .find(|v| {
                self.store
                    .label(*v)
                    .is_some_and(|l| l.is_type_declaration())
            })
            .map(|v| TypeDeclVertex(self.wrap(v)))
    }

    /// Pre-order subtree, self first
    pub fn descendants(&self) -> Vec<VertexRef<'g>> {
        self.store
            .descendants(self.id)
            .into_iter()
            .map(|v| self.wrap(v))
            .collect()
    }

    pub fn classify(self) -> TypedVertex<'g> {
        TypedVertex::classify(self)
    }

    /// Expressions evaluated when a path reaches this vertex, in
    /// evaluation order (operands before the operation that uses them)
    pub fn evaluated_expressions(&self) -> Vec<VertexRef<'g>> {
        let roots: Vec<VertexRef<'g>> = match self.label() {
            NodeKind::ExpressionStatement
            | NodeKind::VariableDeclarationStatements
            | NodeKind::ReturnStatement
            | NodeKind::ThrowStatement
            | NodeKind::StandardCondition
            | NodeKind::DmlInsertStatement
            | NodeKind::DmlUpdateStatement
            | NodeKind::DmlUpsertStatement
            | NodeKind::DmlDeleteStatement
            | NodeKind::DmlUndeleteStatement
            | NodeKind::DmlMergeStatement => self.children(),
            NodeKind::ForEachStatement => self.child(1).into_iter().collect(),
            label if label.is_expression() => vec![*self],
            _ => Vec::new(),
        };
        let mut out = Vec::new();
        for root in roots {
            post_order(root, &mut out);
        }
        out
    }
}

fn post_order<'g>(v: VertexRef<'g>, out: &mut Vec<VertexRef<'g>>) {
    let mut stack = vec![(v, false)];
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            out.push(node);
            continue;
        }
        stack.push((node, true));
        for child in node.children().into_iter().rev() {
            stack.push((child, false));
        }
    }
}

impl PartialEq for VertexRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.store, other.store)
    }
}

impl fmt::Debug for VertexRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}@{})", self.label(), self.id, self.begin_line())
    }
}
