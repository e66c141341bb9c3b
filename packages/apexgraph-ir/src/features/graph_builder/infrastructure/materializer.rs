//! First pass: AST → vertices
//!
//! One vertex per AST node, parent/child edges in source order, every AST
//! property copied (name-bearing ones get their case-safe shadow through
//! the store), plus the builder-owned properties:
//! - `DefiningType`: qualified name of the enclosing type (`Outer.Inner`)
//! - `OuterType`: on inner type declarations
//! - `FileName`, `IsStandard`

use tracing::trace;

use crate::features::parsing::AstNode;
use crate::features::property_graph::{GraphStore, VertexId};
use crate::shared::constants::keys;
use crate::shared::ScopeStack;

pub struct Materializer<'s> {
    store: &'s mut GraphStore,
    file_name: &'s str,
    is_standard: bool,
    scopes: ScopeStack,
}

impl<'s> Materializer<'s> {
    pub fn new(store: &'s mut GraphStore, file_name: &'s str, is_standard: bool) -> Self {
        Self {
            store,
            file_name,
            is_standard,
            scopes: ScopeStack::new(),
        }
    }

    /// Materialize a whole unit; returns the root vertex
    pub fn materialize(mut self, root: &AstNode) -> VertexId {
        let id = self.materialize_node(root, None);
        trace!(unit = self.file_name, root = %id, "materialized unit");
        id
    }

    fn materialize_node(&mut self, node: &AstNode, parent: Option<VertexId>) -> VertexId {
        let id = self.store.add_vertex(node.kind, node.span);
        if let Some(parent) = parent {
            self.store.add_child(parent, id);
        }
        for (&key, value) in node.properties.iter() {
            self.store.set_property(id, key, value.clone());
        }

        let declares_type = node.kind.is_type_declaration();
        if declares_type {
            let name = node.prop_str(keys::NAME).unwrap_or_default();
            if !self.scopes.is_empty() {
                self.store
                    .set_property(id, keys::OUTER_TYPE, self.scopes.qualified());
            }
            self.scopes.push(name);
        }

        self.store
            .set_property(id, keys::DEFINING_TYPE, self.scopes.qualified());
        self.store.set_property(id, keys::FILE_NAME, self.file_name);
        self.store.set_property(id, keys::IS_STANDARD, self.is_standard);

        for child in &node.children {
            self.materialize_node(child, Some(id));
        }

        if declares_type {
            self.scopes.pop();
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::parse_compilation_unit;
    use crate::shared::models::NodeKind;

    #[test]
    fn test_defining_type_and_outer_type() {
        let unit = parse_compilation_unit(
            "Outer.cls",
            "public class Outer { void a() { } public class Inner { void b() { } } }",
        )
        .unwrap();
        let mut store = GraphStore::new();
        let root = Materializer::new(&mut store, &unit.name, false).materialize(&unit.root);

        assert_eq!(store.prop_str(root, keys::DEFINING_TYPE), Some("Outer"));
        let inner = store.vertices_with_label(NodeKind::UserClass)[1];
        assert_eq!(store.prop_str(inner, keys::DEFINING_TYPE), Some("Outer.Inner"));
        assert_eq!(store.prop_str(inner, keys::OUTER_TYPE), Some("Outer"));
        assert_eq!(store.prop_str(inner, keys::DEFINING_TYPE_CS), Some("outer.inner"));

        let methods = store.vertices_with_label(NodeKind::Method);
        assert_eq!(store.prop_str(methods[0], keys::DEFINING_TYPE), Some("Outer"));
        assert_eq!(store.prop_str(methods[1], keys::DEFINING_TYPE), Some("Outer.Inner"));
        assert_eq!(store.prop_str(methods[1], keys::FILE_NAME), Some("Outer.cls"));
        assert!(!store.prop_bool(methods[1], keys::IS_STANDARD));
        assert_eq!(store.vertex_count(), unit.root.size());
    }
}
