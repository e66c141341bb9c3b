//! Fluent traversal over the graph store
//!
//! ```ignore
//! let methods = store
//!     .query_label(NodeKind::Method)
//!     .has_ci(keys::DEFINING_TYPE, "myclass")
//!     .has(keys::NAME, "run")
//!     .to_vec();
//! ```

use super::store::GraphStore;
use crate::features::property_graph::domain::{EdgeLabel, VertexId};
use crate::shared::constants::keys;
use crate::shared::models::NodeKind;

/// A set of vertices being narrowed or traversed; order is preserved and
/// duplicates are removed on each traversal step
#[derive(Clone)]
pub struct GraphQuery<'g> {
    store: &'g GraphStore,
    current: Vec<VertexId>,
}

impl<'g> GraphQuery<'g> {
    pub fn new(store: &'g GraphStore, start: Vec<VertexId>) -> Self {
        Self {
            store,
            current: start,
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Filters
    // ════════════════════════════════════════════════════════════════

    pub fn has_label(mut self, label: NodeKind) -> Self {
        let store = self.store;
        self.current.retain(|v| store.is(*v, label));
        self
    }

    pub fn has_any_label(mut self, labels: &[NodeKind]) -> Self {
        let store = self.store;
        self.current
            .retain(|v| store.label(*v).is_some_and(|l| labels.contains(&l)));
        self
    }

    /// Case-sensitive property equality (list properties match any element)
    pub fn has(mut self, key: &str, value: &str) -> Self {
        let store = self.store;
        self.current
            .retain(|v| store.property(*v, key).is_some_and(|p| p.matches_str(value)));
        self
    }

    /// Case-insensitive equality through the `_CaseSafe` shadow property
    pub fn has_ci(mut self, key: &str, value: &str) -> Self {
        let store = self.store;
        let lowered = value.to_lowercase();
        match keys::case_safe_key(key) {
            Some(shadow) => self.current.retain(|v| {
                store
                    .property(*v, shadow)
                    .is_some_and(|p| p.matches_str(&lowered))
            }),
            None => self.current.retain(|v| {
                store
                    .property(*v, key)
                    .is_some_and(|p| p.to_case_safe().matches_str(&lowered))
            }),
        }
        self
    }

    pub fn has_bool(mut self, key: &str, value: bool) -> Self {
        let store = self.store;
        self.current.retain(|v| store.prop_bool(*v, key) == value);
        self
    }

    pub fn has_key(mut self, key: &str) -> Self {
        let store = self.store;
        self.current.retain(|v| store.property(*v, key).is_some());
        self
    }

    pub fn has_not(mut self, key: &str) -> Self {
        let store = self.store;
        self.current.retain(|v| store.property(*v, key).is_none());
        self
    }

    pub fn filter(mut self, pred: impl Fn(&GraphStore, VertexId) -> bool) -> Self {
        let store = self.store;
        self.current.retain(|v| pred(store, *v));
        self
    }

    // ════════════════════════════════════════════════════════════════
    // Traversals
    // ════════════════════════════════════════════════════════════════

    fn step(self, f: impl Fn(&GraphStore, VertexId) -> Vec<VertexId>) -> Self {
        let mut next = Vec::new();
        for v in &self.current {
            for n in f(self.store, *v) {
                if !next.contains(&n) {
                    next.push(n);
                }
            }
        }
        Self {
            store: self.store,
            current: next,
        }
    }

    pub fn children(self) -> Self {
        self.step(|s, v| s.children(v))
    }

    pub fn child_at(self, index: usize) -> Self {
        self.step(|s, v| s.child_at(v, index).into_iter().collect())
    }

    pub fn parent(self) -> Self {
        self.step(|s, v| s.parent(v).into_iter().collect())
    }

    pub fn descendants(self) -> Self {
        self.step(|s, v| s.descendants(v).into_iter().skip(1).collect())
    }

    pub fn out(self, label: EdgeLabel) -> Self {
        self.step(|s, v| s.out_neighbors(v, label))
    }

    pub fn in_(self, label: EdgeLabel) -> Self {
        self.step(|s, v| s.in_neighbors(v, label))
    }

    pub fn cfg_out(self) -> Self {
        self.step(|s, v| s.cfg_successors(v).into_iter().map(|(n, _)| n).collect())
    }

    pub fn cfg_in(self) -> Self {
        self.step(|s, v| s.cfg_predecessors(v).into_iter().map(|(n, _)| n).collect())
    }

    /// Re-sort by child index (siblings first, stable otherwise)
    pub fn order_by_child_index(mut self) -> Self {
        let store = self.store;
        self.current
            .sort_by_key(|v| store.prop_int(*v, keys::CHILD_INDEX).unwrap_or(0));
        self
    }

    // ════════════════════════════════════════════════════════════════
    // Terminals
    // ════════════════════════════════════════════════════════════════

    pub fn to_vec(self) -> Vec<VertexId> {
        self.current
    }

    pub fn first(&self) -> Option<VertexId> {
        self.current.first().copied()
    }

    pub fn count(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

impl GraphStore {
    /// Start a query from every vertex
    pub fn query(&self) -> GraphQuery<'_> {
        GraphQuery::new(self, self.vertex_ids().collect())
    }

    /// Start a query from the label index
    pub fn query_label(&self, label: NodeKind) -> GraphQuery<'_> {
        GraphQuery::new(self, self.vertices_with_label(label).to_vec())
    }

    /// Start a query from explicit vertices
    pub fn query_from(&self, start: impl IntoIterator<Item = VertexId>) -> GraphQuery<'_> {
        GraphQuery::new(self, start.into_iter().collect())
    }
}
