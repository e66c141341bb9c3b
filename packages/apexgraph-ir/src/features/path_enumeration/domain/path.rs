//! `ApexPath`: one execution path through one method
//!
//! Paths are values. Expansion never edits a path another caller holds; it
//! clones and records the chosen sub-path on the copy. Sub-paths are shared
//! behind `Arc` so forking stays cheap.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::features::path_enumeration::domain::PathMetadata;
use crate::features::property_graph::{CfgEdgeKind, GraphStore, Polarity, VertexId};
use crate::shared::models::NodeKind;

/// A vertex on a path and the CFG edge taken out of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathVertex {
    pub id: VertexId,
    /// `None` for the last vertex of a path
    pub exit: Option<CfgEdgeKind>,
}

impl PathVertex {
    pub fn new(id: VertexId, exit: Option<CfgEdgeKind>) -> Self {
        Self { id, exit }
    }

    /// Outcome of a condition vertex on this path
    pub fn polarity(&self) -> Option<Polarity> {
        self.exit.and_then(|e| e.polarity())
    }
}

/// Run of a class's static-block invoker, triggered on this path
#[derive(Debug, Clone)]
pub struct StaticInitializer {
    /// Defining type of the initialized class
    pub class: String,
    /// Path vertex during which the class was first referenced; `None` at path start
    pub anchor: Option<VertexId>,
    pub path: Arc<ApexPath>,
}

/// Sub-path recorded on a path, in the order expansion attached it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expansion {
    Invocation { anchor: VertexId, site: VertexId },
    StaticInit { index: usize },
}

#[derive(Debug, Clone)]
pub struct ApexPath {
    method: VertexId,
    vertices: Vec<PathVertex>,
    invocations: BTreeMap<VertexId, Arc<ApexPath>>,
    static_initializers: Vec<StaticInitializer>,
    expansions: Vec<Expansion>,
    metadata: PathMetadata,
}

impl ApexPath {
    pub fn new(method: VertexId, vertices: Vec<PathVertex>) -> Self {
        Self {
            method,
            vertices,
            invocations: BTreeMap::new(),
            static_initializers: Vec::new(),
            expansions: Vec::new(),
            metadata: PathMetadata::default(),
        }
    }

    /// Method this path runs through
    pub fn method(&self) -> VertexId {
        self.method
    }

    pub fn vertices(&self) -> &[PathVertex] {
        &self.vertices
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().map(|v| v.id)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn first(&self) -> Option<VertexId> {
        self.vertices.first().map(|v| v.id)
    }

    pub fn last(&self) -> Option<VertexId> {
        self.vertices.last().map(|v| v.id)
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.vertices.iter().any(|v| v.id == id)
    }

    pub fn polarity_of(&self, id: VertexId) -> Option<Polarity> {
        self.vertices
            .iter()
            .find(|v| v.id == id)
            .and_then(|v| v.polarity())
    }

    /// Path vertices with a given label
    pub fn vertices_with_label<'a>(
        &'a self,
        store: &'a GraphStore,
        label: NodeKind,
    ) -> impl Iterator<Item = PathVertex> + 'a {
        self.vertices
            .iter()
            .copied()
            .filter(move |v| store.is(v.id, label))
    }

    /// Whether the path ends at a `return` statement
    pub fn ends_with_return(&self, store: &GraphStore) -> bool {
        self.last()
            .is_some_and(|v| store.is(v, NodeKind::ReturnStatement))
    }

    pub fn ends_with_throw(&self, store: &GraphStore) -> bool {
        self.last()
            .is_some_and(|v| store.is(v, NodeKind::ThrowStatement))
    }

    // ════════════════════════════════════════════════════════════════
    // Expansion results
    // ════════════════════════════════════════════════════════════════

    pub fn invocations(&self) -> &BTreeMap<VertexId, Arc<ApexPath>> {
        &self.invocations
    }

    /// Sub-path chosen for an invocation site
    pub fn invoked_path(&self, site: VertexId) -> Option<&Arc<ApexPath>> {
        self.invocations.get(&site)
    }

    pub fn static_initializers(&self) -> &[StaticInitializer] {
        &self.static_initializers
    }

    /// Invoker path for a class (case-insensitive)
    pub fn static_initializer_for(&self, class: &str) -> Option<&StaticInitializer> {
        self.static_initializers
            .iter()
            .find(|s| s.class.eq_ignore_ascii_case(class))
    }

    pub fn metadata(&self) -> &PathMetadata {
        &self.metadata
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut PathMetadata {
        &mut self.metadata
    }

    pub fn is_expanded(&self) -> bool {
        !self.invocations.is_empty() || !self.static_initializers.is_empty()
    }

    /// Copy of this path with a sub-path recorded for `site`, an expression
    /// evaluated while the path is at `anchor`
    pub fn fork_with_invocation(
        &self,
        anchor: VertexId,
        site: VertexId,
        sub_path: Arc<ApexPath>,
    ) -> ApexPath {
        let mut forked = self.clone();
        forked.metadata.absorb(sub_path.metadata());
        forked.invocations.insert(site, sub_path);
        forked.expansions.push(Expansion::Invocation { anchor, site });
        forked
    }

    /// Copy of this path with a static initializer recorded
    pub fn fork_with_static_initializer(
        &self,
        class: &str,
        anchor: Option<VertexId>,
        sub_path: Arc<ApexPath>,
    ) -> ApexPath {
        let mut forked = self.clone();
        forked.metadata.absorb(sub_path.metadata());
        forked.expansions.push(Expansion::StaticInit {
            index: forked.static_initializers.len(),
        });
        forked.static_initializers.push(StaticInitializer {
            class: class.to_string(),
            anchor,
            path: sub_path,
        });
        forked
    }

    /// Vertices of this path and of every sub-path, in execution order
    ///
    /// A path vertex comes before the sub-paths attached while at it.
    pub fn expanded_vertices(&self) -> Vec<VertexId> {
        let mut out = Vec::new();
        self.collect_expanded(&mut out);
        out
    }

    fn collect_expanded(&self, out: &mut Vec<VertexId>) {
        self.collect_anchored(None, out);
        for vertex in &self.vertices {
            out.push(vertex.id);
            self.collect_anchored(Some(vertex.id), out);
        }
    }

    fn collect_anchored(&self, anchor: Option<VertexId>, out: &mut Vec<VertexId>) {
        for expansion in &self.expansions {
            let sub_path = match *expansion {
                Expansion::Invocation { anchor: at, site } if Some(at) == anchor => {
                    self.invocations.get(&site)
                }
                Expansion::StaticInit { index } => self
                    .static_initializers
                    .get(index)
                    .filter(|init| init.anchor == anchor)
                    .map(|init| &init.path),
                _ => None,
            };
            if let Some(sub_path) = sub_path {
                sub_path.collect_expanded(out);
            }
        }
    }

    /// Deepest nesting of sub-paths below this one
    pub fn depth(&self) -> usize {
        self.invocations
            .values()
            .chain(self.static_initializers.iter().map(|s| &s.path))
            .map(|p| 1 + p.depth())
            .max()
            .unwrap_or(0)
    }
}

impl PartialEq for ApexPath {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
            && self.vertices == other.vertices
            && self.invocations == other.invocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(method: u32, ids: &[u32]) -> ApexPath {
        let vertices = ids
            .iter()
            .map(|id| PathVertex::new(VertexId(*id), Some(CfgEdgeKind::Sequential)))
            .collect();
        ApexPath::new(VertexId(method), vertices)
    }

    #[test]
    fn test_fork_leaves_original_untouched() {
        let outer = path(1, &[10, 11, 12]);
        let inner = Arc::new(path(2, &[20, 21]));
        let forked = outer.fork_with_invocation(VertexId(11), VertexId(40), inner.clone());

        assert!(!outer.is_expanded());
        assert_eq!(forked.invoked_path(VertexId(40)), Some(&inner));
        assert_eq!(forked.depth(), 1);
    }

    #[test]
    fn test_expanded_vertices_interleave_sub_paths() {
        let outer = path(1, &[10, 11, 12]);
        let callee = Arc::new(path(2, &[20, 21]));
        let init = Arc::new(path(3, &[30]));
        let forked = outer
            .fork_with_static_initializer("Util", None, init)
            .fork_with_invocation(VertexId(11), VertexId(40), callee);

        let ids: Vec<u32> = forked.expanded_vertices().iter().map(|v| v.0).collect();
        assert_eq!(ids, vec![30, 10, 11, 20, 21, 12]);
        assert!(forked.static_initializer_for("util").is_some());
    }

    #[test]
    fn test_polarity_lookup() {
        let vertices = vec![
            PathVertex::new(VertexId(1), Some(CfgEdgeKind::Sequential)),
            PathVertex::new(VertexId(2), Some(CfgEdgeKind::Negative)),
            PathVertex::new(VertexId(3), None),
        ];
        let path = ApexPath::new(VertexId(0), vertices);
        assert_eq!(path.polarity_of(VertexId(2)), Some(Polarity::Negative));
        assert_eq!(path.polarity_of(VertexId(1)), None);
        assert_eq!(path.last(), Some(VertexId(3)));
    }
}
