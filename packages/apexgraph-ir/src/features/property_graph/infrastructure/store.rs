//! Graph store backed by a petgraph `DiGraph`
//!
//! Secondary indexes:
//! - label → vertices (insertion order)
//! - lower-cased defining type → vertices
//!
//! Edge iteration order from petgraph is newest-first, so every ordered
//! accessor sorts explicitly (children by `ChildIdx`, CFG edges by edge index).

use ahash::AHashMap;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::features::property_graph::domain::{CfgEdgeKind, EdgeLabel, Vertex, VertexId};
use crate::shared::constants::keys;
use crate::shared::models::{NodeKind, PropertyValue, Span};

#[derive(Debug, Default, Clone)]
pub struct GraphStore {
    graph: DiGraph<Vertex, EdgeLabel>,
    by_label: AHashMap<NodeKind, Vec<VertexId>>,
    by_defining_type: AHashMap<String, Vec<VertexId>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════
    // Mutation
    // ════════════════════════════════════════════════════════════════

    pub fn add_vertex(&mut self, label: NodeKind, span: Span) -> VertexId {
        let id = VertexId(self.graph.node_count() as u32);
        let node = self.graph.add_node(Vertex::new(id, label, span));
        debug_assert_eq!(VertexId::from_node(node), id);
        self.by_label.entry(label).or_default().push(id);
        id
    }

    /// Set a property; name-like keys also get their case-safe shadow
    pub fn set_property(&mut self, id: VertexId, key: &'static str, value: impl Into<PropertyValue>) {
        let value = value.into();
        if key == keys::DEFINING_TYPE {
            if let Some(ty) = value.as_str() {
                let entry = self.by_defining_type.entry(ty.to_lowercase()).or_default();
                if !entry.contains(&id) {
                    entry.push(id);
                }
            }
        }
        if let Some(vertex) = self.graph.node_weight_mut(id.node()) {
            vertex.set(key, value);
        }
    }

    /// Append `child` under `parent`, assigning the next child index
    pub fn add_child(&mut self, parent: VertexId, child: VertexId) {
        let existing = self.children(parent);
        let index = existing.len() as i64;
        if let Some(&previous_last) = existing.last() {
            self.set_property(previous_last, keys::LAST_CHILD, false);
        }
        self.set_property(child, keys::CHILD_INDEX, index);
        self.set_property(child, keys::FIRST_CHILD, index == 0);
        self.set_property(child, keys::LAST_CHILD, true);
        self.graph.add_edge(parent.node(), child.node(), EdgeLabel::Child);
    }

    pub fn add_edge(&mut self, from: VertexId, to: VertexId, label: EdgeLabel) {
        self.graph.add_edge(from.node(), to.node(), label);
    }

    pub fn add_cfg_edge(&mut self, from: VertexId, to: VertexId, kind: CfgEdgeKind) {
        self.add_edge(from, to, EdgeLabel::CfgPath(kind));
    }

    // ════════════════════════════════════════════════════════════════
    // Vertex access
    // ════════════════════════════════════════════════════════════════

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.graph.node_weight(id.node())
    }

    pub fn label(&self, id: VertexId) -> Option<NodeKind> {
        self.vertex(id).map(|v| v.label)
    }

    pub fn is(&self, id: VertexId, label: NodeKind) -> bool {
        self.label(id) == Some(label)
    }

    pub fn property(&self, id: VertexId, key: &str) -> Option<&PropertyValue> {
        self.vertex(id).and_then(|v| v.get(key))
    }

    pub fn prop_str(&self, id: VertexId, key: &str) -> Option<&str> {
        self.vertex(id).and_then(|v| v.get_str(key))
    }

    pub fn prop_bool(&self, id: VertexId, key: &str) -> bool {
        self.vertex(id).map(|v| v.get_bool(key)).unwrap_or(false)
    }

    pub fn prop_int(&self, id: VertexId, key: &str) -> Option<i64> {
        self.vertex(id).and_then(|v| v.get_int(key))
    }

    pub fn prop_list(&self, id: VertexId, key: &str) -> &[String] {
        self.vertex(id).map(|v| v.get_list(key)).unwrap_or(&[])
    }

    pub fn begin_line(&self, id: VertexId) -> u32 {
        self.vertex(id).map(|v| v.begin_line()).unwrap_or(0)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.graph.node_indices().map(VertexId::from_node)
    }

    pub fn vertices_with_label(&self, label: NodeKind) -> &[VertexId] {
        self.by_label.get(&label).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Vertices whose `DefiningType` matches `ty` case-insensitively
    pub fn vertices_with_defining_type(&self, ty: &str) -> &[VertexId] {
        self.by_defining_type
            .get(&ty.to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    // ════════════════════════════════════════════════════════════════
    // Structural navigation
    // ════════════════════════════════════════════════════════════════

    /// Children in source order
    pub fn children(&self, id: VertexId) -> Vec<VertexId> {
        let mut children: Vec<(i64, VertexId)> = self
            .graph
            .edges_directed(id.node(), Direction::Outgoing)
            .filter(|e| *e.weight() == EdgeLabel::Child)
            .map(|e| {
                let child = VertexId::from_node(e.target());
                (self.prop_int(child, keys::CHILD_INDEX).unwrap_or(0), child)
            })
            .collect();
        children.sort();
        children.into_iter().map(|(_, c)| c).collect()
    }

    pub fn child_at(&self, id: VertexId, index: usize) -> Option<VertexId> {
        self.children(id).get(index).copied()
    }

    pub fn children_with_label(&self, id: VertexId, label: NodeKind) -> Vec<VertexId> {
        self.children(id)
            .into_iter()
            .filter(|c| self.is(*c, label))
            .collect()
    }

    pub fn parent(&self, id: VertexId) -> Option<VertexId> {
        self.graph
            .edges_directed(id.node(), Direction::Incoming)
            .find(|e| *e.weight() == EdgeLabel::Child)
            .map(|e| VertexId::from_node(e.source()))
    }

    /// Ancestors, nearest first
    pub fn ancestors(&self, id: VertexId) -> Vec<VertexId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Nearest ancestor (or self) with the given label
    pub fn enclosing(&self, id: VertexId, label: NodeKind) -> Option<VertexId> {
        if self.is(id, label) {
            return Some(id);
        }
        self.ancestors(id).into_iter().find(|a| self.is(*a, label))
    }

    /// Subtree in pre-order (self first)
    pub fn descendants(&self, id: VertexId) -> Vec<VertexId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(v) = stack.pop() {
            out.push(v);
            let mut children = self.children(v);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    // ════════════════════════════════════════════════════════════════
    // Labeled edges
    // ════════════════════════════════════════════════════════════════

    /// Targets of outgoing edges with `label`, in insertion order
    pub fn out_neighbors(&self, id: VertexId, label: EdgeLabel) -> Vec<VertexId> {
        let mut edges: Vec<(usize, VertexId)> = self
            .graph
            .edges_directed(id.node(), Direction::Outgoing)
            .filter(|e| *e.weight() == label)
            .map(|e| (e.id().index(), VertexId::from_node(e.target())))
            .collect();
        edges.sort();
        edges.into_iter().map(|(_, v)| v).collect()
    }

    pub fn in_neighbors(&self, id: VertexId, label: EdgeLabel) -> Vec<VertexId> {
        let mut edges: Vec<(usize, VertexId)> = self
            .graph
            .edges_directed(id.node(), Direction::Incoming)
            .filter(|e| *e.weight() == label)
            .map(|e| (e.id().index(), VertexId::from_node(e.source())))
            .collect();
        edges.sort();
        edges.into_iter().map(|(_, v)| v).collect()
    }

    /// CFG successors in insertion order
    pub fn cfg_successors(&self, id: VertexId) -> Vec<(VertexId, CfgEdgeKind)> {
        let mut edges: Vec<(usize, VertexId, CfgEdgeKind)> = self
            .graph
            .edges_directed(id.node(), Direction::Outgoing)
            .filter_map(|e| match e.weight() {
                EdgeLabel::CfgPath(kind) => {
                    Some((e.id().index(), VertexId::from_node(e.target()), *kind))
                }
                _ => None,
            })
            .collect();
        edges.sort_by_key(|(idx, _, _)| *idx);
        edges.into_iter().map(|(_, v, k)| (v, k)).collect()
    }

    /// CFG predecessors in insertion order, with the kind of the edge into `id`
    pub fn cfg_predecessors(&self, id: VertexId) -> Vec<(VertexId, CfgEdgeKind)> {
        let mut edges: Vec<(usize, VertexId, CfgEdgeKind)> = self
            .graph
            .edges_directed(id.node(), Direction::Incoming)
            .filter_map(|e| match e.weight() {
                EdgeLabel::CfgPath(kind) => {
                    Some((e.id().index(), VertexId::from_node(e.source()), *kind))
                }
                _ => None,
            })
            .collect();
        edges.sort_by_key(|(idx, _, _)| *idx);
        edges.into_iter().map(|(_, v, k)| (v, k)).collect()
    }

    pub fn has_cfg_edges(&self, id: VertexId) -> bool {
        self.graph
            .edges_directed(id.node(), Direction::Outgoing)
            .chain(self.graph.edges_directed(id.node(), Direction::Incoming))
            .any(|e| e.weight().is_cfg())
    }

    /// End-scope labels recorded on a vertex by the CFG synthesizer
    pub fn end_scopes(&self, id: VertexId) -> Vec<NodeKind> {
        self.prop_list(id, keys::END_SCOPES)
            .iter()
            .filter_map(|s| NodeKind::parse(s))
            .collect()
    }
}
