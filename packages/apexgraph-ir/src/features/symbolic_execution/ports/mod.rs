/*
 * Symbolic Execution Ports
 *
 * Seams between the path walker and rule implementations:
 * - PathVisitor: called per path vertex, may prune evaluation
 * - SymbolProvider: read-only view of the walk's scopes and heap
 */

use crate::features::property_graph::VertexId;
use crate::features::symbolic_execution::domain::{ApexValue, Heap, HeapRef};
use crate::features::vertex_model::VertexRef;
use crate::shared::models::NodeKind;

/// Read-only view of the symbols visible at the current vertex
pub trait SymbolProvider {
    /// Local, field of `this`, or static of the running class
    fn lookup(&self, name: &str) -> Option<ApexValue>;

    fn this(&self) -> Option<HeapRef>;

    fn heap(&self) -> &Heap;

    fn static_value(&self, class: &str, name: &str) -> Option<ApexValue>;

    fn current_method(&self) -> Option<VertexId>;

    /// Open blocks in the running method
    fn scope_depth(&self) -> usize;
}

/// Callbacks of a path walk
///
/// `visit` runs before the vertex's expressions are evaluated and before
/// any sub-path attached to it is walked. Returning false skips both;
/// declarations on a skipped vertex still bind indeterminate values.
pub trait PathVisitor {
    fn visit(&mut self, vertex: VertexRef<'_>, symbols: &dyn SymbolProvider) -> bool {
        match vertex.label() {
            label if label.is_dml() => self.visit_dml(vertex, symbols),
            NodeKind::StandardCondition => self.visit_condition(vertex, symbols),
            NodeKind::ReturnStatement => self.visit_return(vertex, symbols),
            _ => true,
        }
    }

    fn visit_dml(&mut self, _vertex: VertexRef<'_>, _symbols: &dyn SymbolProvider) -> bool {
        true
    }

    fn visit_condition(&mut self, _vertex: VertexRef<'_>, _symbols: &dyn SymbolProvider) -> bool {
        true
    }

    fn visit_return(&mut self, _vertex: VertexRef<'_>, _symbols: &dyn SymbolProvider) -> bool {
        true
    }

    /// After the vertex is evaluated, before its end scopes are popped
    fn after_visit(&mut self, _vertex: VertexRef<'_>, _symbols: &dyn SymbolProvider) {}

    /// Every evaluated expression, operands first
    fn on_expression(&mut self, _expression: VertexRef<'_>, _value: &ApexValue) {}

    /// A sub-path starts; parameters are already bound
    fn enter_method(&mut self, _method: VertexRef<'_>, _symbols: &dyn SymbolProvider) {}

    fn exit_method(&mut self, _method: VertexRef<'_>, _returned: Option<&ApexValue>) {}
}

/// Visitor that observes nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVisitor;

impl PathVisitor for NoopVisitor {}
