//! Symbol table of one path walk: heap, method frames and static scopes

use super::heap::Heap;
use super::scope::{MethodFrame, StaticScopes};
use super::value::{ApexValue, HeapRef};
use crate::features::property_graph::VertexId;
use crate::features::symbolic_execution::ports::SymbolProvider;

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub heap: Heap,
    pub statics: StaticScopes,
    frames: Vec<MethodFrame>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing static snapshot
    pub fn with_statics(statics: StaticScopes) -> Self {
        Self {
            statics,
            ..Self::default()
        }
    }

    pub fn push_frame(&mut self, frame: MethodFrame) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<MethodFrame> {
        self.frames.pop()
    }

    pub fn frame(&self) -> Option<&MethodFrame> {
        self.frames.last()
    }

    pub fn frame_mut(&mut self) -> Option<&mut MethodFrame> {
        self.frames.last_mut()
    }

    /// Method frames on the call stack
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    /// Local, then field of `this`, then static of the running class
    pub fn value_of(&self, name: &str) -> Option<ApexValue> {
        let frame = self.frame()?;
        if let Some(binding) = frame.lookup(name) {
            return Some(binding.value.clone());
        }
        if let Some(value) = frame.this.and_then(|this| self.heap.field(this, name)) {
            return Some(value.clone());
        }
        let class = frame.class.as_deref()?;
        self.statics
            .get(class)
            .and_then(|scope| scope.get(name))
            .map(|binding| binding.value.clone())
    }
}

impl SymbolProvider for SymbolTable {
    fn lookup(&self, name: &str) -> Option<ApexValue> {
        self.value_of(name)
    }

    fn this(&self) -> Option<HeapRef> {
        self.frame().and_then(|f| f.this)
    }

    fn heap(&self) -> &Heap {
        &self.heap
    }

    fn static_value(&self, class: &str, name: &str) -> Option<ApexValue> {
        self.statics
            .get(class)
            .and_then(|scope| scope.get(name))
            .map(|binding| binding.value.clone())
    }

    fn current_method(&self) -> Option<VertexId> {
        self.frame().and_then(|f| f.method)
    }

    fn scope_depth(&self) -> usize {
        self.frame().map_or(0, |f| f.depth())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::symbolic_execution::domain::heap::HeapObject;

    #[test]
    fn test_lookup_order() {
        let mut table = SymbolTable::new();
        let this = table.heap.allocate(HeapObject::instance("Counter"));
        table.heap.set_field(this, "total", ApexValue::integer(7));
        table.statics.entry("Counter").declare("limit", "Integer", ApexValue::integer(10));
        table.statics.entry("Counter").declare("total", "Integer", ApexValue::integer(-1));

        let mut frame = MethodFrame::new(None, Some("Counter".into()), Some(this));
        frame.declare("step", "Integer", ApexValue::integer(1));
        table.push_frame(frame);

        assert_eq!(table.lookup("STEP").and_then(|v| v.as_i64()), Some(1));
        assert_eq!(table.lookup("total").and_then(|v| v.as_i64()), Some(7));
        assert_eq!(table.lookup("limit").and_then(|v| v.as_i64()), Some(10));
        assert_eq!(table.lookup("missing"), None);
        assert_eq!(table.this(), Some(this));
        assert_eq!(table.scope_depth(), 0);
    }
}
