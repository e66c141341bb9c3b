use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::constants::keys;
use crate::shared::models::{NodeKind, PropertyMap, PropertyValue, Span};

/// Stable vertex identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u32);

impl VertexId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub(crate) fn node(&self) -> NodeIndex {
        NodeIndex::new(self.index())
    }

    pub(crate) fn from_node(node: NodeIndex) -> Self {
        Self(node.index() as u32)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A vertex: label, source span and property bag
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub label: NodeKind,
    pub span: Span,
    pub properties: PropertyMap,
}

impl Vertex {
    pub fn new(id: VertexId, label: NodeKind, span: Span) -> Self {
        let mut properties = PropertyMap::default();
        properties.insert(keys::BEGIN_LINE, PropertyValue::Int(span.start_line as i64));
        properties.insert(keys::BEGIN_COLUMN, PropertyValue::Int(span.start_col as i64));
        properties.insert(keys::END_LINE, PropertyValue::Int(span.end_line as i64));
        Self {
            id,
            label,
            span,
            properties,
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_int())
    }

    pub fn get_list(&self, key: &str) -> &[String] {
        self.get(key).and_then(|v| v.as_list()).unwrap_or(&[])
    }

    /// Set a property and, for name-like keys, its lower-cased shadow
    pub fn set(&mut self, key: &'static str, value: PropertyValue) {
        if let Some(shadow) = keys::case_safe_key(key) {
            self.properties.insert(shadow, value.to_case_safe());
        }
        self.properties.insert(key, value);
    }

    pub fn begin_line(&self) -> u32 {
        self.span.start_line
    }
}
