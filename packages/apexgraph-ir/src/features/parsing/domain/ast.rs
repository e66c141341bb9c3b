//! AST consumed by the graph builder
//!
//! A read-only tree of typed nodes. Each node has a kind tag, a span, a
//! property bag and ordered children (source order).

use crate::shared::models::{NodeKind, PropertyMap, PropertyValue, Span};

/// One AST node
#[derive(Debug, Clone)]
pub struct AstNode {
    pub kind: NodeKind,
    pub span: Span,
    pub properties: PropertyMap,
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            properties: PropertyMap::default(),
            children: Vec::new(),
        }
    }

    pub fn with_prop(mut self, key: &'static str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key, value.into());
        self
    }

    pub fn set_prop(&mut self, key: &'static str, value: impl Into<PropertyValue>) {
        self.properties.insert(key, value.into());
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn prop(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.prop(key).and_then(|v| v.as_str())
    }

    pub fn prop_bool(&self, key: &str) -> bool {
        self.prop(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn prop_list(&self, key: &str) -> &[String] {
        self.prop(key).and_then(|v| v.as_list()).unwrap_or(&[])
    }

    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &AstNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Depth-first visit; children are skipped when `enter` returns false
    pub fn accept(&self, visitor: &mut dyn AstVisitor) {
        if visitor.enter(self) {
            for child in &self.children {
                child.accept(visitor);
            }
        }
        visitor.exit(self);
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|c| c.size()).sum::<usize>()
    }
}

/// Fixed visiting interface over the tree
pub trait AstVisitor {
    fn enter(&mut self, node: &AstNode) -> bool;

    fn exit(&mut self, _node: &AstNode) {}
}

/// A named, parsed compilation unit
#[derive(Debug, Clone)]
pub struct CompilationDescriptor {
    pub name: String,
    pub root: AstNode,
}

impl CompilationDescriptor {
    pub fn new(name: impl Into<String>, root: AstNode) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::keys;

    struct KindCounter {
        kind: NodeKind,
        count: usize,
    }

    impl AstVisitor for KindCounter {
        fn enter(&mut self, node: &AstNode) -> bool {
            if node.kind == self.kind {
                self.count += 1;
            }
            node.kind != NodeKind::Method
        }
    }

    #[test]
    fn test_accept_prunes_children() {
        let literal = AstNode::new(NodeKind::LiteralExpression, Span::zero());
        let method = AstNode::new(NodeKind::Method, Span::zero()).with_child(literal.clone());
        let class = AstNode::new(NodeKind::UserClass, Span::zero())
            .with_prop(keys::NAME, "Foo")
            .with_child(method)
            .with_child(literal);

        let mut counter = KindCounter {
            kind: NodeKind::LiteralExpression,
            count: 0,
        };
        class.accept(&mut counter);
        assert_eq!(counter.count, 1);
        assert_eq!(class.size(), 4);
        assert_eq!(class.prop_str(keys::NAME), Some("Foo"));
    }
}
