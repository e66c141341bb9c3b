//! Expansion sites: where a path hands control to another method

use crate::features::property_graph::VertexId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteTarget {
    /// Resolved method, constructor or property accessor
    Method(VertexId),
    /// First reference to a class with static blocks runs its invoker
    StaticInit { class: String, invoker: VertexId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Expression that triggers the transfer; `None` for the implicit
    /// initialization of the path method's own class
    pub expression: Option<VertexId>,
    pub target: SiteTarget,
}

impl Site {
    pub fn call(expression: VertexId, method: VertexId) -> Self {
        Self {
            expression: Some(expression),
            target: SiteTarget::Method(method),
        }
    }

    pub fn static_init(expression: Option<VertexId>, class: impl Into<String>, invoker: VertexId) -> Self {
        Self {
            expression,
            target: SiteTarget::StaticInit {
                class: class.into(),
                invoker,
            },
        }
    }

    /// Method whose paths are spliced in
    pub fn callee(&self) -> VertexId {
        match &self.target {
            SiteTarget::Method(m) => *m,
            SiteTarget::StaticInit { invoker, .. } => *invoker,
        }
    }
}
