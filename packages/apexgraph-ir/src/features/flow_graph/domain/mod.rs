//! Continuations and scope frames

use crate::features::property_graph::VertexId;
use crate::shared::models::NodeKind;

/// Where control goes once a statement completes normally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Continuation {
    /// `None`: the method ends
    pub target: Option<VertexId>,
    /// Scopes left on the way, innermost first
    pub end_scopes: Vec<NodeKind>,
}

impl Continuation {
    /// Leave the method
    pub fn exit() -> Self {
        Self::default()
    }

    pub fn to(target: VertexId) -> Self {
        Self {
            target: Some(target),
            end_scopes: Vec::new(),
        }
    }

    /// Same target, after leaving one more (inner) scope
    pub fn leaving(&self, kind: NodeKind) -> Self {
        let mut end_scopes = Vec::with_capacity(self.end_scopes.len() + 1);
        end_scopes.push(kind);
        end_scopes.extend(self.end_scopes.iter().copied());
        Self {
            target: self.target,
            end_scopes,
        }
    }
}

/// Loop exits recorded on a loop frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopExits {
    /// Where `break` goes (the loop's own continuation)
    pub on_break: Continuation,
    /// Where `continue` goes, when it stays inside the loop
    pub on_continue: Option<VertexId>,
}

/// One open scope while synthesizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFrame {
    pub kind: NodeKind,
    pub loop_exits: Option<LoopExits>,
}

impl ScopeFrame {
    pub fn scope(kind: NodeKind) -> Self {
        Self {
            kind,
            loop_exits: None,
        }
    }

    pub fn looping(kind: NodeKind, on_break: Continuation, on_continue: Option<VertexId>) -> Self {
        Self {
            kind,
            loop_exits: Some(LoopExits {
                on_break,
                on_continue,
            }),
        }
    }
}
