//! Per-path metadata accumulated by expander plugins

use serde::{Deserialize, Serialize};

use crate::features::property_graph::VertexId;

/// What a constrainer learned about a variable at some point of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    IsNull,
    NotNull,
    IsTrue,
    IsFalse,
    /// The variable was reassigned; earlier facts no longer hold
    Reset,
}

impl ConstraintKind {
    /// The fact that cannot hold together with this one
    pub fn opposite(&self) -> Option<ConstraintKind> {
        match self {
            ConstraintKind::IsNull => Some(ConstraintKind::NotNull),
            ConstraintKind::NotNull => Some(ConstraintKind::IsNull),
            ConstraintKind::IsTrue => Some(ConstraintKind::IsFalse),
            ConstraintKind::IsFalse => Some(ConstraintKind::IsTrue),
            ConstraintKind::Reset => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    /// Method whose scope the variable lives in
    pub scope: VertexId,
    /// Lower-cased variable name
    pub variable: String,
    pub kind: ConstraintKind,
    /// Vertex that produced the constraint
    pub origin: VertexId,
}

impl Constraint {
    pub fn new(scope: VertexId, variable: &str, kind: ConstraintKind, origin: VertexId) -> Self {
        Self {
            scope,
            variable: variable.to_lowercase(),
            kind,
            origin,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMetadata {
    /// Constraints in path order (callee constraints appear where the call forked)
    pub constraints: Vec<Constraint>,
    /// Vertices matched by the configured vertex predicates, in path order
    pub tracked: Vec<VertexId>,
    /// Names of collapsers that merged sub-paths into this one
    pub collapsed_by: Vec<&'static str>,
}

impl PathMetadata {
    /// Append another path's metadata (a sub-path forked in)
    pub fn absorb(&mut self, other: &PathMetadata) {
        self.constraints.extend(other.constraints.iter().cloned());
        self.tracked.extend(other.tracked.iter().copied());
        for name in &other.collapsed_by {
            if !self.collapsed_by.contains(name) {
                self.collapsed_by.push(name);
            }
        }
    }

    /// Latest non-reset fact about a variable, if no reset came after it
    pub fn current_fact(&self, scope: VertexId, variable: &str) -> Option<ConstraintKind> {
        let variable = variable.to_lowercase();
        self.constraints
            .iter()
            .rev()
            .find(|c| c.scope == scope && c.variable == variable)
            .map(|c| c.kind)
            .filter(|k| *k != ConstraintKind::Reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_fact_respects_reset() {
        let scope = VertexId(1);
        let mut metadata = PathMetadata::default();
        metadata
            .constraints
            .push(Constraint::new(scope, "X", ConstraintKind::IsNull, VertexId(5)));
        assert_eq!(metadata.current_fact(scope, "x"), Some(ConstraintKind::IsNull));

        metadata
            .constraints
            .push(Constraint::new(scope, "x", ConstraintKind::Reset, VertexId(6)));
        assert_eq!(metadata.current_fact(scope, "x"), None);
        assert_eq!(metadata.current_fact(VertexId(2), "x"), None);
    }

    #[test]
    fn test_opposites() {
        assert_eq!(ConstraintKind::IsNull.opposite(), Some(ConstraintKind::NotNull));
        assert_eq!(ConstraintKind::IsFalse.opposite(), Some(ConstraintKind::IsTrue));
        assert_eq!(ConstraintKind::Reset.opposite(), None);
    }
}
