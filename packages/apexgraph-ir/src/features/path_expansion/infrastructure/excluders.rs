//! Built-in excluders

use rustc_hash::FxHashMap;

use crate::features::path_enumeration::{ApexPath, ConstraintKind};
use crate::features::path_expansion::ports::{Decision, PathExcluder};
use crate::features::property_graph::GraphStore;

/// Drops a path once it records a fact that contradicts an earlier, still
/// valid fact about the same variable of the path's own method
#[derive(Debug, Default, Clone, Copy)]
pub struct ContradictoryConstraintExcluder;

impl PathExcluder for ContradictoryConstraintExcluder {
    fn name(&self) -> &'static str {
        "ContradictoryConstraintExcluder"
    }

    fn decide(&self, _store: &GraphStore, path: &ApexPath) -> Decision {
        let scope = path.method();
        let mut current: FxHashMap<&str, ConstraintKind> = FxHashMap::default();
        for constraint in path.metadata().constraints.iter().filter(|c| c.scope == scope) {
            let variable = constraint.variable.as_str();
            if constraint.kind == ConstraintKind::Reset {
                current.remove(variable);
                continue;
            }
            if let Some(previous) = current.get(variable) {
                if previous.opposite() == Some(constraint.kind) {
                    return Decision::Exclude;
                }
            }
            current.insert(variable, constraint.kind);
        }
        Decision::Keep
    }
}
