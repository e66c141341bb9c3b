//! Graph builder results

/// Counts reported after a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub units: usize,
    pub vertices: usize,
    pub edges: usize,
    pub inheritance_edges: usize,
    pub unresolved_supertypes: usize,
}
