//! Pipeline results

use serde_json::{json, Value};

use crate::features::graph_builder::BuildStats;
use crate::features::path_enumeration::ApexPath;
use crate::features::property_graph::VertexId;

/// Expanded paths of one top-level method
#[derive(Debug, Clone)]
pub struct MethodExpansion {
    pub method: VertexId,
    pub paths: Vec<ApexPath>,
}

impl MethodExpansion {
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// True when every path was dropped (stack depth) or the method has no body
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub build: BuildStats,
    /// Methods with cached forward paths
    pub cached_methods: usize,
}

impl PipelineStats {
    /// Run summary for embedding applications (scan reports, logs)
    pub fn to_json(&self) -> Value {
        json!({
            "build": {
                "units": self.build.units,
                "vertices": self.build.vertices,
                "edges": self.build.edges,
                "inheritance_edges": self.build.inheritance_edges,
                "unresolved_supertypes": self.build.unresolved_supertypes,
            },
            "cached_methods": self.cached_methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_summary_json() {
        let stats = PipelineStats {
            build: BuildStats {
                units: 2,
                vertices: 40,
                edges: 39,
                inheritance_edges: 1,
                unresolved_supertypes: 0,
            },
            cached_methods: 3,
        };
        let summary = stats.to_json();
        assert_eq!(summary["build"]["units"], 2);
        assert_eq!(summary["build"]["inheritance_edges"], 1);
        assert_eq!(summary["cached_methods"], 3);
    }
}
