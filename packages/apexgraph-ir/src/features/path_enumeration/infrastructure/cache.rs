//! Per-method forward path cache
//!
//! Forward paths of a method depend only on the (immutable) graph, so they
//! are enumerated once per method and shared. Safe to use from rayon workers.

use std::sync::Arc;

use dashmap::DashMap;

use crate::errors::Result;
use crate::features::path_enumeration::domain::ApexPath;
use crate::features::path_enumeration::infrastructure::PathEnumerator;
use crate::features::property_graph::{GraphStore, VertexId};

#[derive(Debug, Default)]
pub struct MethodPathCache {
    paths: DashMap<VertexId, Arc<Vec<ApexPath>>>,
}

impl MethodPathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward paths for `method`, enumerating on first request
    pub fn get_or_enumerate(&self, store: &GraphStore, method: VertexId) -> Result<Arc<Vec<ApexPath>>> {
        if let Some(paths) = self.paths.get(&method) {
            return Ok(Arc::clone(paths.value()));
        }
        // enumerate outside the shard lock; a racing worker may do the same work
        let paths = Arc::new(PathEnumerator::new(store).forward(method)?);
        Ok(Arc::clone(self.paths.entry(method).or_insert(paths).value()))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&self) {
        self.paths.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::features::graph_builder::build_graph;
    use crate::features::parsing::parse_compilation_unit;
    use crate::shared::models::NodeKind;

    #[test]
    fn test_second_request_is_shared() {
        let config = EngineConfig {
            include_standard_library: false,
            ..EngineConfig::default()
        };
        let unit = parse_compilation_unit("A.cls", "class A { void m(Boolean b) { if (b) { x(); } } }").unwrap();
        let store = build_graph(&config, &[unit]).unwrap();
        let method = store.vertices_with_label(NodeKind::Method)[0];

        let cache = MethodPathCache::new();
        let first = cache.get_or_enumerate(&store, method).unwrap();
        let second = cache.get_or_enumerate(&store, method).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert_eq!(cache.len(), 1);
    }
}
