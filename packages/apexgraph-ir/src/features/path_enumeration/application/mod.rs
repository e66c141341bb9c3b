//! Path enumeration entry points

use crate::errors::Result;
use crate::features::path_enumeration::domain::ApexPath;
use crate::features::path_enumeration::infrastructure::PathEnumerator;
use crate::features::property_graph::{GraphStore, VertexId};

/// All forward paths of a method, in CFG edge order
pub fn enumerate_forward(store: &GraphStore, method: VertexId) -> Result<Vec<ApexPath>> {
    PathEnumerator::new(store).forward(method)
}

/// All paths from the enclosing method's entry to `target`
pub fn enumerate_reverse(store: &GraphStore, target: VertexId) -> Result<Vec<ApexPath>> {
    PathEnumerator::new(store).reverse(target)
}
