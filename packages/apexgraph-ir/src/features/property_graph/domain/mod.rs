//! Graph domain models

mod edge;
mod vertex;

pub use edge::{CfgEdgeKind, EdgeLabel, Polarity};
pub use vertex::{Vertex, VertexId};
