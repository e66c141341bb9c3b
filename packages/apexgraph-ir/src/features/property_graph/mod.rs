//! Property Graph Store
//!
//! In-memory directed graph of typed vertices (one per materialized AST
//! node) and labeled edges:
//! - Child: structural parent → child, ordered by `ChildIdx`
//! - CfgPath: control flow inside one method
//! - ExtensionOf/ExtendedBy, ImplementationOf/ImplementedBy: inheritance pairs
//!
//! Vertices are addressed by stable integer ids (petgraph node indices);
//! the store never removes vertices, so ids stay valid for its lifetime.

pub mod domain;
pub mod infrastructure;

pub use domain::{CfgEdgeKind, EdgeLabel, Polarity, Vertex, VertexId};
pub use infrastructure::{GraphQuery, GraphStore};
