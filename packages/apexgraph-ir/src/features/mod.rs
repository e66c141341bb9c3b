//! Feature modules - each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure models (no external dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Implementations
//!
//! Order of the analysis: parsing → graph_builder (+ flow_graph) →
//! path_enumeration → path_expansion → symbolic_execution.

pub mod flow_graph;
pub mod graph_builder;
pub mod parsing;
pub mod path_enumeration;
pub mod path_expansion;
pub mod property_graph;
pub mod symbolic_execution;
pub mod vertex_model;
