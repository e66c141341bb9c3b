//! Graph Builder
//!
//! Compilation descriptors → populated Property Graph Store.
//!
//! Phases:
//! 1. Materialize every unit (one vertex per AST node, parent/child edges,
//!    case-safe shadows) and synthesize implicit constructs
//! 2. Resolve `extends` / `implements` across all units
//! 3. Synthesize CFG edges for every method (`features::flow_graph`)

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{build_graph, GraphBuilder, GraphBuilderUseCase};
pub use domain::BuildStats;
pub use infrastructure::standard_library::standard_library_units;
