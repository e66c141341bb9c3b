/*
 * apexgraph-ir - Apex static-analysis core
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (NodeKind, Span, PropertyValue, keys)
 * - features/    : Vertical slices (parsing → graph_builder → flow_graph →
 *                  path_enumeration → path_expansion → symbolic_execution)
 * - pipeline/    : Orchestration
 * - config/      : EngineConfig, presets, YAML I/O
 *
 * Parallelism:
 * - Rayon across independent top-level method expansions
 * - One path walk is always sequential
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Resolver helpers thread graph context through
#![allow(clippy::type_complexity)] // Site maps keyed by vertex
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::upper_case_acronyms)] // DML, SOQL, CFG naming

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Pipeline orchestration
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{EngineConfig, Limit, Preset};
pub use errors::{EngineError, Result, UserActionError};
pub use features::graph_builder::build_graph;
pub use features::parsing::{parse_compilation_unit, CompilationDescriptor};
pub use features::path_enumeration::{enumerate_forward, enumerate_reverse, ApexPath};
pub use features::path_expansion::{expand_paths, ExpanderConfig};
pub use features::property_graph::{GraphStore, VertexId};
pub use features::symbolic_execution::{walk_path, ApexValue, PathVisitor, SymbolProvider};
pub use pipeline::AnalysisPipeline;
