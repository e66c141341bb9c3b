//! Graph Builder UseCase

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::features::flow_graph::synthesize_all;
use crate::features::graph_builder::domain::BuildStats;
use crate::features::graph_builder::infrastructure::inheritance::InheritanceResolver;
use crate::features::graph_builder::infrastructure::materializer::Materializer;
use crate::features::graph_builder::infrastructure::standard_library::standard_library_units;
use crate::features::graph_builder::infrastructure::synthesizers::synthesize_unit;
use crate::features::graph_builder::infrastructure::validator::check_reachability;
use crate::features::parsing::CompilationDescriptor;
use crate::features::property_graph::GraphStore;

/// Graph Builder UseCase Trait
pub trait GraphBuilderUseCase: Send + Sync {
    fn build(&self, units: &[CompilationDescriptor]) -> Result<GraphStore>;
}

/// Builds a fresh store per call; nothing is cached between builds
#[derive(Debug, Clone)]
pub struct GraphBuilder<'c> {
    config: &'c EngineConfig,
}

impl<'c> GraphBuilder<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Build the full graph, CFG edges included
    ///
    /// ## Phases
    /// 1. Synthesize implicit constructs and reject unreachable code (per unit)
    /// 2. Materialize user units, then standard-library stubs
    /// 3. Resolve inheritance across all units
    /// 4. Synthesize CFG edges for every method
    pub fn build_with_stats(
        &self,
        units: &[CompilationDescriptor],
    ) -> Result<(GraphStore, BuildStats)> {
        let mut store = GraphStore::new();
        let mut stats = BuildStats::default();

        // Phase 1 + 2: user code
        for unit in units {
            self.materialize_unit(&mut store, unit, false)?;
            stats.units += 1;
        }

        // Phase 2: bundled stubs
        if self.config.include_standard_library {
            for unit in standard_library_units()? {
                self.materialize_unit(&mut store, unit, true)?;
                stats.units += 1;
            }
        }
        debug!(units = stats.units, vertices = store.vertex_count(), "materialized units");

        // Phase 3: inheritance
        let inheritance = InheritanceResolver::new(&mut store).resolve_all()?;
        stats.inheritance_edges = inheritance.edges;
        stats.unresolved_supertypes = inheritance.unresolved;

        // Phase 4: control flow
        let methods = synthesize_all(&mut store)?;
        debug!(methods, "synthesized control flow");

        stats.vertices = store.vertex_count();
        stats.edges = store.edge_count();
        info!(
            units = stats.units,
            vertices = stats.vertices,
            edges = stats.edges,
            "graph build complete"
        );
        Ok((store, stats))
    }

    fn materialize_unit(
        &self,
        store: &mut GraphStore,
        unit: &CompilationDescriptor,
        is_standard: bool,
    ) -> Result<()> {
        let mut root = unit.root.clone();
        synthesize_unit(&mut root);
        check_reachability(&unit.name, &root)?;
        Materializer::new(store, &unit.name, is_standard).materialize(&root);
        Ok(())
    }
}

impl GraphBuilderUseCase for GraphBuilder<'_> {
    fn build(&self, units: &[CompilationDescriptor]) -> Result<GraphStore> {
        self.build_with_stats(units).map(|(store, _)| store)
    }
}

/// Build a graph from parsed units with the given configuration
pub fn build_graph(config: &EngineConfig, units: &[CompilationDescriptor]) -> Result<GraphStore> {
    GraphBuilder::new(config).build(units)
}
