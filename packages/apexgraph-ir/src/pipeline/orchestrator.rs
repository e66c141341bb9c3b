//! Analysis pipeline
//!
//! Owns one built graph plus the per-method path cache that every expansion
//! over it shares. Each `paths_for` / `expand_all` call is one expansion run
//! with its own [`PathExpansionRegistry`]; inside `expand_all` the registry
//! is shared by every worker so the expansion limit holds across methods.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::result::{MethodExpansion, PipelineStats};
use crate::config::EngineConfig;
use crate::errors::{EngineError, Result};
use crate::features::graph_builder::{BuildStats, GraphBuilder};
use crate::features::parsing::{parse_compilation_units, CompilationDescriptor};
use crate::features::path_enumeration::{ApexPath, MethodPathCache};
use crate::features::path_expansion::{
    ExpanderConfig, MethodResolver, PathExpander, PathExpansionRegistry,
};
use crate::features::property_graph::{GraphStore, VertexId};
use crate::features::symbolic_execution::{
    PathVisitor, SymbolicExecutionService, WalkOutcome,
};
use crate::features::vertex_model::{MethodVertex, VertexRef};
use crate::shared::constants::keys;
use crate::shared::models::NodeKind;

pub struct AnalysisPipeline {
    config: EngineConfig,
    store: GraphStore,
    build_stats: BuildStats,
    cache: MethodPathCache,
}

impl AnalysisPipeline {
    /// Pipeline over an empty graph; call [`build`](Self::build) next
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            store: GraphStore::new(),
            build_stats: BuildStats::default(),
            cache: MethodPathCache::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Replace the graph with one built from `units`
    ///
    /// The graph is never updated incrementally: every build starts over and
    /// drops cached paths.
    pub fn build(&mut self, units: &[CompilationDescriptor]) -> Result<BuildStats> {
        let (store, stats) = GraphBuilder::new(&self.config).build_with_stats(units)?;
        self.store = store;
        self.build_stats = stats;
        self.cache.clear();
        info!(
            units = stats.units,
            vertices = stats.vertices,
            edges = stats.edges,
            "pipeline graph built"
        );
        Ok(stats)
    }

    /// Parse `(name, source)` pairs, then [`build`](Self::build)
    pub fn build_sources<'a, I>(&mut self, sources: I) -> Result<BuildStats>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let units = parse_compilation_units(sources)?;
        self.build(&units)
    }

    /// Concrete methods of user code, in vertex order
    pub fn methods(&self) -> Vec<VertexId> {
        self.store
            .vertices_with_label(NodeKind::Method)
            .iter()
            .copied()
            .filter(|m| {
                let method = MethodVertex(VertexRef::new(&self.store, *m));
                !method.is_standard() && !method.is_abstract()
            })
            .collect()
    }

    /// Method `name` declared directly in `class` (case-insensitive);
    /// the first overload when several match
    pub fn find_method(&self, class: &str, name: &str) -> Option<VertexId> {
        self.store
            .query_label(NodeKind::Method)
            .has_ci(keys::DEFINING_TYPE, class)
            .has_ci(keys::NAME, name)
            .to_vec()
            .into_iter()
            .next()
    }

    /// Every expanded forward path of `method`
    pub fn paths_for(&self, method: VertexId, config: &ExpanderConfig) -> Result<Vec<ApexPath>> {
        let resolver = MethodResolver::new(&self.store);
        let registry = PathExpansionRegistry::from_config(&self.config);
        self.expand_one(&resolver, &registry, method, config)
            .map(|expansion| expansion.paths)
    }

    /// Expand `method` and walk each of its paths under `visitor`
    pub fn walk(
        &self,
        method: VertexId,
        config: &ExpanderConfig,
        visitor: &mut dyn PathVisitor,
    ) -> Result<Vec<WalkOutcome>> {
        let paths = self.paths_for(method, config)?;
        SymbolicExecutionService::new(&self.store, &self.config).walk_all(&paths, visitor)
    }

    /// Expand independent top-level methods, in parallel when the
    /// configuration asks for it
    ///
    /// Results keep the order of `methods`. Reaching the expansion limit in
    /// any worker fails the whole run.
    pub fn expand_all(&self, methods: &[VertexId], config: &ExpanderConfig) -> Result<Vec<MethodExpansion>> {
        let resolver = MethodResolver::new(&self.store);
        let registry = PathExpansionRegistry::from_config(&self.config);

        #[cfg(feature = "parallel")]
        let expansions: Result<Vec<MethodExpansion>> = if self.config.parallel {
            methods
                .par_iter()
                .map(|&m| self.expand_one(&resolver, &registry, m, config))
                .collect()
        } else {
            methods
                .iter()
                .map(|&m| self.expand_one(&resolver, &registry, m, config))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let expansions: Result<Vec<MethodExpansion>> = methods
            .iter()
            .map(|&m| self.expand_one(&resolver, &registry, m, config))
            .collect();

        match &expansions {
            Ok(done) => info!(
                methods = done.len(),
                paths = done.iter().map(MethodExpansion::path_count).sum::<usize>(),
                forks = registry.forks(),
                "expansion run finished"
            ),
            Err(EngineError::PathExpansionLimitReached { limit }) => {
                warn!(limit, forks = registry.forks(), "expansion run aborted at the limit")
            }
            Err(_) => {}
        }
        expansions
    }

    fn expand_one(
        &self,
        resolver: &MethodResolver<'_>,
        registry: &PathExpansionRegistry,
        method: VertexId,
        config: &ExpanderConfig,
    ) -> Result<MethodExpansion> {
        let mut expander = PathExpander::new(resolver, &self.cache, registry, config, self.config.stack_depth());
        let paths = expander.expand_method(method)?;
        debug!(method = %method, paths = paths.len(), "method expanded");
        Ok(MethodExpansion { method, paths })
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            build: self.build_stats,
            cached_methods: self.cache.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::symbolic_execution::NoopVisitor;

    const SOURCE: &str = "public class Greeter { \
        String greet(String name) { if (name == null) { return 'nobody'; } return 'Hi ' + name; } \
        String run() { return greet('Bob'); } \
        abstract class Shape { abstract Integer area(); } }";

    fn pipeline(parallel: bool) -> AnalysisPipeline {
        let config = EngineConfig {
            include_standard_library: false,
            parallel,
            ..EngineConfig::default()
        };
        let mut pipeline = AnalysisPipeline::new(config);
        pipeline.build_sources([("Greeter.cls", SOURCE)]).unwrap();
        pipeline
    }

    #[test]
    fn test_methods_skip_abstract_declarations() {
        let pipeline = pipeline(false);
        let names: Vec<&str> = pipeline
            .methods()
            .into_iter()
            .filter_map(|m| pipeline.store().prop_str(m, keys::NAME))
            .collect();
        assert!(names.contains(&"greet"));
        assert!(names.contains(&"run"));
        assert!(!names.contains(&"area"));
    }

    #[test]
    fn test_paths_and_walk() {
        let pipeline = pipeline(false);
        let run = pipeline.find_method("greeter", "RUN").unwrap();
        let paths = pipeline.paths_for(run, &ExpanderConfig::default()).unwrap();
        assert_eq!(paths.len(), 2);

        let outcomes = pipeline.walk(run, &ExpanderConfig::default(), &mut NoopVisitor).unwrap();
        let returned: Vec<Option<String>> = outcomes
            .iter()
            .map(|o| o.returned.as_ref().and_then(|v| v.as_str()).map(str::to_string))
            .collect();
        assert!(returned.contains(&Some("Hi Bob".to_string())));
        assert!(pipeline.stats().cached_methods >= 2);
    }

    #[test]
    fn test_parallel_and_sequential_runs_agree() {
        let sequential = pipeline(false);
        let parallel = pipeline(true);
        let count = |p: &AnalysisPipeline| -> Vec<usize> {
            p.expand_all(&p.methods(), &ExpanderConfig::default())
                .unwrap()
                .iter()
                .map(MethodExpansion::path_count)
                .collect()
        };
        assert_eq!(count(&sequential), count(&parallel));
    }

    #[test]
    fn test_rebuild_drops_cached_paths() {
        let mut pipeline = pipeline(false);
        let run = pipeline.find_method("Greeter", "run").unwrap();
        pipeline.paths_for(run, &ExpanderConfig::default()).unwrap();
        assert!(pipeline.stats().cached_methods > 0);

        pipeline.build_sources([("Other.cls", "public class Other { void go() {} }")]).unwrap();
        assert_eq!(pipeline.stats().cached_methods, 0);
        assert!(pipeline.find_method("Greeter", "run").is_none());
        assert!(pipeline.find_method("Other", "go").is_some());
    }
}
