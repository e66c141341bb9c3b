//! Path expansion entry points

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::features::path_enumeration::{ApexPath, MethodPathCache};
use crate::features::path_expansion::domain::ExpanderConfig;
use crate::features::path_expansion::infrastructure::{
    MethodResolver, PathExpander, PathExpansionRegistry,
};
use crate::features::property_graph::{GraphStore, VertexId};

/// Expansion of one method's paths under an expander configuration
pub trait PathExpansionUseCase {
    fn expand_method(&self, method: VertexId, config: &ExpanderConfig) -> Result<Vec<ApexPath>>;

    fn expand_path(&self, seed: &ApexPath, config: &ExpanderConfig) -> Result<Vec<ApexPath>>;
}

/// Expansion over one built graph, sharing a resolver, a path cache and a registry
pub struct PathExpansionService<'g> {
    resolver: MethodResolver<'g>,
    cache: MethodPathCache,
    registry: PathExpansionRegistry,
    engine: EngineConfig,
}

impl<'g> PathExpansionService<'g> {
    pub fn new(store: &'g GraphStore, engine: &EngineConfig) -> Self {
        Self {
            resolver: MethodResolver::new(store),
            cache: MethodPathCache::new(),
            registry: PathExpansionRegistry::from_config(engine),
            engine: engine.clone(),
        }
    }

    pub fn registry(&self) -> &PathExpansionRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &MethodPathCache {
        &self.cache
    }

    pub fn resolver(&self) -> &MethodResolver<'g> {
        &self.resolver
    }

    fn expander<'s>(&'s self, config: &'s ExpanderConfig) -> PathExpander<'s> {
        PathExpander::new(
            &self.resolver,
            &self.cache,
            &self.registry,
            config,
            self.engine.stack_depth(),
        )
    }
}

impl PathExpansionUseCase for PathExpansionService<'_> {
    fn expand_method(&self, method: VertexId, config: &ExpanderConfig) -> Result<Vec<ApexPath>> {
        self.expander(config).expand_method(method)
    }

    fn expand_path(&self, seed: &ApexPath, config: &ExpanderConfig) -> Result<Vec<ApexPath>> {
        self.expander(config).expand(seed)
    }
}

/// One-shot expansion of every forward path of `method`
pub fn expand_paths(
    store: &GraphStore,
    engine: &EngineConfig,
    method: VertexId,
    config: &ExpanderConfig,
) -> Result<Vec<ApexPath>> {
    PathExpansionService::new(store, engine).expand_method(method, config)
}
