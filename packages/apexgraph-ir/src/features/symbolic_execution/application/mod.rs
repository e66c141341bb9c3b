//! Symbolic execution entry points

use tracing::debug;

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::features::path_enumeration::ApexPath;
use crate::features::path_expansion::MethodResolver;
use crate::features::property_graph::GraphStore;
use crate::features::symbolic_execution::domain::StaticScopes;
use crate::features::symbolic_execution::infrastructure::{PathWalker, WalkOutcome};
use crate::features::symbolic_execution::ports::PathVisitor;

/// Walking expanded paths under a visitor
pub trait SymbolicExecutionUseCase {
    fn walk(&self, path: &ApexPath, visitor: &mut dyn PathVisitor) -> Result<WalkOutcome>;

    /// Walk starting from class statics left by an earlier walk
    fn walk_from(
        &self,
        path: &ApexPath,
        statics: StaticScopes,
        visitor: &mut dyn PathVisitor,
    ) -> Result<WalkOutcome>;
}

pub struct SymbolicExecutionService<'g> {
    resolver: MethodResolver<'g>,
    engine: EngineConfig,
}

impl<'g> SymbolicExecutionService<'g> {
    pub fn new(store: &'g GraphStore, engine: &EngineConfig) -> Self {
        Self {
            resolver: MethodResolver::new(store),
            engine: engine.clone(),
        }
    }

    pub fn resolver(&self) -> &MethodResolver<'g> {
        &self.resolver
    }

    /// Walk every path in order; each walk starts from a fresh symbol table
    pub fn walk_all(&self, paths: &[ApexPath], visitor: &mut dyn PathVisitor) -> Result<Vec<WalkOutcome>> {
        let outcomes = paths
            .iter()
            .map(|path| self.walk(path, &mut *visitor))
            .collect::<Result<Vec<_>>>()?;
        debug!(paths = outcomes.len(), "walked paths");
        Ok(outcomes)
    }
}

impl SymbolicExecutionUseCase for SymbolicExecutionService<'_> {
    fn walk(&self, path: &ApexPath, visitor: &mut dyn PathVisitor) -> Result<WalkOutcome> {
        PathWalker::new(&self.resolver, &self.engine, visitor).walk(path)
    }

    fn walk_from(
        &self,
        path: &ApexPath,
        statics: StaticScopes,
        visitor: &mut dyn PathVisitor,
    ) -> Result<WalkOutcome> {
        PathWalker::new(&self.resolver, &self.engine, visitor)
            .with_statics(statics)
            .walk(path)
    }
}

/// One-shot walk of `path` over `store`
pub fn walk_path(
    store: &GraphStore,
    engine: &EngineConfig,
    path: &ApexPath,
    visitor: &mut dyn PathVisitor,
) -> Result<WalkOutcome> {
    SymbolicExecutionService::new(store, engine).walk(path, visitor)
}
