/*
 * Path Expansion Ports
 *
 * Plugin seams of the expander. Each plugin kind is a small trait; an
 * `ExpanderConfig` holds ordered lists of them and the expander calls them
 * in registration order:
 *
 *   constrainers  → per path vertex, after its invocations are expanded
 *   vertex preds  → per path vertex and per evaluated expression
 *   excluders     → per partial path, after each vertex's constraints
 *   collapsers    → per invocation site, over the callee's finished paths
 */

use crate::features::path_enumeration::{ApexPath, Constraint, PathVertex};
use crate::features::path_expansion::infrastructure::MethodResolver;
use crate::features::property_graph::{GraphStore, VertexId};
use crate::features::vertex_model::VertexRef;

/// What a constrainer sees while a path is expanded
#[derive(Clone, Copy)]
pub struct ForkContext<'a> {
    pub store: &'a GraphStore,
    /// Name and call resolution over the same graph
    pub resolver: &'a MethodResolver<'a>,
    /// Partial path under expansion (invocations up to `vertex` recorded)
    pub path: &'a ApexPath,
    pub vertex: PathVertex,
}

impl<'a> ForkContext<'a> {
    pub fn new(resolver: &'a MethodResolver<'a>, path: &'a ApexPath, vertex: PathVertex) -> Self {
        Self {
            store: resolver.store(),
            resolver,
            path,
            vertex,
        }
    }

    pub fn vertex_ref(&self) -> VertexRef<'a> {
        VertexRef::new(self.store, self.vertex.id)
    }

    /// Method whose variables the constraints refer to
    pub fn scope(&self) -> VertexId {
        self.path.method()
    }
}

/// Verdict of an excluder on one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Exclude,
}

/// Annotates a path with facts learned at one vertex
pub trait PathConstrainer: Send + Sync {
    fn name(&self) -> &'static str;

    fn constrain(&self, ctx: &ForkContext<'_>) -> Vec<Constraint>;
}

/// Vetoes infeasible paths
pub trait PathExcluder: Send + Sync {
    fn name(&self) -> &'static str;

    fn decide(&self, store: &GraphStore, path: &ApexPath) -> Decision;
}

/// Merges equivalent callee paths of one invocation site
pub trait PathCollapser: Send + Sync {
    fn name(&self) -> &'static str;

    /// Paths with equal keys are interchangeable; `None` means never merge
    fn collapse_key(&self, store: &GraphStore, path: &ApexPath) -> Option<String>;
}

/// Marks vertices worth tracking in path metadata
pub trait VertexPredicate: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, vertex: VertexRef<'_>) -> bool;
}
