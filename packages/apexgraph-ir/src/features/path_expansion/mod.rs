//! Path expansion
//!
//! Splices the paths of invoked methods into a seed path. Each invocation
//! on the path is statically resolved (overloads, constructors, property
//! accessors, static initializers) and the outer path forks once per callee
//! path. Plugins configured through [`ExpanderConfig`] annotate, veto or
//! merge the forks; a shared [`PathExpansionRegistry`] enforces the
//! expansion limit across workers.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{expand_paths, PathExpansionService, PathExpansionUseCase};
pub use domain::{ExpanderConfig, ExpanderConfigBuilder, Site, SiteTarget};
pub use infrastructure::{
    ArgumentType, BooleanVariableConstrainer, ContradictoryConstraintExcluder,
    DmlStatementPredicate, MethodCallPredicate, MethodResolver, NullCheckConstrainer,
    PathExpander, PathExpansionRegistry, ReturnValueCollapser, TypeIndex, VariableBinding,
    VariableOrigin,
};
pub use ports::{
    Decision, ForkContext, PathCollapser, PathConstrainer, PathExcluder, VertexPredicate,
};
