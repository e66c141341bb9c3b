mod collapsers;
mod constrainers;
mod excluders;
mod expander;
mod predicates;
mod registry;
mod resolver;
mod type_index;

pub use collapsers::ReturnValueCollapser;
pub use constrainers::{BooleanVariableConstrainer, NullCheckConstrainer};
pub use excluders::ContradictoryConstraintExcluder;
pub use expander::PathExpander;
pub use predicates::{DmlStatementPredicate, MethodCallPredicate};
pub use registry::PathExpansionRegistry;
pub use resolver::{ArgumentType, MethodResolver, VariableBinding, VariableOrigin};
pub use type_index::TypeIndex;
