//! Path enumeration
//!
//! Every acyclic execution path through a method body (forward), or every
//! path from the method entry to a given vertex (reverse). Loops contribute
//! one pass through the body plus the zero-iteration path when the loop
//! allows it; a switch forks once per when-block.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{enumerate_forward, enumerate_reverse};
pub use domain::{
    ApexPath, Constraint, ConstraintKind, PathMetadata, PathVertex, StaticInitializer,
};
pub use infrastructure::{MethodPathCache, PathEnumerator};
