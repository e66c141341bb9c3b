mod metadata;
mod path;

pub use metadata::{Constraint, ConstraintKind, PathMetadata};
pub use path::{ApexPath, PathVertex, StaticInitializer};
