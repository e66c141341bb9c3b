//! Shared models

mod node_kind;
mod property;
mod span;

pub use node_kind::NodeKind;
pub use property::{PropertyMap, PropertyValue};
pub use span::Span;
