mod evaluator;
pub mod operators;
pub mod stdlib;
mod walker;

pub use stdlib::{
    CallReceiver, CollectionHandler, MethodHandler, SchemaHandler, StandardCall,
    StandardLibrary, StringHandler, SystemHandler,
};
pub use walker::{PathWalker, WalkOutcome};
