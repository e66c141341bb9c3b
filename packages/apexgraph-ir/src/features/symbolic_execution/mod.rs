//! Symbolic execution
//!
//! Walks an expanded [`ApexPath`](crate::features::path_enumeration::ApexPath)
//! in path order, tracking abstract [`ApexValue`]s for every local, field
//! and class static. Calls into user code follow the sub-paths the expander
//! recorded; calls into the standard library are modeled by
//! [`StandardLibrary`] handlers. Anything that cannot be resolved becomes an
//! indeterminate value of its declared type and the walk continues.
//!
//! Rule implementations observe a walk through [`PathVisitor`].

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{walk_path, SymbolicExecutionService, SymbolicExecutionUseCase};
pub use domain::{
    ApexValue, Binding, Contents, Heap, HeapObject, HeapRef, InitState, Literal, MethodFrame,
    SchemaKind, SchemaValue, StaticScopes, SymbolTable, ValueKind,
};
pub use infrastructure::{
    CallReceiver, MethodHandler, PathWalker, StandardCall, StandardLibrary, WalkOutcome,
};
pub use ports::{NoopVisitor, PathVisitor, SymbolProvider};
