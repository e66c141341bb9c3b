//! Value model, heap and scopes

pub mod heap;
pub mod scope;
pub mod symbols;
pub mod value;

pub use heap::{Contents, Heap, HeapObject};
pub use scope::{Binding, BlockScope, ClassStaticScope, InitState, MethodFrame, StaticScopes};
pub use symbols::SymbolTable;
pub use value::{ApexValue, HeapRef, Literal, SchemaKind, SchemaValue, ValueKind};
