mod handles;
mod traits;
mod vertex_ref;

pub use handles::{
    BlockVertex, ConditionVertex, IfElseVertex, InvocationVertex, LiteralVertex, LoopVertex,
    MethodVertex, ParameterInfo, SwitchVertex, TryCatchVertex, TypeDeclVertex, TypedVertex,
    VariableDeclarationVertex, VariableVertex, WhenVertex,
};
pub use traits::{Invocable, Named, Typeable};
pub use vertex_ref::VertexRef;
