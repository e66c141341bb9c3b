//! Vertex Model
//!
//! Typed, borrowed views over raw graph vertices. [`VertexRef`] carries the
//! structural navigation every vertex has; [`TypedVertex`] is a closed enum
//! of kind-specific handles, each exposing the accessors that kind needs
//! (method signature, loop parts, switch arms...). Capability traits cut
//! across kinds: [`Named`], [`Typeable`], [`Invocable`].

pub mod domain;

pub use domain::{
    BlockVertex, ConditionVertex, IfElseVertex, InvocationVertex, Invocable, LiteralVertex,
    LoopVertex, MethodVertex, Named, ParameterInfo, SwitchVertex, TryCatchVertex, TypeDeclVertex,
    Typeable, TypedVertex, VariableDeclarationVertex, VariableVertex, VertexRef, WhenVertex,
};
