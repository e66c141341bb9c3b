//! Capabilities shared across vertex kinds

use super::vertex_ref::VertexRef;

/// Vertices carrying a declared or referenced name
pub trait Named<'g> {
    fn name(&self) -> Option<&'g str>;
}

/// Vertices with a declared static type
pub trait Typeable<'g> {
    /// Canonical type name
    fn declared_type(&self) -> Option<String>;
}

/// Vertices that transfer control to a method
pub trait Invocable<'g> {
    /// Invoked method name (`<init>` for constructor invocations)
    fn method_name(&self) -> Option<&'g str>;

    fn arguments(&self) -> Vec<VertexRef<'g>>;

    fn arity(&self) -> usize {
        self.arguments().len()
    }
}
