//! Enclosing type names while the graph builder descends the AST
//!
//! Apex nests inner types one level deep, but the stack does not assume it.

#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    types: Vec<String>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, type_name: impl Into<String>) {
        self.types.push(type_name.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.types.pop()
    }

    /// Defining-type name of the innermost type (`Outer.Inner`)
    pub fn qualified(&self) -> String {
        self.types.join(".")
    }

    /// True outside every type declaration
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Run `f` with `type_name` pushed, popping it afterwards
    pub fn with_scope<F, R>(&mut self, type_name: impl Into<String>, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.push(type_name);
        let result = f(self);
        self.pop();
        result
    }
}
