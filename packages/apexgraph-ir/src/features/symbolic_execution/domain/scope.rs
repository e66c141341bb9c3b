//! Binding environments
//!
//! - [`BlockScope`]: locals of one syntactic block (names are case-insensitive)
//! - [`MethodFrame`]: the block stack of one method activation plus `this`
//! - [`ClassStaticScope`]: static fields of one class and its init state
//! - [`StaticScopes`]: every class's static scope for one walked path

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::value::{ApexValue, HeapRef};
use crate::features::property_graph::VertexId;
use crate::shared::models::NodeKind;
use crate::shared::utils::type_names::canonical_type;

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub declared_type: String,
    pub value: ApexValue,
}

impl Binding {
    pub fn new(declared_type: &str, value: ApexValue) -> Self {
        Self {
            declared_type: canonical_type(declared_type),
            value,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlockScope {
    /// Construct that opened the block; `None` for a method's parameter scope
    pub kind: Option<NodeKind>,
    bindings: FxHashMap<String, Binding>,
}

impl BlockScope {
    pub fn new(kind: Option<NodeKind>) -> Self {
        Self {
            kind,
            bindings: FxHashMap::default(),
        }
    }

    pub fn declare(&mut self, name: &str, declared_type: &str, value: ApexValue) {
        self.bindings
            .insert(name.to_lowercase(), Binding::new(declared_type, value));
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(&name.to_lowercase())
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings.get_mut(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// One method activation
#[derive(Debug, Clone)]
pub struct MethodFrame {
    /// `None` for synthetic frames (field initializers)
    pub method: Option<VertexId>,
    /// Defining type of the running code
    pub class: Option<String>,
    pub this: Option<HeapRef>,
    pub return_value: Option<ApexValue>,
    blocks: Vec<BlockScope>,
}

impl MethodFrame {
    pub fn new(method: Option<VertexId>, class: Option<String>, this: Option<HeapRef>) -> Self {
        Self {
            method,
            class,
            this,
            return_value: None,
            blocks: vec![BlockScope::new(None)],
        }
    }

    pub fn push_block(&mut self, kind: NodeKind) {
        self.blocks.push(BlockScope::new(Some(kind)));
    }

    /// Pop one block; the parameter scope is never popped
    pub fn pop_block(&mut self) -> Option<BlockScope> {
        if self.blocks.len() > 1 {
            self.blocks.pop()
        } else {
            None
        }
    }

    /// Open blocks, excluding the parameter scope
    pub fn depth(&self) -> usize {
        self.blocks.len() - 1
    }

    pub fn declare(&mut self, name: &str, declared_type: &str, value: ApexValue) {
        if let Some(block) = self.blocks.last_mut() {
            block.declare(name, declared_type, value);
        }
    }

    /// Nearest binding, innermost block first
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.blocks.iter().rev().find_map(|b| b.get(name))
    }

    /// Rebind an existing local; false if the name is not a local
    pub fn assign(&mut self, name: &str, value: ApexValue) -> bool {
        match self.blocks.iter_mut().rev().find_map(|b| b.get_mut(name)) {
            Some(binding) => {
                binding.value = value;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    /// Field initializers or static blocks are running
    Initializing,
    Initialized,
}

#[derive(Debug, Clone)]
pub struct ClassStaticScope {
    class: String,
    state: InitState,
    fields: FxHashMap<String, Binding>,
}

impl ClassStaticScope {
    pub fn new(class: &str) -> Self {
        Self {
            class: class.to_string(),
            state: InitState::Uninitialized,
            fields: FxHashMap::default(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    /// Enter initialization; false if it already started
    pub fn begin(&mut self) -> bool {
        if self.state != InitState::Uninitialized {
            return false;
        }
        self.state = InitState::Initializing;
        true
    }

    /// Static blocks finished; only now is the class initialized
    pub fn finish(&mut self) {
        self.state = InitState::Initialized;
    }

    pub fn declare(&mut self, name: &str, declared_type: &str, value: ApexValue) {
        self.fields
            .insert(name.to_lowercase(), Binding::new(declared_type, value));
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.fields.get(&name.to_lowercase())
    }

    pub fn assign(&mut self, name: &str, value: ApexValue) -> bool {
        match self.fields.get_mut(&name.to_lowercase()) {
            Some(binding) => {
                binding.value = value;
                true
            }
            None => false,
        }
    }
}

/// Static state of every class seen on one path
///
/// A value type: each walked path owns its copy, so initialization along one
/// expanded static-initializer fork never leaks into a sibling fork.
#[derive(Debug, Clone, Default)]
pub struct StaticScopes {
    classes: BTreeMap<String, ClassStaticScope>,
}

impl StaticScopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, class: &str) -> Option<&ClassStaticScope> {
        self.classes.get(&class.to_lowercase())
    }

    pub fn get_mut(&mut self, class: &str) -> Option<&mut ClassStaticScope> {
        self.classes.get_mut(&class.to_lowercase())
    }

    pub fn entry(&mut self, class: &str) -> &mut ClassStaticScope {
        self.classes
            .entry(class.to_lowercase())
            .or_insert_with(|| ClassStaticScope::new(class))
    }

    pub fn state(&self, class: &str) -> InitState {
        self.get(class).map_or(InitState::Uninitialized, |s| s.state())
    }

    /// Adopt static variables `other` knows and this snapshot does not
    ///
    /// Variables are identified by class and name; a class initialized in
    /// either snapshot stays initialized.
    pub fn merge(&mut self, other: &StaticScopes) {
        for (key, theirs) in &other.classes {
            let ours = self
                .classes
                .entry(key.clone())
                .or_insert_with(|| ClassStaticScope::new(theirs.class()));
            for (name, binding) in &theirs.fields {
                ours.fields.entry(name.clone()).or_insert_with(|| binding.clone());
            }
            if theirs.state == InitState::Initialized {
                ours.state = InitState::Initialized;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing_and_case_insensitive_lookup() {
        let mut frame = MethodFrame::new(None, None, None);
        frame.declare("count", "Integer", ApexValue::integer(1));
        frame.push_block(NodeKind::BlockStatement);
        frame.declare("Count", "String", ApexValue::string("inner"));
        assert_eq!(frame.lookup("COUNT").and_then(|b| b.value.as_str()), Some("inner"));

        frame.pop_block();
        assert_eq!(frame.lookup("count").and_then(|b| b.value.as_i64()), Some(1));
        assert!(frame.pop_block().is_none());
        assert!(!frame.assign("missing", ApexValue::null()));
    }

    #[test]
    fn test_static_scope_state_machine() {
        let mut statics = StaticScopes::new();
        assert_eq!(statics.state("Config"), InitState::Uninitialized);
        assert!(statics.entry("Config").begin());
        assert!(!statics.entry("config").begin());
        assert_eq!(statics.state("CONFIG"), InitState::Initializing);
        statics.entry("Config").finish();
        assert_eq!(statics.state("Config"), InitState::Initialized);
    }

    #[test]
    fn test_merge_by_variable_identity() {
        let mut left = StaticScopes::new();
        left.entry("A").declare("x", "Integer", ApexValue::integer(1));

        let mut right = StaticScopes::new();
        right.entry("a").declare("X", "Integer", ApexValue::integer(2));
        right.entry("a").declare("y", "Integer", ApexValue::integer(3));
        right.entry("a").finish();

        left.merge(&right);
        let a = left.get("A").unwrap();
        assert_eq!(a.get("x").and_then(|b| b.value.as_i64()), Some(1));
        assert_eq!(a.get("y").and_then(|b| b.value.as_i64()), Some(3));
        assert_eq!(a.state(), InitState::Initialized);
    }
}
