//! Semantic model of standard-library methods
//!
//! Calls into `String`, collections, `Schema`, `System`, `UserInfo` and
//! `Database` produce values directly, without path expansion. A handler
//! that recognizes a call but cannot compute it returns an indeterminate
//! value of the method's return type; `None` means the call is not modeled.

mod collections;
mod schema;
mod strings;
mod system;

use once_cell::sync::Lazy;

use crate::features::symbolic_execution::domain::{ApexValue, Contents, Heap, HeapObject};
use crate::shared::utils::type_names as types;

pub use collections::CollectionHandler;
pub use schema::{schema_member, schema_reference, SchemaHandler};
pub use strings::StringHandler;
pub use system::{query_result, trigger_variable, SystemHandler};

/// What a standard method is called on
#[derive(Debug, Clone, Copy)]
pub enum CallReceiver<'a> {
    Value(&'a ApexValue),
    /// Static call on a type or namespace (`String.valueOf`)
    Type(&'a str),
}

#[derive(Debug, Clone)]
pub struct StandardCall<'a> {
    pub receiver: CallReceiver<'a>,
    /// Lower-cased method name
    pub method: String,
    pub args: &'a [ApexValue],
}

impl<'a> StandardCall<'a> {
    pub fn new(receiver: CallReceiver<'a>, method: &str, args: &'a [ApexValue]) -> Self {
        Self {
            receiver,
            method: method.to_lowercase(),
            args,
        }
    }

    pub fn arg(&self, index: usize) -> Option<&'a ApexValue> {
        self.args.get(index)
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Static call on `ty` (case-insensitive, `System.` prefix optional)
    pub fn is_static_on(&self, ty: &str) -> bool {
        match self.receiver {
            CallReceiver::Type(name) => {
                name.eq_ignore_ascii_case(ty)
                    || name
                        .strip_prefix("System.")
                        .is_some_and(|n| n.eq_ignore_ascii_case(ty))
            }
            CallReceiver::Value(_) => false,
        }
    }
}

pub trait MethodHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn invoke(&self, call: &StandardCall<'_>, heap: &mut Heap) -> Option<ApexValue>;
}

/// Ordered set of handlers; the first one that models a call wins
pub struct StandardLibrary {
    handlers: Vec<Box<dyn MethodHandler>>,
}

static GLOBAL: Lazy<StandardLibrary> = Lazy::new(StandardLibrary::new);

impl StandardLibrary {
    pub fn new() -> Self {
        Self {
            handlers: vec![
                Box::new(StringHandler),
                Box::new(CollectionHandler),
                Box::new(SchemaHandler),
                Box::new(SystemHandler),
            ],
        }
    }

    pub fn global() -> &'static StandardLibrary {
        &GLOBAL
    }

    pub fn with_handler(mut self, handler: Box<dyn MethodHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn invoke(&self, call: &StandardCall<'_>, heap: &mut Heap) -> Option<ApexValue> {
        self.handlers.iter().find_map(|h| h.invoke(call, heap))
    }
}

impl Default for StandardLibrary {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn allocate_list(heap: &mut Heap, element: &str, items: Vec<ApexValue>, complete: bool) -> ApexValue {
    let element = types::canonical_type(element);
    let contents = Contents { items, complete };
    let r = heap.allocate(HeapObject::List {
        element: element.clone(),
        contents,
    });
    ApexValue::reference(&types::list_of(&element), r)
}

pub(crate) fn allocate_set(heap: &mut Heap, element: &str, items: Vec<ApexValue>, complete: bool) -> ApexValue {
    let element = types::canonical_type(element);
    let contents = Contents { items, complete };
    let r = heap.allocate(HeapObject::Set {
        element: element.clone(),
        contents,
    });
    ApexValue::reference(&types::set_of(&element), r)
}

pub(crate) fn void() -> ApexValue {
    ApexValue::indeterminate(types::VOID)
}
