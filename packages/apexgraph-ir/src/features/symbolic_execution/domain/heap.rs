//! Object store of one walk
//!
//! Objects never move or get freed during a walk, so a [`HeapRef`] handed
//! out stays valid and aliasing between variables is preserved.

use rustc_hash::FxHashMap;

use super::value::{ApexValue, HeapRef};
use crate::shared::utils::type_names::canonical_type;

/// Contents of a collection; `complete == false` means more elements than
/// the ones listed may be present
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contents<T> {
    pub items: Vec<T>,
    pub complete: bool,
}

impl<T> Contents<T> {
    pub fn known(items: Vec<T>) -> Self {
        Self { items, complete: true }
    }

    pub fn unknown() -> Self {
        Self {
            items: Vec::new(),
            complete: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeapObject {
    /// Class instance or SObject record; keys are lower-cased field names
    Instance {
        ty: String,
        fields: FxHashMap<String, ApexValue>,
    },
    List {
        element: String,
        contents: Contents<ApexValue>,
    },
    Set {
        element: String,
        contents: Contents<ApexValue>,
    },
    Map {
        key: String,
        value: String,
        contents: Contents<(ApexValue, ApexValue)>,
    },
}

impl HeapObject {
    pub fn instance(ty: &str) -> Self {
        HeapObject::Instance {
            ty: canonical_type(ty),
            fields: FxHashMap::default(),
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            HeapObject::Instance { ty, .. } => ty.clone(),
            HeapObject::List { element, .. } => format!("List<{}>", element),
            HeapObject::Set { element, .. } => format!("Set<{}>", element),
            HeapObject::Map { key, value, .. } => format!("Map<{},{}>", key, value),
        }
    }

    /// Known element count, when the contents are complete
    pub fn size(&self) -> Option<usize> {
        match self {
            HeapObject::List { contents, .. } | HeapObject::Set { contents, .. } => {
                contents.complete.then_some(contents.items.len())
            }
            HeapObject::Map { contents, .. } => contents.complete.then_some(contents.items.len()),
            HeapObject::Instance { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Heap {
    objects: Vec<HeapObject>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, object: HeapObject) -> HeapRef {
        self.objects.push(object);
        HeapRef((self.objects.len() - 1) as u32)
    }

    pub fn get(&self, r: HeapRef) -> Option<&HeapObject> {
        self.objects.get(r.0 as usize)
    }

    pub fn get_mut(&mut self, r: HeapRef) -> Option<&mut HeapObject> {
        self.objects.get_mut(r.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Field of an instance; `None` if unset or not an instance
    pub fn field(&self, r: HeapRef, name: &str) -> Option<&ApexValue> {
        match self.get(r)? {
            HeapObject::Instance { fields, .. } => fields.get(&name.to_lowercase()),
            _ => None,
        }
    }

    /// Set a field of an instance; returns false if `r` is not an instance
    pub fn set_field(&mut self, r: HeapRef, name: &str, value: ApexValue) -> bool {
        match self.get_mut(r) {
            Some(HeapObject::Instance { fields, .. }) => {
                fields.insert(name.to_lowercase(), value);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_share_one_object() {
        let mut heap = Heap::new();
        let account = heap.allocate(HeapObject::instance("Account"));
        let alias = account;
        assert!(heap.set_field(account, "Name", ApexValue::string("Acme")));
        assert_eq!(heap.field(alias, "name").and_then(|v| v.as_str()), Some("Acme"));

        let list = heap.allocate(HeapObject::List {
            element: "String".into(),
            contents: Contents::known(vec![ApexValue::string("a")]),
        });
        assert!(!heap.set_field(list, "x", ApexValue::null()));
        assert_eq!(heap.get(list).and_then(|o| o.size()), Some(1));
        assert_eq!(heap.get(list).map(|o| o.type_name()), Some("List<String>".to_string()));
    }
}
