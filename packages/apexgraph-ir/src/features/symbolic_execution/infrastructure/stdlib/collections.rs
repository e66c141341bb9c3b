//! `List`, `Set` and `Map` methods over heap-allocated collections
//!
//! Element identity uses [`same_element`]: case-sensitive for strings, as
//! collection lookups are in Apex. Mutations that cannot be applied
//! precisely mark the contents incomplete instead of guessing.

use super::{allocate_list, allocate_set, void, CallReceiver, MethodHandler, StandardCall};
use crate::features::symbolic_execution::domain::{
    ApexValue, Contents, Heap, HeapObject, HeapRef, ValueKind,
};
use crate::shared::utils::type_names as types;

#[derive(Debug, Default, Clone, Copy)]
pub struct CollectionHandler;

/// Element equality; `None` when it cannot be decided
pub fn same_element(a: &ApexValue, b: &ApexValue) -> Option<bool> {
    match (&a.kind, &b.kind) {
        (ValueKind::Determinate(x), ValueKind::Determinate(y)) => Some(x == y),
        (ValueKind::Reference(x), ValueKind::Reference(y)) if x == y => Some(true),
        _ => None,
    }
}

/// Position of `needle`: `Ok(Some(i))` found, `Ok(None)` provably absent,
/// `Err(())` undecidable
fn position(items: &[ApexValue], complete: bool, needle: &ApexValue) -> Result<Option<usize>, ()> {
    let mut undecided = !complete;
    for (i, item) in items.iter().enumerate() {
        match same_element(item, needle) {
            Some(true) => return Ok(Some(i)),
            Some(false) => {}
            None => undecided = true,
        }
    }
    if undecided {
        Err(())
    } else {
        Ok(None)
    }
}

fn index_arg(call: &StandardCall<'_>) -> Option<usize> {
    call.arg(0).and_then(|a| a.as_i64()).and_then(|i| usize::try_from(i).ok())
}

impl MethodHandler for CollectionHandler {
    fn name(&self) -> &'static str {
        "CollectionHandler"
    }

    fn invoke(&self, call: &StandardCall<'_>, heap: &mut Heap) -> Option<ApexValue> {
        let CallReceiver::Value(receiver) = call.receiver else {
            return None;
        };
        if !types::is_collection(&receiver.ty) {
            return None;
        }
        let ty = receiver.ty.clone();
        let base = types::base_type(&ty).to_string();
        let element = types::element_type(&ty).unwrap_or_else(|| types::OBJECT.to_string());
        let key = types::key_type(&ty).unwrap_or_else(|| types::OBJECT.to_string());

        let fallback = match (base.as_str(), call.method.as_str()) {
            (_, "size") => ApexValue::indeterminate(types::INTEGER),
            (_, "isempty" | "contains" | "containskey" | "equals") => ApexValue::indeterminate(types::BOOLEAN),
            (types::SET, "add" | "addall" | "remove" | "removeall" | "retainall") => {
                ApexValue::indeterminate(types::BOOLEAN)
            }
            (types::MAP, "get" | "put" | "remove") => ApexValue::indeterminate(&element),
            (types::LIST, "get" | "remove") => ApexValue::indeterminate(&element),
            (types::MAP, "keyset") => ApexValue::indeterminate(&types::set_of(&key)),
            (types::MAP, "values") => ApexValue::indeterminate(&types::list_of(&element)),
            (_, "add" | "addall" | "clear" | "putall" | "sort" | "set") => void(),
            (_, "clone" | "deepclone") => ApexValue::indeterminate(&ty),
            _ => return None,
        };

        let Some(r) = receiver.as_reference() else {
            return Some(fallback);
        };
        let computed = match heap.get(r) {
            Some(HeapObject::List { .. }) => list_method(call, heap, r, &element),
            Some(HeapObject::Set { .. }) => set_method(call, heap, r, &element),
            Some(HeapObject::Map { .. }) => map_method(call, heap, r, &key, &element),
            _ => None,
        };
        Some(computed.unwrap_or(fallback))
    }
}

/// Contents of another collection passed as an argument
fn contents_of(heap: &Heap, value: Option<&ApexValue>) -> Option<Contents<ApexValue>> {
    match heap.get(value?.as_reference()?)? {
        HeapObject::List { contents, .. } | HeapObject::Set { contents, .. } => Some(contents.clone()),
        _ => None,
    }
}

fn list_method(
    call: &StandardCall<'_>,
    heap: &mut Heap,
    r: HeapRef,
    element: &str,
) -> Option<ApexValue> {
    let incoming = contents_of(heap, call.arg(0));
    let Some(HeapObject::List { contents, .. }) = heap.get_mut(r) else {
        return None;
    };
    match call.method.as_str() {
        "add" if call.arity() == 1 => {
            contents.items.push(call.arg(0)?.clone());
            Some(void())
        }
        "add" => {
            let index = call.arg(0).and_then(|a| a.as_i64()).and_then(|i| usize::try_from(i).ok());
            match index {
                Some(i) if contents.complete && i <= contents.items.len() => {
                    contents.items.insert(i, call.arg(1)?.clone());
                }
                _ => {
                    contents.items.push(call.arg(1)?.clone());
                    contents.complete = false;
                }
            }
            Some(void())
        }
        "addall" => {
            match incoming {
                Some(other) => {
                    contents.items.extend(other.items);
                    contents.complete &= other.complete;
                }
                None => contents.complete = false,
            }
            Some(void())
        }
        "get" => {
            let i = index_arg(call)?;
            contents.complete.then(|| contents.items.get(i).cloned()).flatten()
        }
        "set" => {
            match index_arg(call) {
                Some(i) if i < contents.items.len() && contents.complete => {
                    contents.items[i] = call.arg(1)?.clone();
                }
                _ => contents.complete = false,
            }
            Some(void())
        }
        "remove" => match index_arg(call) {
            Some(i) if contents.complete && i < contents.items.len() => Some(contents.items.remove(i)),
            _ => {
                contents.complete = false;
                None
            }
        },
        "size" => contents.complete.then(|| ApexValue::integer(contents.items.len() as i64)),
        "isempty" => {
            if !contents.items.is_empty() {
                Some(ApexValue::boolean(false))
            } else {
                contents.complete.then(|| ApexValue::boolean(true))
            }
        }
        "contains" => {
            let found = position(&contents.items, contents.complete, call.arg(0)?).ok()?;
            Some(ApexValue::boolean(found.is_some()))
        }
        "clear" => {
            *contents = Contents::known(Vec::new());
            Some(void())
        }
        "clone" => {
            let copy = contents.clone();
            Some(allocate_list(heap, element, copy.items, copy.complete))
        }
        _ => None,
    }
}

fn set_method(
    call: &StandardCall<'_>,
    heap: &mut Heap,
    r: HeapRef,
    element: &str,
) -> Option<ApexValue> {
    let incoming = contents_of(heap, call.arg(0));
    let Some(HeapObject::Set { contents, .. }) = heap.get_mut(r) else {
        return None;
    };
    match call.method.as_str() {
        "add" => {
            let value = call.arg(0)?;
            match position(&contents.items, true, value) {
                Ok(Some(_)) => Some(ApexValue::boolean(false)),
                Ok(None) => {
                    contents.items.push(value.clone());
                    Some(ApexValue::boolean(true))
                }
                Err(()) => {
                    contents.items.push(value.clone());
                    contents.complete = false;
                    None
                }
            }
        }
        "addall" => {
            match incoming {
                Some(other) => {
                    for item in other.items {
                        match position(&contents.items, true, &item) {
                            Ok(Some(_)) => {}
                            Ok(None) => contents.items.push(item),
                            Err(()) => {
                                contents.items.push(item);
                                contents.complete = false;
                            }
                        }
                    }
                    contents.complete &= other.complete;
                }
                None => contents.complete = false,
            }
            None
        }
        "remove" => match position(&contents.items, contents.complete, call.arg(0)?) {
            Ok(Some(i)) => {
                contents.items.remove(i);
                Some(ApexValue::boolean(true))
            }
            Ok(None) => Some(ApexValue::boolean(false)),
            Err(()) => {
                contents.complete = false;
                None
            }
        },
        "contains" => {
            let found = position(&contents.items, contents.complete, call.arg(0)?).ok()?;
            Some(ApexValue::boolean(found.is_some()))
        }
        "size" => contents.complete.then(|| ApexValue::integer(contents.items.len() as i64)),
        "isempty" => {
            if !contents.items.is_empty() {
                Some(ApexValue::boolean(false))
            } else {
                contents.complete.then(|| ApexValue::boolean(true))
            }
        }
        "clear" => {
            *contents = Contents::known(Vec::new());
            Some(void())
        }
        "clone" => {
            let copy = contents.clone();
            Some(allocate_set(heap, element, copy.items, copy.complete))
        }
        _ => None,
    }
}

fn map_method(
    call: &StandardCall<'_>,
    heap: &mut Heap,
    r: HeapRef,
    key: &str,
    value: &str,
) -> Option<ApexValue> {
    let Some(HeapObject::Map { contents, .. }) = heap.get_mut(r) else {
        return None;
    };
    let keys: Vec<ApexValue> = contents.items.iter().map(|(k, _)| k.clone()).collect();
    match call.method.as_str() {
        "put" => {
            let (k, v) = (call.arg(0)?, call.arg(1)?);
            match position(&keys, true, k) {
                Ok(Some(i)) => {
                    let previous = std::mem::replace(&mut contents.items[i].1, v.clone());
                    Some(previous)
                }
                Ok(None) => {
                    contents.items.push((k.clone(), v.clone()));
                    Some(ApexValue::null_of(value))
                }
                Err(()) => {
                    contents.items.push((k.clone(), v.clone()));
                    contents.complete = false;
                    None
                }
            }
        }
        "get" => match position(&keys, contents.complete, call.arg(0)?) {
            Ok(Some(i)) => Some(contents.items[i].1.clone()),
            Ok(None) => Some(ApexValue::null_of(value)),
            Err(()) => None,
        },
        "containskey" => {
            let found = position(&keys, contents.complete, call.arg(0)?).ok()?;
            Some(ApexValue::boolean(found.is_some()))
        }
        "remove" => match position(&keys, contents.complete, call.arg(0)?) {
            Ok(Some(i)) => Some(contents.items.remove(i).1),
            Ok(None) => Some(ApexValue::null_of(value)),
            Err(()) => {
                contents.complete = false;
                None
            }
        },
        "size" => contents.complete.then(|| ApexValue::integer(contents.items.len() as i64)),
        "isempty" => {
            if !contents.items.is_empty() {
                Some(ApexValue::boolean(false))
            } else {
                contents.complete.then(|| ApexValue::boolean(true))
            }
        }
        "clear" => {
            *contents = Contents::known(Vec::new());
            Some(void())
        }
        "keyset" => {
            let complete = contents.complete;
            Some(allocate_set(heap, key, keys, complete))
        }
        "values" => {
            let complete = contents.complete;
            let values = contents.items.iter().map(|(_, v)| v.clone()).collect();
            Some(allocate_list(heap, value, values, complete))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(heap: &mut Heap, receiver: &ApexValue, method: &str, args: &[ApexValue]) -> Option<ApexValue> {
        let call = StandardCall::new(CallReceiver::Value(receiver), method, args);
        CollectionHandler.invoke(&call, heap)
    }

    #[test]
    fn test_list_tracks_known_contents() {
        let mut heap = Heap::new();
        let list = allocate_list(&mut heap, "String", Vec::new(), true);
        call(&mut heap, &list, "add", &[ApexValue::string("a")]);
        call(&mut heap, &list, "add", &[ApexValue::string("b")]);

        let size = call(&mut heap, &list, "size", &[]).unwrap();
        assert_eq!(size.as_i64(), Some(2));
        let second = call(&mut heap, &list, "get", &[ApexValue::integer(1)]).unwrap();
        assert_eq!(second.as_str(), Some("b"));
        let contains = call(&mut heap, &list, "contains", &[ApexValue::string("A")]).unwrap();
        assert_eq!(contains.as_bool(), Some(false));

        call(&mut heap, &list, "add", &[ApexValue::indeterminate("Integer"), ApexValue::string("c")]);
        let size = call(&mut heap, &list, "size", &[]).unwrap();
        assert!(size.is_indeterminate());
        assert_eq!(size.ty, "Integer");
    }

    #[test]
    fn test_map_lookup_and_key_set() {
        let mut heap = Heap::new();
        let r = heap.allocate(HeapObject::Map {
            key: "String".into(),
            value: "Integer".into(),
            contents: Contents::known(Vec::new()),
        });
        let map = ApexValue::reference("Map<String,Integer>", r);
        call(&mut heap, &map, "put", &[ApexValue::string("k"), ApexValue::integer(1)]);
        let previous = call(&mut heap, &map, "put", &[ApexValue::string("k"), ApexValue::integer(2)]).unwrap();
        assert_eq!(previous.as_i64(), Some(1));

        assert_eq!(call(&mut heap, &map, "get", &[ApexValue::string("k")]).and_then(|v| v.as_i64()), Some(2));
        assert!(call(&mut heap, &map, "get", &[ApexValue::string("K")]).unwrap().is_null());

        let keys = call(&mut heap, &map, "keySet", &[]).unwrap();
        assert_eq!(keys.ty, "Set<String>");
        assert_eq!(call(&mut heap, &keys, "size", &[]).and_then(|v| v.as_i64()), Some(1));

        call(&mut heap, &map, "put", &[ApexValue::indeterminate("String"), ApexValue::integer(3)]);
        assert!(call(&mut heap, &map, "get", &[ApexValue::string("x")]).unwrap().is_indeterminate());
    }

    #[test]
    fn test_indeterminate_collections_keep_types() {
        let mut heap = Heap::new();
        let unknown = ApexValue::indeterminate("Map<Id,Account>");
        assert_eq!(call(&mut heap, &unknown, "get", &[ApexValue::null()]).map(|v| v.ty), Some("Account".into()));
        assert_eq!(call(&mut heap, &unknown, "values", &[]).map(|v| v.ty), Some("List<Account>".into()));
        assert!(call(&mut heap, &ApexValue::string("x"), "size", &[]).is_none());
    }
}
