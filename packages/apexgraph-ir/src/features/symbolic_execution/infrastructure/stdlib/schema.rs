//! Schema describe chain
//!
//! `Schema.getGlobalDescribe().get('Account').getDescribe().fields.getMap()`
//! and the static forms `Account.SObjectType`, `Schema.SObjectType.Account`,
//! `Account.Name` all produce [`SchemaValue`] tokens, so rules can tell which
//! object and field a CRUD/FLS check is about.

use super::{CallReceiver, MethodHandler, StandardCall};
use crate::features::symbolic_execution::domain::{
    ApexValue, Heap, HeapObject, SchemaKind, SchemaValue,
};
use crate::shared::utils::type_names as types;

/// Namespaces whose dotted members are never `SObject.Field` references
const SYSTEM_NAMESPACES: &[&str] = &[
    "apexpages", "database", "json", "label", "limits", "math", "schema", "search", "site",
    "system", "test", "trigger", "userinfo", "string", "integer", "long", "decimal", "double",
    "boolean", "date", "datetime", "id", "blob", "url", "crypto", "encodingutil", "messaging",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaHandler;

fn token(kind: SchemaKind, object: Option<String>, field: Option<String>) -> ApexValue {
    ApexValue::schema(SchemaValue::new(kind, object, field))
}

fn permission_check(method: &str) -> bool {
    method.starts_with("is")
}

impl MethodHandler for SchemaHandler {
    fn name(&self) -> &'static str {
        "SchemaHandler"
    }

    fn invoke(&self, call: &StandardCall<'_>, heap: &mut Heap) -> Option<ApexValue> {
        match call.receiver {
            CallReceiver::Type(_) if call.is_static_on("Schema") => match call.method.as_str() {
                "getglobaldescribe" => Some(token(SchemaKind::GlobalDescribe, None, None)),
                "describesobjects" => Some(ApexValue::indeterminate(&types::list_of(
                    "Schema.DescribeSObjectResult",
                ))),
                _ => None,
            },
            CallReceiver::Value(receiver) => match receiver.as_schema() {
                Some(schema) => Some(
                    token_method(schema, call, heap)
                        .unwrap_or_else(|| fallback(&call.method, &receiver.ty)),
                ),
                None if receiver.ty.starts_with("Schema.") => Some(fallback(&call.method, &receiver.ty)),
                None => None,
            },
            CallReceiver::Type(_) => None,
        }
    }
}

/// Typed result of a describe method that cannot be followed
fn fallback(method: &str, receiver_ty: &str) -> ApexValue {
    match method {
        "getdescribe" if receiver_ty.ends_with("SObjectField") => {
            ApexValue::indeterminate("Schema.DescribeFieldResult")
        }
        "getdescribe" => ApexValue::indeterminate("Schema.DescribeSObjectResult"),
        "getname" | "getlabel" | "getlocalname" => ApexValue::indeterminate(types::STRING),
        "getsobjecttype" => ApexValue::indeterminate("Schema.SObjectType"),
        "getsobjectfield" => ApexValue::indeterminate("Schema.SObjectField"),
        "newsobject" => ApexValue::indeterminate(types::SOBJECT),
        "containskey" => ApexValue::indeterminate(types::BOOLEAN),
        "keyset" => ApexValue::indeterminate(&types::set_of(types::STRING)),
        m if permission_check(m) => ApexValue::indeterminate(types::BOOLEAN),
        _ => ApexValue::indeterminate(types::OBJECT),
    }
}

fn name_arg(call: &StandardCall<'_>) -> Option<String> {
    call.arg(0).and_then(|a| a.as_str()).map(str::to_string)
}

fn token_method(schema: &SchemaValue, call: &StandardCall<'_>, heap: &mut Heap) -> Option<ApexValue> {
    let object = schema.object.clone();
    let value = match (schema.kind, call.method.as_str()) {
        (SchemaKind::GlobalDescribe, "get") => token(SchemaKind::SObjectType, name_arg(call), None),
        (SchemaKind::SObjectType, "getdescribe") => ApexValue::schema(schema.step(SchemaKind::DescribeSObjectResult)),
        (SchemaKind::SObjectType, "newsobject") => {
            let ty = object?;
            let r = heap.allocate(HeapObject::instance(&ty));
            ApexValue::reference(&ty, r)
        }
        (SchemaKind::DescribeSObjectResult, "getname" | "getlocalname") => ApexValue::string(object?),
        (SchemaKind::DescribeSObjectResult, "getsobjecttype") => {
            ApexValue::schema(schema.step(SchemaKind::SObjectType))
        }
        (SchemaKind::FieldMap, "getmap") => ApexValue::schema(schema.clone()),
        (SchemaKind::FieldMap, "get") => token(SchemaKind::SObjectField, object, name_arg(call)),
        (SchemaKind::SObjectField, "getdescribe") => ApexValue::schema(schema.step(SchemaKind::DescribeFieldResult)),
        (SchemaKind::DescribeFieldResult, "getname" | "getlocalname") => ApexValue::string(schema.field.clone()?),
        (SchemaKind::DescribeFieldResult, "getsobjectfield") => {
            ApexValue::schema(schema.step(SchemaKind::SObjectField))
        }
        _ => return None,
    };
    Some(value)
}

/// Property read on a schema token (`describe.fields`, `fieldMap.Name`)
pub fn schema_member(value: &ApexValue, name: &str) -> Option<ApexValue> {
    let schema = value.as_schema()?;
    let member = name.to_lowercase();
    let next = match (schema.kind, member.as_str()) {
        (SchemaKind::SObjectType | SchemaKind::DescribeSObjectResult, "fields") => {
            schema.step(SchemaKind::FieldMap)
        }
        (SchemaKind::FieldMap, _) => SchemaValue::new(SchemaKind::SObjectField, schema.object.clone(), Some(name.to_string())),
        (SchemaKind::SObjectField, "getdescribe") => schema.step(SchemaKind::DescribeFieldResult),
        _ => return None,
    };
    Some(ApexValue::schema(next))
}

fn is_namespace(name: &str) -> bool {
    SYSTEM_NAMESPACES.contains(&name.to_lowercase().as_str())
}

/// Static schema reference spelled as a dotted name
///
/// The caller must already have ruled out variables and user types for the
/// first segment.
pub fn schema_reference(names: &[String]) -> Option<ApexValue> {
    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    let (head, consumed) = match lowered.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["schema", "sobjecttype", _, ..] => (token(SchemaKind::SObjectType, Some(names[2].clone()), None), 3),
        ["sobjecttype", _, ..] => (token(SchemaKind::SObjectType, Some(names[1].clone()), None), 2),
        ["schema", _, "sobjecttype", ..] => (token(SchemaKind::SObjectType, Some(names[1].clone()), None), 3),
        [_, "sobjecttype", ..] if !is_namespace(&names[0]) => {
            (token(SchemaKind::SObjectType, Some(names[0].clone()), None), 2)
        }
        [_, _, ..] if !is_namespace(&names[0]) => (
            token(SchemaKind::SObjectField, Some(names[0].clone()), Some(names[1].clone())),
            2,
        ),
        _ => return None,
    };
    names[consumed..]
        .iter()
        .try_fold(head, |value, name| schema_member(&value, name))
}
