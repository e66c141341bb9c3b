//! `System`, `Database`, `UserInfo`, `Limits`, `Test` and the primitive
//! `valueOf` conversions, plus the values of trigger context variables

use once_cell::sync::Lazy;
use regex::Regex;

use super::{void, CallReceiver, MethodHandler, StandardCall};
use crate::features::symbolic_execution::domain::{
    ApexValue, Contents, Heap, HeapObject, Literal, ValueKind,
};
use crate::shared::utils::type_names as types;

static FROM_CLAUSE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)\bFROM\s+(\w+)").ok());

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHandler;

impl MethodHandler for SystemHandler {
    fn name(&self) -> &'static str {
        "SystemHandler"
    }

    fn invoke(&self, call: &StandardCall<'_>, heap: &mut Heap) -> Option<ApexValue> {
        let CallReceiver::Type(_) = call.receiver else {
            return None;
        };
        let method = call.method.as_str();
        if call.is_static_on("System") {
            return system_method(method);
        }
        if call.is_static_on("Database") {
            return database_method(call, heap);
        }
        if call.is_static_on("UserInfo") {
            return method.starts_with("get").then(|| user_info(method));
        }
        if call.is_static_on("Limits") {
            return method.starts_with("get").then(|| ApexValue::indeterminate(types::INTEGER));
        }
        if call.is_static_on("Test") {
            return match method {
                "isrunningtest" => Some(ApexValue::indeterminate(types::BOOLEAN)),
                "starttest" | "stoptest" => Some(void()),
                _ => None,
            };
        }
        if method == "valueof" {
            for ty in [types::INTEGER, types::LONG, types::DECIMAL, types::DOUBLE, types::BOOLEAN, types::ID] {
                if call.is_static_on(ty) {
                    let converted = call.arg(0).and_then(|a| value_of(ty, a));
                    return Some(converted.unwrap_or_else(|| ApexValue::indeterminate(ty)));
                }
            }
        }
        None
    }
}

fn system_method(method: &str) -> Option<ApexValue> {
    let value = match method {
        "debug" | "assert" | "assertequals" | "assertnotequals" | "enqueuejob" | "abortjob" => void(),
        "now" => ApexValue::indeterminate("Datetime"),
        "today" => ApexValue::indeterminate("Date"),
        "currenttimemillis" => ApexValue::indeterminate(types::LONG),
        "schedule" | "schedulebatch" | "executebatch" => ApexValue::indeterminate(types::ID),
        _ => return None,
    };
    Some(value)
}

fn database_method(call: &StandardCall<'_>, heap: &mut Heap) -> Option<ApexValue> {
    let query = || call.arg(0).and_then(|a| a.as_str());
    let value = match call.method.as_str() {
        "query" | "querywithbinds" => query_result(heap, query()),
        "getquerylocator" => ApexValue::indeterminate("Database.QueryLocator"),
        "countquery" | "countquerywithbinds" => ApexValue::indeterminate(types::INTEGER),
        "insert" => ApexValue::indeterminate(&types::list_of("Database.SaveResult")),
        "update" => ApexValue::indeterminate(&types::list_of("Database.SaveResult")),
        "upsert" => ApexValue::indeterminate(&types::list_of("Database.UpsertResult")),
        "delete" => ApexValue::indeterminate(&types::list_of("Database.DeleteResult")),
        "undelete" => ApexValue::indeterminate(&types::list_of("Database.UndeleteResult")),
        "setsavepoint" => ApexValue::indeterminate("System.Savepoint"),
        "rollback" => void(),
        _ => return None,
    };
    Some(value)
}

fn user_info(method: &str) -> ApexValue {
    match method {
        "getuserid" | "getorganizationid" | "getprofileid" | "getuserroleid" => {
            ApexValue::indeterminate(types::ID)
        }
        "gettimezone" => ApexValue::indeterminate("TimeZone"),
        _ => ApexValue::indeterminate(types::STRING),
    }
}

fn value_of(ty: &str, arg: &ApexValue) -> Option<ApexValue> {
    let literal = arg.as_literal()?;
    let text = match literal {
        Literal::Null => return None,
        other => other.to_string(),
    };
    let text = text.trim();
    let value = match ty {
        types::INTEGER => ApexValue::integer(text.parse::<i32>().ok()? as i64),
        types::LONG => ApexValue::literal(Literal::Long(text.parse().ok()?)),
        types::DECIMAL | types::DOUBLE => ApexValue::new(ty, ValueKind::Determinate(Literal::Decimal(text.parse().ok()?))),
        types::BOOLEAN => ApexValue::boolean(text.eq_ignore_ascii_case("true")),
        types::ID => ApexValue::new(types::ID, ValueKind::Determinate(Literal::String(text.to_string()))),
        _ => return None,
    };
    Some(value)
}

/// Object queried by a SOQL string
pub fn queried_object(query: &str) -> Option<String> {
    let from = FROM_CLAUSE.as_ref()?;
    from.captures(query)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Rows of a SOQL query: a list of the queried object with unknown contents
pub fn query_result(heap: &mut Heap, query: Option<&str>) -> ApexValue {
    let element = query
        .and_then(queried_object)
        .map(|o| types::canonical_type(&o))
        .unwrap_or_else(|| types::SOBJECT.to_string());
    let r = heap.allocate(HeapObject::List {
        element: element.clone(),
        contents: Contents::unknown(),
    });
    ApexValue::reference(&types::list_of(&element), r)
}

/// Value of a `Trigger.*` context variable in a trigger on `target`
pub fn trigger_variable(name: &str, target: &str) -> Option<ApexValue> {
    let value = match name.to_lowercase().as_str() {
        "new" | "old" => ApexValue::indeterminate(&types::list_of(target)),
        "newmap" | "oldmap" => ApexValue::indeterminate(&types::map_of(types::ID, target)),
        "isinsert" | "isupdate" | "isdelete" | "isundelete" | "isbefore" | "isafter"
        | "isexecuting" => ApexValue::indeterminate(types::BOOLEAN),
        "size" => ApexValue::indeterminate(types::INTEGER),
        "operationtype" => ApexValue::indeterminate("System.TriggerOperation"),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_call(ty: &str, method: &str, args: &[ApexValue], heap: &mut Heap) -> Option<ApexValue> {
        SystemHandler.invoke(&StandardCall::new(CallReceiver::Type(ty), method, args), heap)
    }

    #[test]
    fn test_conversions_and_void_calls() {
        let mut heap = Heap::new();
        let n = static_call("Integer", "valueOf", &[ApexValue::string(" 42 ")], &mut heap).unwrap();
        assert_eq!(n.as_i64(), Some(42));
        let bad = static_call("Integer", "valueOf", &[ApexValue::string("4x")], &mut heap).unwrap();
        assert!(bad.is_indeterminate());
        assert_eq!(bad.ty, "Integer");
        let flag = static_call("Boolean", "valueOf", &[ApexValue::string("TRUE")], &mut heap).unwrap();
        assert_eq!(flag.as_bool(), Some(true));

        let debug = static_call("System", "debug", &[ApexValue::string("x")], &mut heap).unwrap();
        assert_eq!(debug.ty, "void");
        let user = static_call("UserInfo", "getUserId", &[], &mut heap).unwrap();
        assert_eq!(user.ty, "Id");
        assert!(static_call("System", "frobnicate", &[], &mut heap).is_none());
    }

    #[test]
    fn test_database_query_uses_from_clause() {
        let mut heap = Heap::new();
        let rows = static_call(
            "Database",
            "query",
            &[ApexValue::string("SELECT Id FROM Contact WHERE Name = 'x'")],
            &mut heap,
        )
        .unwrap();
        assert_eq!(rows.ty, "List<Contact>");
        let list = rows.as_reference().unwrap();
        assert_eq!(heap.get(list).and_then(|o| o.size()), None);

        let dynamic = static_call("Database", "query", &[ApexValue::indeterminate("String")], &mut heap).unwrap();
        assert_eq!(dynamic.ty, "List<SObject>");
    }

    #[test]
    fn test_trigger_context_variables() {
        assert_eq!(trigger_variable("new", "Account").map(|v| v.ty), Some("List<Account>".to_string()));
        assert_eq!(
            trigger_variable("OldMap", "Account").map(|v| v.ty),
            Some("Map<Id,Account>".to_string())
        );
        assert_eq!(trigger_variable("isUpdate", "Account").map(|v| v.ty), Some("Boolean".to_string()));
        assert!(trigger_variable("bogus", "Account").is_none());
    }
}
