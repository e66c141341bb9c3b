//! Bundled standard-library declarations
//!
//! Stub sources for the standard types user code commonly extends or
//! implements. They go through the same front-end as user code and are
//! materialized with `IsStandard = true`, so `extends Exception` or
//! `implements Database.Batchable<SObject>` gets a real inheritance edge.

use once_cell::sync::OnceCell;

use crate::features::parsing::{parse_compilation_unit, CompilationDescriptor, ParseError};

const EXCEPTION: &str = r#"
global virtual class Exception {
    global Exception() { }
    global Exception(String message) { }
    global virtual String getMessage() { return null; }
    global virtual String getTypeName() { return null; }
    global virtual Integer getLineNumber() { return null; }
    global virtual String getStackTraceString() { return null; }
    global virtual Exception getCause() { return null; }
    global virtual void setMessage(String message) { }
}
"#;

const EXCEPTION_SUBCLASSES: &[&str] = &[
    "AuraHandledException",
    "CalloutException",
    "DmlException",
    "HandledException",
    "IllegalArgumentException",
    "JSONException",
    "LimitException",
    "ListException",
    "MathException",
    "NoAccessException",
    "NullPointerException",
    "QueryException",
    "SecurityException",
    "SObjectException",
    "StringException",
    "TypeException",
];

const SCHEDULABLE: &str = r#"
global interface Schedulable {
    void execute(SchedulableContext context);
}
"#;

const QUEUEABLE: &str = r#"
global interface Queueable {
    void execute(QueueableContext context);
}
"#;

const COMPARABLE: &str = r#"
global interface Comparable {
    Integer compareTo(Object other);
}
"#;

const DATABASE: &str = r#"
global class Database {
    global interface Batchable {
        Iterable<SObject> start(Database.BatchableContext context);
        void execute(Database.BatchableContext context, List<SObject> scope);
        void finish(Database.BatchableContext context);
    }
    global interface Stateful { }
    global interface AllowsCallouts { }
}
"#;

static UNITS: OnceCell<Vec<CompilationDescriptor>> = OnceCell::new();

/// Parsed stub units, parsed once per process
pub fn standard_library_units() -> Result<&'static [CompilationDescriptor], ParseError> {
    UNITS
        .get_or_try_init(parse_all)
        .map(|units| units.as_slice())
}

fn parse_all() -> Result<Vec<CompilationDescriptor>, ParseError> {
    let mut units = vec![parse_compilation_unit("StandardLibrary/Exception.cls", EXCEPTION)?];
    for name in EXCEPTION_SUBCLASSES {
        let source = format!("global class {} extends Exception {{ }}", name);
        units.push(parse_compilation_unit(
            &format!("StandardLibrary/{}.cls", name),
            &source,
        )?);
    }
    for (name, source) in [
        ("Schedulable", SCHEDULABLE),
        ("Queueable", QUEUEABLE),
        ("Comparable", COMPARABLE),
        ("Database", DATABASE),
    ] {
        units.push(parse_compilation_unit(
            &format!("StandardLibrary/{}.cls", name),
            source,
        )?);
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::keys;
    use crate::shared::models::NodeKind;

    #[test]
    fn test_stubs_parse() {
        let units = standard_library_units().unwrap();
        assert_eq!(units.len(), 1 + EXCEPTION_SUBCLASSES.len() + 4);
        let database = units.last().unwrap();
        let inner: Vec<&str> = database
            .root
            .children_of_kind(NodeKind::UserInterface)
            .filter_map(|c| c.prop_str(keys::NAME))
            .collect();
        assert_eq!(inner, vec!["Batchable", "Stateful", "AllowsCallouts"]);
    }
}
