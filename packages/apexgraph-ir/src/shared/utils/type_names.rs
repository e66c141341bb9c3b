//! Canonical Apex type names
//!
//! Type references are case-insensitive and have aliases (`String[]` is a
//! `List<String>`, `SObjectType` is `Schema.SObjectType`). Every value and
//! declared type in the engine goes through [`canonical_type`] so equality
//! checks can stay plain string comparisons.

pub const OBJECT: &str = "Object";
pub const SOBJECT: &str = "SObject";
pub const STRING: &str = "String";
pub const INTEGER: &str = "Integer";
pub const LONG: &str = "Long";
pub const DECIMAL: &str = "Decimal";
pub const DOUBLE: &str = "Double";
pub const BOOLEAN: &str = "Boolean";
pub const ID: &str = "Id";
pub const VOID: &str = "void";
pub const NULL_TYPE: &str = "null";
pub const LIST: &str = "List";
pub const SET: &str = "Set";
pub const MAP: &str = "Map";

const WELL_KNOWN: &[&str] = &[
    "Object",
    "SObject",
    "String",
    "Integer",
    "Long",
    "Decimal",
    "Double",
    "Boolean",
    "Id",
    "Date",
    "Datetime",
    "Time",
    "Blob",
    "void",
    "List",
    "Set",
    "Map",
    "Exception",
    "Schema",
    "Schema.SObjectType",
    "Schema.SObjectField",
    "Schema.DescribeSObjectResult",
    "Schema.DescribeFieldResult",
    "Schema.FieldSet",
    "System",
    "Database",
    "UserInfo",
    "Math",
    "Trigger",
];

const SCHEMA_ALIASES: &[&str] = &[
    "SObjectType",
    "SObjectField",
    "DescribeSObjectResult",
    "DescribeFieldResult",
    "FieldSet",
];

const PRIMITIVES: &[&str] = &[
    "String", "Integer", "Long", "Decimal", "Double", "Boolean", "Id", "Date", "Datetime", "Time",
    "Blob",
];

/// Canonical spelling of a type reference
pub fn canonical_type(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return OBJECT.to_string();
    }

    if let Some(element) = compact.strip_suffix("[]") {
        return format!("{}<{}>", LIST, canonical_type(element));
    }

    let (base, args) = split_generic(&compact);
    let base = canonical_base(base);
    if args.is_empty() {
        base
    } else {
        let args: Vec<String> = args.iter().map(|a| canonical_type(a)).collect();
        format!("{}<{}>", base, args.join(","))
    }
}

fn canonical_base(base: &str) -> String {
    for known in WELL_KNOWN {
        if known.eq_ignore_ascii_case(base) {
            return known.to_string();
        }
    }
    for alias in SCHEMA_ALIASES {
        if alias.eq_ignore_ascii_case(base) {
            return format!("Schema.{}", alias);
        }
    }
    base.to_string()
}

/// Split `Map<String,List<Id>>` into `("Map", ["String", "List<Id>"])`
pub fn split_generic(ty: &str) -> (&str, Vec<&str>) {
    let Some(open) = ty.find('<') else {
        return (ty, Vec::new());
    };
    if !ty.ends_with('>') {
        return (ty, Vec::new());
    }
    let base = &ty[..open];
    let inner = &ty[open + 1..ty.len() - 1];

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        args.push(last);
    }
    (base, args)
}

/// Base name without generic arguments
pub fn base_type(ty: &str) -> &str {
    split_generic(ty).0
}

pub fn types_equal(a: &str, b: &str) -> bool {
    canonical_type(a).eq_ignore_ascii_case(&canonical_type(b))
}

pub fn is_primitive(ty: &str) -> bool {
    let canonical = canonical_type(ty);
    PRIMITIVES.iter().any(|p| *p == canonical)
}

pub fn is_collection(ty: &str) -> bool {
    matches!(base_type(&canonical_type(ty)), LIST | SET | MAP)
}

/// Element type of a `List`/`Set`, value type of a `Map`
pub fn element_type(ty: &str) -> Option<String> {
    let canonical = canonical_type(ty);
    let (base, args) = split_generic(&canonical);
    match (base, args.as_slice()) {
        (LIST, [element]) | (SET, [element]) => Some(element.to_string()),
        (MAP, [_, value]) => Some(value.to_string()),
        _ => None,
    }
}

/// Key type of a `Map`
pub fn key_type(ty: &str) -> Option<String> {
    let canonical = canonical_type(ty);
    let (base, args) = split_generic(&canonical);
    match (base, args.as_slice()) {
        (MAP, [key, _]) => Some(key.to_string()),
        _ => None,
    }
}

pub fn list_of(element: &str) -> String {
    format!("{}<{}>", LIST, canonical_type(element))
}

pub fn set_of(element: &str) -> String {
    format!("{}<{}>", SET, canonical_type(element))
}

pub fn map_of(key: &str, value: &str) -> String {
    format!("{}<{},{}>", MAP, canonical_type(key), canonical_type(value))
}

/// Numeric widening allowed by Apex for implicit conversions
pub fn widening_distance(from: &str, to: &str) -> Option<usize> {
    const NUMERIC_ORDER: &[&str] = &[INTEGER, LONG, DOUBLE, DECIMAL];
    let from = canonical_type(from);
    let to = canonical_type(to);
    if from == ID && to == STRING {
        return Some(1);
    }
    let from_idx = NUMERIC_ORDER.iter().position(|t| *t == from)?;
    let to_idx = NUMERIC_ORDER.iter().position(|t| *t == to)?;
    if to_idx > from_idx {
        Some(to_idx - from_idx)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_primitives_and_arrays() {
        assert_eq!(canonical_type("string"), "String");
        assert_eq!(canonical_type("STRING[]"), "List<String>");
        assert_eq!(canonical_type("map< string , list<id> >"), "Map<String,List<Id>>");
        assert_eq!(canonical_type("sobjecttype"), "Schema.SObjectType");
        assert_eq!(canonical_type("MyClass.Inner"), "MyClass.Inner");
    }

    #[test]
    fn test_split_generic_nested() {
        let (base, args) = split_generic("Map<String,Map<Id,List<Account>>>");
        assert_eq!(base, "Map");
        assert_eq!(args, vec!["String", "Map<Id,List<Account>>"]);
    }

    #[test]
    fn test_element_and_key_types() {
        assert_eq!(element_type("List<Account>").as_deref(), Some("Account"));
        assert_eq!(element_type("Map<String,Integer>").as_deref(), Some("Integer"));
        assert_eq!(key_type("Map<String,Integer>").as_deref(), Some("String"));
        assert_eq!(element_type("String"), None);
    }

    #[test]
    fn test_widening() {
        assert_eq!(widening_distance("Integer", "Long"), Some(1));
        assert_eq!(widening_distance("Integer", "Decimal"), Some(3));
        assert_eq!(widening_distance("Decimal", "Integer"), None);
        assert_eq!(widening_distance("Id", "String"), Some(1));
    }
}
