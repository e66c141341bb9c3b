//! Property keys and reserved identifiers
//!
//! Keys are `&'static str` so property maps stay cheap to clone; every
//! name-bearing key has a `*_CaseSafe` shadow holding the lower-cased value.

/// Property keys stored on AST nodes and graph vertices
pub mod keys {
    pub const NAME: &str = "Name";
    pub const NAME_CS: &str = "Name_CaseSafe";
    pub const DEFINING_TYPE: &str = "DefiningType";
    pub const DEFINING_TYPE_CS: &str = "DefiningType_CaseSafe";
    pub const SUPER_CLASS_NAME: &str = "SuperClassName";
    pub const SUPER_CLASS_NAME_CS: &str = "SuperClassName_CaseSafe";
    pub const INTERFACE_NAMES: &str = "InterfaceNames";
    pub const INTERFACE_NAMES_CS: &str = "InterfaceNames_CaseSafe";
    pub const METHOD_NAME: &str = "MethodName";
    pub const METHOD_NAME_CS: &str = "MethodName_CaseSafe";
    pub const FULL_METHOD_NAME: &str = "FullMethodName";
    pub const FULL_METHOD_NAME_CS: &str = "FullMethodName_CaseSafe";
    pub const TYPE: &str = "Type";
    pub const TYPE_CS: &str = "Type_CaseSafe";
    pub const RETURN_TYPE: &str = "ReturnType";
    pub const RETURN_TYPE_CS: &str = "ReturnType_CaseSafe";
    pub const TARGET_NAME: &str = "TargetName";
    pub const TARGET_NAME_CS: &str = "TargetName_CaseSafe";
    pub const NAMES: &str = "Names";
    pub const NAMES_CS: &str = "Names_CaseSafe";
    pub const OUTER_TYPE: &str = "OuterType";
    pub const OUTER_TYPE_CS: &str = "OuterType_CaseSafe";

    pub const USAGES: &str = "Usages";
    pub const BEGIN_LINE: &str = "BeginLine";
    pub const BEGIN_COLUMN: &str = "BeginColumn";
    pub const END_LINE: &str = "EndLine";
    pub const CHILD_INDEX: &str = "ChildIdx";
    pub const FIRST_CHILD: &str = "FirstChild";
    pub const LAST_CHILD: &str = "LastChild";
    pub const FILE_NAME: &str = "FileName";

    pub const IS_STANDARD: &str = "IsStandard";
    pub const IS_STATIC: &str = "IsStatic";
    pub const IS_CONSTRUCTOR: &str = "IsConstructor";
    pub const IS_ABSTRACT: &str = "IsAbstract";
    pub const IS_IMPLICIT: &str = "IsImplicit";
    pub const IS_SYNTHETIC: &str = "IsSynthetic";
    pub const SYNTHETIC_KIND: &str = "SyntheticKind";
    pub const PROPERTY_NAME: &str = "PropertyName";
    pub const MODIFIERS: &str = "Modifiers";
    pub const ARITY: &str = "Arity";
    pub const OPERATOR: &str = "Operator";
    pub const LITERAL_TYPE: &str = "LiteralType";
    pub const VALUE: &str = "Value";
    pub const VALUES: &str = "Values";
    pub const QUERY: &str = "Query";
    pub const HAS_INIT: &str = "HasInit";
    pub const HAS_CONDITION: &str = "HasCondition";
    pub const HAS_UPDATE: &str = "HasUpdate";
    pub const HAS_FINALLY: &str = "HasFinally";
    pub const HAS_GETTER: &str = "HasGetter";
    pub const HAS_SETTER: &str = "HasSetter";
    pub const END_SCOPES: &str = "EndScopes";
    pub const UNRESOLVED_SUPERTYPES: &str = "UnresolvedSupertypes";

    /// Shadow key holding the lower-cased copy of `key`, if `key` is name-bearing
    pub fn case_safe_key(key: &str) -> Option<&'static str> {
        match key {
            NAME => Some(NAME_CS),
            DEFINING_TYPE => Some(DEFINING_TYPE_CS),
            SUPER_CLASS_NAME => Some(SUPER_CLASS_NAME_CS),
            INTERFACE_NAMES => Some(INTERFACE_NAMES_CS),
            METHOD_NAME => Some(METHOD_NAME_CS),
            FULL_METHOD_NAME => Some(FULL_METHOD_NAME_CS),
            TYPE => Some(TYPE_CS),
            RETURN_TYPE => Some(RETURN_TYPE_CS),
            TARGET_NAME => Some(TARGET_NAME_CS),
            NAMES => Some(NAMES_CS),
            OUTER_TYPE => Some(OUTER_TYPE_CS),
            _ => None,
        }
    }
}

/// Names the graph builder reserves for synthesized methods
pub mod reserved {
    /// Method wrapping a trigger body
    pub const TRIGGER_INVOKE_METHOD: &str = "invoke";
    /// Constructor method name
    pub const CONSTRUCTOR_NAME: &str = "<init>";
    /// Method that calls every static block of a class in declaration order
    pub const STATIC_BLOCK_INVOKER: &str = "<staticBlockInvoker>";
    pub const STATIC_BLOCK_PREFIX: &str = "<staticBlock";
    pub const GETTER_PREFIX: &str = "__get_";
    pub const SETTER_PREFIX: &str = "__set_";
    /// Implicit parameter of a property setter
    pub const SETTER_PARAMETER: &str = "value";

    pub const SYNTHETIC_STATIC_BLOCK: &str = "StaticBlock";
    pub const SYNTHETIC_STATIC_BLOCK_INVOKER: &str = "StaticBlockInvoker";
    pub const SYNTHETIC_GETTER: &str = "PropertyGetter";
    pub const SYNTHETIC_SETTER: &str = "PropertySetter";
    pub const SYNTHETIC_TRIGGER_INVOKE: &str = "TriggerInvoke";

    /// `<staticBlock1>`, `<staticBlock2>`, ... (1-based, declaration order)
    pub fn static_block_method_name(ordinal: usize) -> String {
        format!("{}{}>", STATIC_BLOCK_PREFIX, ordinal)
    }

    pub fn getter_name(property: &str) -> String {
        format!("{}{}", GETTER_PREFIX, property)
    }

    pub fn setter_name(property: &str) -> String {
        format!("{}{}", SETTER_PREFIX, property)
    }
}

/// Literal type tags stored under [`keys::LITERAL_TYPE`]
pub mod literal_types {
    pub const STRING: &str = "STRING";
    pub const INTEGER: &str = "INTEGER";
    pub const LONG: &str = "LONG";
    pub const DECIMAL: &str = "DECIMAL";
    pub const TRUE: &str = "TRUE";
    pub const FALSE: &str = "FALSE";
    pub const NULL: &str = "NULL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_safe_keys() {
        assert_eq!(keys::case_safe_key(keys::NAME), Some(keys::NAME_CS));
        assert_eq!(keys::case_safe_key(keys::ARITY), None);
    }

    #[test]
    fn test_reserved_names_are_not_apex_identifiers() {
        assert_eq!(reserved::static_block_method_name(2), "<staticBlock2>");
        assert_eq!(reserved::getter_name("Size"), "__get_Size");
        assert_eq!(reserved::setter_name("Size"), "__set_Size");
    }
}
