//! Abstract values
//!
//! ```text
//! ApexValue ::= type × kind × origin
//! kind      ::= Determinate(literal) | Reference(heap ref) | ForLoop(values)
//!             | Schema(token) | Indeterminate
//! ```
//!
//! A value always carries its canonical type; an indeterminate value loses
//! only its content.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::features::property_graph::VertexId;
use crate::shared::utils::type_names::{self as types, canonical_type};

/// Address of an object or collection in a walk's heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeapRef(pub u32);

impl fmt::Display for HeapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Long(i64),
    Decimal(f64),
    String(String),
    /// Enum constant by name
    Enum(String),
}

impl Literal {
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Null => types::NULL_TYPE,
            Literal::Boolean(_) => types::BOOLEAN,
            Literal::Integer(_) => types::INTEGER,
            Literal::Long(_) => types::LONG,
            Literal::Decimal(_) => types::DECIMAL,
            Literal::String(_) => types::STRING,
            Literal::Enum(_) => types::OBJECT,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Integer(i) | Literal::Long(i) => write!(f, "{}", i),
            Literal::Decimal(d) => write!(f, "{}", d),
            Literal::String(s) | Literal::Enum(s) => write!(f, "{}", s),
        }
    }
}

/// Step of the schema describe chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    /// `Schema.getGlobalDescribe()`
    GlobalDescribe,
    /// `Account.SObjectType`, `globalDescribe.get('Account')`
    SObjectType,
    /// `getDescribe()` on an SObjectType
    DescribeSObjectResult,
    /// `fields.getMap()`
    FieldMap,
    /// `Account.Name`, `fieldMap.get('Name')`
    SObjectField,
    /// `getDescribe()` on an SObjectField
    DescribeFieldResult,
}

impl SchemaKind {
    pub fn type_name(&self) -> String {
        match self {
            SchemaKind::GlobalDescribe => types::map_of(types::STRING, "Schema.SObjectType"),
            SchemaKind::SObjectType => "Schema.SObjectType".to_string(),
            SchemaKind::DescribeSObjectResult => "Schema.DescribeSObjectResult".to_string(),
            SchemaKind::FieldMap => types::map_of(types::STRING, "Schema.SObjectField"),
            SchemaKind::SObjectField => "Schema.SObjectField".to_string(),
            SchemaKind::DescribeFieldResult => "Schema.DescribeFieldResult".to_string(),
        }
    }
}

/// Schema token; `None` names mean the object or field is not statically known
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaValue {
    pub kind: SchemaKind,
    pub object: Option<String>,
    pub field: Option<String>,
}

impl SchemaValue {
    pub fn new(kind: SchemaKind, object: Option<String>, field: Option<String>) -> Self {
        Self { kind, object, field }
    }

    /// Same token moved along the describe chain
    pub fn step(&self, kind: SchemaKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }

    /// Whether the object (and field, where relevant) is known
    pub fn is_resolved(&self) -> bool {
        let field_known = match self.kind {
            SchemaKind::SObjectField | SchemaKind::DescribeFieldResult => self.field.is_some(),
            _ => true,
        };
        (self.kind == SchemaKind::GlobalDescribe || self.object.is_some()) && field_known
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueKind {
    Determinate(Literal),
    Reference(HeapRef),
    /// Values an iteration variable takes across the loop's single pass
    ForLoop(Vec<ApexValue>),
    Schema(SchemaValue),
    Indeterminate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApexValue {
    /// Canonical type
    pub ty: String,
    pub kind: ValueKind,
    /// Expression or declaration that produced the value
    pub origin: Option<VertexId>,
}

impl ApexValue {
    pub fn new(ty: impl AsRef<str>, kind: ValueKind) -> Self {
        Self {
            ty: canonical_type(ty.as_ref()),
            kind,
            origin: None,
        }
    }

    pub fn literal(literal: Literal) -> Self {
        let ty = literal.type_name();
        Self::new(ty, ValueKind::Determinate(literal))
    }

    pub fn null() -> Self {
        Self::literal(Literal::Null)
    }

    /// Null declared as `ty` (uninitialized variable or field)
    pub fn null_of(ty: &str) -> Self {
        Self::new(ty, ValueKind::Determinate(Literal::Null))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(Literal::String(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::literal(Literal::Integer(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::literal(Literal::Boolean(value))
    }

    pub fn indeterminate(ty: &str) -> Self {
        Self::new(ty, ValueKind::Indeterminate)
    }

    pub fn reference(ty: &str, heap_ref: HeapRef) -> Self {
        Self::new(ty, ValueKind::Reference(heap_ref))
    }

    pub fn schema(token: SchemaValue) -> Self {
        Self::new(token.kind.type_name(), ValueKind::Schema(token))
    }

    pub fn for_loop(element_type: &str, values: Vec<ApexValue>) -> Self {
        Self::new(element_type, ValueKind::ForLoop(values))
    }

    pub fn with_origin(mut self, origin: VertexId) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Same content, viewed through a declared type
    pub fn retyped(mut self, ty: &str) -> Self {
        let ty = canonical_type(ty);
        // keep the more precise runtime type of determinate values and objects
        if matches!(self.kind, ValueKind::Indeterminate | ValueKind::ForLoop(_))
            || self.is_null()
        {
            self.ty = ty;
        }
        self
    }

    pub fn is_determinate(&self) -> bool {
        matches!(self.kind, ValueKind::Determinate(_))
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self.kind, ValueKind::Indeterminate)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Determinate(Literal::Null))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ValueKind::Determinate(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::Determinate(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.kind {
            ValueKind::Determinate(Literal::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match &self.kind {
            ValueKind::Determinate(Literal::Integer(i) | Literal::Long(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match &self.kind {
            ValueKind::Determinate(Literal::Integer(i) | Literal::Long(i)) => Some(*i as f64),
            ValueKind::Determinate(Literal::Decimal(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<HeapRef> {
        match self.kind {
            ValueKind::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaValue> {
        match &self.kind {
            ValueKind::Schema(s) => Some(s),
            _ => None,
        }
    }

    pub fn loop_values(&self) -> Option<&[ApexValue]> {
        match &self.kind {
            ValueKind::ForLoop(values) => Some(values),
            _ => None,
        }
    }

    /// Text used when the value is concatenated into a string
    pub fn display_text(&self) -> Option<String> {
        match &self.kind {
            ValueKind::Determinate(l) => Some(l.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for ApexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Determinate(Literal::String(s)) => write!(f, "'{}'", s),
            ValueKind::Determinate(l) => write!(f, "{}", l),
            ValueKind::Reference(r) => write!(f, "{}{}", self.ty, r),
            ValueKind::ForLoop(values) => write!(f, "for<{}>[{} values]", self.ty, values.len()),
            ValueKind::Schema(s) => write!(f, "{:?}({:?}.{:?})", s.kind, s.object, s.field),
            ValueKind::Indeterminate => write!(f, "?{}", self.ty),
        }
    }
}
