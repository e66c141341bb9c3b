//! Vertex/AST property values

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property bag keyed by the constants in [`crate::shared::constants::keys`]
pub type PropertyMap = AHashMap<&'static str, PropertyValue>;

/// A single property value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Lower-cased copy used for the case-insensitive shadow properties
    pub fn to_case_safe(&self) -> PropertyValue {
        match self {
            PropertyValue::Str(s) => PropertyValue::Str(s.to_lowercase()),
            PropertyValue::List(items) => {
                PropertyValue::List(items.iter().map(|s| s.to_lowercase()).collect())
            }
            other => other.clone(),
        }
    }

    /// Equality against a plain string: strings compare directly, lists
    /// match when any element matches
    pub fn matches_str(&self, value: &str) -> bool {
        match self {
            PropertyValue::Str(s) => s == value,
            PropertyValue::List(items) => items.iter().any(|s| s == value),
            PropertyValue::Int(i) => value.parse::<i64>().map(|v| v == *i).unwrap_or(false),
            PropertyValue::Bool(b) => value.parse::<bool>().map(|v| v == *b).unwrap_or(false),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Str(s) => f.write_str(s),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}
