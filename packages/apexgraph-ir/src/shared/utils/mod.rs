//! Shared utilities

pub mod scope_stack;
pub mod type_names;
