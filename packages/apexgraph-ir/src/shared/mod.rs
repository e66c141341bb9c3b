//! Shared module - Common types and utilities
//!
//! Types that every feature agrees on: vertex labels, property values, source
//! spans, property-key constants and type-name helpers.

pub mod constants;
pub mod models;
pub mod utils;

// Re-exports for convenience
pub use models::*;
pub use utils::scope_stack::ScopeStack;
