//! Apex front-end
//!
//! Turns Apex source text into the AST the graph builder consumes:
//! - Domain: `AstNode`, `CompilationDescriptor`, `ParseError`
//! - Infrastructure: lexer + recursive-descent parser
//! - Application: `parse_compilation_unit` entry point
//!
//! The graph builder only depends on the domain types; any front-end that
//! produces the same node shapes can replace this one.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{parse_compilation_unit, parse_compilation_units};
pub use domain::{AstNode, AstVisitor, CompilationDescriptor, ParseError};
