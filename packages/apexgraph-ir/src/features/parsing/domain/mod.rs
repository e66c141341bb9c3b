//! Front-end domain models

mod ast;
mod error;

pub use ast::{AstNode, AstVisitor, CompilationDescriptor};
pub use error::ParseError;
