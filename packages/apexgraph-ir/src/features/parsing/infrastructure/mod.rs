//! Lexer and recursive-descent parser for Apex source

mod expressions;
mod lexer;
mod parser;
mod statements;

pub use lexer::{tokenize, Token, TokenKind};
pub use parser::Parser;
