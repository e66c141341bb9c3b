//! Source spans
//!
//! Lines and columns are 1-based, as the lexer reports them. Synthesized
//! vertices (implicit else blocks, accessor methods, static-init invokers)
//! borrow the span of the node they were made for; declarations the parser
//! has not finished yet start at [`Span::zero`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    pub fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::zero()
    }
}
