use thiserror::Error;

/// Front-end failure with the offending location
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error in {unit} at {line}:{column}: {message}")]
pub struct ParseError {
    pub unit: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(unit: impl Into<String>, line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            line,
            column,
            message: message.into(),
        }
    }
}
