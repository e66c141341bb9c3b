//! Error types for apexgraph-ir
//!
//! Three kinds of failure leave the engine:
//! - [`UserActionError`]: malformed input the user can fix (unreachable code)
//! - [`EngineError::PathExpansionLimitReached`]: a resource limit aborted an expansion
//! - [`EngineError::Internal`]: an invariant broke; an engine defect, never user-actionable
//!
//! Unresolvable references are not errors: they become indeterminate values.

use thiserror::Error;

use crate::config::ConfigError;
use crate::features::parsing::ParseError;

/// User-actionable compile error carrying a source location
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({unit}:{line}:{column})")]
pub struct UserActionError {
    pub message: String,
    /// Compilation unit (file) name
    pub unit: String,
    pub line: u32,
    pub column: u32,
}

impl UserActionError {
    pub fn new(message: impl Into<String>, unit: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            unit: unit.into(),
            line,
            column,
        }
    }
}

/// Main error type for apexgraph-ir operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input reported to the end user
    #[error(transparent)]
    UserAction(#[from] UserActionError),

    /// Total expanded-path count exceeded the configured limit
    #[error("Path expansion limit reached: more than {limit} expanded paths")]
    PathExpansionLimitReached { limit: usize },

    /// Front-end failure
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invariant violation inside the engine
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    pub fn is_user_actionable(&self) -> bool {
        matches!(self, EngineError::UserAction(_) | EngineError::Parse(_))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_action_error_display_carries_location() {
        let err = UserActionError::new("Unreachable statement in method MyClass.foo", "MyClass.cls", 7, 9);
        assert_eq!(
            err.to_string(),
            "Unreachable statement in method MyClass.foo (MyClass.cls:7:9)"
        );
        let engine: EngineError = err.into();
        assert!(engine.is_user_actionable());
    }

    #[test]
    fn test_limit_error_is_not_user_actionable() {
        let err = EngineError::PathExpansionLimitReached { limit: 10 };
        assert!(!err.is_user_actionable());
        assert!(err.to_string().contains("10"));
        assert!(!EngineError::internal("bad vertex").is_user_actionable());
    }
}
