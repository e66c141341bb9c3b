//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Scan defaults: expansion limit 50,000, stack depth 450
    Default,

    /// CI: expansion limit 1,000, stack depth 50
    Strict,

    /// No limits (tests and offline investigations)
    Unbounded,
}

impl Preset {
    /// (path_expansion_limit, stack_depth_limit)
    pub fn limits(&self) -> (i64, i64) {
        match self {
            Self::Default => (50_000, 450),
            Self::Strict => (1_000, 50),
            Self::Unbounded => (-1, -1),
        }
    }

    /// Parse preset from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "strict" => Ok(Self::Strict),
            "unbounded" => Ok(Self::Unbounded),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Strict => "strict",
            Self::Unbounded => "unbounded",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parse() {
        assert_eq!(Preset::parse("STRICT").unwrap(), Preset::Strict);
        assert_eq!(Preset::parse("unbounded").unwrap().limits(), (-1, -1));
        assert!(matches!(
            Preset::parse("fast"),
            Err(ConfigError::UnknownPreset(_))
        ));
    }
}
