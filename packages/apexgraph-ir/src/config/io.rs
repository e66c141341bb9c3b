//! Configuration I/O (YAML schema types)

use serde::{Deserialize, Serialize};

use super::engine_config::EngineConfig;

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Base preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// Field overrides applied on top of the preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineConfigPatch>,
}

/// Partial engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_expansion_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_depth_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_standard_library: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_for_loop_unroll_values: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
}

impl EngineConfigPatch {
    /// Full patch reproducing `config`
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            path_expansion_limit: Some(config.path_expansion_limit),
            stack_depth_limit: Some(config.stack_depth_limit),
            include_standard_library: Some(config.include_standard_library),
            max_for_loop_unroll_values: Some(config.max_for_loop_unroll_values),
            parallel: Some(config.parallel),
        }
    }

    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(v) = self.path_expansion_limit {
            config.path_expansion_limit = v;
        }
        if let Some(v) = self.stack_depth_limit {
            config.stack_depth_limit = v;
        }
        if let Some(v) = self.include_standard_library {
            config.include_standard_library = v;
        }
        if let Some(v) = self.max_for_loop_unroll_values {
            config.max_for_loop_unroll_values = v;
        }
        if let Some(v) = self.parallel {
            config.parallel = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut config = EngineConfig::default();
        let patch = EngineConfigPatch {
            stack_depth_limit: Some(7),
            ..Default::default()
        };
        patch.apply(&mut config);
        assert_eq!(config.stack_depth_limit, 7);
        assert_eq!(config.path_expansion_limit, EngineConfig::default().path_expansion_limit);
    }

    #[test]
    fn test_yaml_file_loading() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "version: 1\nengine:\n  path_expansion_limit: -1").unwrap();
        let config = EngineConfig::from_yaml_file(file.path()).unwrap();
        assert!(config.expansion_limit().is_unlimited());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = EngineConfig::from_yaml_str("version: 1\nengine:\n  max_depth: 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
