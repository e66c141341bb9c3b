//! Engine configuration consumed by the core
//!
//! Passed explicitly into the graph builder, the path expander and the
//! pipeline; there is no process-wide configuration singleton.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigFileV1, EngineConfigPatch};
use super::preset::Preset;
use super::validation::{check_limit, Validatable};

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// A numeric limit where a negative raw value means "unlimited"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limit(Option<usize>);

impl Limit {
    pub const UNLIMITED: Limit = Limit(None);

    /// Interpret a raw configured integer
    pub fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            Limit(None)
        } else {
            Limit(Some(raw as usize))
        }
    }

    pub fn bounded(max: usize) -> Self {
        Limit(Some(max))
    }

    pub fn is_unlimited(&self) -> bool {
        self.0.is_none()
    }

    pub fn max(&self) -> Option<usize> {
        self.0
    }

    /// Whether `count` is within the limit
    pub fn allows(&self, count: usize) -> bool {
        match self.0 {
            Some(max) => count <= max,
            None => true,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of forked paths during one expansion (-1 = unlimited)
    pub path_expansion_limit: i64,

    /// Maximum nested method-call depth during expansion (-1 = unlimited)
    pub stack_depth_limit: i64,

    /// Materialize the bundled standard-library stubs
    pub include_standard_library: bool,

    /// Upper bound on the values a classic `for` iteration variable may hold
    pub max_for_loop_unroll_values: usize,

    /// Expand independent methods in parallel (rayon)
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let (path_expansion_limit, stack_depth_limit) = Preset::Default.limits();
        Self {
            path_expansion_limit,
            stack_depth_limit,
            include_standard_library: true,
            max_for_loop_unroll_values: 100,
            parallel: true,
        }
    }
}

impl EngineConfig {
    /// Start a builder from a preset
    pub fn preset(preset: Preset) -> EngineConfigBuilder {
        let (path_expansion_limit, stack_depth_limit) = preset.limits();
        EngineConfigBuilder {
            config: EngineConfig {
                path_expansion_limit,
                stack_depth_limit,
                ..EngineConfig::default()
            },
            preset,
        }
    }

    pub fn expansion_limit(&self) -> Limit {
        Limit::from_raw(self.path_expansion_limit)
    }

    pub fn stack_depth(&self) -> Limit {
        Limit::from_raw(self.stack_depth_limit)
    }

    /// Load a `version: 1` YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        if raw.get("version").is_none() {
            return Err(ConfigError::MissingVersion);
        }
        let file: ConfigFileV1 = serde_yaml::from_value(raw)?;
        if !SUPPORTED_VERSIONS.contains(&file.version) {
            return Err(ConfigError::UnsupportedVersion {
                found: file.version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = match file.preset.as_deref() {
            Some(name) => Preset::parse(name)?,
            None => Preset::Default,
        };
        let mut builder = EngineConfig::preset(preset);
        if let Some(patch) = file.engine {
            builder = builder.apply_patch(patch);
        }
        builder.build()
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export as a `version: 1` YAML document
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: 1,
            preset: None,
            engine: Some(EngineConfigPatch::from_config(self)),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_limit("path_expansion_limit", self.path_expansion_limit)?;
        check_limit("stack_depth_limit", self.stack_depth_limit)?;
        if self.max_for_loop_unroll_values == 0 || self.max_for_loop_unroll_values > 10_000 {
            return Err(ConfigError::range_with_hint(
                "max_for_loop_unroll_values",
                self.max_for_loop_unroll_values,
                1,
                10_000,
                "Loop values beyond this bound become indeterminate",
            ));
        }
        Ok(())
    }
}

/// Builder over a preset
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
    preset: Preset,
}

impl EngineConfigBuilder {
    pub fn with_path_expansion_limit(mut self, limit: i64) -> Self {
        self.config.path_expansion_limit = limit;
        self
    }

    pub fn with_stack_depth_limit(mut self, limit: i64) -> Self {
        self.config.stack_depth_limit = limit;
        self
    }

    pub fn with_standard_library(mut self, include: bool) -> Self {
        self.config.include_standard_library = include;
        self
    }

    pub fn with_max_for_loop_unroll_values(mut self, max: usize) -> Self {
        self.config.max_for_loop_unroll_values = max;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn apply_patch(mut self, patch: EngineConfigPatch) -> Self {
        patch.apply(&mut self.config);
        self
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Validate and return the configuration
    pub fn build(self) -> ConfigResult<EngineConfig> {
        self.config.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_limit_is_unlimited() {
        assert!(Limit::from_raw(-1).is_unlimited());
        assert!(Limit::from_raw(-1).allows(usize::MAX));
        let limit = Limit::from_raw(3);
        assert!(limit.allows(3));
        assert!(!limit.allows(4));
    }

    #[test]
    fn test_builder_validates() {
        let config = EngineConfig::preset(Preset::Strict)
            .with_path_expansion_limit(10)
            .build()
            .unwrap();
        assert_eq!(config.expansion_limit(), Limit::bounded(10));
        assert_eq!(config.stack_depth(), Limit::bounded(50));

        let err = EngineConfig::preset(Preset::Default)
            .with_stack_depth_limit(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Range { .. }));

        let config = EngineConfig::preset(Preset::Default)
            .with_standard_library(false)
            .with_max_for_loop_unroll_values(8)
            .with_parallel(false)
            .build()
            .unwrap();
        assert!(!config.include_standard_library);
        assert_eq!(config.max_for_loop_unroll_values, 8);
        assert!(!config.parallel);

        let err = EngineConfig::preset(Preset::Default)
            .with_max_for_loop_unroll_values(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Range { .. }));
    }

    #[test]
    fn test_yaml_requires_version() {
        let err = EngineConfig::from_yaml_str("preset: strict\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingVersion));

        let err = EngineConfig::from_yaml_str("version: 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { found: 2, .. }));
    }

    #[test]
    fn test_yaml_preset_with_overrides() {
        let yaml = "version: 1\npreset: strict\nengine:\n  stack_depth_limit: 12\n  parallel: false\n";
        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.path_expansion_limit, 1_000);
        assert_eq!(config.stack_depth_limit, 12);
        assert!(!config.parallel);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig::preset(Preset::Unbounded).build().unwrap();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("version: 1"));
        let reloaded = EngineConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(reloaded, config);
    }
}
