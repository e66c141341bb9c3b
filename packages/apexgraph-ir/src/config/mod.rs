//! Engine configuration
//!
//! The core reads two limits (path-expansion and stack-depth) plus a few
//! tuning knobs. How they are sourced is the caller's business; this module
//! offers presets, a builder, YAML I/O and validation.
//!
//! # Examples
//!
//! ```rust,ignore
//! use apexgraph_ir::config::{EngineConfig, Preset};
//!
//! let config = EngineConfig::preset(Preset::Strict)
//!     .with_path_expansion_limit(5_000)
//!     .build()?;
//!
//! let config = EngineConfig::from_yaml_str("version: 1\npreset: unbounded\n")?;
//! ```

pub mod engine_config;
pub mod error;
pub mod io;
pub mod preset;
pub mod validation;

// Re-exports
pub use engine_config::{EngineConfig, EngineConfigBuilder, Limit};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigFileV1, EngineConfigPatch};
pub use preset::Preset;
pub use validation::Validatable;
