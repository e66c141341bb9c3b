//! Path expansion domain: configuration and expansion sites

mod config;
mod site;

pub use config::{ExpanderConfig, ExpanderConfigBuilder};
pub use site::{Site, SiteTarget};
