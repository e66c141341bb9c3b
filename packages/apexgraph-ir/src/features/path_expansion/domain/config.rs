//! Expander configuration and its builder

use std::fmt;
use std::sync::Arc;

use crate::features::path_expansion::ports::{
    PathCollapser, PathConstrainer, PathExcluder, VertexPredicate,
};

/// How a seed path is expanded
///
/// Plugins are shared (`Arc`) so one configuration can drive expansions on
/// several rayon workers.
#[derive(Clone)]
pub struct ExpanderConfig {
    pub expand_method_calls: bool,
    pub collapsers: Vec<Arc<dyn PathCollapser>>,
    pub excluders: Vec<Arc<dyn PathExcluder>>,
    pub constrainers: Vec<Arc<dyn PathConstrainer>>,
    pub vertex_predicates: Vec<Arc<dyn VertexPredicate>>,
}

impl ExpanderConfig {
    pub fn builder() -> ExpanderConfigBuilder {
        ExpanderConfigBuilder::new()
    }

    /// Enumerated paths only; invocations stay unexpanded
    pub fn no_expansion() -> Self {
        Self::builder().expand_method_calls(false).build()
    }

    pub fn has_plugins(&self) -> bool {
        !(self.collapsers.is_empty()
            && self.excluders.is_empty()
            && self.constrainers.is_empty()
            && self.vertex_predicates.is_empty())
    }
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ExpanderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |v: Vec<&'static str>| v.join(",");
        f.debug_struct("ExpanderConfig")
            .field("expand_method_calls", &self.expand_method_calls)
            .field("collapsers", &names(self.collapsers.iter().map(|p| p.name()).collect()))
            .field("excluders", &names(self.excluders.iter().map(|p| p.name()).collect()))
            .field("constrainers", &names(self.constrainers.iter().map(|p| p.name()).collect()))
            .field(
                "vertex_predicates",
                &names(self.vertex_predicates.iter().map(|p| p.name()).collect()),
            )
            .finish()
    }
}

/// Builder for [`ExpanderConfig`]
pub struct ExpanderConfigBuilder {
    config: ExpanderConfig,
}

impl ExpanderConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ExpanderConfig {
                expand_method_calls: true,
                collapsers: Vec::new(),
                excluders: Vec::new(),
                constrainers: Vec::new(),
                vertex_predicates: Vec::new(),
            },
        }
    }

    pub fn expand_method_calls(mut self, expand: bool) -> Self {
        self.config.expand_method_calls = expand;
        self
    }

    pub fn with_collapser(mut self, collapser: impl PathCollapser + 'static) -> Self {
        self.config.collapsers.push(Arc::new(collapser));
        self
    }

    pub fn with_excluder(mut self, excluder: impl PathExcluder + 'static) -> Self {
        self.config.excluders.push(Arc::new(excluder));
        self
    }

    pub fn with_constrainer(mut self, constrainer: impl PathConstrainer + 'static) -> Self {
        self.config.constrainers.push(Arc::new(constrainer));
        self
    }

    pub fn with_vertex_predicate(mut self, predicate: impl VertexPredicate + 'static) -> Self {
        self.config.vertex_predicates.push(Arc::new(predicate));
        self
    }

    pub fn build(self) -> ExpanderConfig {
        self.config
    }
}

impl Default for ExpanderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::path_expansion::infrastructure::{DmlStatementPredicate, NullCheckConstrainer};

    #[test]
    fn test_builder_registers_plugins() {
        assert!(!ExpanderConfig::default().has_plugins());
        assert!(!ExpanderConfig::no_expansion().expand_method_calls);

        let config = ExpanderConfig::builder()
            .with_constrainer(NullCheckConstrainer)
            .with_vertex_predicate(DmlStatementPredicate)
            .build();
        assert!(config.has_plugins());
        assert!(config.expand_method_calls);
        let debug = format!("{config:?}");
        assert!(debug.contains("vertex_predicates: \"DmlStatementPredicate\""), "{debug}");
    }
}
