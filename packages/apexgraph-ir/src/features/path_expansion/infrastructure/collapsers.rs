//! Built-in collapsers

use crate::features::path_enumeration::ApexPath;
use crate::features::path_expansion::ports::PathCollapser;
use crate::features::property_graph::GraphStore;
use crate::features::vertex_model::{LiteralVertex, VertexRef};
use crate::shared::models::NodeKind;

/// Merges callee paths that return the same literal, or the same variable
///
/// Typical target is a lazily initialized singleton accessor: both sides of
/// `if (instance == null)` end in `return instance;`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReturnValueCollapser;

impl PathCollapser for ReturnValueCollapser {
    fn name(&self) -> &'static str {
        "ReturnValueCollapser"
    }

    fn collapse_key(&self, store: &GraphStore, path: &ApexPath) -> Option<String> {
        let last = path.last()?;
        if !store.is(last, NodeKind::ReturnStatement) {
            return None;
        }
        let value = VertexRef::new(store, last).child(0)?;
        match value.label() {
            NodeKind::LiteralExpression => {
                let literal = LiteralVertex(value);
                Some(format!("lit:{}:{}", literal.literal_type(), literal.text()))
            }
            NodeKind::VariableExpression => value.name().map(|n| format!("var:{}", n.to_lowercase())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::features::graph_builder::build_graph;
    use crate::features::parsing::parse_compilation_unit;
    use crate::features::path_enumeration::enumerate_forward;
    use crate::shared::constants::keys;

    #[test]
    fn test_singleton_accessor_paths_share_a_key() {
        let config = EngineConfig {
            include_standard_library: false,
            ..EngineConfig::default()
        };
        let unit = parse_compilation_unit(
            "Cache.cls",
            "public class Cache { static Cache instance; static Cache getInstance() { if (instance == null) { instance = new Cache(); } return instance; } Integer code(Boolean b) { if (b) { return 1; } return 2; } }",
        )
        .unwrap();
        let store = build_graph(&config, &[unit]).unwrap();
        let method = |name: &str| {
            store
                .vertices_with_label(NodeKind::Method)
                .iter()
                .copied()
                .find(|m| store.prop_str(*m, keys::NAME) == Some(name))
                .unwrap()
        };

        let singleton = enumerate_forward(&store, method("getInstance")).unwrap();
        assert_eq!(singleton.len(), 2);
        let found: Vec<_> = singleton
            .iter()
            .map(|p| ReturnValueCollapser.collapse_key(&store, p))
            .collect();
        assert_eq!(found[0], Some("var:instance".to_string()));
        assert_eq!(found[0], found[1]);

        let codes = enumerate_forward(&store, method("code")).unwrap();
        let found: Vec<_> = codes
            .iter()
            .map(|p| ReturnValueCollapser.collapse_key(&store, p))
            .collect();
        assert_ne!(found[0], found[1]);
    }
}
