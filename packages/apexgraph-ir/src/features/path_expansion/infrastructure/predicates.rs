//! Built-in vertex predicates

use crate::features::path_expansion::ports::VertexPredicate;
use crate::features::vertex_model::{Invocable, InvocationVertex, VertexRef};
use crate::shared::constants::keys;
use crate::shared::models::NodeKind;

/// Any DML statement
#[derive(Debug, Default, Clone, Copy)]
pub struct DmlStatementPredicate;

impl VertexPredicate for DmlStatementPredicate {
    fn name(&self) -> &'static str {
        "DmlStatementPredicate"
    }

    fn matches(&self, vertex: VertexRef<'_>) -> bool {
        vertex.label().is_dml()
    }
}

/// Method calls by simple name (`query`) or full name (`Database.query`),
/// case-insensitive
#[derive(Debug, Clone, Default)]
pub struct MethodCallPredicate {
    names: Vec<String>,
}

impl MethodCallPredicate {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|n| n.as_ref().to_lowercase()).collect(),
        }
    }
}

impl VertexPredicate for MethodCallPredicate {
    fn name(&self) -> &'static str {
        "MethodCallPredicate"
    }

    fn matches(&self, vertex: VertexRef<'_>) -> bool {
        if !vertex.is(NodeKind::MethodCallExpression) {
            return false;
        }
        let call = InvocationVertex(vertex);
        [call.method_name(), call.prop_str(keys::FULL_METHOD_NAME)]
            .into_iter()
            .flatten()
            .any(|name| self.names.iter().any(|wanted| name.eq_ignore_ascii_case(wanted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::features::graph_builder::build_graph;
    use crate::features::parsing::parse_compilation_unit;

    #[test]
    fn test_predicates_match_by_kind_and_name() {
        let config = EngineConfig {
            include_standard_library: false,
            ..EngineConfig::default()
        };
        let unit = parse_compilation_unit(
            "A.cls",
            "public class A { void run() { List<Account> rows = Database.query('SELECT Id FROM Account'); insert rows; rows.clear(); } }",
        )
        .unwrap();
        let store = build_graph(&config, &[unit]).unwrap();

        let insert = store.vertices_with_label(NodeKind::DmlInsertStatement)[0];
        assert!(DmlStatementPredicate.matches(VertexRef::new(&store, insert)));

        let predicate = MethodCallPredicate::new(["database.QUERY"]);
        let matched: Vec<_> = store
            .vertices_with_label(NodeKind::MethodCallExpression)
            .iter()
            .filter(|c| predicate.matches(VertexRef::new(&store, **c)))
            .map(|c| store.prop_str(*c, keys::METHOD_NAME))
            .collect();
        assert_eq!(matched, vec![Some("query")]);
    }
}
