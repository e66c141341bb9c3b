//! Forward and reverse path enumeration over synthesized CFG edges
//!
//! Explicit-stack DFS; successors are explored in edge order so the result
//! order is stable for a given graph. Forward enumeration keeps a scope
//! depth (+1 per scope-opening vertex, minus its end scopes) and requires
//! it to return to zero at every path end.

use tracing::{debug, trace};

use crate::errors::{EngineError, Result};
use crate::features::path_enumeration::domain::{ApexPath, PathVertex};
use crate::features::property_graph::{GraphStore, VertexId};
use crate::shared::constants::keys;
use crate::shared::models::NodeKind;

pub struct PathEnumerator<'g> {
    store: &'g GraphStore,
}

struct Pending {
    vertex: VertexId,
    prefix: Vec<PathVertex>,
    depth: i64,
}

impl<'g> PathEnumerator<'g> {
    pub fn new(store: &'g GraphStore) -> Self {
        Self { store }
    }

    /// Entry block of a method (its body)
    pub fn entry(&self, method: VertexId) -> Option<VertexId> {
        self.store
            .children(method)
            .last()
            .copied()
            .filter(|b| self.store.is(*b, NodeKind::BlockStatement))
    }

    /// Every path through `method`; empty when the method has no body
    pub fn forward(&self, method: VertexId) -> Result<Vec<ApexPath>> {
        if !self.store.is(method, NodeKind::Method) {
            return Err(EngineError::internal(format!(
                "forward enumeration requested for non-method vertex {}",
                method
            )));
        }
        let Some(entry) = self.entry(method) else {
            return Ok(Vec::new());
        };

        let mut paths = Vec::new();
        let mut stack = vec![Pending {
            vertex: entry,
            prefix: Vec::new(),
            depth: 0,
        }];

        while let Some(Pending {
            vertex,
            mut prefix,
            mut depth,
        }) = stack.pop()
        {
            if self.store.label(vertex).is_some_and(|l| l.opens_scope()) {
                depth += 1;
            }
            depth -= self.store.end_scopes(vertex).len() as i64;
            if depth < 0 {
                return Err(self.scope_error(method, vertex, depth));
            }

            let successors = self.store.cfg_successors(vertex);
            match successors.as_slice() {
                [] => {
                    if depth != 0 {
                        return Err(self.scope_error(method, vertex, depth));
                    }
                    prefix.push(PathVertex::new(vertex, None));
                    paths.push(ApexPath::new(method, prefix));
                }
                [(next, kind)] => {
                    prefix.push(PathVertex::new(vertex, Some(*kind)));
                    stack.push(Pending {
                        vertex: *next,
                        prefix,
                        depth,
                    });
                }
                forks => {
                    // reversed so the first edge is explored first
                    for (next, kind) in forks.iter().rev() {
                        let mut forked = prefix.clone();
                        forked.push(PathVertex::new(vertex, Some(*kind)));
                        stack.push(Pending {
                            vertex: *next,
                            prefix: forked,
                            depth,
                        });
                    }
                }
            }
        }

        debug!(
            method = self.store.prop_str(method, keys::NAME).unwrap_or(""),
            paths = paths.len(),
            "enumerated forward paths"
        );
        Ok(paths)
    }

    /// Every path from the enclosing method's entry to `target`
    ///
    /// Expressions resolve to the statement (or condition) that evaluates
    /// them; the returned paths end at that vertex.
    pub fn reverse(&self, target: VertexId) -> Result<Vec<ApexPath>> {
        let method = self
            .store
            .enclosing(target, NodeKind::Method)
            .ok_or_else(|| EngineError::internal(format!("vertex {} is outside any method", target)))?;
        let entry = self
            .entry(method)
            .ok_or_else(|| EngineError::internal(format!("method {} has no body", method)))?;
        let Some(anchor) = self.path_vertex_for(target, entry) else {
            trace!(target = %target, "vertex is not on any path");
            return Ok(Vec::new());
        };

        let mut paths = Vec::new();
        // suffixes are built backwards, then reversed
        let mut stack = vec![(anchor, vec![PathVertex::new(anchor, None)])];
        while let Some((vertex, suffix)) = stack.pop() {
            if vertex == entry {
                let mut vertices = suffix;
                vertices.reverse();
                paths.push(ApexPath::new(method, vertices));
                continue;
            }
            let predecessors = self.store.cfg_predecessors(vertex);
            for (previous, kind) in predecessors.iter().rev() {
                let mut extended = suffix.clone();
                extended.push(PathVertex::new(*previous, Some(*kind)));
                stack.push((*previous, extended));
            }
        }

        debug!(target = %target, paths = paths.len(), "enumerated reverse paths");
        Ok(paths)
    }

    /// `target` itself when it sits on paths, else its nearest such ancestor
    fn path_vertex_for(&self, target: VertexId, entry: VertexId) -> Option<VertexId> {
        std::iter::once(target)
            .chain(self.store.ancestors(target))
            .find(|v| {
                *v == entry
                    || self.store.has_cfg_edges(*v)
                    || self.store.property(*v, keys::END_SCOPES).is_some()
            })
    }

    fn scope_error(&self, method: VertexId, vertex: VertexId, depth: i64) -> EngineError {
        EngineError::internal(format!(
            "unbalanced scopes in {}.{} at {} (depth {})",
            self.store.prop_str(method, keys::DEFINING_TYPE).unwrap_or("?"),
            self.store.prop_str(method, keys::NAME).unwrap_or("?"),
            vertex,
            depth
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::features::graph_builder::build_graph;
    use crate::features::parsing::parse_compilation_unit;
    use crate::features::property_graph::Polarity;

    fn graph(source: &str) -> GraphStore {
        let config = EngineConfig {
            include_standard_library: false,
            ..EngineConfig::default()
        };
        let unit = parse_compilation_unit("Test.cls", source).unwrap();
        build_graph(&config, &[unit]).unwrap()
    }

    fn method(store: &GraphStore, name: &str) -> VertexId {
        store
            .vertices_with_label(NodeKind::Method)
            .iter()
            .copied()
            .find(|m| store.prop_str(*m, keys::NAME) == Some(name))
            .unwrap()
    }

    #[test]
    fn test_if_else_yields_two_paths_with_polarity() {
        let store = graph("class A { void m(Boolean b) { if (b) { x(); } else { y(); } } }");
        let paths = PathEnumerator::new(&store).forward(method(&store, "m")).unwrap();
        assert_eq!(paths.len(), 2);

        let polarities: Vec<Polarity> = paths
            .iter()
            .map(|p| {
                p.vertices_with_label(&store, NodeKind::StandardCondition)
                    .next()
                    .and_then(|v| v.polarity())
                    .unwrap()
            })
            .collect();
        assert_eq!(polarities, vec![Polarity::Positive, Polarity::Negative]);
    }

    #[test]
    fn test_loops_unroll_once_plus_skip() {
        let store = graph(
            "class A { void m(List<String> xs) { for (String s : xs) { a(); } do { c(); } while (d()); } }",
        );
        let paths = PathEnumerator::new(&store).forward(method(&store, "m")).unwrap();
        // foreach: body or skip; do: body once
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_bodiless_method_has_no_paths() {
        let store = graph("abstract class A { abstract void m(); }");
        let paths = PathEnumerator::new(&store).forward(method(&store, "m")).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_reverse_from_expression_resolves_to_statement() {
        let store = graph(
            "class A { void m(Boolean b) { if (b) { return; } insert x; } }",
        );
        let insert = store.vertices_with_label(NodeKind::DmlInsertStatement)[0];
        let operand = store.children(insert)[0];
        let paths = PathEnumerator::new(&store).reverse(operand).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].last(), Some(insert));
        assert_eq!(paths[0].first(), PathEnumerator::new(&store).entry(method(&store, "m")));
    }
}
