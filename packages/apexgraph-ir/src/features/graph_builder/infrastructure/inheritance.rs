//! Second pass: `extends` / `implements` resolution
//!
//! Needs every unit materialized. A bare name resolves against the
//! referencing type's own inner types, then its outer type's inner types,
//! then the global type space; a dotted name is looked up exactly. Generic
//! arguments are ignored. Supertypes nobody declares are recorded in
//! `UnresolvedSupertypes` without an edge.

use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace};

use crate::errors::{EngineError, Result};
use crate::features::property_graph::{EdgeLabel, GraphStore, VertexId};
use crate::shared::constants::keys;
use crate::shared::models::NodeKind;
use crate::shared::utils::type_names::base_type;

/// Counts produced by one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InheritanceStats {
    pub edges: usize,
    pub unresolved: usize,
}

pub struct InheritanceResolver<'s> {
    store: &'s mut GraphStore,
    /// Lower-cased qualified name → type declaration vertex
    types: AHashMap<String, VertexId>,
}

impl<'s> InheritanceResolver<'s> {
    pub fn new(store: &'s mut GraphStore) -> Self {
        let mut types = AHashMap::new();
        for id in type_declarations(store) {
            if let Some(name) = store.prop_str(id, keys::DEFINING_TYPE) {
                // first declaration wins; user units are materialized before stubs
                types.entry(name.to_lowercase()).or_insert(id);
            }
        }
        Self { store, types }
    }

    pub fn resolve_all(mut self) -> Result<InheritanceStats> {
        let mut stats = InheritanceStats::default();

        for id in type_declarations(self.store) {
            let is_interface = self.store.is(id, NodeKind::UserInterface);
            let mut links: Vec<(String, EdgeLabel)> = Vec::new();

            if let Some(super_class) = self.store.prop_str(id, keys::SUPER_CLASS_NAME) {
                links.push((super_class.to_string(), EdgeLabel::ExtensionOf));
            }
            // interfaces extend other interfaces; classes implement them
            let interface_label = if is_interface {
                EdgeLabel::ExtensionOf
            } else {
                EdgeLabel::ImplementationOf
            };
            for name in self.store.prop_list(id, keys::INTERFACE_NAMES) {
                links.push((name.clone(), interface_label));
            }

            let mut unresolved = Vec::new();
            for (reference, label) in links {
                match self.resolve(id, &reference) {
                    Some(target) if target != id => {
                        self.link(id, target, label);
                        stats.edges += 1;
                    }
                    Some(_) => {
                        return Err(EngineError::internal(format!(
                            "type {} lists itself as a supertype",
                            self.store.prop_str(id, keys::DEFINING_TYPE).unwrap_or("?")
                        )));
                    }
                    None => {
                        trace!(supertype = %reference, "unresolved supertype");
                        unresolved.push(reference);
                    }
                }
            }
            if !unresolved.is_empty() {
                stats.unresolved += unresolved.len();
                self.store
                    .set_property(id, keys::UNRESOLVED_SUPERTYPES, unresolved);
            }
        }

        self.check_acyclic()?;
        debug!(edges = stats.edges, unresolved = stats.unresolved, "resolved inheritance");
        Ok(stats)
    }

    /// Resolve a supertype reference written inside type `from`
    fn resolve(&self, from: VertexId, reference: &str) -> Option<VertexId> {
        let name = base_type(reference).to_lowercase();
        if name.contains('.') {
            return self.types.get(&name).copied();
        }
        let own = self
            .store
            .prop_str(from, keys::DEFINING_TYPE_CS)
            .map(|own| format!("{}.{}", own, name));
        let outer = self
            .store
            .prop_str(from, keys::OUTER_TYPE_CS)
            .map(|outer| format!("{}.{}", outer, name));

        own.into_iter()
            .chain(outer)
            .chain(std::iter::once(name))
            .find_map(|candidate| self.types.get(&candidate).copied())
    }

    fn link(&mut self, from: VertexId, to: VertexId, label: EdgeLabel) {
        self.store.add_edge(from, to, label);
        if let Some(reverse) = label.reverse() {
            self.store.add_edge(to, from, reverse);
        }
    }

    /// An extension chain that revisits a type is a builder defect
    fn check_acyclic(&self) -> Result<()> {
        for start in type_declarations(self.store) {
            let mut seen = AHashSet::new();
            let mut frontier = vec![start];
            while let Some(current) = frontier.pop() {
                for next in self.store.out_neighbors(current, EdgeLabel::ExtensionOf) {
                    if next == start {
                        return Err(EngineError::internal(format!(
                            "cyclic extension chain through {}",
                            self.store.prop_str(start, keys::DEFINING_TYPE).unwrap_or("?")
                        )));
                    }
                    if seen.insert(next) {
                        frontier.push(next);
                    }
                }
            }
        }
        Ok(())
    }
}

fn type_declarations(store: &GraphStore) -> Vec<VertexId> {
    let mut ids: Vec<VertexId> = [
        NodeKind::UserClass,
        NodeKind::UserInterface,
        NodeKind::UserEnum,
    ]
    .iter()
    .flat_map(|label| store.vertices_with_label(*label).iter().copied())
    .collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::graph_builder::infrastructure::materializer::Materializer;
    use crate::features::parsing::parse_compilation_unit;

    fn store_of(sources: &[(&str, &str)]) -> GraphStore {
        let mut store = GraphStore::new();
        for (name, source) in sources {
            let unit = parse_compilation_unit(name, source).unwrap();
            Materializer::new(&mut store, &unit.name, false).materialize(&unit.root);
        }
        store
    }

    fn type_named(store: &GraphStore, qualified: &str) -> VertexId {
        type_declarations(store)
            .into_iter()
            .find(|id| store.prop_str(*id, keys::DEFINING_TYPE) == Some(qualified))
            .unwrap()
    }

    #[test]
    fn test_inner_class_shadows_global() {
        let mut store = store_of(&[
            ("Base.cls", "public virtual class Base { }"),
            (
                "Outer.cls",
                "public class Outer { public virtual class Base { } public class Child extends Base { } }",
            ),
        ]);
        let stats = InheritanceResolver::new(&mut store).resolve_all().unwrap();
        assert_eq!(stats.edges, 1);

        let child = type_named(&store, "Outer.Child");
        let inner_base = type_named(&store, "Outer.Base");
        assert_eq!(store.out_neighbors(child, EdgeLabel::ExtensionOf), vec![inner_base]);
        assert_eq!(store.out_neighbors(inner_base, EdgeLabel::ExtendedBy), vec![child]);
    }

    #[test]
    fn test_dotted_and_generic_references() {
        let mut store = store_of(&[
            ("Outer.cls", "public class Outer { public interface Marker { } }"),
            (
                "Impl.cls",
                "public class Impl implements Outer.Marker, Comparable<Impl>, Database.Batchable<SObject> { }",
            ),
        ]);
        let stats = InheritanceResolver::new(&mut store).resolve_all().unwrap();
        assert_eq!(stats.edges, 1);
        assert_eq!(stats.unresolved, 2);

        let implementer = type_named(&store, "Impl");
        let marker = type_named(&store, "Outer.Marker");
        assert_eq!(store.out_neighbors(implementer, EdgeLabel::ImplementationOf), vec![marker]);
        assert_eq!(
            store.prop_list(implementer, keys::UNRESOLVED_SUPERTYPES),
            ["Comparable<Impl>", "Database.Batchable<SObject>"]
        );
    }

    #[test]
    fn test_cycle_is_internal_error() {
        let mut store = store_of(&[
            ("A.cls", "public class A extends B { }"),
            ("B.cls", "public class B extends A { }"),
        ]);
        let err = InheritanceResolver::new(&mut store).resolve_all().unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }
}
