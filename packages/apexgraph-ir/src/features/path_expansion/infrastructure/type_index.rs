//! Declared types and their hierarchy, read from a built graph

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use crate::features::property_graph::{EdgeLabel, GraphStore, VertexId};
use crate::shared::constants::keys;
use crate::shared::models::NodeKind;
use crate::shared::utils::type_names::base_type;

pub struct TypeIndex<'g> {
    store: &'g GraphStore,
    /// Lower-cased qualified name → declaration
    types: AHashMap<String, VertexId>,
}

impl<'g> TypeIndex<'g> {
    pub fn new(store: &'g GraphStore) -> Self {
        let mut ids: Vec<VertexId> = [
            NodeKind::UserClass,
            NodeKind::UserInterface,
            NodeKind::UserEnum,
            NodeKind::UserTrigger,
        ]
        .iter()
        .flat_map(|label| store.vertices_with_label(*label).iter().copied())
        .collect();
        ids.sort();

        let mut types = AHashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(name) = store.prop_str(id, keys::DEFINING_TYPE_CS) {
                types.entry(name.to_string()).or_insert(id);
            }
        }
        Self { store, types }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Exact qualified lookup (case-insensitive)
    pub fn get(&self, qualified: &str) -> Option<VertexId> {
        self.types.get(&base_type(qualified).to_lowercase()).copied()
    }

    /// Resolve a type reference written inside `from`: own inner types,
    /// then the outer type's inner types, then the global space
    pub fn lookup(&self, from: Option<VertexId>, reference: &str) -> Option<VertexId> {
        let name = base_type(reference).to_lowercase();
        let name = name.strip_prefix("schema.").unwrap_or(&name);
        let own = from.and_then(|f| self.store.prop_str(f, keys::DEFINING_TYPE_CS));
        let outer = from.and_then(|f| self.store.prop_str(f, keys::OUTER_TYPE_CS));

        own.into_iter()
            .chain(outer)
            .map(|scope| format!("{}.{}", scope, name))
            .chain(std::iter::once(name.to_string()))
            .find_map(|candidate| self.types.get(&candidate).copied())
    }

    pub fn name_of(&self, ty: VertexId) -> &'g str {
        self.store.prop_str(ty, keys::DEFINING_TYPE).unwrap_or("")
    }

    /// Direct supertypes: superclass / extended interfaces first, then implemented interfaces
    pub fn supertypes(&self, ty: VertexId) -> Vec<VertexId> {
        let mut out = self.store.out_neighbors(ty, EdgeLabel::ExtensionOf);
        out.extend(self.store.out_neighbors(ty, EdgeLabel::ImplementationOf));
        out
    }

    pub fn superclass(&self, ty: VertexId) -> Option<VertexId> {
        if self.store.is(ty, NodeKind::UserInterface) {
            return None;
        }
        self.store
            .out_neighbors(ty, EdgeLabel::ExtensionOf)
            .into_iter()
            .next()
    }

    /// Transitive supertypes with their distance, nearest first
    pub fn ancestors(&self, ty: VertexId) -> Vec<(VertexId, usize)> {
        let mut out = Vec::new();
        let mut seen = AHashSet::new();
        seen.insert(ty);
        let mut queue = VecDeque::from([(ty, 0usize)]);
        while let Some((current, distance)) = queue.pop_front() {
            for parent in self.supertypes(current) {
                if seen.insert(parent) {
                    out.push((parent, distance + 1));
                    queue.push_back((parent, distance + 1));
                }
            }
        }
        out
    }

    /// `ty` followed by its transitive supertypes
    pub fn hierarchy(&self, ty: VertexId) -> Vec<VertexId> {
        std::iter::once(ty)
            .chain(self.ancestors(ty).into_iter().map(|(t, _)| t))
            .collect()
    }

    /// Steps from `sub` up to `sup`; `Some(0)` when they are the same type
    pub fn subtype_distance(&self, sub: VertexId, sup: VertexId) -> Option<usize> {
        if sub == sup {
            return Some(0);
        }
        self.ancestors(sub)
            .into_iter()
            .find(|(t, _)| *t == sup)
            .map(|(_, d)| d)
    }

    /// Enclosing type of an inner type
    pub fn outer(&self, ty: VertexId) -> Option<VertexId> {
        self.store
            .prop_str(ty, keys::OUTER_TYPE)
            .and_then(|outer| self.get(outer))
    }
}
