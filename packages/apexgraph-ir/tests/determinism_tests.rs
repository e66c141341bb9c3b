//! Property-based tests for path counts and build determinism
//!
//! Invariants that hold for every generated fixture size:
//! - Sequential if/else statements multiply: n branches give 2^n paths
//! - Early-return guards add one path each; the DML has one reverse path
//! - Building the same sources twice gives the same graph and paths

mod common;

use apexgraph_ir::features::path_enumeration::{enumerate_forward, enumerate_reverse, ApexPath};
use apexgraph_ir::features::property_graph::GraphStore;
use apexgraph_ir::shared::models::NodeKind;
use common::*;
use proptest::prelude::*;

/// Labels and lines of a path, comparable across separately built graphs
fn shape(store: &GraphStore, path: &ApexPath) -> Vec<(Option<NodeKind>, u32)> {
    path.vertex_ids()
        .map(|v| (store.label(v), store.begin_line(v)))
        .collect()
}

fn shapes(store: &GraphStore, paths: &[ApexPath]) -> Vec<Vec<(Option<NodeKind>, u32)>> {
    paths.iter().map(|p| shape(store, p)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_sequential_branches_multiply(branches in 1usize..=5) {
        let source = fixture_sequential_branches(branches);
        let store = graph_of(&[("Branchy.cls", source.as_str())]);
        let paths = enumerate_forward(&store, method_in(&store, "Branchy", "run")).unwrap();
        prop_assert_eq!(paths.len(), 1 << branches);

        // every path takes exactly one side of every if/else
        for path in &paths {
            let conditions = path.vertex_ids().filter(|v| store.is(*v, NodeKind::StandardCondition)).count();
            prop_assert_eq!(conditions, branches);
        }
    }

    #[test]
    fn prop_guards_add_one_path_each(guards in 0usize..=6) {
        let source = fixture_guarded_insert(guards);
        let store = graph_of(&[("Guarded.cls", source.as_str())]);
        let forward = enumerate_forward(&store, method_in(&store, "Guarded", "save")).unwrap();
        prop_assert_eq!(forward.len(), guards + 1);

        let insert = store.vertices_with_label(NodeKind::DmlInsertStatement)[0];
        let reverse = enumerate_reverse(&store, insert).unwrap();
        prop_assert_eq!(reverse.len(), 1);
        let reaching = forward.iter().filter(|p| p.contains(insert)).count();
        prop_assert_eq!(reaching, 1);
    }

    #[test]
    fn prop_switch_forks_per_when(whens in 1usize..=6) {
        let source = fixture_switch(whens);
        let store = graph_of(&[("Switcher.cls", source.as_str())]);
        let paths = enumerate_forward(&store, method_in(&store, "Switcher", "run")).unwrap();
        prop_assert_eq!(paths.len(), whens + 1);
    }

    #[test]
    fn prop_builds_are_deterministic(branches in 1usize..=4, guards in 0usize..=4) {
        let branchy = fixture_sequential_branches(branches);
        let guarded = fixture_guarded_insert(guards);
        let sources = [("Branchy.cls", branchy.as_str()), ("Guarded.cls", guarded.as_str())];
        let first = graph_of(&sources);
        let second = graph_of(&sources);

        prop_assert_eq!(first.vertex_count(), second.vertex_count());
        prop_assert_eq!(first.edge_count(), second.edge_count());

        for (class, method) in [("Branchy", "run"), ("Guarded", "save")] {
            let a = enumerate_forward(&first, method_in(&first, class, method)).unwrap();
            let b = enumerate_forward(&second, method_in(&second, class, method)).unwrap();
            prop_assert_eq!(shapes(&first, &a), shapes(&second, &b));
        }
    }

    #[test]
    fn prop_parallel_expansion_matches_sequential(branches in 1usize..=4) {
        let branchy = fixture_sequential_branches(branches);
        let sources = [("Branchy.cls", branchy.as_str())];
        let expand = |parallel: bool| {
            let config = apexgraph_ir::EngineConfig { parallel, ..test_config() };
            let pipeline = pipeline_of(config, &sources);
            let methods = pipeline.methods();
            let expansions = pipeline
                .expand_all(&methods, &apexgraph_ir::ExpanderConfig::default())
                .unwrap();
            expansions
                .iter()
                .map(|e| shapes(pipeline.store(), &e.paths))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(expand(false), expand(true));
    }
}
