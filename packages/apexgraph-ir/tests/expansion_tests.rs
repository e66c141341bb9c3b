//! Path expansion through the pipeline: limits, plugins and configuration

mod common;

use std::io::Write as _;

use apexgraph_ir::config::EngineConfig;
use apexgraph_ir::features::path_enumeration::ApexPath;
use apexgraph_ir::features::path_expansion::{
    ContradictoryConstraintExcluder, Decision, DmlStatementPredicate, ExpanderConfig,
    NullCheckConstrainer, PathExcluder,
};
use apexgraph_ir::features::property_graph::GraphStore;
use apexgraph_ir::shared::models::NodeKind;
use apexgraph_ir::EngineError;
use common::*;
use pretty_assertions::assert_eq;

const BRANCHY: &str = "public class Calls {
    public void run() {
        helper();
        helper();
    }
    public void helper() {
        if (x()) {
            System.debug(1);
        } else {
            System.debug(2);
        }
    }
    public Boolean x() {
        return true;
    }
}";

fn limited(expansion: i64, depth: i64) -> EngineConfig {
    EngineConfig {
        path_expansion_limit: expansion,
        stack_depth_limit: depth,
        ..test_config()
    }
}

#[test]
fn test_expansion_limit_fails_the_run() {
    let pipeline = pipeline_of(limited(1, -1), &[("Calls.cls", BRANCHY)]);
    let run = method_in(pipeline.store(), "Calls", "run");

    let err = pipeline.paths_for(run, &ExpanderConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::PathExpansionLimitReached { limit: 1 }));
    assert!(!err.is_user_actionable());

    let err = pipeline.expand_all(&[run], &ExpanderConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::PathExpansionLimitReached { limit: 1 }));
}

#[test]
fn test_each_run_gets_a_fresh_fork_budget() {
    // three forks per expansion of `run`; a budget of four covers one run at a time
    let pipeline = pipeline_of(limited(4, -1), &[("Calls.cls", BRANCHY)]);
    let run = method_in(pipeline.store(), "Calls", "run");
    for _ in 0..3 {
        assert_path_count(&pipeline.paths_for(run, &ExpanderConfig::default()).unwrap(), 4);
    }
}

#[test]
fn test_stack_depth_limit_drops_deep_paths() {
    let pipeline = pipeline_of(limited(-1, 1), &[("Calls.cls", BRANCHY)]);
    let store = pipeline.store();

    let run = pipeline.paths_for(method_in(store, "Calls", "run"), &ExpanderConfig::default()).unwrap();
    assert!(run.is_empty());

    let helper = pipeline.paths_for(method_in(store, "Calls", "helper"), &ExpanderConfig::default()).unwrap();
    assert_path_count(&helper, 2);
}

#[test]
fn test_expand_all_keeps_method_order() {
    let pipeline = pipeline_of(test_config(), &[("Calls.cls", BRANCHY)]);
    let store = pipeline.store();
    let methods = vec![
        method_in(store, "Calls", "x"),
        method_in(store, "Calls", "run"),
        method_in(store, "Calls", "helper"),
    ];

    let expansions = pipeline.expand_all(&methods, &ExpanderConfig::default()).unwrap();
    let summary: Vec<_> = expansions.iter().map(|e| (e.method, e.path_count())).collect();
    assert_eq!(summary, vec![(methods[0], 1), (methods[1], 4), (methods[2], 2)]);
    for path in &expansions[1].paths {
        assert_eq!(path.method(), methods[1]);
        assert!(path.is_expanded());
    }
}

#[test]
fn test_no_expansion_returns_enumerated_paths() {
    let pipeline = pipeline_of(test_config(), &[("Calls.cls", BRANCHY)]);
    let run = method_in(pipeline.store(), "Calls", "run");
    let paths = pipeline.paths_for(run, &ExpanderConfig::no_expansion()).unwrap();
    assert_path_count(&paths, 1);
    assert!(paths[0].invocations().is_empty());
}

struct DmlExcluder;

impl PathExcluder for DmlExcluder {
    fn name(&self) -> &'static str {
        "DmlExcluder"
    }

    fn decide(&self, store: &GraphStore, path: &ApexPath) -> Decision {
        if path.vertex_ids().any(|v| store.is(v, NodeKind::DmlInsertStatement)) {
            Decision::Exclude
        } else {
            Decision::Keep
        }
    }
}

#[test]
fn test_excluder_and_predicate_plugins() {
    let source = fixture_guarded_insert(2);
    let pipeline = pipeline_of(test_config(), &[("Guarded.cls", source.as_str())]);
    let store = pipeline.store();
    let save = method_in(store, "Guarded", "save");

    let tracking = ExpanderConfig::builder().with_vertex_predicate(DmlStatementPredicate).build();
    let paths = pipeline.paths_for(save, &tracking).unwrap();
    assert_path_count(&paths, 3);
    let tracked: Vec<usize> = paths.iter().map(|p| p.metadata().tracked.len()).collect();
    assert_eq!(tracked.iter().sum::<usize>(), 1);

    let excluding = ExpanderConfig::builder().with_excluder(DmlExcluder).build();
    let paths = pipeline.paths_for(save, &excluding).unwrap();
    assert_path_count(&paths, 2);
    assert_paths_end_with(store, &paths, &[NodeKind::ReturnStatement]);
}

const LAZY_SINGLETON: &str = "public class Lazy {
    static Lazy instance;
    static void init() {
        instance = new Lazy();
    }
    public void run(Lazy local) {
        if (instance == null) {
            init();
        }
        if (instance == null) {
            insert instance;
        }
    }
    public void check(Lazy local) {
        if (local == null) {
            init();
        }
        if (local == null) {
            insert local;
        }
    }
}";

#[test]
fn test_contradictions_only_prune_local_checks() {
    let pipeline = pipeline_of(test_config(), &[("Lazy.cls", LAZY_SINGLETON)]);
    let store = pipeline.store();
    let pruning = ExpanderConfig::builder()
        .with_constrainer(NullCheckConstrainer)
        .with_excluder(ContradictoryConstraintExcluder)
        .build();

    // init() may assign the field between the checks, so every combination is feasible
    let run = pipeline.paths_for(method_in(store, "Lazy", "run"), &pruning).unwrap();
    assert_path_count(&run, 4);
    assert!(run.iter().all(|p| p.metadata().constraints.is_empty()));

    let check = pipeline.paths_for(method_in(store, "Lazy", "check"), &pruning).unwrap();
    assert_path_count(&check, 2);
    let unpruned = pipeline
        .paths_for(method_in(store, "Lazy", "check"), &ExpanderConfig::default())
        .unwrap();
    assert_path_count(&unpruned, 4);
}

#[test]
fn test_pipeline_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "version: 1\npreset: strict\nengine:\n  path_expansion_limit: 1\n  include_standard_library: false\n  parallel: false"
    )
    .unwrap();

    let config = EngineConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.path_expansion_limit, 1);
    assert_eq!(config.stack_depth_limit, 50);
    assert!(!config.parallel);

    let pipeline = pipeline_of(config, &[("Calls.cls", BRANCHY)]);
    let store = pipeline.store();
    let helper = pipeline.paths_for(method_in(store, "Calls", "helper"), &ExpanderConfig::default()).unwrap();
    assert_path_count(&helper, 2);
    let err = pipeline
        .paths_for(method_in(store, "Calls", "run"), &ExpanderConfig::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::PathExpansionLimitReached { .. }));
}
