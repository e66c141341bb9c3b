//! End-to-end scenarios: parse → build → CFG → enumerate

mod common;

use apexgraph_ir::features::path_enumeration::{enumerate_forward, enumerate_reverse};
use apexgraph_ir::features::property_graph::Polarity;
use apexgraph_ir::features::graph_builder::build_graph;
use apexgraph_ir::features::parsing::parse_compilation_unit;
use apexgraph_ir::shared::constants::keys;
use apexgraph_ir::shared::models::NodeKind;
use apexgraph_ir::EngineError;
use common::*;
use pretty_assertions::assert_eq;

#[test]
fn test_simple_trigger() {
    let store = graph_of(&[("T.trigger", "trigger T on Account (before insert) {}")]);
    let triggers = store.vertices_with_label(NodeKind::UserTrigger);
    assert_eq!(triggers.len(), 1);
    assert_eq!(store.prop_str(triggers[0], keys::NAME), Some("T"));
    assert_eq!(store.prop_str(triggers[0], keys::TARGET_NAME), Some("Account"));

    let invoke = method_in(&store, "T", "invoke");
    let paths = enumerate_forward(&store, invoke).unwrap();
    assert_path_count(&paths, 1);
}

#[test]
fn test_early_returns_collapse_paths() {
    let source = fixture_guarded_insert(2);
    let store = graph_of(&[("Guarded.cls", source.as_str())]);
    let save = method_in(&store, "Guarded", "save");

    let forward = enumerate_forward(&store, save).unwrap();
    assert_path_count(&forward, 3);
    assert_paths_end_with(&store, &forward, &[NodeKind::ReturnStatement, NodeKind::DmlInsertStatement]);

    let insert = store.vertices_with_label(NodeKind::DmlInsertStatement)[0];
    let reverse = enumerate_reverse(&store, insert).unwrap();
    assert_path_count(&reverse, 1);
    assert_eq!(reverse[0].last(), Some(insert));
}

#[test]
fn test_switch_forks_once_per_when_block() {
    let source = fixture_switch(2);
    let store = graph_of(&[("Switcher.cls", source.as_str())]);
    let run = method_in(&store, "Switcher", "run");
    let paths = enumerate_forward(&store, run).unwrap();
    assert_path_count(&paths, 3);

    let whens: Vec<NodeKind> = paths
        .iter()
        .map(|p| {
            p.vertex_ids()
                .filter_map(|v| store.label(v))
                .find(|l| matches!(l, NodeKind::ValueWhenBlock | NodeKind::ElseWhenBlock))
                .unwrap()
        })
        .collect();
    assert_eq!(
        whens,
        vec![NodeKind::ValueWhenBlock, NodeKind::ValueWhenBlock, NodeKind::ElseWhenBlock]
    );
}

#[test]
fn test_unreachable_code_names_the_line() {
    let source = "public class Dead {\n    void m() {\n        return;\n        System.debug('x');\n    }\n}";
    let unit = parse_compilation_unit("Dead.cls", source).unwrap();
    let err = build_graph(&test_config(), &[unit]).unwrap_err();
    assert!(err.is_user_actionable());
    match err {
        EngineError::UserAction(e) => {
            assert_eq!(e.unit, "Dead.cls");
            assert_eq!(e.line, 4);
        }
        other => panic!("expected a user-action error, got {other:?}"),
    }
}

#[test]
fn test_if_else_gives_one_path_per_polarity() {
    let source = "public class A {\n    void m(Boolean b) {\n        if (b) {\n            x();\n        } else {\n            y();\n        }\n    }\n}";
    let store = graph_of(&[("A.cls", source)]);
    let paths = enumerate_forward(&store, method_in(&store, "A", "m")).unwrap();
    assert_path_count(&paths, 2);

    let condition = vertex_at(&store, NodeKind::StandardCondition, 3);
    let polarities: Vec<Option<Polarity>> = paths.iter().map(|p| p.polarity_of(condition)).collect();
    assert_eq!(polarities, vec![Some(Polarity::Positive), Some(Polarity::Negative)]);
}

#[test]
fn test_end_scopes_name_every_exited_construct() {
    let source = "public class A {\n    void m(Boolean a, Boolean b) {\n        if (a) {\n            if (b) {\n                x();\n            }\n        }\n        y();\n    }\n}";
    let store = graph_of(&[("A.cls", source)]);
    let inner = vertex_at(&store, NodeKind::ExpressionStatement, 5);
    assert_eq!(
        store.end_scopes(inner),
        vec![
            NodeKind::BlockStatement,
            NodeKind::IfElseBlockStatement,
            NodeKind::BlockStatement,
            NodeKind::IfElseBlockStatement,
        ]
    );
    let after = vertex_at(&store, NodeKind::ExpressionStatement, 8);
    assert_eq!(store.end_scopes(after), vec![NodeKind::BlockStatement]);
}
