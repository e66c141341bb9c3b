//! Typed vertex handles over a built graph

mod common;

use apexgraph_ir::features::property_graph::GraphStore;
use apexgraph_ir::features::vertex_model::{
    InvocationVertex, LoopVertex, MethodVertex, SwitchVertex, TypeDeclVertex, TypedVertex, VertexRef,
};
use apexgraph_ir::shared::models::NodeKind;
use common::*;
use pretty_assertions::assert_eq;

const SHAPES: &str = "public class Outer extends Base implements Runnable {
    static Integer counter;
    static {
        counter = 0;
    }
    public void run(List<String> names) {
        for (String s : names) {
            Helper.log(s);
        }
        while (counter > 0) {
            counter--;
        }
        switch on counter {
            when 1 { System.debug(1); }
            when 2, 3 { System.debug(2); }
            when else { System.debug(0); }
        }
    }
    public class Inner {
    }
}";

fn shapes() -> GraphStore {
    graph_of(&[("Base.cls", "public virtual class Base { }"), ("Outer.cls", SHAPES)])
}

fn type_decl<'g>(store: &'g GraphStore, line: u32, name: &str) -> TypeDeclVertex<'g> {
    let id = store
        .vertices_with_label(NodeKind::UserClass)
        .iter()
        .copied()
        .find(|v| store.begin_line(*v) == line && VertexRef::new(store, *v).name() == Some(name))
        .unwrap_or_else(|| panic!("no class {name} on line {line}"));
    match TypedVertex::classify(VertexRef::new(store, id)) {
        TypedVertex::TypeDecl(t) => t,
        other => panic!("not a type declaration: {other:?}"),
    }
}

#[test]
fn test_type_declaration_accessors() {
    let store = shapes();
    let outer = type_decl(&store, 1, "Outer");
    assert_eq!(outer.super_class_name(), Some("Base"));
    assert_eq!(outer.interface_names(), ["Runnable"]);
    assert_eq!(outer.outer_type(), None);

    let inner: Vec<_> = outer.inner_types();
    assert_eq!(inner.len(), 1);
    assert_eq!(inner[0].qualified_name(), "Outer.Inner");
    assert_eq!(inner[0].outer_type(), Some("Outer"));
    assert!(inner[0].inner_types().is_empty());
}

#[test]
fn test_static_blocks_get_a_synthetic_invoker() {
    let store = shapes();
    let invoker = MethodVertex(VertexRef::new(&store, method_in(&store, "Outer", "<staticBlockInvoker>")));
    assert!(invoker.is_synthetic());
    assert!(invoker.is_static_block_invoker());
    assert_eq!(invoker.synthetic_kind(), Some("StaticBlockInvoker"));

    let run = MethodVertex(VertexRef::new(&store, method_in(&store, "Outer", "run")));
    assert!(!run.is_synthetic());
    assert!(!run.is_static_block_invoker());
    assert_eq!(run.synthetic_kind(), None);
}

#[test]
fn test_loop_and_switch_parts() {
    let store = shapes();
    let each = LoopVertex(VertexRef::new(&store, vertex_at(&store, NodeKind::ForEachStatement, 7)));
    let variable = each.loop_variable().unwrap();
    assert!(variable.is(NodeKind::VariableDeclarationStatements));
    assert!(each.iterable().is_some());

    let whilst = LoopVertex(VertexRef::new(&store, vertex_at(&store, NodeKind::WhileLoopStatement, 10)));
    assert!(whilst.loop_variable().is_none());
    assert!(whilst.condition().is_some());

    let switch = SwitchVertex(VertexRef::new(&store, vertex_at(&store, NodeKind::SwitchStatement, 13)));
    let whens = switch.when_blocks();
    let labels: Vec<NodeKind> = whens.iter().map(|w| w.label()).collect();
    assert_eq!(
        labels,
        vec![NodeKind::ValueWhenBlock, NodeKind::ValueWhenBlock, NodeKind::ElseWhenBlock]
    );
    assert_eq!(whens[1].cases().len(), 2);
}

#[test]
fn test_invocation_full_method_name() {
    let store = shapes();
    let call = InvocationVertex(VertexRef::new(&store, vertex_at(&store, NodeKind::MethodCallExpression, 8)));
    assert_eq!(call.full_method_name(), Some("Helper.log"));
}
