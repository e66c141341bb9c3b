//! Path walks over expanded paths: values, heap, statics and visitors

mod common;

use apexgraph_ir::features::path_expansion::ExpanderConfig;
use apexgraph_ir::features::symbolic_execution::{
    ApexValue, NoopVisitor, PathVisitor, SchemaKind, SymbolProvider, WalkOutcome,
};
use apexgraph_ir::features::vertex_model::VertexRef;
use apexgraph_ir::shared::models::NodeKind;
use apexgraph_ir::AnalysisPipeline;
use common::*;
use pretty_assertions::assert_eq;

fn walk_all(pipeline: &AnalysisPipeline, class: &str, method: &str, visitor: &mut dyn PathVisitor) -> Vec<WalkOutcome> {
    let method = method_in(pipeline.store(), class, method);
    pipeline.walk(method, &ExpanderConfig::default(), visitor).unwrap()
}

fn single_return(sources: &[(&str, &str)], class: &str, method: &str) -> Option<ApexValue> {
    let pipeline = pipeline_of(test_config(), sources);
    let outcomes = walk_all(&pipeline, class, method, &mut NoopVisitor);
    assert_eq!(outcomes.len(), 1, "expected a single path");
    outcomes.into_iter().next().and_then(|o| o.returned)
}

/// Records the value each named variable expression evaluated to
#[derive(Default)]
struct VariableRecorder {
    seen: Vec<(String, ApexValue)>,
}

impl VariableRecorder {
    fn values_of(&self, name: &str) -> Vec<&ApexValue> {
        self.seen
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
            .collect()
    }
}

impl PathVisitor for VariableRecorder {
    fn on_expression(&mut self, expression: VertexRef<'_>, value: &ApexValue) {
        if expression.is(NodeKind::VariableExpression) {
            if let Some(name) = expression.name() {
                self.seen.push((name.to_string(), value.clone()));
            }
        }
    }
}

/// Skips evaluation of the first expression statement it sees
#[derive(Default)]
struct PruneFirstStatement {
    pruned: bool,
}

impl PathVisitor for PruneFirstStatement {
    fn visit(&mut self, vertex: VertexRef<'_>, _symbols: &dyn SymbolProvider) -> bool {
        if !self.pruned && vertex.is(NodeKind::ExpressionStatement) {
            self.pruned = true;
            return false;
        }
        true
    }
}

/// Captures one variable's value after every vertex
struct Watch {
    name: &'static str,
    last: Option<ApexValue>,
}

impl PathVisitor for Watch {
    fn after_visit(&mut self, _vertex: VertexRef<'_>, symbols: &dyn SymbolProvider) {
        if let Some(value) = symbols.lookup(self.name) {
            self.last = Some(value);
        }
    }
}

#[test]
fn test_constructor_and_instance_method_share_the_heap() {
    let returned = single_return(
        &[
            (
                "Box.cls",
                "public class Box { private Integer size; \
                 public Box(Integer size) { this.size = size; } \
                 public Integer getSize() { return size; } }",
            ),
            ("Use.cls", "public class Use { public Integer run() { Box b = new Box(4); return b.getSize(); } }"),
        ],
        "Use",
        "run",
    );
    assert_integer_value(returned.as_ref(), 4);
}

#[test]
fn test_explicit_getter_and_setter_run_as_sub_paths() {
    let source = "public class Gauge { \
        public Integer celsius { get { return 21; } } \
        public Integer level { get; set { level = value * 2; } } \
        public Integer read() { return this.celsius; } \
        void bump() { this.level = 5; } \
        public Integer doubled() { bump(); return level; } }";
    assert_integer_value(single_return(&[("Gauge.cls", source)], "Gauge", "read").as_ref(), 21);
    assert_integer_value(single_return(&[("Gauge.cls", source)], "Gauge", "doubled").as_ref(), 10);
}

#[test]
fn test_static_initialization_of_another_class() {
    let returned = single_return(
        &[
            (
                "Settings.cls",
                "public class Settings { public static String mode = 'live'; static { mode = mode.toUpperCase(); } }",
            ),
            ("Reader.cls", "public class Reader { public String run() { return Settings.mode; } }"),
        ],
        "Reader",
        "run",
    );
    assert_string_value(returned.as_ref(), "LIVE");
}

#[test]
fn test_overload_picked_by_closest_generalization() {
    let returned = single_return(
        &[(
            "Shapes.cls",
            "public class Shapes { \
                public virtual class Shape {} \
                public class Circle extends Shape {} \
                String describe(Shape s) { return 'shape'; } \
                String describe(Object o) { return 'object'; } \
                String describe(Integer i) { return 'integer'; } \
                String run() { Circle c = new Circle(); return describe(c); } }",
        )],
        "Shapes",
        "run",
    );
    assert_string_value(returned.as_ref(), "shape");
}

#[test]
fn test_visitor_can_prune_a_call() {
    let source = "public class Counter { Integer hits = 0; \
        void hit() { hits = hits + 1; } \
        Integer run() { hit(); hit(); return hits; } }";
    let pipeline = pipeline_of(test_config(), &[("Counter.cls", source)]);

    let full = walk_all(&pipeline, "Counter", "run", &mut NoopVisitor);
    assert_integer_value(full[0].returned.as_ref(), 2);

    let mut pruning = PruneFirstStatement::default();
    let pruned = walk_all(&pipeline, "Counter", "run", &mut pruning);
    assert_integer_value(pruned[0].returned.as_ref(), 1);
    assert!(pruned[0].vertices_visited < full[0].vertices_visited);
}

#[test]
fn test_trigger_context_variables_are_typed() {
    let source = "trigger AccountGuard on Account (before insert, before update) { \
        Boolean inserting = Trigger.isInsert; \
        Integer count = Trigger.size; }";
    let pipeline = pipeline_of(test_config(), &[("AccountGuard.trigger", source)]);
    let mut recorder = VariableRecorder::default();
    walk_all(&pipeline, "AccountGuard", "invoke", &mut recorder);

    let inserting = recorder.values_of("isInsert");
    assert_eq!(inserting.len(), 1);
    assert!(inserting[0].is_indeterminate());
    assert_eq!(inserting[0].ty, "Boolean");
    assert_eq!(recorder.values_of("size")[0].ty, "Integer");
}

#[test]
fn test_schema_describe_chain_keeps_object_and_field() {
    let source = "public class Fls { public void check() { \
        Schema.DescribeFieldResult d = Schema.sObjectType.Account.fields.Name.getDescribe(); \
        System.debug(d); } }";
    let pipeline = pipeline_of(test_config(), &[("Fls.cls", source)]);
    let mut watch = Watch { name: "d", last: None };
    walk_all(&pipeline, "Fls", "check", &mut watch);

    let token = watch.last.as_ref().and_then(ApexValue::as_schema).cloned().unwrap();
    assert_eq!(token.kind, SchemaKind::DescribeFieldResult);
    assert_eq!(token.object.as_deref(), Some("Account"));
    assert_eq!(token.field.as_deref(), Some("Name"));
}

#[test]
fn test_unresolved_calls_are_indeterminate() {
    let returned = single_return(
        &[("Remote.cls", "public class Remote { String run() { return Elsewhere.fetch('x'); } }")],
        "Remote",
        "run",
    );
    let value = returned.unwrap();
    assert!(value.is_indeterminate());
}
