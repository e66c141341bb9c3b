//! Built-in constrainers
//!
//! Both read the outcome of a `StandardCondition` on the path and record
//! what it proves about locals and parameters. Fields are skipped: a callee
//! spliced between two checks may rebind them. Assignments and declarations
//! emit `Reset` so stale facts never reach the excluder.

use crate::features::path_enumeration::{Constraint, ConstraintKind};
use crate::features::path_expansion::infrastructure::{MethodResolver, VariableOrigin};
use crate::features::path_expansion::ports::{ForkContext, PathConstrainer};
use crate::features::property_graph::Polarity;
use crate::features::vertex_model::{ConditionVertex, LiteralVertex, VariableVertex, VertexRef};
use crate::shared::constants::{keys, literal_types};
use crate::shared::models::NodeKind;

/// Fact about one variable: lower-cased name and kind
type Fact = (String, ConstraintKind);

type Leaf = fn(&MethodResolver<'_>, VertexRef<'_>, bool) -> Option<Fact>;

/// `x == null` / `x != null`
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCheckConstrainer;

impl PathConstrainer for NullCheckConstrainer {
    fn name(&self) -> &'static str {
        "NullCheckConstrainer"
    }

    fn constrain(&self, ctx: &ForkContext<'_>) -> Vec<Constraint> {
        collect(ctx, null_check)
    }
}

/// `if (flag)` / `if (!flag)`
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanVariableConstrainer;

impl PathConstrainer for BooleanVariableConstrainer {
    fn name(&self) -> &'static str {
        "BooleanVariableConstrainer"
    }

    fn constrain(&self, ctx: &ForkContext<'_>) -> Vec<Constraint> {
        collect(ctx, boolean_variable)
    }
}

fn collect(ctx: &ForkContext<'_>, leaf: Leaf) -> Vec<Constraint> {
    let vertex = ctx.vertex_ref();
    let scope = ctx.scope();
    let mut facts = Vec::new();

    if vertex.is(NodeKind::StandardCondition) {
        if let (Some(polarity), Some(expression)) =
            (ctx.vertex.polarity(), ConditionVertex(vertex).expression())
        {
            let truth = polarity == Polarity::Positive;
            condition_facts(ctx.resolver, expression, truth, leaf, &mut facts);
        }
    } else {
        facts.extend(
            reassigned_variables(ctx.resolver, vertex)
                .into_iter()
                .map(|name| (name, ConstraintKind::Reset)),
        );
    }

    facts
        .into_iter()
        .map(|(variable, kind)| Constraint::new(scope, &variable, kind, vertex.id))
        .collect()
}

/// Facts proven by `expression` evaluating to `truth`
fn condition_facts(
    resolver: &MethodResolver<'_>,
    expression: VertexRef<'_>,
    truth: bool,
    leaf: Leaf,
    out: &mut Vec<Fact>,
) {
    let operator = expression.prop_str(keys::OPERATOR);
    match (expression.label(), operator) {
        // a && b is true only if both are; a || b is false only if both are
        (NodeKind::BooleanExpression, Some("&&")) if truth => {
            for operand in expression.children() {
                condition_facts(resolver, operand, true, leaf, out);
            }
        }
        (NodeKind::BooleanExpression, Some("||")) if !truth => {
            for operand in expression.children() {
                condition_facts(resolver, operand, false, leaf, out);
            }
        }
        (NodeKind::PrefixExpression, Some("!")) => {
            if let Some(operand) = expression.child(0) {
                condition_facts(resolver, operand, !truth, leaf, out);
            }
        }
        _ => out.extend(leaf(resolver, expression, truth)),
    }
}

fn null_check(resolver: &MethodResolver<'_>, expression: VertexRef<'_>, truth: bool) -> Option<Fact> {
    if !expression.is(NodeKind::BooleanExpression) {
        return None;
    }
    let equals = match expression.prop_str(keys::OPERATOR)? {
        "==" => true,
        "!=" => false,
        _ => return None,
    };
    let (left, right) = (expression.child(0)?, expression.child(1)?);
    let variable = match (is_null_literal(left), is_null_literal(right)) {
        (false, true) => local_name(resolver, left)?,
        (true, false) => local_name(resolver, right)?,
        _ => return None,
    };
    let kind = if equals == truth {
        ConstraintKind::IsNull
    } else {
        ConstraintKind::NotNull
    };
    Some((variable, kind))
}

fn boolean_variable(resolver: &MethodResolver<'_>, expression: VertexRef<'_>, truth: bool) -> Option<Fact> {
    let variable = local_name(resolver, expression)?;
    let kind = if truth {
        ConstraintKind::IsTrue
    } else {
        ConstraintKind::IsFalse
    };
    Some((variable, kind))
}

fn is_null_literal(v: VertexRef<'_>) -> bool {
    v.is(NodeKind::LiteralExpression) && LiteralVertex(v).literal_type() == literal_types::NULL
}

/// Lower-cased name of an unqualified variable expression bound to a local or parameter
fn local_name(resolver: &MethodResolver<'_>, v: VertexRef<'_>) -> Option<String> {
    if !v.is(NodeKind::VariableExpression) {
        return None;
    }
    let variable = VariableVertex(v);
    if !variable.is_unqualified() {
        return None;
    }
    let name = variable.0.name()?;
    match resolver.variable_binding(name, v.id)?.origin {
        VariableOrigin::Local(_) | VariableOrigin::Parameter(_) => Some(name.to_lowercase()),
        VariableOrigin::Field { .. } | VariableOrigin::Property { .. } => None,
    }
}

/// Variables a statement (re)binds
fn reassigned_variables(resolver: &MethodResolver<'_>, vertex: VertexRef<'_>) -> Vec<String> {
    match vertex.label() {
        NodeKind::VariableDeclarationStatements | NodeKind::ForEachStatement => vertex
            .descendants()
            .into_iter()
            .filter(|d| d.is(NodeKind::VariableDeclaration))
            .filter_map(|d| d.name().map(str::to_lowercase))
            .collect(),
        _ => vertex
            .evaluated_expressions()
            .into_iter()
            .filter(|e| e.is(NodeKind::AssignmentExpression))
            .filter_map(|e| e.child(0).and_then(|target| local_name(resolver, target)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::features::graph_builder::build_graph;
    use crate::features::parsing::parse_compilation_unit;
    use crate::features::path_enumeration::{enumerate_forward, ApexPath};
    use crate::features::property_graph::GraphStore;

    fn setup(source: &str) -> (GraphStore, Vec<ApexPath>) {
        let config = EngineConfig {
            include_standard_library: false,
            ..EngineConfig::default()
        };
        let unit = parse_compilation_unit("A.cls", source).unwrap();
        let store = build_graph(&config, &[unit]).unwrap();
        let method = store
            .vertices_with_label(NodeKind::Method)
            .iter()
            .copied()
            .find(|m| store.prop_str(*m, keys::NAME) == Some("run"))
            .unwrap();
        let paths = enumerate_forward(&store, method).unwrap();
        (store, paths)
    }

    fn constraints(store: &GraphStore, path: &ApexPath, plugin: &dyn PathConstrainer) -> Vec<(String, ConstraintKind)> {
        let resolver = MethodResolver::new(store);
        path.vertices()
            .iter()
            .flat_map(|v| plugin.constrain(&ForkContext::new(&resolver, path, *v)))
            .map(|c| (c.variable, c.kind))
            .collect()
    }

    #[test]
    fn test_null_check_follows_polarity() {
        let (store, paths) = setup(
            "public class A { void run(String x) { if (x != null) { System.debug(x); } else { x = 'a'; } } }",
        );
        assert_eq!(paths.len(), 2);
        assert_eq!(
            constraints(&store, &paths[0], &NullCheckConstrainer),
            vec![("x".to_string(), ConstraintKind::NotNull)]
        );
        assert_eq!(
            constraints(&store, &paths[1], &NullCheckConstrainer),
            vec![
                ("x".to_string(), ConstraintKind::IsNull),
                ("x".to_string(), ConstraintKind::Reset),
            ]
        );
    }

    #[test]
    fn test_boolean_variable_with_negation_and_conjunction() {
        let (store, paths) = setup(
            "public class A { void run(Boolean a, Boolean b) { if (!a && b) { System.debug(1); } } }",
        );
        assert_eq!(
            constraints(&store, &paths[0], &BooleanVariableConstrainer),
            vec![
                ("a".to_string(), ConstraintKind::IsFalse),
                ("b".to_string(), ConstraintKind::IsTrue),
            ]
        );
        // the negative branch proves nothing about either operand
        assert!(constraints(&store, &paths[1], &BooleanVariableConstrainer).is_empty());
    }

    #[test]
    fn test_fields_yield_no_facts() {
        let (store, paths) = setup(
            "public class A { \
                static A instance; \
                Boolean ready; \
                void run(String x) { \
                    String y = x; \
                    if (instance == null && y != null) { instance = new A(); } \
                    if (ready) { ready = false; } } }",
        );
        let first = &paths[0];
        assert_eq!(
            constraints(&store, first, &NullCheckConstrainer),
            vec![
                ("y".to_string(), ConstraintKind::Reset),
                ("y".to_string(), ConstraintKind::NotNull),
            ]
        );
        assert!(constraints(&store, first, &BooleanVariableConstrainer)
            .iter()
            .all(|(name, _)| name == "y"));
    }
}
