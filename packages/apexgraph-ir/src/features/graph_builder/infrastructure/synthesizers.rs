//! Implicit-construct synthesis
//!
//! Runs on the AST before materialization so that every synthesized node is
//! materialized (and indexed) exactly like a parsed one:
//! - empty `else` block for every `if` chain lacking one
//! - skip block for loops that may run zero times
//! - `<staticBlockN>` methods plus one `<staticBlockInvoker>` per class
//! - `__get_X` / `__set_X` accessor methods per property
//! - `invoke` method wrapping a trigger body

use crate::features::parsing::AstNode;
use crate::shared::constants::{keys, literal_types, reserved};
use crate::shared::models::{NodeKind, Span};

/// Rewrite a compilation unit root in place
pub(crate) fn synthesize_unit(root: &mut AstNode) {
    match root.kind {
        NodeKind::UserTrigger => synthesize_trigger(root),
        kind if kind.is_type_declaration() => synthesize_type(root),
        _ => {}
    }
}

// ════════════════════════════════════════════════════════════════
// Types and members
// ════════════════════════════════════════════════════════════════

fn synthesize_type(node: &mut AstNode) {
    let members = std::mem::take(&mut node.children);
    let mut static_blocks = Vec::new();
    let mut children = Vec::with_capacity(members.len());

    for mut member in members {
        match member.kind {
            NodeKind::StaticBlock => {
                let ordinal = static_blocks.len() + 1;
                let name = reserved::static_block_method_name(ordinal);
                let span = member.span;
                let body = member
                    .children
                    .pop()
                    .unwrap_or_else(|| implicit_block(span));
                children.push(
                    synthetic_method(&name, "void", span, reserved::SYNTHETIC_STATIC_BLOCK)
                        .with_prop(keys::IS_STATIC, true)
                        .with_child(body),
                );
                static_blocks.push((name, span));
            }
            NodeKind::PropertyDeclaration => {
                let accessors = property_accessors(&mut member);
                children.push(member);
                children.extend(accessors);
            }
            kind if kind.is_type_declaration() => {
                synthesize_type(&mut member);
                children.push(member);
            }
            _ => {
                synthesize_statements(&mut member);
                children.push(member);
            }
        }
    }

    if !static_blocks.is_empty() {
        children.push(static_block_invoker(node.span, &static_blocks));
    }
    node.children = children;
}

/// Method calling every static block in declaration order
fn static_block_invoker(span: Span, blocks: &[(String, Span)]) -> AstNode {
    let calls = blocks.iter().map(|(name, block_span)| {
        let call = AstNode::new(NodeKind::MethodCallExpression, *block_span)
            .with_prop(keys::METHOD_NAME, name.as_str())
            .with_prop(keys::FULL_METHOD_NAME, name.as_str())
            .with_child(AstNode::new(NodeKind::EmptyReferenceExpression, *block_span));
        AstNode::new(NodeKind::ExpressionStatement, *block_span).with_child(call)
    });
    let body = AstNode::new(NodeKind::BlockStatement, span).with_children(calls);
    synthetic_method(
        reserved::STATIC_BLOCK_INVOKER,
        "void",
        span,
        reserved::SYNTHETIC_STATIC_BLOCK_INVOKER,
    )
    .with_prop(keys::IS_STATIC, true)
    .with_child(body)
}

/// Strip accessor children off a property, returning one method per accessor
fn property_accessors(property: &mut AstNode) -> Vec<AstNode> {
    let name = property.prop_str(keys::NAME).unwrap_or_default().to_string();
    let ty = property.prop_str(keys::TYPE).unwrap_or("Object").to_string();
    let is_static = property.prop_bool(keys::IS_STATIC);

    let accessors = std::mem::take(&mut property.children);
    let mut methods = Vec::with_capacity(accessors.len());
    for mut accessor in accessors {
        let span = accessor.span;
        let explicit_body = accessor.children.pop();
        let is_auto = explicit_body.is_none();
        let mut body = explicit_body.unwrap_or_else(|| implicit_block(span));
        synthesize_statements(&mut body);

        let mut method = match accessor.kind {
            NodeKind::PropertyGetter => {
                synthetic_method(&reserved::getter_name(&name), &ty, span, reserved::SYNTHETIC_GETTER)
            }
            NodeKind::PropertySetter => {
                let parameter = AstNode::new(NodeKind::Parameter, span)
                    .with_prop(keys::NAME, reserved::SETTER_PARAMETER)
                    .with_prop(keys::TYPE, ty.as_str());
                synthetic_method(&reserved::setter_name(&name), "void", span, reserved::SYNTHETIC_SETTER)
                    .with_prop(keys::ARITY, 1i64)
                    .with_child(parameter)
            }
            _ => continue,
        };
        method.set_prop(keys::IS_STATIC, is_static);
        method.set_prop(keys::PROPERTY_NAME, name.as_str());
        method.set_prop(keys::IS_IMPLICIT, is_auto);
        methods.push(method.with_child(body));
    }
    methods
}

fn synthesize_trigger(trigger: &mut AstNode) {
    let usages: Vec<String> = normalize_usages(trigger.prop_list(keys::USAGES));
    trigger.set_prop(keys::USAGES, usages);

    let span = trigger.span;
    let mut body = trigger
        .children
        .pop()
        .unwrap_or_else(|| implicit_block(span));
    synthesize_statements(&mut body);
    let invoke = synthetic_method(
        reserved::TRIGGER_INVOKE_METHOD,
        "void",
        span,
        reserved::SYNTHETIC_TRIGGER_INVOKE,
    )
    .with_prop(keys::IS_STATIC, false)
    .with_child(body);
    trigger.children = vec![invoke];
}

/// `before  insert` → `BEFORE INSERT`, duplicates dropped, order kept
pub(crate) fn normalize_usages(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for usage in raw {
        let normalized = usage
            .split_whitespace()
            .map(|w| w.to_uppercase())
            .collect::<Vec<_>>()
            .join(" ");
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

fn synthetic_method(name: &str, return_type: &str, span: Span, kind: &str) -> AstNode {
    AstNode::new(NodeKind::Method, span)
        .with_prop(keys::NAME, name)
        .with_prop(keys::RETURN_TYPE, return_type)
        .with_prop(keys::ARITY, 0i64)
        .with_prop(keys::IS_CONSTRUCTOR, false)
        .with_prop(keys::IS_ABSTRACT, false)
        .with_prop(keys::IS_SYNTHETIC, true)
        .with_prop(keys::SYNTHETIC_KIND, kind)
}

fn implicit_block(span: Span) -> AstNode {
    AstNode::new(NodeKind::BlockStatement, span).with_prop(keys::IS_IMPLICIT, true)
}

// ════════════════════════════════════════════════════════════════
// Statements
// ════════════════════════════════════════════════════════════════

/// Add implicit else/skip blocks throughout a subtree
pub(crate) fn synthesize_statements(node: &mut AstNode) {
    for child in node.children.iter_mut() {
        synthesize_statements(child);
    }
    match node.kind {
        NodeKind::IfElseBlockStatement => {
            let has_else = node
                .children
                .last()
                .is_some_and(|c| c.kind == NodeKind::BlockStatement);
            if !has_else {
                node.children.push(implicit_block(node.span));
            }
        }
        NodeKind::WhileLoopStatement => {
            let condition = node.children_of_kind(NodeKind::StandardCondition).next();
            if condition.is_some_and(|c| !is_literal_true(c)) {
                node.children.push(implicit_block(node.span));
            }
        }
        NodeKind::ForLoopStatement => {
            let condition = node.children_of_kind(NodeKind::StandardCondition).next();
            if condition.is_some_and(|c| !is_literal_true(c)) {
                node.children.push(implicit_block(node.span));
            }
        }
        NodeKind::ForEachStatement => node.children.push(implicit_block(node.span)),
        _ => {}
    }
}

fn is_literal_true(condition: &AstNode) -> bool {
    condition.children.first().is_some_and(|e| {
        e.kind == NodeKind::LiteralExpression
            && e.prop_str(keys::LITERAL_TYPE) == Some(literal_types::TRUE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::parse_compilation_unit;

    fn synthesized(source: &str) -> AstNode {
        let mut unit = parse_compilation_unit("Test", source).unwrap();
        synthesize_unit(&mut unit.root);
        unit.root
    }

    fn method<'a>(root: &'a AstNode, name: &str) -> &'a AstNode {
        root.children
            .iter()
            .find(|c| c.kind == NodeKind::Method && c.prop_str(keys::NAME) == Some(name))
            .unwrap()
    }

    #[test]
    fn test_if_without_else_gets_implicit_block() {
        let root = synthesized("class A { void m(Boolean b) { if (b) { return; } } }");
        let body = method(&root, "m").children.last().unwrap();
        let if_else = &body.children[0];
        assert_eq!(if_else.children.len(), 2);
        assert!(if_else.children[1].prop_bool(keys::IS_IMPLICIT));
    }

    #[test]
    fn test_loops_get_skip_blocks_only_when_zero_iterations_possible() {
        let root = synthesized(
            "class A { void m(List<String> xs) { while (true) { } while (x > 0) { } for (String s : xs) { } do { } while (b); } }",
        );
        let body = method(&root, "m").children.last().unwrap();
        let counts: Vec<usize> = body.children.iter().map(|c| c.children.len()).collect();
        assert_eq!(counts, vec![2, 3, 4, 2]);
    }

    #[test]
    fn test_static_blocks_become_methods_and_invoker() {
        let root = synthesized("class A { static { x = 1; } static Integer x; static { x = 2; } }");
        assert!(method(&root, "<staticBlock1>").prop_bool(keys::IS_STATIC));
        assert!(method(&root, "<staticBlock2>").prop_bool(keys::IS_SYNTHETIC));
        let invoker = method(&root, reserved::STATIC_BLOCK_INVOKER);
        let calls = &invoker.children[0].children;
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1].children[0].prop_str(keys::METHOD_NAME),
            Some("<staticBlock2>")
        );
        assert_eq!(root.children_of_kind(NodeKind::StaticBlock).count(), 0);
    }

    #[test]
    fn test_property_accessors() {
        let root = synthesized(
            "class A { public Integer Size { get; set { Size = value; } } }",
        );
        let getter = method(&root, "__get_Size");
        assert_eq!(getter.prop_str(keys::RETURN_TYPE), Some("Integer"));
        assert!(getter.prop_bool(keys::IS_IMPLICIT));
        let setter = method(&root, "__set_Size");
        assert!(!setter.prop_bool(keys::IS_IMPLICIT));
        assert_eq!(setter.children[0].prop_str(keys::NAME), Some("value"));
        let property = root.children_of_kind(NodeKind::PropertyDeclaration).next().unwrap();
        assert!(property.children.is_empty());
    }

    #[test]
    fn test_trigger_wraps_body_in_invoke() {
        let root = synthesized("trigger T on Account (before insert, After  Update) { }");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].prop_str(keys::NAME), Some("invoke"));
        assert_eq!(root.prop_list(keys::USAGES), ["BEFORE INSERT", "AFTER UPDATE"]);
    }
}
