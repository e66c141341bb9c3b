//! Unreachable-code detection
//!
//! A statement that follows `return`, `throw`, `break` or `continue` in the
//! same block can never execute. This is a compile error, reported with the
//! method and the line of the first unreachable statement.

use crate::errors::UserActionError;
use crate::features::parsing::AstNode;
use crate::shared::constants::keys;
use crate::shared::models::NodeKind;
use crate::shared::ScopeStack;

/// Check every method body of a (synthesized) compilation unit
pub(crate) fn check_reachability(unit: &str, root: &AstNode) -> Result<(), UserActionError> {
    let mut scopes = ScopeStack::new();
    check_type(unit, root, &mut scopes)
}

fn check_type(unit: &str, node: &AstNode, scopes: &mut ScopeStack) -> Result<(), UserActionError> {
    let name = node.prop_str(keys::NAME).unwrap_or_default();
    scopes.with_scope(name, |scopes| {
        for member in &node.children {
            if member.kind.is_type_declaration() {
                check_type(unit, member, scopes)?;
            } else if member.kind == NodeKind::Method {
                let method = member.prop_str(keys::NAME).unwrap_or_default();
                let owner = scopes.qualified();
                for child in &member.children {
                    check_block_tree(unit, &owner, method, child)?;
                }
            }
        }
        Ok(())
    })
}

fn check_block_tree(
    unit: &str,
    owner: &str,
    method: &str,
    node: &AstNode,
) -> Result<(), UserActionError> {
    if node.kind == NodeKind::BlockStatement {
        let mut statements = node.children.iter();
        while let Some(statement) = statements.next() {
            if statement.kind.is_unconditional_exit() {
                if let Some(unreachable) = statements.next() {
                    return Err(UserActionError::new(
                        format!(
                            "Unreachable statement in method {}.{} at line {}",
                            owner, method, unreachable.span.start_line
                        ),
                        unit,
                        unreachable.span.start_line,
                        unreachable.span.start_col,
                    ));
                }
            }
        }
    }
    for child in &node.children {
        check_block_tree(unit, owner, method, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::parse_compilation_unit;

    fn check(source: &str) -> Result<(), UserActionError> {
        let unit = parse_compilation_unit("MyClass.cls", source).unwrap();
        check_reachability(&unit.name, &unit.root)
    }

    #[test]
    fn test_statement_after_return_is_rejected() {
        let err = check("class MyClass {\n  void foo() {\n    return;\n    insert a;\n  }\n}").unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("MyClass.foo"));
        assert!(err.to_string().contains("MyClass.cls"));
    }

    #[test]
    fn test_nested_blocks_and_inner_classes_are_checked() {
        let err = check(
            "class Outer { class Inner { void m() { while (x) { break; x = 1; } } } }",
        )
        .unwrap_err();
        assert!(err.message.contains("Outer.Inner.m"));
    }

    #[test]
    fn test_trailing_exit_is_fine() {
        assert!(check("class A { Integer m(Boolean b) { if (b) { return 1; } return 2; } }").is_ok());
    }
}
