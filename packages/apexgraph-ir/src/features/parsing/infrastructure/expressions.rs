//! Expression parsing (precedence climbing)
//!
//! Identifier chains become either a `VariableExpression` whose child is the
//! qualifier, or a `MethodCallExpression` whose first child is the receiver:
//! `EmptyReferenceExpression` for unqualified calls, `ReferenceExpression`
//! carrying the dotted names for `a.b.m()`, or any other expression.

use super::lexer::{Token, TokenKind};
use super::parser::{PResult, Parser};
use crate::features::parsing::domain::AstNode;
use crate::shared::constants::{keys, literal_types};
use crate::shared::models::{NodeKind, Span};
use crate::shared::utils::type_names::{base_type, canonical_type, MAP, SET};

const ASSIGNMENT_OPS: &[&str] = &["=", "+=", "-=", "*=", "/="];

impl Parser {
    pub(super) fn parse_expression(&mut self) -> PResult<AstNode> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> PResult<AstNode> {
        let start = self.peek().clone();
        let target = self.parse_ternary()?;
        if let Some(op) = ASSIGNMENT_OPS.iter().find(|op| self.check(op)) {
            self.advance();
            let value = self.parse_assignment()?;
            return Ok(AstNode::new(NodeKind::AssignmentExpression, self.span_from(&start))
                .with_prop(keys::OPERATOR, *op)
                .with_child(target)
                .with_child(value));
        }
        Ok(target)
    }

    fn parse_ternary(&mut self) -> PResult<AstNode> {
        let start = self.peek().clone();
        let condition = self.parse_binary(0)?;
        if !self.eat("?") {
            return Ok(condition);
        }
        let when_true = self.parse_expression()?;
        self.expect(":")?;
        let when_false = self.parse_ternary()?;
        Ok(AstNode::new(NodeKind::TernaryExpression, self.span_from(&start))
            .with_child(condition)
            .with_child(when_true)
            .with_child(when_false))
    }

    /// Binary operators by precedence level, loosest first
    fn parse_binary(&mut self, level: usize) -> PResult<AstNode> {
        const LEVELS: &[(&[&str], NodeKind)] = &[
            (&["||"], NodeKind::BooleanExpression),
            (&["&&"], NodeKind::BooleanExpression),
            (&["==", "!=", "===", "!=="], NodeKind::BooleanExpression),
            (&["<", ">", "<=", ">="], NodeKind::BooleanExpression),
            (&["+", "-"], NodeKind::BinaryExpression),
            (&["*", "/", "%"], NodeKind::BinaryExpression),
        ];
        let Some((ops, kind)) = LEVELS.get(level) else {
            return self.parse_unary();
        };

        let start = self.peek().clone();
        let mut left = self.parse_binary(level + 1)?;
        loop {
            // relational level also hosts `instanceof`
            if level == 3 && self.check_keyword("instanceof") {
                self.advance();
                let ty = self.parse_type()?;
                left = AstNode::new(NodeKind::InstanceOfExpression, self.span_from(&start))
                    .with_prop(keys::TYPE, ty)
                    .with_child(left);
                continue;
            }
            let Some(op) = ops.iter().find(|op| self.check(op)) else {
                break;
            };
            self.advance();
            let right = self.parse_binary(level + 1)?;
            left = AstNode::new(*kind, self.span_from(&start))
                .with_prop(keys::OPERATOR, *op)
                .with_child(left)
                .with_child(right);
        }
        Ok(left)
    }

    pub(super) fn parse_unary(&mut self) -> PResult<AstNode> {
        let start = self.peek().clone();
        if let Some(op) = ["!", "-", "+", "++", "--"].iter().find(|op| self.check(op)) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(AstNode::new(NodeKind::PrefixExpression, self.span_from(&start))
                .with_prop(keys::OPERATOR, *op)
                .with_child(operand));
        }

        if self.check("(") {
            let cast = self.try_parse(|p| {
                p.advance();
                let ty = p.parse_type()?;
                p.expect(")")?;
                if p.starts_operand() {
                    Ok(ty)
                } else {
                    Err(p.error_here("not a cast"))
                }
            });
            if let Some(ty) = cast {
                let operand = self.parse_unary()?;
                return Ok(AstNode::new(NodeKind::CastExpression, self.span_from(&start))
                    .with_prop(keys::TYPE, ty)
                    .with_child(operand));
            }
        }

        self.parse_postfix()
    }

    fn starts_operand(&self) -> bool {
        let token = self.peek();
        match &token.kind {
            TokenKind::Identifier(_) => !token.is_keyword("instanceof"),
            TokenKind::StringLiteral(_)
            | TokenKind::IntegerLiteral(_)
            | TokenKind::LongLiteral(_)
            | TokenKind::DecimalLiteral(_)
            | TokenKind::Soql(_) => true,
            TokenKind::Punct(p) => matches!(*p, "(" | "!"),
            _ => false,
        }
    }

    fn parse_postfix(&mut self) -> PResult<AstNode> {
        let start = self.peek().clone();
        let mut expr = self.parse_primary()?;
        loop {
            if self.check(".") && self.peek_at(1).identifier().is_some() {
                self.advance();
                let name = self.expect_identifier()?;
                if self.check("(") {
                    let args = self.parse_arguments()?;
                    expr = AstNode::new(NodeKind::MethodCallExpression, self.span_from(&start))
                        .with_prop(keys::METHOD_NAME, name.clone())
                        .with_prop(keys::FULL_METHOD_NAME, name)
                        .with_child(expr)
                        .with_children(args);
                } else {
                    expr = AstNode::new(NodeKind::VariableExpression, self.span_from(&start))
                        .with_prop(keys::NAME, name)
                        .with_child(expr);
                }
            } else if self.eat("[") {
                let index = self.parse_expression()?;
                self.expect("]")?;
                expr = AstNode::new(NodeKind::ArrayLoadExpression, self.span_from(&start))
                    .with_child(expr)
                    .with_child(index);
            } else if self.check("++") || self.check("--") {
                let op = if self.check("++") { "++" } else { "--" };
                self.advance();
                expr = AstNode::new(NodeKind::PostfixExpression, self.span_from(&start))
                    .with_prop(keys::OPERATOR, op)
                    .with_child(expr);
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_arguments(&mut self) -> PResult<Vec<AstNode>> {
        self.expect("(")?;
        let mut args = Vec::new();
        while !self.check(")") {
            args.push(self.parse_expression()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<AstNode> {
        let start = self.peek().clone();
        let literal = match &start.kind {
            TokenKind::StringLiteral(s) => Some((literal_types::STRING, s.clone())),
            TokenKind::IntegerLiteral(i) => Some((literal_types::INTEGER, i.to_string())),
            TokenKind::LongLiteral(i) => Some((literal_types::LONG, i.to_string())),
            TokenKind::DecimalLiteral(d) => Some((literal_types::DECIMAL, d.clone())),
            _ if start.is_keyword("true") => Some((literal_types::TRUE, "true".to_string())),
            _ if start.is_keyword("false") => Some((literal_types::FALSE, "false".to_string())),
            _ if start.is_keyword("null") => Some((literal_types::NULL, "null".to_string())),
            _ => None,
        };
        if let Some((literal_type, value)) = literal {
            self.advance();
            return Ok(AstNode::new(NodeKind::LiteralExpression, self.span_from(&start))
                .with_prop(keys::LITERAL_TYPE, literal_type)
                .with_prop(keys::VALUE, value));
        }

        if let TokenKind::Soql(query) = &start.kind {
            let query = query.clone();
            self.advance();
            return Ok(AstNode::new(NodeKind::SoqlExpression, self.span_from(&start))
                .with_prop(keys::QUERY, query));
        }

        if self.eat("(") {
            let inner = self.parse_expression()?;
            self.expect(")")?;
            return Ok(inner);
        }

        if start.is_keyword("this") || start.is_keyword("super") {
            let is_this = start.is_keyword("this");
            self.advance();
            if self.check("(") {
                let args = self.parse_arguments()?;
                let kind = if is_this {
                    NodeKind::ThisMethodCallExpression
                } else {
                    NodeKind::SuperMethodCallExpression
                };
                return Ok(AstNode::new(kind, self.span_from(&start)).with_children(args));
            }
            let kind = if is_this {
                NodeKind::ThisVariableExpression
            } else {
                NodeKind::SuperVariableExpression
            };
            return Ok(AstNode::new(kind, self.span_from(&start)));
        }

        if start.is_keyword("new") && self.peek_at(1).identifier().is_some() {
            return self.parse_new();
        }

        if start.identifier().is_some() {
            return self.parse_name_chain();
        }

        Err(self.error_here("expected expression"))
    }

    /// `a`, `a.b.c`, `m()`, `A.b.m()`, `Account.class`
    fn parse_name_chain(&mut self) -> PResult<AstNode> {
        let start = self.peek().clone();
        let mut names = vec![self.expect_identifier()?];
        while self.check(".")
            && self.peek_at(1).identifier().is_some()
            && !self.peek_at(1).is_keyword("class")
            && !self.peek_at(2).is_punct("(")
        {
            self.advance();
            names.push(self.expect_identifier()?);
        }

        if self.check("(") {
            let method = names.pop().unwrap_or_default();
            return self.finish_call(&start, names, method);
        }

        if self.check(".") && self.peek_at(1).is_keyword("class") {
            self.advance();
            self.advance();
            return Ok(AstNode::new(NodeKind::ClassRefExpression, self.span_from(&start))
                .with_prop(keys::TYPE, names.join(".")));
        }

        if self.check(".") && self.peek_at(1).identifier().is_some() && self.peek_at(2).is_punct("(") {
            self.advance();
            let method = self.expect_identifier()?;
            return self.finish_call(&start, names, method);
        }

        let name = names.pop().unwrap_or_default();
        let qualifier = reference(&start, names);
        Ok(AstNode::new(NodeKind::VariableExpression, self.span_from(&start))
            .with_prop(keys::NAME, name)
            .with_child(qualifier))
    }

    fn finish_call(&mut self, start: &Token, names: Vec<String>, method: String) -> PResult<AstNode> {
        let full_name = if names.is_empty() {
            method.clone()
        } else {
            format!("{}.{}", names.join("."), method)
        };
        let receiver = reference(start, names);
        let args = self.parse_arguments()?;
        Ok(AstNode::new(NodeKind::MethodCallExpression, self.span_from(start))
            .with_prop(keys::METHOD_NAME, method)
            .with_prop(keys::FULL_METHOD_NAME, full_name)
            .with_child(receiver)
            .with_children(args))
    }

    fn parse_new(&mut self) -> PResult<AstNode> {
        let start = self.expect_keyword("new")?;
        let ty = self.parse_type()?;

        if self.eat("[") {
            // sized array: `new String[n]`
            self.parse_expression()?;
            self.expect("]")?;
            return Ok(AstNode::new(NodeKind::NewObjectExpression, self.span_from(&start))
                .with_prop(keys::TYPE, format!("{}[]", ty)));
        }

        if self.check("(") {
            let args = self.parse_arguments()?;
            return Ok(AstNode::new(NodeKind::NewObjectExpression, self.span_from(&start))
                .with_prop(keys::TYPE, ty)
                .with_children(args));
        }

        self.expect("{")?;
        let canonical = canonical_type(&ty);
        let base = base_type(&canonical);
        let mut entries = Vec::new();
        while !self.check("}") {
            let entry_start = self.peek().clone();
            let first = self.parse_expression()?;
            if base == MAP {
                self.expect("=>")?;
                let value = self.parse_expression()?;
                entries.push(
                    AstNode::new(NodeKind::MapEntryNode, self.span_from(&entry_start))
                        .with_child(first)
                        .with_child(value),
                );
            } else {
                entries.push(first);
            }
            if !self.eat(",") {
                break;
            }
        }
        self.expect("}")?;

        let kind = match base {
            MAP => NodeKind::NewMapLiteralExpression,
            SET => NodeKind::NewSetLiteralExpression,
            _ => NodeKind::NewListLiteralExpression,
        };
        Ok(AstNode::new(kind, self.span_from(&start))
            .with_prop(keys::TYPE, ty)
            .with_children(entries))
    }
}

fn reference(start: &Token, names: Vec<String>) -> AstNode {
    let span = Span::new(start.line, start.column, start.end_line, start.end_column);
    if names.is_empty() {
        AstNode::new(NodeKind::EmptyReferenceExpression, span)
    } else {
        AstNode::new(NodeKind::ReferenceExpression, span).with_prop(keys::NAMES, names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(src: &str) -> AstNode {
        let mut parser = Parser::new("T", src).unwrap();
        parser.parse_expression().unwrap()
    }

    #[test]
    fn test_precedence() {
        let e = expr("a || b && c == 1 + 2 * 3");
        assert_eq!(e.kind, NodeKind::BooleanExpression);
        assert_eq!(e.prop_str(keys::OPERATOR), Some("||"));
        let and = &e.children[1];
        assert_eq!(and.prop_str(keys::OPERATOR), Some("&&"));
        let eq = &and.children[1];
        let plus = &eq.children[1];
        assert_eq!(plus.kind, NodeKind::BinaryExpression);
        assert_eq!(plus.children[1].prop_str(keys::OPERATOR), Some("*"));
    }

    #[test]
    fn test_method_call_receivers() {
        let e = expr("foo(1)");
        assert_eq!(e.kind, NodeKind::MethodCallExpression);
        assert_eq!(e.children[0].kind, NodeKind::EmptyReferenceExpression);
        assert_eq!(e.children.len(), 2);

        let e = expr("Outer.Inner.run(a, b)");
        assert_eq!(e.prop_str(keys::METHOD_NAME), Some("run"));
        assert_eq!(e.prop_str(keys::FULL_METHOD_NAME), Some("Outer.Inner.run"));
        assert_eq!(e.children[0].prop_list(keys::NAMES), ["Outer", "Inner"]);

        let e = expr("a.b().c()");
        assert_eq!(e.prop_str(keys::METHOD_NAME), Some("c"));
        assert_eq!(e.children[0].kind, NodeKind::MethodCallExpression);
    }

    #[test]
    fn test_variable_chain_and_class_ref() {
        let e = expr("Trigger.new");
        assert_eq!(e.kind, NodeKind::VariableExpression);
        assert_eq!(e.prop_str(keys::NAME), Some("new"));
        assert_eq!(e.children[0].prop_list(keys::NAMES), ["Trigger"]);

        let e = expr("Account.class");
        assert_eq!(e.kind, NodeKind::ClassRefExpression);
        assert_eq!(e.prop_str(keys::TYPE), Some("Account"));
    }

    #[test]
    fn test_cast_versus_parenthesized() {
        assert_eq!(expr("(String) x").kind, NodeKind::CastExpression);
        assert_eq!(expr("(a) + b").kind, NodeKind::BinaryExpression);
        assert_eq!(expr("(x).size()").kind, NodeKind::MethodCallExpression);
    }

    #[test]
    fn test_collection_literals() {
        let e = expr("new Map<String, Integer>{'a' => 1, 'b' => 2}");
        assert_eq!(e.kind, NodeKind::NewMapLiteralExpression);
        assert_eq!(e.children.len(), 2);
        assert_eq!(e.children[0].kind, NodeKind::MapEntryNode);

        assert_eq!(expr("new Set<Id>{}").kind, NodeKind::NewSetLiteralExpression);
        assert_eq!(expr("new String[]{'a'}").kind, NodeKind::NewListLiteralExpression);
        assert_eq!(expr("new Account(Name = 'x')").kind, NodeKind::NewObjectExpression);
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let e = expr("a = b = 1");
        assert_eq!(e.kind, NodeKind::AssignmentExpression);
        assert_eq!(e.children[1].kind, NodeKind::AssignmentExpression);
    }
}
