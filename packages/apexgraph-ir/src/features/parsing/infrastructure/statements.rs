//! Statement parsing
//!
//! Bodies of `if`/loops are always blocks in the AST: a single-statement
//! body is wrapped in a `BlockStatement` spanning that statement.

use super::lexer::{Token, TokenKind};
use super::parser::{PResult, Parser};
use crate::features::parsing::domain::AstNode;
use crate::shared::constants::keys;
use crate::shared::models::{NodeKind, Span};

const DML_KEYWORDS: &[(&str, NodeKind)] = &[
    ("insert", NodeKind::DmlInsertStatement),
    ("update", NodeKind::DmlUpdateStatement),
    ("upsert", NodeKind::DmlUpsertStatement),
    ("delete", NodeKind::DmlDeleteStatement),
    ("undelete", NodeKind::DmlUndeleteStatement),
    ("merge", NodeKind::DmlMergeStatement),
];

impl Parser {
    pub(super) fn parse_block(&mut self) -> PResult<AstNode> {
        let start = self.expect("{")?;
        let mut statements = Vec::new();
        while !self.check("}") {
            if self.peek().is_eof() {
                return Err(self.error_here("expected '}'"));
            }
            if self.eat(";") {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        self.advance();
        Ok(AstNode::new(NodeKind::BlockStatement, self.span_from(&start)).with_children(statements))
    }

    /// Loop/if body: a block, or a single statement wrapped in one
    fn parse_body(&mut self) -> PResult<AstNode> {
        if self.check("{") {
            return self.parse_block();
        }
        let statement = self.parse_statement()?;
        Ok(AstNode::new(NodeKind::BlockStatement, statement.span).with_child(statement))
    }

    pub(super) fn parse_statement(&mut self) -> PResult<AstNode> {
        if self.check("{") {
            return self.parse_block();
        }
        if self.check_keyword("if") {
            return self.parse_if();
        }
        if self.check_keyword("for") {
            return self.parse_for();
        }
        if self.check_keyword("while") {
            return self.parse_while();
        }
        if self.check_keyword("do") {
            return self.parse_do();
        }
        if self.check_keyword("switch") && self.peek_at(1).is_keyword("on") {
            return self.parse_switch();
        }
        if self.check_keyword("try") && self.peek_at(1).is_punct("{") {
            return self.parse_try();
        }
        if self.check_keyword("return") {
            return self.parse_return();
        }
        if self.check_keyword("throw") {
            let start = self.advance();
            let value = self.parse_expression()?;
            self.expect(";")?;
            return Ok(AstNode::new(NodeKind::ThrowStatement, self.span_from(&start)).with_child(value));
        }
        if self.check_keyword("break") || self.check_keyword("continue") {
            let start = self.advance();
            let kind = if start.is_keyword("break") {
                NodeKind::BreakStatement
            } else {
                NodeKind::ContinueStatement
            };
            self.expect(";")?;
            return Ok(AstNode::new(kind, self.span_from(&start)));
        }
        if let Some(kind) = self.dml_kind() {
            return self.parse_dml(kind);
        }

        let start = self.peek().clone();
        if let Some((ty, name)) = self.try_parse(|p| p.parse_local_header(&["=", ";", ","])) {
            let node = self.parse_variable_declarations(&start, ty, name)?;
            self.expect(";")?;
            return Ok(node);
        }

        let expr = self.parse_expression()?;
        self.expect(";")?;
        Ok(AstNode::new(NodeKind::ExpressionStatement, self.span_from(&start)).with_child(expr))
    }

    /// `[final] Type name` followed by one of `followers`
    fn parse_local_header(&mut self, followers: &[&str]) -> PResult<(String, String)> {
        self.eat_keyword("final");
        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;
        if followers.iter().any(|f| self.check(f)) {
            Ok((ty, name))
        } else {
            Err(self.error_here("not a declaration"))
        }
    }

    /// Declarators after the header; leaves the terminator unconsumed
    fn parse_variable_declarations(
        &mut self,
        start: &Token,
        ty: String,
        first_name: String,
    ) -> PResult<AstNode> {
        let mut node = AstNode::new(NodeKind::VariableDeclarationStatements, start_span(start))
            .with_prop(keys::TYPE, ty.clone());
        let mut name = first_name;
        let mut decl_start = start.clone();
        loop {
            let mut decl = AstNode::new(NodeKind::VariableDeclaration, start_span(&decl_start))
                .with_prop(keys::NAME, name)
                .with_prop(keys::TYPE, ty.clone());
            if self.eat("=") {
                decl.children.push(self.parse_expression()?);
            }
            decl.span = self.span_from(&decl_start);
            node.children.push(decl);
            if !self.eat(",") {
                break;
            }
            decl_start = self.peek().clone();
            name = self.expect_identifier()?;
        }
        node.span = self.span_from(start);
        Ok(node)
    }

    fn condition(&mut self) -> PResult<AstNode> {
        let expr = self.parse_expression()?;
        Ok(AstNode::new(NodeKind::StandardCondition, expr.span).with_child(expr))
    }

    fn parse_if(&mut self) -> PResult<AstNode> {
        let start = self.peek().clone();
        let mut node = AstNode::new(NodeKind::IfElseBlockStatement, start_span(&start));
        loop {
            let branch_start = self.expect_keyword("if")?;
            self.expect("(")?;
            let condition = self.condition()?;
            self.expect(")")?;
            let body = self.parse_body()?;
            node.children.push(
                AstNode::new(NodeKind::IfBlockStatement, self.span_from(&branch_start))
                    .with_child(condition)
                    .with_child(body),
            );
            if !self.eat_keyword("else") {
                break;
            }
            if !self.check_keyword("if") {
                node.children.push(self.parse_body()?);
                break;
            }
        }
        node.span = self.span_from(&start);
        Ok(node)
    }

    fn parse_for(&mut self) -> PResult<AstNode> {
        let start = self.expect_keyword("for")?;
        self.expect("(")?;

        let header_start = self.peek().clone();
        if let Some((ty, name)) = self.try_parse(|p| p.parse_local_header(&[":"])) {
            let variable = AstNode::new(NodeKind::VariableDeclaration, self.span_from(&header_start))
                .with_prop(keys::NAME, name)
                .with_prop(keys::TYPE, ty.clone());
            let declaration =
                AstNode::new(NodeKind::VariableDeclarationStatements, self.span_from(&header_start))
                    .with_prop(keys::TYPE, ty)
                    .with_child(variable);
            self.expect(":")?;
            let iterable = self.parse_expression()?;
            self.expect(")")?;
            let body = self.parse_body()?;
            return Ok(AstNode::new(NodeKind::ForEachStatement, self.span_from(&start))
                .with_child(declaration)
                .with_child(iterable)
                .with_child(body));
        }

        let mut node = AstNode::new(NodeKind::ForLoopStatement, start_span(&start));

        let init = if self.check(";") {
            None
        } else if let Some((ty, name)) = self.try_parse(|p| p.parse_local_header(&["=", ";", ","])) {
            Some(self.parse_variable_declarations(&header_start, ty, name)?)
        } else {
            let expr = self.parse_expression()?;
            Some(AstNode::new(NodeKind::ExpressionStatement, expr.span).with_child(expr))
        };
        self.expect(";")?;

        let condition = if self.check(";") {
            None
        } else {
            Some(self.condition()?)
        };
        self.expect(";")?;

        let update = if self.check(")") {
            None
        } else {
            let expr = self.parse_expression()?;
            Some(AstNode::new(NodeKind::ExpressionStatement, expr.span).with_child(expr))
        };
        if self.check(",") {
            return Err(self.error_here("multiple update expressions are not supported"));
        }
        self.expect(")")?;

        node.set_prop(keys::HAS_INIT, init.is_some());
        node.set_prop(keys::HAS_CONDITION, condition.is_some());
        node.set_prop(keys::HAS_UPDATE, update.is_some());
        node.children.extend(init);
        node.children.extend(condition);
        node.children.extend(update);
        node.children.push(self.parse_body()?);
        node.span = self.span_from(&start);
        Ok(node)
    }

    fn parse_while(&mut self) -> PResult<AstNode> {
        let start = self.expect_keyword("while")?;
        self.expect("(")?;
        let condition = self.condition()?;
        self.expect(")")?;
        let body = self.parse_body()?;
        Ok(AstNode::new(NodeKind::WhileLoopStatement, self.span_from(&start))
            .with_child(condition)
            .with_child(body))
    }

    fn parse_do(&mut self) -> PResult<AstNode> {
        let start = self.expect_keyword("do")?;
        let body = self.parse_block()?;
        self.expect_keyword("while")?;
        self.expect("(")?;
        let condition = self.condition()?;
        self.expect(")")?;
        self.expect(";")?;
        Ok(AstNode::new(NodeKind::DoLoopStatement, self.span_from(&start))
            .with_child(body)
            .with_child(condition))
    }

    fn parse_switch(&mut self) -> PResult<AstNode> {
        let start = self.expect_keyword("switch")?;
        self.expect_keyword("on")?;
        let subject = self.parse_expression()?;
        let mut node = AstNode::new(NodeKind::SwitchStatement, start_span(&start)).with_child(subject);

        self.expect("{")?;
        while !self.check("}") {
            let when_start = self.expect_keyword("when")?;

            if self.check_keyword("else") && self.peek_at(1).is_punct("{") {
                self.advance();
                let body = self.parse_block()?;
                node.children.push(
                    AstNode::new(NodeKind::ElseWhenBlock, self.span_from(&when_start)).with_child(body),
                );
                continue;
            }

            let type_case = self.try_parse(|p| {
                let ty = p.parse_type()?;
                let name = p.expect_identifier()?;
                if p.check("{") {
                    Ok((ty, name))
                } else {
                    Err(p.error_here("not a type case"))
                }
            });
            if let Some((ty, name)) = type_case {
                let body = self.parse_block()?;
                node.children.push(
                    AstNode::new(NodeKind::TypeWhenBlock, self.span_from(&when_start))
                        .with_prop(keys::TYPE, ty)
                        .with_prop(keys::NAME, name)
                        .with_child(body),
                );
                continue;
            }

            let mut when = AstNode::new(NodeKind::ValueWhenBlock, start_span(&when_start));
            loop {
                let case_start = self.peek().clone();
                let is_identifier = case_start.identifier().is_some()
                    && !case_start.is_keyword("null")
                    && !case_start.is_keyword("true")
                    && !case_start.is_keyword("false")
                    && (self.peek_at(1).is_punct(",") || self.peek_at(1).is_punct("{"));
                if is_identifier {
                    let name = self.expect_identifier()?;
                    when.children.push(
                        AstNode::new(NodeKind::IdentifierCase, self.span_from(&case_start))
                            .with_prop(keys::NAME, name),
                    );
                } else {
                    let value = self.parse_unary()?;
                    when.children.push(
                        AstNode::new(NodeKind::LiteralCase, self.span_from(&case_start)).with_child(value),
                    );
                }
                if !self.eat(",") {
                    break;
                }
            }
            when.children.push(self.parse_block()?);
            when.span = self.span_from(&when_start);
            node.children.push(when);
        }
        self.expect("}")?;
        node.span = self.span_from(&start);
        Ok(node)
    }

    fn parse_try(&mut self) -> PResult<AstNode> {
        let start = self.expect_keyword("try")?;
        let mut node = AstNode::new(NodeKind::TryCatchFinallyBlockStatement, start_span(&start))
            .with_child(self.parse_block()?);

        while self.check_keyword("catch") {
            let catch_start = self.advance();
            self.expect("(")?;
            self.eat_keyword("final");
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            self.expect(")")?;
            let body = self.parse_block()?;
            node.children.push(
                AstNode::new(NodeKind::CatchBlockStatement, self.span_from(&catch_start))
                    .with_prop(keys::TYPE, ty)
                    .with_prop(keys::NAME, name)
                    .with_child(body),
            );
        }

        let has_finally = self.eat_keyword("finally");
        if has_finally {
            node.children.push(self.parse_block()?);
        }
        if node.children.len() == 1 {
            return Err(self.error_here("expected 'catch' or 'finally'"));
        }
        node.set_prop(keys::HAS_FINALLY, has_finally);
        node.span = self.span_from(&start);
        Ok(node)
    }

    fn parse_return(&mut self) -> PResult<AstNode> {
        let start = self.expect_keyword("return")?;
        let mut node = AstNode::new(NodeKind::ReturnStatement, start_span(&start));
        if !self.check(";") {
            node.children.push(self.parse_expression()?);
        }
        self.expect(";")?;
        node.span = self.span_from(&start);
        Ok(node)
    }

    /// DML keyword followed by an operand (`update x;`, not `update = 1;`)
    fn dml_kind(&self) -> Option<NodeKind> {
        let operand_follows = matches!(
            self.peek_at(1).kind,
            TokenKind::Identifier(_) | TokenKind::Soql(_)
        );
        if !operand_follows {
            return None;
        }
        DML_KEYWORDS
            .iter()
            .find(|(kw, _)| self.check_keyword(kw))
            .map(|(_, kind)| *kind)
    }

    fn parse_dml(&mut self, kind: NodeKind) -> PResult<AstNode> {
        let start = self.advance();
        // `insert as user records;`
        if self.check_keyword("as")
            && (self.peek_at(1).is_keyword("user") || self.peek_at(1).is_keyword("system"))
        {
            self.advance();
            self.advance();
        }
        let mut node = AstNode::new(kind, start_span(&start)).with_child(self.parse_expression()?);
        match kind {
            NodeKind::DmlMergeStatement => node.children.push(self.parse_expression()?),
            // optional external id field
            NodeKind::DmlUpsertStatement if !self.check(";") => {
                node.set_prop(keys::NAME, self.parse_type()?);
            }
            _ => {}
        }
        self.expect(";")?;
        node.span = self.span_from(&start);
        Ok(node)
    }
}

fn start_span(token: &Token) -> Span {
    Span::new(token.line, token.column, token.end_line, token.end_column)
}
