//! CFG synthesizer
//!
//! Walks one method body with a stack of open scope frames. Every vertex
//! hands control to a [`Continuation`]; the last statement of a block
//! inherits the block's continuation plus the block itself as an end scope.
//!
//! Per construct:
//! - if/else: `IfElse → IfBlock → Condition`, Positive to the block,
//!   Negative to the next `IfBlock` or the (possibly implicit) else block
//! - while: `While → Condition`, Positive to the body, Negative to the skip block
//! - foreach: `ForEach → loop variable`, then body and skip block
//! - for: `For → init → Condition → body → update`, Negative to the skip block
//! - do: `Do → body → Condition`, Negative out of the loop
//! - switch: `Switch → discriminant`, one Case edge per when-block
//! - try: `Try →` try block and each catch; blocks flow into finally
//! - return/throw: no edge, every open scope ends; an enclosing finally
//!   block is not entered on that path

use tracing::trace;

use crate::errors::{EngineError, Result, UserActionError};
use crate::features::flow_graph::domain::{Continuation, ScopeFrame};
use crate::features::property_graph::{CfgEdgeKind, GraphStore, VertexId};
use crate::shared::constants::keys;
use crate::shared::models::{NodeKind, PropertyValue};

pub struct CfgSynthesizer<'s> {
    store: &'s mut GraphStore,
    frames: Vec<ScopeFrame>,
}

impl<'s> CfgSynthesizer<'s> {
    pub fn new(store: &'s mut GraphStore) -> Self {
        Self {
            store,
            frames: Vec::new(),
        }
    }

    /// Synthesize one method; false when it has no body or was already done
    pub fn synthesize(&mut self, method: VertexId) -> Result<bool> {
        if !self.store.is(method, NodeKind::Method) {
            return Err(EngineError::internal(format!(
                "CFG synthesis requested for non-method vertex {}",
                method
            )));
        }
        let Some(body) = self
            .store
            .children(method)
            .last()
            .copied()
            .filter(|b| self.store.is(*b, NodeKind::BlockStatement))
        else {
            return Ok(false);
        };
        if self.store.has_cfg_edges(body) || self.store.property(body, keys::END_SCOPES).is_some() {
            return Ok(false);
        }

        self.frames.clear();
        self.block(body, &Continuation::exit())?;
        trace!(
            method = self.store.prop_str(method, keys::NAME).unwrap_or(""),
            "synthesized CFG"
        );
        Ok(true)
    }

    // ════════════════════════════════════════════════════════════════
    // Blocks and simple statements
    // ════════════════════════════════════════════════════════════════

    fn block(&mut self, block: VertexId, cont: &Continuation) -> Result<()> {
        self.frames.push(ScopeFrame::scope(NodeKind::BlockStatement));
        let statements = self.store.children(block);
        match statements.first() {
            None => self.flow(block, &cont.leaving(NodeKind::BlockStatement), CfgEdgeKind::Sequential),
            Some(&first) => {
                self.store.add_cfg_edge(block, first, CfgEdgeKind::Sequential);
                for (i, &statement) in statements.iter().enumerate() {
                    let next = match statements.get(i + 1) {
                        Some(&next) => Continuation::to(next),
                        None => cont.leaving(NodeKind::BlockStatement),
                    };
                    self.statement(statement, &next)?;
                }
            }
        }
        self.frames.pop();
        Ok(())
    }

    fn statement(&mut self, statement: VertexId, cont: &Continuation) -> Result<()> {
        let label = self
            .store
            .label(statement)
            .ok_or_else(|| EngineError::internal(format!("missing vertex {}", statement)))?;
        match label {
            NodeKind::BlockStatement => self.block(statement, cont),
            NodeKind::IfElseBlockStatement => self.if_else(statement, cont),
            NodeKind::WhileLoopStatement => self.while_loop(statement, cont),
            NodeKind::ForEachStatement => self.for_each(statement, cont),
            NodeKind::ForLoopStatement => self.for_loop(statement, cont),
            NodeKind::DoLoopStatement => self.do_loop(statement, cont),
            NodeKind::SwitchStatement => self.switch(statement, cont),
            NodeKind::TryCatchFinallyBlockStatement => self.try_catch(statement, cont),
            NodeKind::ReturnStatement | NodeKind::ThrowStatement => {
                let scopes = self.open_scopes(0);
                self.set_end_scopes(statement, &scopes);
                Ok(())
            }
            NodeKind::BreakStatement => self.break_statement(statement),
            NodeKind::ContinueStatement => self.continue_statement(statement),
            _ => {
                self.flow(statement, cont, CfgEdgeKind::Sequential);
                Ok(())
            }
        }
    }

    /// Hand control from `from` to a continuation
    fn flow(&mut self, from: VertexId, cont: &Continuation, kind: CfgEdgeKind) {
        self.set_end_scopes(from, &cont.end_scopes);
        if let Some(target) = cont.target {
            self.store.add_cfg_edge(from, target, kind);
        }
    }

    fn set_end_scopes(&mut self, id: VertexId, scopes: &[NodeKind]) {
        if scopes.is_empty() {
            return;
        }
        let labels: Vec<String> = scopes.iter().map(|k| k.as_str().to_string()).collect();
        self.store
            .set_property(id, keys::END_SCOPES, PropertyValue::List(labels));
    }

    /// Kinds of frames `from..` in innermost-first order
    fn open_scopes(&self, from: usize) -> Vec<NodeKind> {
        self.frames[from..].iter().rev().map(|f| f.kind).collect()
    }

    // ════════════════════════════════════════════════════════════════
    // Jumps
    // ════════════════════════════════════════════════════════════════

    fn innermost_loop(&self, statement: VertexId) -> Result<usize> {
        self.frames
            .iter()
            .rposition(|f| f.loop_exits.is_some())
            .ok_or_else(|| {
                let keyword = if self.store.is(statement, NodeKind::BreakStatement) {
                    "break"
                } else {
                    "continue"
                };
                EngineError::from(UserActionError::new(
                    format!("'{}' outside of a loop", keyword),
                    self.store.prop_str(statement, keys::FILE_NAME).unwrap_or(""),
                    self.store.begin_line(statement),
                    self.store.prop_int(statement, keys::BEGIN_COLUMN).unwrap_or(0) as u32,
                ))
            })
    }

    fn break_statement(&mut self, statement: VertexId) -> Result<()> {
        let index = self.innermost_loop(statement)?;
        let on_break = self.frames[index]
            .loop_exits
            .as_ref()
            .map(|exits| exits.on_break.clone())
            .unwrap_or_default();
        let mut end_scopes = self.open_scopes(index);
        end_scopes.extend(on_break.end_scopes.iter().copied());
        let cont = Continuation {
            target: on_break.target,
            end_scopes,
        };
        self.flow(statement, &cont, CfgEdgeKind::Sequential);
        Ok(())
    }

    fn continue_statement(&mut self, statement: VertexId) -> Result<()> {
        let index = self.innermost_loop(statement)?;
        let on_continue = self.frames[index]
            .loop_exits
            .as_ref()
            .and_then(|exits| exits.on_continue);
        match on_continue {
            Some(target) => {
                let cont = Continuation {
                    target: Some(target),
                    end_scopes: self.open_scopes(index + 1),
                };
                self.flow(statement, &cont, CfgEdgeKind::Sequential);
                Ok(())
            }
            // single-pass loops: continuing means leaving
            None => self.break_statement(statement),
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Compound statements
    // ════════════════════════════════════════════════════════════════

    fn if_else(&mut self, statement: VertexId, cont: &Continuation) -> Result<()> {
        let branches = self
            .store
            .children_with_label(statement, NodeKind::IfBlockStatement);
        let else_block = self
            .store
            .children(statement)
            .last()
            .copied()
            .filter(|b| self.store.is(*b, NodeKind::BlockStatement));
        let first = branches
            .first()
            .copied()
            .ok_or_else(|| malformed(statement, "if statement without branches"))?;
        let else_block = else_block.ok_or_else(|| malformed(statement, "if statement without else block"))?;

        self.frames.push(ScopeFrame::scope(NodeKind::IfElseBlockStatement));
        let inner = cont.leaving(NodeKind::IfElseBlockStatement);
        self.store.add_cfg_edge(statement, first, CfgEdgeKind::Sequential);

        for (i, &branch) in branches.iter().enumerate() {
            let condition = self.child_of(branch, 0, NodeKind::StandardCondition)?;
            let block = self.child_of(branch, 1, NodeKind::BlockStatement)?;
            let otherwise = branches.get(i + 1).copied().unwrap_or(else_block);

            self.store.add_cfg_edge(branch, condition, CfgEdgeKind::Sequential);
            self.store.add_cfg_edge(condition, block, CfgEdgeKind::Positive);
            self.store.add_cfg_edge(condition, otherwise, CfgEdgeKind::Negative);
            self.block(block, &inner)?;
        }
        self.block(else_block, &inner)?;

        self.frames.pop();
        Ok(())
    }

    fn while_loop(&mut self, statement: VertexId, cont: &Continuation) -> Result<()> {
        let condition = self
            .first_child(statement, NodeKind::StandardCondition)
            .ok_or_else(|| malformed(statement, "while loop without condition"))?;
        let (body, skip) = self.loop_blocks(statement)?;

        self.frames.push(ScopeFrame::looping(
            NodeKind::WhileLoopStatement,
            cont.clone(),
            None,
        ));
        let inner = cont.leaving(NodeKind::WhileLoopStatement);
        self.store.add_cfg_edge(statement, condition, CfgEdgeKind::Sequential);
        self.store.add_cfg_edge(condition, body, CfgEdgeKind::Positive);
        if let Some(skip) = skip {
            self.store.add_cfg_edge(condition, skip, CfgEdgeKind::Negative);
        }
        self.block(body, &inner)?;
        if let Some(skip) = skip {
            self.block(skip, &inner)?;
        }
        self.frames.pop();
        Ok(())
    }

    fn for_each(&mut self, statement: VertexId, cont: &Continuation) -> Result<()> {
        let variable = self.child_of(statement, 0, NodeKind::VariableDeclarationStatements)?;
        let (body, skip) = self.loop_blocks(statement)?;

        self.frames.push(ScopeFrame::looping(
            NodeKind::ForEachStatement,
            cont.clone(),
            None,
        ));
        let inner = cont.leaving(NodeKind::ForEachStatement);
        self.store.add_cfg_edge(statement, variable, CfgEdgeKind::Sequential);
        self.store.add_cfg_edge(variable, body, CfgEdgeKind::Sequential);
        if let Some(skip) = skip {
            self.store.add_cfg_edge(variable, skip, CfgEdgeKind::Sequential);
        }
        self.block(body, &inner)?;
        if let Some(skip) = skip {
            self.block(skip, &inner)?;
        }
        self.frames.pop();
        Ok(())
    }

    fn for_loop(&mut self, statement: VertexId, cont: &Continuation) -> Result<()> {
        let children = self.store.children(statement);
        let mut index = 0;
        let init = if self.store.prop_bool(statement, keys::HAS_INIT) {
            index += 1;
            children.first().copied()
        } else {
            None
        };
        let condition = if self.store.prop_bool(statement, keys::HAS_CONDITION) {
            index += 1;
            children.get(index - 1).copied()
        } else {
            None
        };
        let update = if self.store.prop_bool(statement, keys::HAS_UPDATE) {
            children.get(index).copied()
        } else {
            None
        };
        let (body, skip) = self.loop_blocks(statement)?;

        self.frames.push(ScopeFrame::looping(
            NodeKind::ForLoopStatement,
            cont.clone(),
            update,
        ));
        let inner = cont.leaving(NodeKind::ForLoopStatement);

        let mut previous = statement;
        if let Some(init) = init {
            self.store.add_cfg_edge(previous, init, CfgEdgeKind::Sequential);
            previous = init;
        }
        match condition {
            Some(condition) => {
                self.store.add_cfg_edge(previous, condition, CfgEdgeKind::Sequential);
                self.store.add_cfg_edge(condition, body, CfgEdgeKind::Positive);
                if let Some(skip) = skip {
                    self.store.add_cfg_edge(condition, skip, CfgEdgeKind::Negative);
                }
            }
            None => self.store.add_cfg_edge(previous, body, CfgEdgeKind::Sequential),
        }

        match update {
            Some(update) => {
                self.block(body, &Continuation::to(update))?;
                self.flow(update, &inner, CfgEdgeKind::Sequential);
            }
            None => self.block(body, &inner)?,
        }
        if let Some(skip) = skip {
            self.block(skip, &inner)?;
        }
        self.frames.pop();
        Ok(())
    }

    fn do_loop(&mut self, statement: VertexId, cont: &Continuation) -> Result<()> {
        let body = self.child_of(statement, 0, NodeKind::BlockStatement)?;
        let condition = self.child_of(statement, 1, NodeKind::StandardCondition)?;

        self.frames.push(ScopeFrame::looping(
            NodeKind::DoLoopStatement,
            cont.clone(),
            Some(condition),
        ));
        self.store.add_cfg_edge(statement, body, CfgEdgeKind::Sequential);
        self.block(body, &Continuation::to(condition))?;
        self.flow(
            condition,
            &cont.leaving(NodeKind::DoLoopStatement),
            CfgEdgeKind::Negative,
        );
        self.frames.pop();
        Ok(())
    }

    fn switch(&mut self, statement: VertexId, cont: &Continuation) -> Result<()> {
        let children = self.store.children(statement);
        let discriminant = children
            .first()
            .copied()
            .ok_or_else(|| malformed(statement, "switch without discriminant"))?;
        let whens: Vec<VertexId> = children
            .iter()
            .copied()
            .filter(|c| self.store.label(*c).is_some_and(|l| l.is_when_block()))
            .collect();

        self.frames.push(ScopeFrame::scope(NodeKind::SwitchStatement));
        let inner = cont.leaving(NodeKind::SwitchStatement);
        self.store.add_cfg_edge(statement, discriminant, CfgEdgeKind::Sequential);
        if whens.is_empty() {
            self.flow(discriminant, &inner, CfgEdgeKind::Sequential);
        }
        for &when in &whens {
            self.store.add_cfg_edge(discriminant, when, CfgEdgeKind::Case);
        }
        for when in whens {
            let kind = self.store.label(when).unwrap_or(NodeKind::ElseWhenBlock);
            let block = self
                .store
                .children(when)
                .last()
                .copied()
                .filter(|b| self.store.is(*b, NodeKind::BlockStatement))
                .ok_or_else(|| malformed(when, "when clause without block"))?;
            self.frames.push(ScopeFrame::scope(kind));
            self.store.add_cfg_edge(when, block, CfgEdgeKind::Sequential);
            self.block(block, &inner.leaving(kind))?;
            self.frames.pop();
        }
        self.frames.pop();
        Ok(())
    }

    fn try_catch(&mut self, statement: VertexId, cont: &Continuation) -> Result<()> {
        let children = self.store.children(statement);
        let try_block = self.child_of(statement, 0, NodeKind::BlockStatement)?;
        let catches = self
            .store
            .children_with_label(statement, NodeKind::CatchBlockStatement);
        let finally = if self.store.prop_bool(statement, keys::HAS_FINALLY) {
            children
                .last()
                .copied()
                .filter(|b| *b != try_block && self.store.is(*b, NodeKind::BlockStatement))
        } else {
            None
        };

        self.frames.push(ScopeFrame::scope(NodeKind::TryCatchFinallyBlockStatement));
        let outer = cont.leaving(NodeKind::TryCatchFinallyBlockStatement);

        self.store.add_cfg_edge(statement, try_block, CfgEdgeKind::Sequential);
        for &catch in &catches {
            self.store.add_cfg_edge(statement, catch, CfgEdgeKind::Sequential);
        }

        let after_try = match finally {
            Some(finally) => Continuation::to(finally),
            None => outer.clone(),
        };
        self.block(try_block, &after_try)?;

        for catch in catches {
            let block = self.child_of(catch, 0, NodeKind::BlockStatement)?;
            self.frames.push(ScopeFrame::scope(NodeKind::CatchBlockStatement));
            self.store.add_cfg_edge(catch, block, CfgEdgeKind::Sequential);
            self.block(block, &after_try.leaving(NodeKind::CatchBlockStatement))?;
            self.frames.pop();
        }

        if let Some(finally) = finally {
            self.block(finally, &outer)?;
        }
        self.frames.pop();
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════
    // Structure helpers
    // ════════════════════════════════════════════════════════════════

    fn first_child(&self, parent: VertexId, label: NodeKind) -> Option<VertexId> {
        self.store.children_with_label(parent, label).first().copied()
    }

    fn child_of(&self, parent: VertexId, index: usize, label: NodeKind) -> Result<VertexId> {
        self.store
            .child_at(parent, index)
            .filter(|c| self.store.is(*c, label))
            .ok_or_else(|| malformed(parent, &format!("expected {} at child {}", label, index)))
    }

    /// `(body, skip block)` of a loop
    fn loop_blocks(&self, statement: VertexId) -> Result<(VertexId, Option<VertexId>)> {
        let blocks = self
            .store
            .children_with_label(statement, NodeKind::BlockStatement);
        let body = blocks
            .iter()
            .copied()
            .find(|b| !self.store.prop_bool(*b, keys::IS_IMPLICIT))
            .ok_or_else(|| malformed(statement, "loop without body"))?;
        let skip = blocks
            .iter()
            .copied()
            .find(|b| self.store.prop_bool(*b, keys::IS_IMPLICIT));
        Ok((body, skip))
    }
}

fn malformed(at: VertexId, what: &str) -> EngineError {
    EngineError::internal(format!("{} at {}", what, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::features::graph_builder::build_graph;
    use crate::features::parsing::parse_compilation_unit;
    use crate::shared::models::NodeKind::*;
    use pretty_assertions::assert_eq;

    fn graph(source: &str) -> GraphStore {
        let config = EngineConfig {
            include_standard_library: false,
            ..EngineConfig::default()
        };
        let unit = parse_compilation_unit("Test.cls", source).unwrap();
        build_graph(&config, &[unit]).unwrap()
    }

    /// First vertex with `label` on source line `line`
    fn at(store: &GraphStore, label: NodeKind, line: u32) -> VertexId {
        store
            .vertices_with_label(label)
            .iter()
            .copied()
            .find(|v| store.begin_line(*v) == line)
            .unwrap()
    }

    #[test]
    fn test_if_else_edges_and_scopes() {
        let store = graph(
            "class A {\n void m(Boolean b) {\n if (b) {\n x = 1;\n }\n y = 2;\n }\n}",
        );
        let condition = at(&store, StandardCondition, 3);
        let successors = store.cfg_successors(condition);
        assert_eq!(successors.len(), 2);
        assert_eq!(successors[0].1, CfgEdgeKind::Positive);
        assert_eq!(successors[1].1, CfgEdgeKind::Negative);
        assert!(store.prop_bool(successors[1].0, keys::IS_IMPLICIT));

        let inner = at(&store, ExpressionStatement, 4);
        let after = at(&store, ExpressionStatement, 6);
        assert_eq!(store.end_scopes(inner), vec![BlockStatement, IfElseBlockStatement]);
        assert_eq!(store.cfg_successors(inner), vec![(after, CfgEdgeKind::Sequential)]);
        assert_eq!(store.end_scopes(successors[1].0), vec![BlockStatement, IfElseBlockStatement]);
        assert_eq!(store.end_scopes(after), vec![BlockStatement]);
    }

    #[test]
    fn test_return_ends_every_open_scope() {
        let store = graph(
            "class A {\n void m() {\n while (x > 0) {\n if (b) {\n return;\n }\n }\n }\n}",
        );
        let ret = at(&store, ReturnStatement, 5);
        assert!(store.cfg_successors(ret).is_empty());
        assert_eq!(
            store.end_scopes(ret),
            vec![
                BlockStatement,
                IfElseBlockStatement,
                BlockStatement,
                WhileLoopStatement,
                BlockStatement
            ]
        );
    }

    #[test]
    fn test_break_jumps_past_the_loop() {
        let store = graph(
            "class A {\n void m() {\n for (Integer i = 0; i < 3; i++) {\n break;\n }\n done();\n }\n}",
        );
        let brk = at(&store, BreakStatement, 4);
        let after = at(&store, ExpressionStatement, 6);
        assert_eq!(store.cfg_successors(brk), vec![(after, CfgEdgeKind::Sequential)]);
        assert_eq!(store.end_scopes(brk), vec![BlockStatement, ForLoopStatement]);

        // body falls into the update, the update leaves the loop
        let update = store
            .children(at(&store, ForLoopStatement, 3))
            .into_iter()
            .find(|c| store.is(*c, ExpressionStatement))
            .unwrap();
        assert_eq!(store.cfg_successors(update), vec![(after, CfgEdgeKind::Sequential)]);
        assert_eq!(store.end_scopes(update), vec![ForLoopStatement]);
    }

    #[test]
    fn test_do_loop_condition_leaves_loop() {
        let store = graph("class A {\n void m() {\n do {\n x++;\n } while (x < 3);\n }\n}");
        let condition = at(&store, StandardCondition, 5);
        assert!(store.cfg_successors(condition).is_empty());
        assert_eq!(store.end_scopes(condition), vec![DoLoopStatement, BlockStatement]);
        let body_statement = at(&store, ExpressionStatement, 4);
        assert_eq!(store.cfg_successors(body_statement), vec![(condition, CfgEdgeKind::Sequential)]);
        assert_eq!(store.end_scopes(body_statement), vec![BlockStatement]);
    }

    #[test]
    fn test_switch_has_one_case_edge_per_when() {
        let store = graph(
            "class A {\n void m(String s) {\n switch on s {\n when 'a', 'b' { x(); }\n when 'c' { y(); }\n when else { z(); }\n }\n }\n}",
        );
        let switch = at(&store, SwitchStatement, 3);
        let discriminant = store.children(switch)[0];
        let cases = store.cfg_successors(discriminant);
        assert_eq!(cases.len(), 3);
        assert!(cases.iter().all(|(_, kind)| *kind == CfgEdgeKind::Case));
        let last = at(&store, ExpressionStatement, 6);
        assert_eq!(
            store.end_scopes(last),
            vec![BlockStatement, ElseWhenBlock, SwitchStatement, BlockStatement]
        );
    }

    #[test]
    fn test_try_catch_finally_flow() {
        let store = graph(
            "class A {\n void m() {\n try {\n a();\n } catch (Exception e) {\n b();\n } finally {\n c();\n }\n }\n}",
        );
        let try_statement = at(&store, TryCatchFinallyBlockStatement, 3);
        assert_eq!(store.cfg_successors(try_statement).len(), 2);

        let in_try = at(&store, ExpressionStatement, 4);
        let in_catch = at(&store, ExpressionStatement, 6);
        let in_finally = at(&store, ExpressionStatement, 8);
        let finally_block = store.parent(in_finally).unwrap();
        assert_eq!(store.cfg_successors(in_try), vec![(finally_block, CfgEdgeKind::Sequential)]);
        assert_eq!(store.end_scopes(in_try), vec![BlockStatement]);
        assert_eq!(store.end_scopes(in_catch), vec![BlockStatement, CatchBlockStatement]);
        assert_eq!(
            store.end_scopes(in_finally),
            vec![BlockStatement, TryCatchFinallyBlockStatement, BlockStatement]
        );
    }

    #[test]
    fn test_return_in_try_skips_finally() {
        let store = graph(
            "class A {\n void m() {\n try {\n return;\n } finally {\n c();\n }\n }\n}",
        );
        let ret = at(&store, ReturnStatement, 4);
        assert!(store.cfg_successors(ret).is_empty());
        let scopes = store.end_scopes(ret);
        assert!(scopes.contains(&TryCatchFinallyBlockStatement));
        assert_eq!(scopes.last(), Some(&BlockStatement));

        let in_finally = at(&store, ExpressionStatement, 6);
        assert!(store.cfg_predecessors(in_finally).iter().all(|(p, _)| *p != ret));
    }

    #[test]
    fn test_break_outside_loop_is_rejected() {
        let config = EngineConfig {
            include_standard_library: false,
            ..EngineConfig::default()
        };
        let unit = parse_compilation_unit("Test.cls", "class A { void m() { break; } }").unwrap();
        let err = build_graph(&config, &[unit]).unwrap_err();
        assert!(err.is_user_actionable());
    }
}
