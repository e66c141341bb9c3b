//! Path walker
//!
//! Walks one expanded path vertex by vertex, keeping a symbol table of
//! method frames, block scopes, class statics and a heap. Per vertex:
//!
//! 1. open a block scope if the vertex opens one
//! 2. `visit` (a visitor returning false prunes evaluation and sub-paths)
//! 3. run static initializers anchored at the vertex
//! 4. evaluate the vertex's expressions, walking sub-paths for resolved calls
//! 5. `after_visit`
//! 6. close the scopes the vertex ends
//!
//! Expression evaluation lives in `evaluator.rs`.

use rustc_hash::FxHashMap;
use tracing::debug;
#[cfg(feature = "trace")]
use tracing::trace;

use super::stdlib::{void, StandardLibrary};
use crate::config::EngineConfig;
use crate::errors::{EngineError, Result};
use crate::features::path_enumeration::ApexPath;
use crate::features::path_expansion::MethodResolver;
use crate::features::property_graph::{GraphStore, VertexId};
use crate::features::symbolic_execution::domain::{
    ApexValue, HeapObject, HeapRef, InitState, MethodFrame, StaticScopes, SymbolTable, ValueKind,
};
use crate::features::symbolic_execution::ports::PathVisitor;
use crate::features::vertex_model::{
    LoopVertex, MethodVertex, Named, TypeDeclVertex, Typeable, VariableDeclarationVertex, VariableVertex,
    VertexRef,
};
use crate::shared::constants::keys;
use crate::shared::models::NodeKind;
use crate::shared::utils::type_names as types;

/// Result of walking one path
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    /// Value of the entry method's `return`, if the path reached one
    pub returned: Option<ApexValue>,
    /// Path vertices visited, sub-paths included
    pub vertices_visited: usize,
    /// Heap and class statics as the walk left them
    pub symbols: SymbolTable,
}

pub struct PathWalker<'a, 'g, V: PathVisitor + ?Sized> {
    pub(super) store: &'g GraphStore,
    pub(super) resolver: &'a MethodResolver<'g>,
    pub(super) library: &'a StandardLibrary,
    pub(super) max_unroll: usize,
    pub(super) symbols: SymbolTable,
    pub(super) visitor: &'a mut V,
    /// Iterated value of each foreach statement reached
    iterables: FxHashMap<VertexId, ApexValue>,
    /// Discriminant value of each switch statement reached
    discriminants: FxHashMap<VertexId, ApexValue>,
    visited: usize,
}

impl<'a, 'g, V: PathVisitor + ?Sized> PathWalker<'a, 'g, V> {
    pub fn new(resolver: &'a MethodResolver<'g>, config: &EngineConfig, visitor: &'a mut V) -> Self {
        Self {
            store: resolver.store(),
            resolver,
            library: StandardLibrary::global(),
            max_unroll: config.max_for_loop_unroll_values,
            symbols: SymbolTable::new(),
            visitor,
            iterables: FxHashMap::default(),
            discriminants: FxHashMap::default(),
            visited: 0,
        }
    }

    pub fn with_library(mut self, library: &'a StandardLibrary) -> Self {
        self.library = library;
        self
    }

    /// Start from class statics left by an earlier walk
    pub fn with_statics(mut self, statics: StaticScopes) -> Self {
        self.symbols = SymbolTable::with_statics(statics);
        self
    }

    /// Walk `path` from its method's entry
    ///
    /// Parameters of the entry method are indeterminate. An instance method
    /// runs against a fresh instance whose fields hold their initializers.
    pub fn walk(mut self, path: &ApexPath) -> Result<WalkOutcome> {
        let method = MethodVertex(VertexRef::new(self.store, path.method()));
        let class = self.resolver.enclosing_type(method.id);
        debug!(method = %method.signature(), vertices = path.len(), "walking path");

        self.run_static_initializers(path, None)?;
        if let Some(class) = class {
            self.ensure_initialized(class)?;
        }
        let this = match class {
            Some(class) if !method.is_static() => Some(self.instantiate(class)?),
            _ => None,
        };

        let mut frame = MethodFrame::new(Some(method.id), self.class_name(class), this);
        for parameter in method.parameters() {
            frame.declare(&parameter.name, &parameter.ty, ApexValue::indeterminate(&parameter.ty));
        }
        self.symbols.push_frame(frame);
        self.visitor.enter_method(method.0, &self.symbols);
        self.run_vertices(path)?;
        let frame = self.pop_frame()?;
        self.visitor.exit_method(method.0, frame.return_value.as_ref());

        debug!(visited = self.visited, heap = self.symbols.heap.len(), "walk finished");
        Ok(WalkOutcome {
            returned: frame.return_value,
            vertices_visited: self.visited,
            symbols: self.symbols,
        })
    }

    // ════════════════════════════════════════════════════════════════
    // Frames and sub-paths
    // ════════════════════════════════════════════════════════════════

    pub(super) fn frame(&self) -> Result<&MethodFrame> {
        self.symbols
            .frame()
            .ok_or_else(|| EngineError::internal("path walk without a method frame"))
    }

    pub(super) fn frame_mut(&mut self) -> Result<&mut MethodFrame> {
        self.symbols
            .frame_mut()
            .ok_or_else(|| EngineError::internal("path walk without a method frame"))
    }

    fn pop_frame(&mut self) -> Result<MethodFrame> {
        self.symbols
            .pop_frame()
            .ok_or_else(|| EngineError::internal("method frame stack underflow"))
    }

    pub(super) fn class_name(&self, class: Option<VertexId>) -> Option<String> {
        class.map(|c| self.resolver.types().name_of(c).to_string())
    }

    /// Walk the sub-path of an invoked method; returns what it returned
    pub(super) fn invoke_path(
        &mut self,
        path: &ApexPath,
        this: Option<HeapRef>,
        args: Vec<ApexValue>,
    ) -> Result<ApexValue> {
        let method = MethodVertex(VertexRef::new(self.store, path.method()));
        let this = if method.is_static() { None } else { this };
        let class = self.class_name(self.resolver.enclosing_type(method.id));

        self.run_static_initializers(path, None)?;
        let mut frame = MethodFrame::new(Some(method.id), class, this);
        let mut args = args.into_iter();
        for parameter in method.parameters() {
            let value = match args.next() {
                Some(arg) => arg.retyped(&parameter.ty),
                None => ApexValue::indeterminate(&parameter.ty),
            };
            frame.declare(&parameter.name, &parameter.ty, value);
        }
        self.symbols.push_frame(frame);
        #[cfg(feature = "trace")]
        trace!(method = %method.signature(), depth = self.symbols.call_depth(), "entering sub-path");
        self.visitor.enter_method(method.0, &self.symbols);
        self.run_vertices(path)?;
        let frame = self.pop_frame()?;
        self.visitor.exit_method(method.0, frame.return_value.as_ref());

        let return_type = method.return_type();
        Ok(frame.return_value.unwrap_or_else(|| {
            if return_type.eq_ignore_ascii_case(types::VOID) {
                void()
            } else {
                ApexValue::indeterminate(&return_type)
            }
        }))
    }

    fn run_vertices(&mut self, path: &ApexPath) -> Result<()> {
        for vertex in path.vertices() {
            self.step(path, vertex.id)?;
        }
        Ok(())
    }

    fn step(&mut self, path: &ApexPath, id: VertexId) -> Result<()> {
        let vertex = VertexRef::new(self.store, id);
        let label = vertex.label();
        if label.opens_scope() {
            self.frame_mut()?.push_block(label);
        }
        self.visited += 1;
        #[cfg(feature = "trace")]
        trace!(vertex = %id, label = label.as_str(), "visit");

        if self.visitor.visit(vertex, &self.symbols) {
            self.run_static_initializers(path, Some(id))?;
            self.evaluate_vertex(path, vertex)?;
        } else {
            self.skip_vertex(vertex)?;
        }
        self.visitor.after_visit(vertex, &self.symbols);

        let ended = vertex.end_scopes().len();
        let frame = self.frame_mut()?;
        for _ in 0..ended {
            frame.pop_block();
        }
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════
    // Class statics and instances
    // ════════════════════════════════════════════════════════════════

    fn run_static_initializers(&mut self, path: &ApexPath, anchor: Option<VertexId>) -> Result<()> {
        for init in path.static_initializers().iter().filter(|i| i.anchor == anchor) {
            self.initialize_class(&init.class, Some(&init.path))?;
        }
        Ok(())
    }

    /// Static fields first, then the static blocks through the invoker path
    fn initialize_class(&mut self, class: &str, invoker: Option<&ApexPath>) -> Result<()> {
        if !self.symbols.statics.entry(class).begin() {
            return Ok(());
        }
        debug!(class, with_invoker = invoker.is_some(), "initializing class statics");
        if let Some(decl) = self.resolver.types().get(class) {
            self.initialize_static_fields(decl)?;
        }
        if let Some(invoker) = invoker {
            self.invoke_path(invoker, None, Vec::new())?;
        }
        self.symbols.statics.entry(class).finish();
        Ok(())
    }

    /// Initialize a class on first static access when no invoker path ran
    pub(super) fn ensure_initialized(&mut self, class: VertexId) -> Result<()> {
        let name = self.resolver.types().name_of(class).to_string();
        if self.symbols.statics.state(&name) == InitState::Uninitialized {
            self.initialize_class(&name, None)?;
        }
        Ok(())
    }

    fn initialize_static_fields(&mut self, decl: VertexId) -> Result<()> {
        let ty = TypeDeclVertex(VertexRef::new(self.store, decl));
        let class = ty.qualified_name().to_string();
        self.symbols.push_frame(MethodFrame::new(None, Some(class.clone()), None));
        for field in ty.field_declarations().into_iter().filter(|f| is_static_field(*f)) {
            let (name, declared, value) = self.field_value(field)?;
            self.symbols.statics.entry(&class).declare(&name, &declared, value);
        }
        for property in ty.properties().into_iter().filter(|p| p.prop_bool(keys::IS_STATIC)) {
            let declared = types::canonical_type(property.prop_str(keys::TYPE).unwrap_or(types::OBJECT));
            if let Some(name) = property.name() {
                self.symbols
                    .statics
                    .entry(&class)
                    .declare(name, &declared, ApexValue::null_of(&declared));
            }
        }
        self.pop_frame()?;
        Ok(())
    }

    /// Allocate an instance with every instance field initialized,
    /// superclass fields first
    pub(super) fn instantiate(&mut self, decl: VertexId) -> Result<HeapRef> {
        let name = self.resolver.types().name_of(decl).to_string();
        let r = self.symbols.heap.allocate(HeapObject::instance(&name));
        let mut hierarchy = self.resolver.types().hierarchy(decl);
        hierarchy.reverse();
        for owner in hierarchy {
            let ty = TypeDeclVertex(VertexRef::new(self.store, owner));
            if ty.is_interface() {
                continue;
            }
            self.symbols
                .push_frame(MethodFrame::new(None, Some(ty.qualified_name().to_string()), Some(r)));
            for field in ty.field_declarations().into_iter().filter(|f| !is_static_field(*f)) {
                let (field_name, _, value) = self.field_value(field)?;
                self.symbols.heap.set_field(r, &field_name, value);
            }
            for property in ty.properties().into_iter().filter(|p| !p.prop_bool(keys::IS_STATIC)) {
                let declared = types::canonical_type(property.prop_str(keys::TYPE).unwrap_or(types::OBJECT));
                if let Some(property_name) = property.name() {
                    self.symbols
                        .heap
                        .set_field(r, property_name, ApexValue::null_of(&declared));
                }
            }
            self.pop_frame()?;
        }
        Ok(r)
    }

    fn field_value(&mut self, field: VariableDeclarationVertex<'g>) -> Result<(String, String, ApexValue)> {
        let name = field.name().unwrap_or_default().to_string();
        let declared = field.declared_type().unwrap_or_else(|| types::OBJECT.to_string());
        let value = match field.initializer() {
            Some(init) => self.eval(None, init)?.retyped(&declared),
            None => ApexValue::null_of(&declared).with_origin(field.id),
        };
        Ok((name, declared, value))
    }

    // ════════════════════════════════════════════════════════════════
    // Statements
    // ════════════════════════════════════════════════════════════════

    fn evaluate_vertex(&mut self, path: &ApexPath, vertex: VertexRef<'g>) -> Result<()> {
        let sites = Some(path);
        match vertex.label() {
            NodeKind::VariableDeclarationStatements => self.declare_variables(sites, vertex)?,
            NodeKind::ExpressionStatement => {
                let is_update = vertex
                    .parent()
                    .filter(|p| p.is(NodeKind::ForLoopStatement))
                    .and_then(|p| LoopVertex(p).update())
                    .is_some_and(|u| u.id == vertex.id);
                // the update runs after the single body pass; nothing reads it
                if !is_update {
                    if let Some(expression) = vertex.child(0) {
                        self.eval(sites, expression)?;
                    }
                }
            }
            NodeKind::ReturnStatement => {
                if let Some(expression) = vertex.child(0) {
                    let value = self.eval(sites, expression)?;
                    self.frame_mut()?.return_value = Some(value);
                }
            }
            NodeKind::StandardCondition => {
                if let Some(looping) = vertex.parent().filter(|p| p.is(NodeKind::ForLoopStatement)) {
                    self.unroll_for_loop(vertex, LoopVertex(looping))?;
                }
                if let Some(expression) = vertex.child(0) {
                    self.eval(sites, expression)?;
                }
            }
            NodeKind::ForEachStatement => {
                if let Some(iterable) = LoopVertex(vertex).iterable() {
                    let value = self.eval(sites, iterable)?;
                    self.iterables.insert(vertex.id, value);
                }
            }
            NodeKind::TypeWhenBlock | NodeKind::CatchBlockStatement => self.declare_clause_variable(vertex)?,
            label if label.is_dml() || label == NodeKind::ThrowStatement => {
                for child in vertex.children().into_iter().filter(|c| c.label().is_expression()) {
                    self.eval(sites, child)?;
                }
            }
            label if label.is_expression() => {
                let value = self.eval(sites, vertex)?;
                if let Some(switch) = vertex.parent().filter(|p| p.is(NodeKind::SwitchStatement)) {
                    self.discriminants.insert(switch.id, value);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Vertex the visitor pruned: names it declares still get bound
    fn skip_vertex(&mut self, vertex: VertexRef<'g>) -> Result<()> {
        match vertex.label() {
            NodeKind::VariableDeclarationStatements => {
                for declaration in vertex.children_with_label(NodeKind::VariableDeclaration) {
                    let declaration = VariableDeclarationVertex(declaration);
                    let declared = self.declared_type(vertex, declaration);
                    let name = declaration.name().unwrap_or_default();
                    self.frame_mut()?
                        .declare(name, &declared, ApexValue::indeterminate(&declared));
                }
            }
            NodeKind::TypeWhenBlock | NodeKind::CatchBlockStatement => self.declare_clause_variable(vertex)?,
            _ => {}
        }
        Ok(())
    }

    fn declared_type(&self, statements: VertexRef<'g>, declaration: VariableDeclarationVertex<'g>) -> String {
        declaration
            .declared_type()
            .or_else(|| statements.prop_str(keys::TYPE).map(types::canonical_type))
            .unwrap_or_else(|| types::OBJECT.to_string())
    }

    fn declare_variables(&mut self, sites: Option<&ApexPath>, statements: VertexRef<'g>) -> Result<()> {
        let foreach = statements.parent().filter(|p| p.is(NodeKind::ForEachStatement));
        for declaration in statements.children_with_label(NodeKind::VariableDeclaration) {
            let declaration = VariableDeclarationVertex(declaration);
            let declared = self.declared_type(statements, declaration);
            let value = match (foreach, declaration.initializer()) {
                (Some(looping), _) => self.loop_element(looping.id, &declared),
                (None, Some(init)) => self.eval(sites, init)?.retyped(&declared),
                (None, None) => ApexValue::null_of(&declared).with_origin(declaration.id),
            };
            let name = declaration.name().unwrap_or_default();
            self.frame_mut()?.declare(name, &declared, value);
        }
        Ok(())
    }

    /// Value of a foreach variable: every element when the iterated
    /// collection is fully known
    fn loop_element(&self, looping: VertexId, element: &str) -> ApexValue {
        let contents = self
            .iterables
            .get(&looping)
            .and_then(|v| v.as_reference())
            .and_then(|r| self.symbols.heap.get(r));
        match contents {
            Some(HeapObject::List { contents, .. } | HeapObject::Set { contents, .. }) if contents.complete => {
                ApexValue::for_loop(element, contents.items.clone())
            }
            _ => ApexValue::indeterminate(element),
        }
    }

    /// `catch (T e)` and `when T t` bind a variable in their own scope
    fn declare_clause_variable(&mut self, clause: VertexRef<'g>) -> Result<()> {
        let Some(name) = clause.name() else {
            return Ok(());
        };
        let declared = types::canonical_type(clause.prop_str(keys::TYPE).unwrap_or(types::OBJECT));
        let value = match clause.label() {
            NodeKind::TypeWhenBlock => clause
                .parent()
                .and_then(|switch| self.discriminants.get(&switch.id))
                .filter(|v| !matches!(v.kind, ValueKind::Indeterminate))
                .map(|v| v.clone().retyped(&declared))
                .unwrap_or_else(|| ApexValue::indeterminate(&declared)),
            _ => ApexValue::indeterminate(&declared),
        };
        self.frame_mut()?.declare(name, &declared, value);
        Ok(())
    }

    /// Classic `for (Integer i = a; i < b; i++)`: bind `i` to every value of
    /// the single modeled pass, or to an unknown Integer
    fn unroll_for_loop(&mut self, condition: VertexRef<'g>, looping: LoopVertex<'g>) -> Result<()> {
        let Some(variable) = looping
            .init()
            .filter(|i| i.is(NodeKind::VariableDeclarationStatements))
            .and_then(|i| i.children_with_label(NodeKind::VariableDeclaration).into_iter().next())
            .and_then(|d| d.name())
        else {
            return Ok(());
        };
        let values = self.loop_counter_values(condition, looping, variable);
        let value = match values {
            Some(values) => ApexValue::for_loop(types::INTEGER, values),
            None => ApexValue::indeterminate(types::INTEGER),
        };
        self.frame_mut()?.assign(variable, value.with_origin(looping.id));
        Ok(())
    }

    fn loop_counter_values(
        &self,
        condition: VertexRef<'g>,
        looping: LoopVertex<'g>,
        variable: &str,
    ) -> Option<Vec<ApexValue>> {
        let start = self.frame().ok()?.lookup(variable)?.value.as_i64()?;
        let test = condition.child(0).filter(|c| c.is(NodeKind::BooleanExpression))?;
        let inclusive = match test.prop_str(keys::OPERATOR)? {
            "<" => false,
            "<=" => true,
            _ => return None,
        };
        test.child(0).filter(|l| is_plain_variable(*l, variable))?;
        let bound = self.constant_integer(test.child(1)?)?;
        let step = loop_step(looping.update()?.child(0)?, variable)?;

        let end = if inclusive { bound.checked_add(1)? } else { bound };
        let mut values = Vec::new();
        let mut current = start;
        while current < end {
            if values.len() >= self.max_unroll {
                return None;
            }
            values.push(ApexValue::integer(current));
            current = current.checked_add(step)?;
        }
        Some(values)
    }

    /// Integer literal, or a local currently bound to a known Integer
    fn constant_integer(&self, expression: VertexRef<'g>) -> Option<i64> {
        match expression.label() {
            NodeKind::LiteralExpression => expression.prop_str(keys::VALUE)?.parse().ok(),
            NodeKind::VariableExpression => {
                let name = expression.name()?;
                if !is_plain_variable(expression, name) {
                    return None;
                }
                self.frame().ok()?.lookup(name)?.value.as_i64()
            }
            _ => None,
        }
    }
}

fn is_static_field(field: VariableDeclarationVertex<'_>) -> bool {
    field.parent().is_some_and(|stmts| stmts.prop_bool(keys::IS_STATIC))
}

/// Unqualified read of `name`
fn is_plain_variable(expression: VertexRef<'_>, name: &str) -> bool {
    expression.is(NodeKind::VariableExpression)
        && expression.name().is_some_and(|n| n.eq_ignore_ascii_case(name))
        && VariableVertex(expression).is_unqualified()
}

/// Positive increment of `i++`, `++i` or `i += k`
fn loop_step(update: VertexRef<'_>, variable: &str) -> Option<i64> {
    match (update.label(), update.prop_str(keys::OPERATOR)?) {
        (NodeKind::PostfixExpression | NodeKind::PrefixExpression, "++") => {
            update.child(0).filter(|c| is_plain_variable(*c, variable)).map(|_| 1)
        }
        (NodeKind::AssignmentExpression, "+=") => {
            update.child(0).filter(|c| is_plain_variable(*c, variable))?;
            let step: i64 = update
                .child(1)
                .filter(|c| c.is(NodeKind::LiteralExpression))?
                .prop_str(keys::VALUE)?
                .parse()
                .ok()?;
            (step > 0).then_some(step)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::graph_builder::build_graph;
    use crate::features::parsing::parse_compilation_unit;
    use crate::features::path_expansion::{expand_paths, ExpanderConfig};
    use crate::features::symbolic_execution::domain::Heap;
    use crate::features::symbolic_execution::infrastructure::stdlib::{MethodHandler, StandardCall};
    use crate::features::symbolic_execution::ports::{NoopVisitor, SymbolProvider};

    fn config() -> EngineConfig {
        EngineConfig {
            include_standard_library: false,
            ..EngineConfig::default()
        }
    }

    fn graph(source: &str) -> GraphStore {
        let unit = parse_compilation_unit("A.cls", source).unwrap();
        build_graph(&config(), &[unit]).unwrap()
    }

    fn method(store: &GraphStore, name: &str) -> VertexId {
        store
            .vertices_with_label(NodeKind::Method)
            .iter()
            .copied()
            .find(|m| store.prop_str(*m, keys::NAME) == Some(name))
            .unwrap()
    }

    fn paths(store: &GraphStore, name: &str) -> Vec<ApexPath> {
        expand_paths(store, &config(), method(store, name), &ExpanderConfig::default()).unwrap()
    }

    fn walk_with<V: PathVisitor>(store: &GraphStore, path: &ApexPath, visitor: &mut V) -> WalkOutcome {
        let resolver = MethodResolver::new(store);
        PathWalker::new(&resolver, &config(), visitor).walk(path).unwrap()
    }

    fn returned(source: &str, name: &str) -> ApexValue {
        let store = graph(source);
        let paths = paths(&store, name);
        walk_with(&store, &paths[0], &mut NoopVisitor).returned.unwrap()
    }

    /// Records every value `watch` takes after each vertex
    struct Watcher {
        watch: &'static str,
        seen: Vec<ApexValue>,
    }

    impl PathVisitor for Watcher {
        fn after_visit(&mut self, _vertex: VertexRef<'_>, symbols: &dyn SymbolProvider) {
            if let Some(value) = symbols.lookup(self.watch) {
                self.seen.push(value);
            }
        }
    }

    #[derive(Default)]
    struct DmlRecorder {
        records: Vec<(String, Option<ApexValue>)>,
    }

    impl PathVisitor for DmlRecorder {
        fn visit_dml(&mut self, _vertex: VertexRef<'_>, symbols: &dyn SymbolProvider) -> bool {
            if let Some(value) = symbols.lookup("acc") {
                let name = value
                    .as_reference()
                    .and_then(|r| symbols.heap().field(r, "Name"))
                    .cloned();
                self.records.push((value.ty.clone(), name));
            }
            true
        }
    }

    #[test]
    fn test_constant_folding() {
        let value = returned(
            "public class A { Integer run() { Integer x = 2; Integer y = x * 3 + 1; return y; } }",
            "run",
        );
        assert_eq!(value.as_i64(), Some(7));
    }

    #[test]
    fn test_sub_path_return_value() {
        let value = returned(
            "public class A { \
                String run() { return greet('Bob'); } \
                String greet(String name) { return 'Hi ' + name; } }",
            "run",
        );
        assert_eq!(value.as_str(), Some("Hi Bob"));
    }

    #[test]
    fn test_dml_visitor_sees_record_fields() {
        let store = graph(
            "public class A { void run() { Account acc = new Account(Name = 'Acme'); insert acc; } }",
        );
        let paths = paths(&store, "run");
        let mut recorder = DmlRecorder::default();
        walk_with(&store, &paths[0], &mut recorder);

        assert_eq!(recorder.records.len(), 1);
        let (ty, name) = &recorder.records[0];
        assert_eq!(ty, "Account");
        assert_eq!(name.as_ref().and_then(|n| n.as_str()), Some("Acme"));
    }

    #[test]
    fn test_static_block_runs_after_field_initializers() {
        let value = returned(
            "public class A { \
                static Integer seed = 5; \
                static { seed = seed + 1; } \
                static Integer next() { return seed; } \
                Integer run() { return A.next(); } }",
            "run",
        );
        assert_eq!(value.as_i64(), Some(6));
    }

    #[test]
    fn test_for_loop_counter_is_unrolled() {
        let store = graph(
            "public class A { void run() { Integer last = 0; for (Integer i = 0; i < 3; i++) { last = i; } } }",
        );
        for path in paths(&store, "run") {
            let mut watcher = Watcher { watch: "i", seen: Vec::new() };
            walk_with(&store, &path, &mut watcher);
            let counters: Vec<i64> = watcher
                .seen
                .iter()
                .find_map(|v| v.loop_values())
                .unwrap()
                .iter()
                .filter_map(ApexValue::as_i64)
                .collect();
            assert_eq!(counters, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_foreach_variable_spans_known_elements() {
        let store = graph(
            "public class A { Integer run() { \
                List<Integer> xs = new List<Integer>{1, 2, 3}; \
                for (Integer x : xs) { System.debug(x); } \
                return xs.size(); } }",
        );
        let paths = paths(&store, "run");
        assert!(!paths.is_empty());
        for path in &paths {
            let mut watcher = Watcher { watch: "x", seen: Vec::new() };
            let outcome = walk_with(&store, path, &mut watcher);
            assert_eq!(outcome.returned.and_then(|v| v.as_i64()), Some(3));
            if let Some(element) = watcher.seen.first() {
                assert_eq!(element.loop_values().map(<[ApexValue]>::len), Some(3));
            }
        }
    }

    struct ClockHandler;

    impl MethodHandler for ClockHandler {
        fn name(&self) -> &'static str {
            "ClockHandler"
        }

        fn invoke(&self, call: &StandardCall<'_>, _heap: &mut Heap) -> Option<ApexValue> {
            (call.is_static_on("Clock") && call.method == "now").then(|| ApexValue::integer(42))
        }
    }

    #[test]
    fn test_custom_handler_models_unknown_calls() {
        let store = graph("public class A { Integer run() { return Clock.now(); } }");
        let paths = paths(&store, "run");
        let resolver = MethodResolver::new(&store);

        let unmodeled = PathWalker::new(&resolver, &config(), &mut NoopVisitor)
            .walk(&paths[0])
            .unwrap()
            .returned
            .unwrap();
        assert!(!unmodeled.is_determinate());

        let library = StandardLibrary::new().with_handler(Box::new(ClockHandler));
        assert_eq!(library.handler_names().last(), Some(&"ClockHandler"));
        let modeled = PathWalker::new(&resolver, &config(), &mut NoopVisitor)
            .with_library(&library)
            .walk(&paths[0])
            .unwrap()
            .returned
            .unwrap();
        assert!(modeled.is_determinate());
        assert_eq!(modeled.as_i64(), Some(42));
    }
}
