//! Expression evaluation
//!
//! Each expression evaluates to an [`ApexValue`]. Calls with a sub-path on
//! the walked path run that sub-path; other calls go to the standard-library
//! model; anything left yields an indeterminate value of the expression's
//! static type. Every evaluated expression is reported to the visitor,
//! operands first.

use super::operators;
use super::stdlib::{
    allocate_list, allocate_set, query_result, schema_member, schema_reference, trigger_variable,
    CallReceiver, StandardCall,
};
use super::walker::PathWalker;
use crate::errors::Result;
use crate::features::path_enumeration::ApexPath;
use crate::features::path_expansion::VariableOrigin;
use crate::features::property_graph::VertexId;
use crate::features::symbolic_execution::domain::{
    ApexValue, Contents, HeapObject, HeapRef, Literal, ValueKind,
};
use crate::features::symbolic_execution::ports::PathVisitor;
use crate::features::vertex_model::{
    Invocable, InvocationVertex, LiteralVertex, VariableVertex, VertexRef,
};
use crate::shared::constants::{keys, literal_types};
use crate::shared::models::NodeKind;
use crate::shared::utils::type_names as types;

/// What a dotted name denotes
enum NameTarget {
    Value(ApexValue),
    Type(VertexId),
    Unknown,
}

/// Storage location written by an assignment or `++`/`--`
enum Place {
    Local(String),
    Field(HeapRef, String),
    Static(String, String),
    /// Collection element: container and index or key
    Element(ApexValue, ApexValue),
    Unknown,
}

/// Receiver of a method call
enum Receiver {
    Value(ApexValue),
    Type(String),
    /// Unqualified, `this.m()` or `super.m()`
    Implicit,
}

impl<'a, 'g, V: PathVisitor + ?Sized> PathWalker<'a, 'g, V> {
    /// Evaluate `expression`; `sites` is the path whose sub-paths may run
    pub(super) fn eval(&mut self, sites: Option<&ApexPath>, expression: VertexRef<'g>) -> Result<ApexValue> {
        let value = self.eval_expression(sites, expression)?;
        let value = match value.origin {
            Some(_) => value,
            None => value.with_origin(expression.id),
        };
        self.visitor.on_expression(expression, &value);
        Ok(value)
    }

    fn eval_expression(&mut self, sites: Option<&ApexPath>, e: VertexRef<'g>) -> Result<ApexValue> {
        match e.label() {
            NodeKind::LiteralExpression => Ok(literal(LiteralVertex(e))),
            NodeKind::VariableExpression => {
                if let Some(getter) = sites.and_then(|p| p.invoked_path(e.id)) {
                    let holder = self.accessor_holder(sites, e)?;
                    return self.invoke_path(getter, holder, Vec::new());
                }
                self.read_variable(sites, e)
            }
            NodeKind::ThisVariableExpression | NodeKind::SuperVariableExpression => Ok(self.this_value(e)),
            NodeKind::MethodCallExpression
            | NodeKind::ThisMethodCallExpression
            | NodeKind::SuperMethodCallExpression => self.eval_call(sites, e),
            NodeKind::NewObjectExpression => self.eval_new(sites, e),
            NodeKind::NewListLiteralExpression | NodeKind::NewSetLiteralExpression => {
                let ty = self.literal_type_of(e);
                let element = types::element_type(&ty).unwrap_or_else(|| types::OBJECT.to_string());
                let mut items = Vec::new();
                for child in e.children() {
                    items.push(self.eval(sites, child)?);
                }
                let heap = &mut self.symbols.heap;
                Ok(match e.label() {
                    NodeKind::NewSetLiteralExpression => allocate_set(heap, &element, items, true),
                    _ => allocate_list(heap, &element, items, true),
                })
            }
            NodeKind::NewMapLiteralExpression => {
                let ty = self.literal_type_of(e);
                let key = types::key_type(&ty).unwrap_or_else(|| types::OBJECT.to_string());
                let value = types::element_type(&ty).unwrap_or_else(|| types::OBJECT.to_string());
                let mut entries = Vec::new();
                for entry in e.children_with_label(NodeKind::MapEntryNode) {
                    let (Some(k), Some(v)) = (entry.child(0), entry.child(1)) else {
                        continue;
                    };
                    entries.push((self.eval(sites, k)?, self.eval(sites, v)?));
                }
                let r = self.symbols.heap.allocate(HeapObject::Map {
                    key: key.clone(),
                    value: value.clone(),
                    contents: Contents::known(entries),
                });
                Ok(ApexValue::reference(&types::map_of(&key, &value), r))
            }
            NodeKind::BinaryExpression => {
                let (Some(left), Some(right)) = (e.child(0), e.child(1)) else {
                    return Ok(self.unknown(e));
                };
                let op = e.prop_str(keys::OPERATOR).unwrap_or("+");
                let l = self.eval(sites, left)?;
                let r = self.eval(sites, right)?;
                Ok(operators::binary(op, &l, &r).unwrap_or_else(|| self.unknown(e)))
            }
            NodeKind::BooleanExpression => self.eval_boolean(sites, e),
            NodeKind::PrefixExpression | NodeKind::PostfixExpression => self.eval_unary(sites, e),
            NodeKind::AssignmentExpression => self.eval_assignment(sites, e),
            NodeKind::TernaryExpression => {
                let (Some(condition), Some(yes), Some(no)) = (e.child(0), e.child(1), e.child(2)) else {
                    return Ok(self.unknown(e));
                };
                match self.eval(sites, condition)?.as_bool() {
                    Some(true) => self.eval(sites, yes),
                    Some(false) => self.eval(sites, no),
                    None => {
                        let a = self.eval(sites, yes)?;
                        let b = self.eval(sites, no)?;
                        if a.ty == b.ty && a.kind == b.kind {
                            Ok(a)
                        } else {
                            Ok(self.unknown(e))
                        }
                    }
                }
            }
            NodeKind::CastExpression => {
                let target = types::canonical_type(e.prop_str(keys::TYPE).unwrap_or(types::OBJECT));
                match e.child(0) {
                    Some(operand) => Ok(self.eval(sites, operand)?.retyped(&target)),
                    None => Ok(ApexValue::indeterminate(&target)),
                }
            }
            NodeKind::InstanceOfExpression => {
                let Some(operand) = e.child(0) else {
                    return Ok(ApexValue::indeterminate(types::BOOLEAN));
                };
                let value = self.eval(sites, operand)?;
                let target = types::canonical_type(e.prop_str(keys::TYPE).unwrap_or(types::OBJECT));
                Ok(match self.instance_of(&value, &target, e.id) {
                    Some(result) => ApexValue::boolean(result),
                    None => ApexValue::indeterminate(types::BOOLEAN),
                })
            }
            NodeKind::ArrayLoadExpression => {
                let (Some(container), Some(index)) = (e.child(0), e.child(1)) else {
                    return Ok(self.unknown(e));
                };
                let container = self.eval(sites, container)?;
                let index = self.eval(sites, index)?;
                Ok(self
                    .element_at(&container, &index)
                    .unwrap_or_else(|| self.unknown(e)))
            }
            NodeKind::SoqlExpression => Ok(query_result(&mut self.symbols.heap, e.prop_str(keys::QUERY))),
            NodeKind::ClassRefExpression => Ok(ApexValue::indeterminate("System.Type")),
            _ => Ok(self.unknown(e)),
        }
    }

    /// Indeterminate value of the expression's static type
    fn unknown(&self, e: VertexRef<'g>) -> ApexValue {
        ApexValue::indeterminate(&self.static_type(e))
    }

    fn static_type(&self, e: VertexRef<'g>) -> String {
        self.resolver
            .expression_type(e.id)
            .known()
            .map(str::to_string)
            .unwrap_or_else(|| types::OBJECT.to_string())
    }

    fn literal_type_of(&self, e: VertexRef<'g>) -> String {
        types::canonical_type(e.prop_str(keys::TYPE).unwrap_or(types::OBJECT))
    }

    fn this_ref(&self) -> Result<Option<HeapRef>> {
        Ok(self.frame()?.this)
    }

    fn this_value(&self, e: VertexRef<'g>) -> ApexValue {
        let this = self.symbols.frame().and_then(|f| f.this);
        match this.and_then(|r| self.symbols.heap.get(r).map(|o| (r, o.type_name()))) {
            Some((r, ty)) => ApexValue::reference(&ty, r),
            None => self.unknown(e),
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Names
    // ════════════════════════════════════════════════════════════════

    /// Value of an unqualified name: local, field of `this`, static of the
    /// running class, then whatever the declaration resolver finds
    fn lookup_name(&mut self, name: &str, at: VertexRef<'g>) -> Result<Option<ApexValue>> {
        let frame = self.frame()?;
        if let Some(binding) = frame.lookup(name) {
            return Ok(Some(binding.value.clone()));
        }
        if let Some(value) = frame.this.and_then(|this| self.symbols.heap.field(this, name)) {
            return Ok(Some(value.clone()));
        }
        if let Some(binding) = frame
            .class
            .as_deref()
            .and_then(|class| self.symbols.statics.get(class))
            .and_then(|scope| scope.get(name))
        {
            return Ok(Some(binding.value.clone()));
        }

        let Some(binding) = self.resolver.variable_binding(name, at.id) else {
            return Ok(None);
        };
        let value = match binding.origin {
            VariableOrigin::Field { owner, is_static: true, .. }
            | VariableOrigin::Property { owner, is_static: true, .. } => {
                self.static_value(owner, name)?
            }
            _ => None,
        };
        Ok(Some(value.unwrap_or_else(|| ApexValue::indeterminate(&binding.ty))))
    }

    /// Static variable of `owner`, initializing the class first
    fn static_value(&mut self, owner: VertexId, name: &str) -> Result<Option<ApexValue>> {
        self.ensure_initialized(owner)?;
        let class = self.resolver.types().name_of(owner);
        Ok(self
            .symbols
            .statics
            .get(class)
            .and_then(|scope| scope.get(name))
            .map(|binding| binding.value.clone()))
    }

    /// `Type.member`: an enum constant or a static variable
    fn static_member(&mut self, decl: VertexId, name: &str) -> Result<Option<ApexValue>> {
        let ty = VertexRef::new(self.store, decl);
        if ty.is(NodeKind::UserEnum) {
            if let Some(constant) = ty.prop_list(keys::VALUES).iter().find(|v| v.eq_ignore_ascii_case(name)) {
                let enum_type = self.resolver.types().name_of(decl);
                return Ok(Some(ApexValue::new(
                    enum_type,
                    ValueKind::Determinate(Literal::Enum(constant.clone())),
                )));
            }
        }
        let Some(binding) = self.resolver.member_binding(decl, name) else {
            return Ok(None);
        };
        let value = match binding.origin {
            VariableOrigin::Field { owner, is_static: true, .. }
            | VariableOrigin::Property { owner, is_static: true, .. } => self.static_value(owner, name)?,
            _ => None,
        };
        Ok(Some(value.unwrap_or_else(|| ApexValue::indeterminate(&binding.ty))))
    }

    /// Member read on a value: schema token step or instance field
    fn member_of(&self, holder: &ApexValue, name: &str, fallback: &str) -> ApexValue {
        if let Some(token) = schema_member(holder, name) {
            return token;
        }
        if let Some(value) = holder.as_reference().and_then(|r| self.symbols.heap.field(r, name)) {
            return value.clone();
        }
        let declared = self
            .resolver
            .types()
            .get(&holder.ty)
            .and_then(|decl| self.resolver.member_binding(decl, name))
            .map(|b| b.ty);
        ApexValue::indeterminate(declared.as_deref().unwrap_or(fallback))
    }

    /// Resolve a dotted name such as `a.b.c`, `Outer.Inner.CONST`,
    /// `Trigger.new` or `Account.SObjectType`
    fn resolve_names(&mut self, names: &[String], at: VertexRef<'g>) -> Result<NameTarget> {
        let Some(first) = names.first() else {
            return Ok(NameTarget::Unknown);
        };
        if let Some(value) = self.lookup_name(first, at)? {
            let value = names[1..]
                .iter()
                .fold(value, |holder, name| self.member_of(&holder, name, types::OBJECT));
            return Ok(NameTarget::Value(value));
        }

        if first.eq_ignore_ascii_case("Trigger") && names.len() >= 2 {
            let target = at
                .enclosing_type()
                .filter(|t| t.is(NodeKind::UserTrigger))
                .and_then(|t| t.prop_str(keys::TARGET_NAME));
            if let Some(value) = target.and_then(|t| trigger_variable(&names[1], t)) {
                let value = names[2..]
                    .iter()
                    .fold(value, |holder, name| self.member_of(&holder, name, types::OBJECT));
                return Ok(NameTarget::Value(value));
            }
        }

        let context = self.resolver.enclosing_type(at.id);
        for split in (1..=names.len()).rev() {
            let type_name = names[..split].join(".");
            let Some(decl) = self.resolver.types().lookup(context, &type_name) else {
                continue;
            };
            if split == names.len() {
                return Ok(NameTarget::Type(decl));
            }
            return Ok(match self.static_member(decl, &names[split])? {
                Some(value) => NameTarget::Value(
                    names[split + 1..]
                        .iter()
                        .fold(value, |holder, name| self.member_of(&holder, name, types::OBJECT)),
                ),
                None => NameTarget::Unknown,
            });
        }

        Ok(match schema_reference(names) {
            Some(value) => NameTarget::Value(value),
            None => NameTarget::Unknown,
        })
    }

    fn read_variable(&mut self, sites: Option<&ApexPath>, e: VertexRef<'g>) -> Result<ApexValue> {
        let variable = VariableVertex(e);
        let name = e.name().unwrap_or_default();
        let Some(qualifier) = variable.qualifier() else {
            return Ok(self.lookup_name(name, e)?.unwrap_or_else(|| self.unknown(e)));
        };
        match qualifier.label() {
            NodeKind::EmptyReferenceExpression => {
                Ok(self.lookup_name(name, e)?.unwrap_or_else(|| self.unknown(e)))
            }
            NodeKind::ThisVariableExpression | NodeKind::SuperVariableExpression => {
                let field = self
                    .this_ref()?
                    .and_then(|this| self.symbols.heap.field(this, name))
                    .cloned();
                Ok(field.unwrap_or_else(|| self.unknown(e)))
            }
            NodeKind::ReferenceExpression => {
                let mut names = variable.qualifier_names().to_vec();
                names.push(name.to_string());
                Ok(match self.resolve_names(&names, e)? {
                    NameTarget::Value(value) => value,
                    NameTarget::Type(_) | NameTarget::Unknown => self.unknown(e),
                })
            }
            _ => {
                let holder = self.eval(sites, qualifier)?;
                let fallback = self.static_type(e);
                Ok(self.member_of(&holder, name, &fallback))
            }
        }
    }

    /// Object an accessor sub-path runs against
    fn accessor_holder(&mut self, sites: Option<&ApexPath>, e: VertexRef<'g>) -> Result<Option<HeapRef>> {
        let variable = VariableVertex(e);
        match variable.qualifier() {
            None => self.this_ref(),
            Some(q) => match q.label() {
                NodeKind::EmptyReferenceExpression
                | NodeKind::ThisVariableExpression
                | NodeKind::SuperVariableExpression => self.this_ref(),
                NodeKind::ReferenceExpression => {
                    let names = variable.qualifier_names().to_vec();
                    Ok(match self.resolve_names(&names, e)? {
                        NameTarget::Value(value) => value.as_reference(),
                        NameTarget::Type(_) | NameTarget::Unknown => None,
                    })
                }
                _ => Ok(self.eval(sites, q)?.as_reference()),
            },
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Calls and allocation
    // ════════════════════════════════════════════════════════════════

    fn eval_call(&mut self, sites: Option<&ApexPath>, e: VertexRef<'g>) -> Result<ApexValue> {
        let invocation = InvocationVertex(e);
        let receiver = match invocation.receiver() {
            None => Receiver::Implicit,
            Some(r) => match r.label() {
                NodeKind::EmptyReferenceExpression
                | NodeKind::ThisVariableExpression
                | NodeKind::SuperVariableExpression => Receiver::Implicit,
                NodeKind::ReferenceExpression => {
                    let names = r.prop_list(keys::NAMES);
                    match self.resolve_names(names, e)? {
                        NameTarget::Value(value) => Receiver::Value(value),
                        NameTarget::Type(decl) => Receiver::Type(self.resolver.types().name_of(decl).to_string()),
                        NameTarget::Unknown => Receiver::Type(names.join(".")),
                    }
                }
                _ => Receiver::Value(self.eval(sites, r)?),
            },
        };

        let mut args = Vec::new();
        for arg in invocation.arguments() {
            args.push(self.eval(sites, arg)?);
        }

        if let Some(callee) = sites.and_then(|p| p.invoked_path(e.id)) {
            let this = match &receiver {
                Receiver::Value(value) => value.as_reference(),
                Receiver::Implicit => self.this_ref()?,
                Receiver::Type(_) => None,
            };
            return self.invoke_path(callee, this, args);
        }

        let method = invocation.method_name().unwrap_or_default();
        let modeled = match &receiver {
            Receiver::Value(value) => {
                let call = StandardCall::new(CallReceiver::Value(value), method, &args);
                self.library.invoke(&call, &mut self.symbols.heap)
            }
            Receiver::Type(ty) => {
                let call = StandardCall::new(CallReceiver::Type(ty), method, &args);
                self.library.invoke(&call, &mut self.symbols.heap)
            }
            Receiver::Implicit => None,
        };
        Ok(modeled.unwrap_or_else(|| self.unknown(e)))
    }

    fn eval_new(&mut self, sites: Option<&ApexPath>, e: VertexRef<'g>) -> Result<ApexValue> {
        let raw = e.prop_str(keys::TYPE).unwrap_or(types::OBJECT);
        let created = types::canonical_type(raw);

        if raw.trim_end().ends_with(']') {
            let element = types::element_type(&created).unwrap_or_else(|| types::OBJECT.to_string());
            return Ok(allocate_list(&mut self.symbols.heap, &element, Vec::new(), false));
        }

        let arguments = InvocationVertex(e).arguments();
        if types::is_collection(&created) {
            let mut args = Vec::new();
            for arg in arguments {
                args.push(self.eval(sites, arg)?);
            }
            return Ok(self.new_collection(&created, args.first()));
        }

        let context = self.resolver.enclosing_type(e.id);
        if let Some(decl) = self.resolver.types().lookup(context, &created) {
            let mut args = Vec::new();
            for arg in arguments {
                args.push(self.eval(sites, arg)?);
            }
            self.ensure_initialized(decl)?;
            let instance = self.instantiate(decl)?;
            if let Some(constructor) = sites.and_then(|p| p.invoked_path(e.id)) {
                self.invoke_path(constructor, Some(instance), args)?;
            }
            let name = self.resolver.types().name_of(decl).to_string();
            return Ok(ApexValue::reference(&name, instance));
        }

        // SObject record: `new Account(Name = 'Acme')`
        let record = self.symbols.heap.allocate(HeapObject::instance(&created));
        for arg in arguments {
            let field = arg
                .is(NodeKind::AssignmentExpression)
                .then(|| arg.child(0).filter(|t| t.is(NodeKind::VariableExpression)))
                .flatten();
            match (field.and_then(|f| f.name()), arg.child(1)) {
                (Some(name), Some(value)) => {
                    let value = self.eval(sites, value)?;
                    self.symbols.heap.set_field(record, name, value);
                }
                _ => {
                    self.eval(sites, arg)?;
                }
            }
        }
        Ok(ApexValue::reference(&created, record))
    }

    fn new_collection(&mut self, ty: &str, source: Option<&ApexValue>) -> ApexValue {
        let element = types::element_type(ty).unwrap_or_else(|| types::OBJECT.to_string());
        let copied = match source {
            None => Some(Contents::known(Vec::new())),
            Some(value) => match value.as_reference().and_then(|r| self.symbols.heap.get(r)) {
                Some(HeapObject::List { contents, .. } | HeapObject::Set { contents, .. }) => Some(contents.clone()),
                _ => None,
            },
        };
        let heap = &mut self.symbols.heap;
        match types::base_type(ty) {
            types::MAP => {
                let key = types::key_type(ty).unwrap_or_else(|| types::OBJECT.to_string());
                let contents = if source.is_none() { Contents::known(Vec::new()) } else { Contents::unknown() };
                let r = heap.allocate(HeapObject::Map {
                    key: key.clone(),
                    value: element.clone(),
                    contents,
                });
                ApexValue::reference(&types::map_of(&key, &element), r)
            }
            base => {
                let contents = copied.unwrap_or_else(Contents::unknown);
                if base == types::SET {
                    allocate_set(heap, &element, contents.items, contents.complete)
                } else {
                    allocate_list(heap, &element, contents.items, contents.complete)
                }
            }
        }
    }

    fn element_at(&mut self, container: &ApexValue, index: &ApexValue) -> Option<ApexValue> {
        let args = [index.clone()];
        let call = StandardCall::new(CallReceiver::Value(container), "get", &args);
        self.library.invoke(&call, &mut self.symbols.heap)
    }

    fn instance_of(&self, value: &ApexValue, target: &str, at: VertexId) -> Option<bool> {
        if value.is_null() {
            return Some(false);
        }
        if value.is_indeterminate() {
            return None;
        }
        if types::types_equal(&value.ty, target) || target == types::OBJECT {
            return Some(true);
        }
        let context = self.resolver.enclosing_type(at);
        let index = self.resolver.types();
        match (index.lookup(context, &value.ty), index.lookup(context, target)) {
            (Some(sub), Some(sup)) => Some(index.subtype_distance(sub, sup).is_some()),
            _ => None,
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Operators and assignment
    // ════════════════════════════════════════════════════════════════

    fn eval_boolean(&mut self, sites: Option<&ApexPath>, e: VertexRef<'g>) -> Result<ApexValue> {
        let (Some(left), Some(right)) = (e.child(0), e.child(1)) else {
            return Ok(ApexValue::indeterminate(types::BOOLEAN));
        };
        let op = e.prop_str(keys::OPERATOR).unwrap_or("==");
        let l = self.eval(sites, left)?;
        if matches!(op, "&&" | "||") {
            if let Some(decided) = operators::short_circuit(op, &l) {
                return Ok(decided);
            }
            let r = self.eval(sites, right)?;
            return Ok(operators::logical(op, &l, &r).unwrap_or_else(|| ApexValue::indeterminate(types::BOOLEAN)));
        }
        let r = self.eval(sites, right)?;
        Ok(operators::compare(op, &l, &r).unwrap_or_else(|| ApexValue::indeterminate(types::BOOLEAN)))
    }

    fn eval_unary(&mut self, sites: Option<&ApexPath>, e: VertexRef<'g>) -> Result<ApexValue> {
        let Some(operand) = e.child(0) else {
            return Ok(self.unknown(e));
        };
        let op = e.prop_str(keys::OPERATOR).unwrap_or("");
        if !matches!(op, "++" | "--") {
            let value = self.eval(sites, operand)?;
            return Ok(operators::prefix(op, &value).unwrap_or_else(|| self.unknown(e)));
        }

        let place = self.place_of(sites, operand)?;
        let current = self
            .read_place(&place)
            .unwrap_or_else(|| self.unknown(operand));
        self.visitor.on_expression(operand, &current);
        let next = operators::step(op, &current).unwrap_or_else(|| ApexValue::indeterminate(&current.ty));
        self.write_place(place, next.clone());
        Ok(if e.is(NodeKind::PostfixExpression) { current } else { next })
    }

    fn eval_assignment(&mut self, sites: Option<&ApexPath>, e: VertexRef<'g>) -> Result<ApexValue> {
        let (Some(target), Some(source)) = (e.child(0), e.child(1)) else {
            return Ok(self.unknown(e));
        };
        let op = e.prop_str(keys::OPERATOR).unwrap_or("=");
        let place = self.place_of(sites, target)?;
        let assigned = self.eval(sites, source)?;
        let value = match op.strip_suffix('=').filter(|o| !o.is_empty()) {
            Some(arithmetic) => {
                let current = self
                    .read_place(&place)
                    .unwrap_or_else(|| self.unknown(target));
                operators::binary(arithmetic, &current, &assigned)
                    .unwrap_or_else(|| ApexValue::indeterminate(&current.ty))
            }
            None => assigned,
        };

        if let Some(setter) = sites.and_then(|p| p.invoked_path(e.id)) {
            let holder = match &place {
                Place::Field(r, _) => Some(*r),
                _ => self.this_ref()?,
            };
            self.invoke_path(setter, holder, vec![value.clone()])?;
        } else {
            self.write_place(place, value.clone());
        }
        Ok(value)
    }

    fn place_of(&mut self, sites: Option<&ApexPath>, target: VertexRef<'g>) -> Result<Place> {
        match target.label() {
            NodeKind::VariableExpression => {}
            NodeKind::ArrayLoadExpression => {
                let (Some(container), Some(index)) = (target.child(0), target.child(1)) else {
                    return Ok(Place::Unknown);
                };
                let container = self.eval(sites, container)?;
                let index = self.eval(sites, index)?;
                return Ok(Place::Element(container, index));
            }
            _ => return Ok(Place::Unknown),
        }

        let variable = VariableVertex(target);
        let name = target.name().unwrap_or_default().to_string();
        let qualifier = variable.qualifier();
        match qualifier.map(|q| q.label()) {
            None | Some(NodeKind::EmptyReferenceExpression) => self.unqualified_place(name, target),
            Some(NodeKind::ThisVariableExpression | NodeKind::SuperVariableExpression) => {
                Ok(self.this_ref()?.map_or(Place::Unknown, |this| Place::Field(this, name)))
            }
            Some(NodeKind::ReferenceExpression) => {
                let names = variable.qualifier_names().to_vec();
                match self.resolve_names(&names, target)? {
                    NameTarget::Value(holder) => {
                        Ok(holder.as_reference().map_or(Place::Unknown, |r| Place::Field(r, name)))
                    }
                    NameTarget::Type(decl) => self.static_place(decl, name),
                    NameTarget::Unknown => Ok(Place::Unknown),
                }
            }
            Some(_) => {
                let Some(q) = qualifier else {
                    return Ok(Place::Unknown);
                };
                let holder = self.eval(sites, q)?;
                Ok(holder.as_reference().map_or(Place::Unknown, |r| Place::Field(r, name)))
            }
        }
    }

    fn unqualified_place(&mut self, name: String, at: VertexRef<'g>) -> Result<Place> {
        let frame = self.frame()?;
        if frame.lookup(&name).is_some() {
            return Ok(Place::Local(name));
        }
        if let Some(this) = frame.this.filter(|this| self.symbols.heap.field(*this, &name).is_some()) {
            return Ok(Place::Field(this, name));
        }
        if let Some(class) = frame
            .class
            .clone()
            .filter(|class| self.symbols.statics.get(class).and_then(|s| s.get(&name)).is_some())
        {
            return Ok(Place::Static(class, name));
        }
        let this = frame.this;
        Ok(match self.resolver.variable_binding(&name, at.id).map(|b| b.origin) {
            Some(
                VariableOrigin::Field { owner, is_static: true, .. }
                | VariableOrigin::Property { owner, is_static: true, .. },
            ) => {
                self.ensure_initialized(owner)?;
                Place::Static(self.resolver.types().name_of(owner).to_string(), name)
            }
            Some(VariableOrigin::Field { .. } | VariableOrigin::Property { .. }) => {
                this.map_or(Place::Unknown, |this| Place::Field(this, name))
            }
            Some(VariableOrigin::Local(_) | VariableOrigin::Parameter(_)) => Place::Local(name),
            None => Place::Unknown,
        })
    }

    fn static_place(&mut self, decl: VertexId, name: String) -> Result<Place> {
        let owner = match self.resolver.member_binding(decl, &name).map(|b| b.origin) {
            Some(
                VariableOrigin::Field { owner, .. } | VariableOrigin::Property { owner, .. },
            ) => owner,
            _ => decl,
        };
        self.ensure_initialized(owner)?;
        Ok(Place::Static(self.resolver.types().name_of(owner).to_string(), name))
    }

    fn read_place(&mut self, place: &Place) -> Option<ApexValue> {
        match place {
            Place::Local(name) => self.symbols.frame()?.lookup(name).map(|b| b.value.clone()),
            Place::Field(r, name) => self.symbols.heap.field(*r, name).cloned(),
            Place::Static(class, name) => self
                .symbols
                .statics
                .get(class)
                .and_then(|scope| scope.get(name))
                .map(|b| b.value.clone()),
            Place::Element(container, index) => self.element_at(container, index),
            Place::Unknown => None,
        }
    }

    fn write_place(&mut self, place: Place, value: ApexValue) {
        match place {
            Place::Local(name) => {
                if let Some(frame) = self.symbols.frame_mut() {
                    frame.assign(&name, value);
                }
            }
            Place::Field(r, name) => {
                self.symbols.heap.set_field(r, &name, value);
            }
            Place::Static(class, name) => {
                let scope = self.symbols.statics.entry(&class);
                if !scope.assign(&name, value.clone()) {
                    let ty = value.ty.clone();
                    scope.declare(&name, &ty, value);
                }
            }
            Place::Element(container, index) => {
                let method = if types::base_type(&container.ty) == types::MAP { "put" } else { "set" };
                let args = [index, value];
                let call = StandardCall::new(CallReceiver::Value(&container), method, &args);
                self.library.invoke(&call, &mut self.symbols.heap);
            }
            Place::Unknown => {}
        }
    }
}

fn literal(v: LiteralVertex<'_>) -> ApexValue {
    let text = v.text();
    match v.literal_type() {
        literal_types::STRING => ApexValue::string(text),
        literal_types::INTEGER => text
            .parse()
            .map(ApexValue::integer)
            .unwrap_or_else(|_| ApexValue::indeterminate(types::INTEGER)),
        literal_types::LONG => text
            .trim_end_matches(['l', 'L'])
            .parse()
            .map(|l| ApexValue::literal(Literal::Long(l)))
            .unwrap_or_else(|_| ApexValue::indeterminate(types::LONG)),
        literal_types::DECIMAL => text
            .parse()
            .map(|d| ApexValue::literal(Literal::Decimal(d)))
            .unwrap_or_else(|_| ApexValue::indeterminate(types::DECIMAL)),
        literal_types::TRUE => ApexValue::boolean(true),
        literal_types::FALSE => ApexValue::boolean(false),
        _ => ApexValue::null(),
    }
}
