//! Static resolution of invocation targets
//!
//! ## Responsibilities
//! - variable binding lookup (locals → parameters → members up the hierarchy → outer types)
//! - static expression typing, enough to pick overloads
//! - invocation targets: methods, constructors, property accessors
//! - classes whose static initialization an expression triggers
//!
//! ## Overload selection
//! Candidates with the invoked name and arity are scored per argument:
//! exact match 0, numeric widening 1-3, user subtype 10 per step, `SObject`
//! 300, `Object` 500; specialization and unrelated types are ineligible. A
//! null argument prefers the deepest reference type. Lowest total wins; ties
//! go to the candidate found first (subclass before superclass, then
//! declaration order).

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::features::path_expansion::infrastructure::TypeIndex;
use crate::features::property_graph::{GraphStore, VertexId};
use crate::features::vertex_model::{
    Invocable, InvocationVertex, LiteralVertex, MethodVertex, Typeable, VariableVertex, VertexRef,
};
use crate::shared::constants::{keys, literal_types, reserved};
use crate::shared::models::NodeKind;
use crate::shared::utils::type_names::{
    self as types, base_type, canonical_type, element_type, is_collection, is_primitive,
    split_generic, widening_distance,
};

const OBJECT_SCORE: u32 = 500;
const SOBJECT_SCORE: u32 = 300;
const ELEMENT_SOBJECT_SCORE: u32 = 30;
const ELEMENT_OBJECT_SCORE: u32 = 50;
const SUBTYPE_STEP: u32 = 10;
const NULL_BASE: u32 = 100;

/// Statically known type of an argument expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentType {
    Known(String),
    /// Literal `null`
    Null,
    Unknown,
}

impl ArgumentType {
    pub fn known(&self) -> Option<&str> {
        match self {
            ArgumentType::Known(t) => Some(t),
            _ => None,
        }
    }
}

/// Where a name is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableOrigin {
    Local(VertexId),
    Parameter(VertexId),
    Field { owner: VertexId, declaration: VertexId, is_static: bool },
    Property { owner: VertexId, declaration: VertexId, is_static: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    /// Canonical declared type
    pub ty: String,
    pub origin: VariableOrigin,
}

/// What a dotted receiver (`a.b.c`) denotes
#[derive(Debug, Clone, PartialEq, Eq)]
enum Receiver {
    Instance { ty: String, static_owner: Option<VertexId> },
    Static(VertexId),
    Unknown,
}

pub struct MethodResolver<'g> {
    store: &'g GraphStore,
    types: TypeIndex<'g>,
    /// Invocation targets already resolved, shared by every expander over this resolver
    resolved: RwLock<FxHashMap<VertexId, Option<VertexId>>>,
}

impl<'g> MethodResolver<'g> {
    pub fn new(store: &'g GraphStore) -> Self {
        Self {
            store,
            types: TypeIndex::new(store),
            resolved: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn store(&self) -> &'g GraphStore {
        self.store
    }

    pub fn types(&self) -> &TypeIndex<'g> {
        &self.types
    }

    fn vertex(&self, id: VertexId) -> VertexRef<'g> {
        VertexRef::new(self.store, id)
    }

    /// Type declaration enclosing `id`
    pub fn enclosing_type(&self, id: VertexId) -> Option<VertexId> {
        self.vertex(id).enclosing_type().map(|t| t.id)
    }

    // ════════════════════════════════════════════════════════════════
    // Variables and members
    // ════════════════════════════════════════════════════════════════

    /// Binding of an unqualified name as seen from `at`
    pub fn variable_binding(&self, name: &str, at: VertexId) -> Option<VariableBinding> {
        let here = self.vertex(at);
        if let Some(method) = here.enclosing_method() {
            if let Some(local) = self.local_binding(method, name, at) {
                return Some(local);
            }
            if let Some(param) = method
                .children_with_label(NodeKind::Parameter)
                .into_iter()
                .find(|p| p.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            {
                return Some(VariableBinding {
                    ty: canonical_type(param.prop_str(keys::TYPE).unwrap_or(types::OBJECT)),
                    origin: VariableOrigin::Parameter(param.id),
                });
            }
        }

        let mut scope = self.enclosing_type(at);
        while let Some(ty) = scope {
            if let Some(member) = self.member_binding(ty, name) {
                return Some(member);
            }
            scope = self.types.outer(ty);
        }
        None
    }

    /// Latest local declaration of `name` before `at` whose scope contains `at`
    fn local_binding(&self, method: MethodVertex<'g>, name: &str, at: VertexId) -> Option<VariableBinding> {
        let enclosing: Vec<VertexId> = self.store.ancestors(at);
        let mut found = None;
        for v in self.store.descendants(method.id) {
            if v == at {
                break;
            }
            let declared = match self.store.label(v) {
                Some(NodeKind::VariableDeclaration) => self.store.parent(v).and_then(|stmts| self.store.parent(stmts)),
                // catch variables and typed when-blocks scope over their own subtree
                Some(NodeKind::CatchBlockStatement) | Some(NodeKind::TypeWhenBlock) => Some(v),
                _ => continue,
            };
            let matches = self
                .store
                .prop_str(v, keys::NAME)
                .is_some_and(|n| n.eq_ignore_ascii_case(name));
            if matches && declared.is_some_and(|scope| enclosing.contains(&scope)) {
                found = Some(VariableBinding {
                    ty: canonical_type(self.store.prop_str(v, keys::TYPE).unwrap_or(types::OBJECT)),
                    origin: VariableOrigin::Local(v),
                });
            }
        }
        found
    }

    /// Field or property `name` declared on `ty` or one of its supertypes
    pub fn member_binding(&self, ty: VertexId, name: &str) -> Option<VariableBinding> {
        for owner in self.types.hierarchy(ty) {
            for member in self.store.children(owner) {
                match self.store.label(member) {
                    Some(NodeKind::FieldDeclarationStatements) => {
                        let is_static = self.store.prop_bool(member, keys::IS_STATIC);
                        for field in self.store.children_with_label(member, NodeKind::FieldDeclaration) {
                            if self.has_name(field, name) {
                                return Some(VariableBinding {
                                    ty: self.declared_type(field),
                                    origin: VariableOrigin::Field {
                                        owner,
                                        declaration: field,
                                        is_static,
                                    },
                                });
                            }
                        }
                    }
                    Some(NodeKind::PropertyDeclaration) if self.has_name(member, name) => {
                        return Some(VariableBinding {
                            ty: self.declared_type(member),
                            origin: VariableOrigin::Property {
                                owner,
                                declaration: member,
                                is_static: self.store.prop_bool(member, keys::IS_STATIC),
                            },
                        });
                    }
                    _ => {}
                }
            }
        }
        None
    }

    fn has_name(&self, id: VertexId, name: &str) -> bool {
        self.store
            .prop_str(id, keys::NAME)
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }

    fn declared_type(&self, id: VertexId) -> String {
        canonical_type(self.store.prop_str(id, keys::TYPE).unwrap_or(types::OBJECT))
    }

    /// Binding a variable expression refers to, qualified or not
    pub fn variable_expression_binding(&self, expr: VertexId) -> Option<VariableBinding> {
        let var = VariableVertex(self.vertex(expr));
        let name = var.0.name()?;
        let Some(qualifier) = var.qualifier() else {
            return self.variable_binding(name, expr);
        };
        match qualifier.label() {
            NodeKind::EmptyReferenceExpression => self.variable_binding(name, expr),
            NodeKind::ThisVariableExpression => self
                .enclosing_type(expr)
                .and_then(|ty| self.member_binding(ty, name)),
            NodeKind::SuperVariableExpression => self
                .enclosing_type(expr)
                .and_then(|ty| self.types.superclass(ty))
                .and_then(|ty| self.member_binding(ty, name)),
            NodeKind::ReferenceExpression => {
                match self.receiver(qualifier.prop_list(keys::NAMES), expr) {
                    Receiver::Instance { ty, .. } => {
                        let context = self.enclosing_type(expr);
                        self.types
                            .lookup(context, &ty)
                            .and_then(|decl| self.member_binding(decl, name))
                    }
                    Receiver::Static(decl) => self.member_binding(decl, name),
                    Receiver::Unknown => None,
                }
            }
            _ => {
                let ty = self.expression_type(qualifier.id);
                let context = self.enclosing_type(expr);
                ty.known()
                    .and_then(|t| self.types.lookup(context, t))
                    .and_then(|decl| self.member_binding(decl, name))
            }
        }
    }

    /// Interpret dotted names: a variable chain, or a type followed by static members
    fn receiver(&self, names: &[String], at: VertexId) -> Receiver {
        let Some(first) = names.first() else {
            return Receiver::Unknown;
        };
        let context = self.enclosing_type(at);

        if let Some(binding) = self.variable_binding(first, at) {
            return match self.member_chain(&binding.ty, &names[1..], context) {
                Some(ty) => Receiver::Instance { ty, static_owner: None },
                None => Receiver::Unknown,
            };
        }

        for split in (1..=names.len()).rev() {
            let Some(decl) = self.types.lookup(context, &names[..split].join(".")) else {
                continue;
            };
            if split == names.len() {
                return Receiver::Static(decl);
            }
            let Some(member) = self.member_binding(decl, &names[split]) else {
                return Receiver::Unknown;
            };
            return match self.member_chain(&member.ty, &names[split + 1..], Some(decl)) {
                Some(ty) => Receiver::Instance {
                    ty,
                    static_owner: Some(decl),
                },
                None => Receiver::Unknown,
            };
        }
        Receiver::Unknown
    }

    fn member_chain(&self, start: &str, names: &[String], context: Option<VertexId>) -> Option<String> {
        let mut ty = start.to_string();
        let mut context = context;
        for name in names {
            let decl = self.types.lookup(context, &ty)?;
            ty = self.member_binding(decl, name)?.ty;
            context = Some(decl);
        }
        Some(ty)
    }

    // ════════════════════════════════════════════════════════════════
    // Static typing
    // ════════════════════════════════════════════════════════════════

    pub fn expression_type(&self, expr: VertexId) -> ArgumentType {
        let v = self.vertex(expr);
        let known = |t: Option<String>| t.map_or(ArgumentType::Unknown, ArgumentType::Known);
        match v.label() {
            NodeKind::LiteralExpression => {
                let literal = LiteralVertex(v);
                if literal.literal_type() == literal_types::NULL {
                    ArgumentType::Null
                } else {
                    known(literal.declared_type())
                }
            }
            NodeKind::VariableExpression => known(self.variable_expression_binding(expr).map(|b| b.ty)),
            NodeKind::ThisVariableExpression => {
                known(self.enclosing_type(expr).map(|t| self.types.name_of(t).to_string()))
            }
            NodeKind::NewObjectExpression => known(InvocationVertex(v).created_type()),
            NodeKind::NewListLiteralExpression
            | NodeKind::NewSetLiteralExpression
            | NodeKind::NewMapLiteralExpression
            | NodeKind::CastExpression => known(v.prop_str(keys::TYPE).map(canonical_type)),
            NodeKind::MethodCallExpression
            | NodeKind::ThisMethodCallExpression
            | NodeKind::SuperMethodCallExpression => {
                let returned = self
                    .resolve_invocation(expr)
                    .map(|m| MethodVertex(self.vertex(m)).return_type())
                    .filter(|t| !t.eq_ignore_ascii_case(types::VOID));
                known(returned)
            }
            NodeKind::BooleanExpression | NodeKind::InstanceOfExpression => {
                ArgumentType::Known(types::BOOLEAN.to_string())
            }
            NodeKind::PrefixExpression => {
                if v.prop_str(keys::OPERATOR) == Some("!") {
                    ArgumentType::Known(types::BOOLEAN.to_string())
                } else {
                    v.child(0).map_or(ArgumentType::Unknown, |c| self.expression_type(c.id))
                }
            }
            NodeKind::PostfixExpression => {
                v.child(0).map_or(ArgumentType::Unknown, |c| self.expression_type(c.id))
            }
            NodeKind::BinaryExpression => {
                let (Some(left), Some(right)) = (v.child(0), v.child(1)) else {
                    return ArgumentType::Unknown;
                };
                binary_type(&self.expression_type(left.id), &self.expression_type(right.id))
            }
            NodeKind::TernaryExpression => {
                let branch = |i| v.child(i).map_or(ArgumentType::Unknown, |c| self.expression_type(c.id));
                match branch(1) {
                    ArgumentType::Known(t) => ArgumentType::Known(t),
                    _ => branch(2),
                }
            }
            NodeKind::AssignmentExpression => {
                v.child(0).map_or(ArgumentType::Unknown, |c| self.expression_type(c.id))
            }
            NodeKind::ArrayLoadExpression => {
                let container = v.child(0).map(|c| self.expression_type(c.id));
                known(container.and_then(|c| c.known().and_then(element_type)))
            }
            NodeKind::SoqlExpression => ArgumentType::Known(types::list_of(types::SOBJECT)),
            NodeKind::ClassRefExpression => ArgumentType::Known("System.Type".to_string()),
            _ => ArgumentType::Unknown,
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Invocation targets
    // ════════════════════════════════════════════════════════════════

    /// Method a call, constructor call, `this(...)` or `super(...)` runs
    pub fn resolve_invocation(&self, site: VertexId) -> Option<VertexId> {
        if let Some(target) = self.resolved.read().get(&site) {
            return *target;
        }
        let target = self.resolve_invocation_uncached(site);
        self.resolved.write().insert(site, target);
        target
    }

    /// Number of invocation sites resolved so far
    pub fn resolved_sites(&self) -> usize {
        self.resolved.read().len()
    }

    fn resolve_invocation_uncached(&self, site: VertexId) -> Option<VertexId> {
        let invocation = InvocationVertex(self.vertex(site));
        let context = self.enclosing_type(site);
        let arguments: Vec<ArgumentType> = invocation
            .arguments()
            .iter()
            .map(|a| self.expression_type(a.id))
            .collect();

        match invocation.label() {
            NodeKind::NewObjectExpression => {
                let created = invocation.created_type()?;
                if is_collection(&created) {
                    return None;
                }
                let decl = self.types.lookup(context, &created)?;
                self.select_constructor(decl, &arguments, context)
            }
            NodeKind::ThisMethodCallExpression => self.select_constructor(context?, &arguments, context),
            NodeKind::SuperMethodCallExpression => {
                let parent = self.types.superclass(context?)?;
                self.select_constructor(parent, &arguments, context)
            }
            NodeKind::MethodCallExpression => {
                let name = invocation.method_name()?;
                let receiver = invocation.receiver();
                let owners: Vec<VertexId> = match receiver.map(|r| r.label()) {
                    None | Some(NodeKind::EmptyReferenceExpression) => {
                        let mut owners = Vec::new();
                        let mut scope = context;
                        while let Some(ty) = scope {
                            owners.push(ty);
                            scope = self.types.outer(ty);
                        }
                        owners
                    }
                    Some(NodeKind::ThisVariableExpression) => context.into_iter().collect(),
                    Some(NodeKind::SuperVariableExpression) => {
                        context.and_then(|t| self.types.superclass(t)).into_iter().collect()
                    }
                    Some(NodeKind::ReferenceExpression) => {
                        match self.receiver(invocation.receiver_names(), site) {
                            Receiver::Instance { ty, .. } => {
                                self.types.lookup(context, &ty).into_iter().collect()
                            }
                            Receiver::Static(decl) => vec![decl],
                            Receiver::Unknown => Vec::new(),
                        }
                    }
                    Some(_) => {
                        let receiver_type = receiver.map(|r| self.expression_type(r.id));
                        receiver_type
                            .and_then(|t| t.known().and_then(|t| self.types.lookup(context, t)))
                            .into_iter()
                            .collect()
                    }
                };

                // the first owner (or enclosing type) declaring a match wins
                owners.into_iter().find_map(|owner| {
                    let candidates = self.candidates(owner, name, arguments.len());
                    self.select_overload(&candidates, &arguments, context)
                })
            }
            _ => None,
        }
    }

    fn select_constructor(
        &self,
        decl: VertexId,
        arguments: &[ArgumentType],
        context: Option<VertexId>,
    ) -> Option<VertexId> {
        let constructors: Vec<VertexId> = self
            .store
            .children_with_label(decl, NodeKind::Method)
            .into_iter()
            .filter(|m| {
                self.store.prop_bool(*m, keys::IS_CONSTRUCTOR)
                    && MethodVertex(self.vertex(*m)).arity() == arguments.len()
            })
            .collect();
        self.select_overload(&constructors, arguments, context)
    }

    /// Methods named `name` with `arity` parameters on `owner` and its supertypes
    pub fn candidates(&self, owner: VertexId, name: &str, arity: usize) -> Vec<VertexId> {
        self.types
            .hierarchy(owner)
            .into_iter()
            .flat_map(|ty| self.store.children_with_label(ty, NodeKind::Method))
            .filter(|m| {
                let method = MethodVertex(self.vertex(*m));
                !method.is_constructor()
                    && method.0.name().is_some_and(|n| n.eq_ignore_ascii_case(name))
                    && method.arity() == arity
            })
            .collect()
    }

    /// Best-fitting candidate for the argument types; `None` when none is eligible
    pub fn select_overload(
        &self,
        candidates: &[VertexId],
        arguments: &[ArgumentType],
        context: Option<VertexId>,
    ) -> Option<VertexId> {
        let mut best: Option<(u32, VertexId)> = None;
        for &candidate in candidates {
            let method = MethodVertex(self.vertex(candidate));
            let parameters = method.parameters();
            if parameters.len() != arguments.len() {
                continue;
            }
            let owner = self.enclosing_type(candidate);
            let score = parameters
                .iter()
                .zip(arguments)
                .try_fold(0u32, |total, (param, arg)| {
                    self.parameter_score(&param.ty, owner, arg, context)
                        .map(|s| total + s)
                });
            if let Some(score) = score {
                if best.map_or(true, |(b, _)| score < b) {
                    best = Some((score, candidate));
                }
            }
        }
        best.map(|(_, m)| m)
    }

    /// Cost of passing `arg` to a parameter of type `param`; `None` if ineligible
    pub fn parameter_score(
        &self,
        param: &str,
        param_context: Option<VertexId>,
        arg: &ArgumentType,
        arg_context: Option<VertexId>,
    ) -> Option<u32> {
        match arg {
            ArgumentType::Unknown => Some(0),
            ArgumentType::Null => {
                let param = canonical_type(param);
                if param == types::OBJECT {
                    return Some(OBJECT_SCORE);
                }
                let depth = self
                    .types
                    .lookup(param_context, &param)
                    .map_or(0, |decl| self.types.ancestors(decl).len() as u32);
                Some(NULL_BASE.saturating_sub(depth))
            }
            ArgumentType::Known(arg) => self.type_score(arg, arg_context, param, param_context),
        }
    }

    fn type_score(
        &self,
        arg: &str,
        arg_context: Option<VertexId>,
        param: &str,
        param_context: Option<VertexId>,
    ) -> Option<u32> {
        let arg = canonical_type(arg);
        let param = canonical_type(param);
        if arg.eq_ignore_ascii_case(&param) {
            return Some(0);
        }
        if param == types::OBJECT {
            return Some(OBJECT_SCORE);
        }
        if let Some(distance) = widening_distance(&arg, &param) {
            return Some(distance as u32);
        }

        if is_collection(&arg) || is_collection(&param) {
            let (arg_base, arg_params) = split_generic(&arg);
            let (param_base, param_params) = split_generic(&param);
            if arg_base != param_base || arg_params.len() != param_params.len() {
                return None;
            }
            // elements generalize to Object, SObject or a user supertype, never specialize
            return arg_params
                .iter()
                .zip(&param_params)
                .try_fold(0u32, |total, (a, p)| {
                    let a = canonical_type(a);
                    let p = canonical_type(p);
                    let step = if a.eq_ignore_ascii_case(&p) {
                        0
                    } else if p == types::OBJECT {
                        ELEMENT_OBJECT_SCORE
                    } else if p == types::SOBJECT {
                        self.is_record_type(&a, arg_context).then_some(ELEMENT_SOBJECT_SCORE)?
                    } else {
                        let sub = self.types.lookup(arg_context, &a)?;
                        let sup = self.types.lookup(param_context, &p)?;
                        SUBTYPE_STEP * self.types.subtype_distance(sub, sup)? as u32
                    };
                    Some(total + step)
                });
        }

        if param == types::SOBJECT {
            return self.is_record_type(&arg, arg_context).then_some(SOBJECT_SCORE);
        }
        let sub = self.types.lookup(arg_context, &arg)?;
        let sup = self.types.lookup(param_context, &param)?;
        self.types
            .subtype_distance(sub, sup)
            .map(|d| SUBTYPE_STEP * d as u32)
    }

    /// Standard or custom object type: neither primitive, collection, Object nor a user type
    fn is_record_type(&self, ty: &str, context: Option<VertexId>) -> bool {
        ty != types::OBJECT
            && !is_primitive(ty)
            && !is_collection(ty)
            && self.types.lookup(context, ty).is_none()
    }

    // ════════════════════════════════════════════════════════════════
    // Properties and static initialization
    // ════════════════════════════════════════════════════════════════

    /// Explicit getter run by reading `expr` (a variable expression)
    pub fn resolve_property_read(&self, expr: VertexId) -> Option<VertexId> {
        self.accessor(expr, reserved::getter_name)
    }

    /// Explicit setter run by an assignment whose target is a property
    pub fn resolve_property_write(&self, assignment: VertexId) -> Option<VertexId> {
        let target = self.store.child_at(assignment, 0)?;
        if !self.store.is(target, NodeKind::VariableExpression) {
            return None;
        }
        self.accessor(target, reserved::setter_name)
    }

    fn accessor(&self, expr: VertexId, accessor_name: fn(&str) -> String) -> Option<VertexId> {
        let binding = self.variable_expression_binding(expr)?;
        let VariableOrigin::Property { owner, declaration, .. } = binding.origin else {
            return None;
        };
        let wanted = accessor_name(self.store.prop_str(declaration, keys::NAME)?);
        // inside the accessor itself the name means the backing field
        if self
            .store
            .enclosing(expr, NodeKind::Method)
            .and_then(|m| self.store.prop_str(m, keys::NAME))
            .is_some_and(|n| n.eq_ignore_ascii_case(&wanted))
        {
            return None;
        }
        self.store
            .children_with_label(owner, NodeKind::Method)
            .into_iter()
            .find(|m| {
                self.has_name(*m, &wanted) && !self.store.prop_bool(*m, keys::IS_IMPLICIT)
            })
    }

    /// Synthetic static-block invoker of a class
    pub fn static_invoker(&self, ty: VertexId) -> Option<VertexId> {
        self.store
            .children_with_label(ty, NodeKind::Method)
            .into_iter()
            .find(|m| self.store.prop_str(*m, keys::NAME) == Some(reserved::STATIC_BLOCK_INVOKER))
    }

    /// Class whose static initialization `expr` triggers, when it names one
    pub fn static_reference(&self, expr: VertexId) -> Option<VertexId> {
        let v = self.vertex(expr);
        let context = self.enclosing_type(expr);
        match v.label() {
            NodeKind::NewObjectExpression => {
                let created = InvocationVertex(v).created_type()?;
                self.types.lookup(context, base_type(&created))
            }
            NodeKind::MethodCallExpression => {
                let receiver = InvocationVertex(v).receiver()?;
                self.static_owner(receiver, expr)
            }
            NodeKind::VariableExpression => {
                let qualifier = VariableVertex(v).qualifier()?;
                self.static_owner(qualifier, expr)
            }
            _ => None,
        }
    }

    fn static_owner(&self, qualifier: VertexRef<'g>, at: VertexId) -> Option<VertexId> {
        if !qualifier.is(NodeKind::ReferenceExpression) {
            return None;
        }
        match self.receiver(qualifier.prop_list(keys::NAMES), at) {
            Receiver::Static(decl) => Some(decl),
            Receiver::Instance { static_owner, .. } => static_owner,
            Receiver::Unknown => None,
        }
    }
}

fn binary_type(left: &ArgumentType, right: &ArgumentType) -> ArgumentType {
    let (Some(l), Some(r)) = (left.known(), right.known()) else {
        return ArgumentType::Unknown;
    };
    if l == types::STRING || r == types::STRING {
        return ArgumentType::Known(types::STRING.to_string());
    }
    if l == r {
        return ArgumentType::Known(l.to_string());
    }
    if widening_distance(l, r).is_some() {
        return ArgumentType::Known(r.to_string());
    }
    if widening_distance(r, l).is_some() {
        return ArgumentType::Known(l.to_string());
    }
    ArgumentType::Unknown
}
