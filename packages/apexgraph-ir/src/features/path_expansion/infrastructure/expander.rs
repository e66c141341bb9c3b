//! Worklist path expander
//!
//! Expands a seed path by splicing in the paths of every method it invokes,
//! forking once per callee path. Recursion is an explicit stack of frames,
//! one per method being expanded, so both limits are plain counters:
//!
//! - stack depth: a site nested deeper than the limit drops the partial path
//!   it belongs to (logged at debug level, not an error)
//! - expansion count: every fork is registered with the shared registry
//!   first; passing the limit aborts the whole expansion
//!
//! Within a path vertex, sites run in evaluation order. Static initializers
//! are placed before the expression that first references their class.
//! Once a vertex's sites are done the constrainers, vertex predicates and
//! excluders see the partial path, in that order.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::config::Limit;
use crate::errors::{EngineError, Result};
use crate::features::path_enumeration::{ApexPath, MethodPathCache, PathVertex};
use crate::features::path_expansion::domain::{ExpanderConfig, Site, SiteTarget};
use crate::features::path_expansion::infrastructure::{MethodResolver, PathExpansionRegistry};
use crate::features::path_expansion::ports::{Decision, ForkContext};
use crate::features::property_graph::{GraphStore, VertexId};
use crate::features::vertex_model::VertexRef;
use crate::shared::constants::keys;
use crate::shared::models::NodeKind;

/// Lower-cased names of classes whose static initialization already ran
type Initialized = BTreeSet<String>;

#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    /// Index into the path's vertices
    vertex: usize,
    /// Next site of that vertex
    site: usize,
}

struct Partial {
    path: ApexPath,
    initialized: Initialized,
    cursor: Cursor,
}

struct Frame {
    method: VertexId,
    /// Partial paths still to advance; popped from the back
    pending: Vec<Partial>,
    done: Vec<(ApexPath, Initialized)>,
    /// Parent partial waiting on this frame's child
    resume: Option<(Partial, Site)>,
}

impl Frame {
    fn new(method: VertexId, mut seeds: Vec<Partial>) -> Self {
        seeds.reverse();
        Self {
            method,
            pending: seeds,
            done: Vec::new(),
            resume: None,
        }
    }
}

enum Plan {
    Skip,
    /// Static invoker with no paths: nothing to splice, class counts as initialized
    MarkInitialized(String),
    Drop,
    Descend(Arc<Vec<ApexPath>>),
}

pub struct PathExpander<'a> {
    store: &'a GraphStore,
    resolver: &'a MethodResolver<'a>,
    cache: &'a MethodPathCache,
    registry: &'a PathExpansionRegistry,
    config: &'a ExpanderConfig,
    stack_depth: Limit,
    vertex_sites: FxHashMap<VertexId, Arc<[Site]>>,
    entry_sites: FxHashMap<VertexId, Arc<[Site]>>,
}

impl<'a> PathExpander<'a> {
    pub fn new(
        resolver: &'a MethodResolver<'a>,
        cache: &'a MethodPathCache,
        registry: &'a PathExpansionRegistry,
        config: &'a ExpanderConfig,
        stack_depth: Limit,
    ) -> Self {
        Self {
            store: resolver.store(),
            resolver,
            cache,
            registry,
            config,
            stack_depth,
            vertex_sites: FxHashMap::default(),
            entry_sites: FxHashMap::default(),
        }
    }

    /// Expand every forward path of `method`
    pub fn expand_method(&mut self, method: VertexId) -> Result<Vec<ApexPath>> {
        let seeds = self.cache.get_or_enumerate(self.store, method)?;
        let mut out = Vec::new();
        for seed in seeds.iter() {
            out.extend(self.expand(seed)?);
        }
        debug!(method = %method, seeds = seeds.len(), expanded = out.len(), "expanded method");
        Ok(out)
    }

    /// All expansions of one seed path, in deterministic order
    pub fn expand(&mut self, seed: &ApexPath) -> Result<Vec<ApexPath>> {
        let root = Partial {
            path: seed.clone(),
            initialized: Initialized::new(),
            cursor: Cursor::default(),
        };
        let mut stack = vec![Frame::new(seed.method(), vec![root])];

        loop {
            let next = match stack.last_mut() {
                Some(frame) => frame.pending.pop(),
                None => return Err(EngineError::internal("expansion stack underflow")),
            };
            if let Some(partial) = next {
                self.advance(partial, &mut stack)?;
                continue;
            }

            let Some(finished) = stack.pop() else {
                return Err(EngineError::internal("expansion stack underflow"));
            };
            let Some(parent) = stack.last_mut() else {
                return Ok(finished.done.into_iter().map(|(path, _)| path).collect());
            };
            let (partial, site) = parent
                .resume
                .take()
                .ok_or_else(|| EngineError::internal("child frame finished without a waiting parent"))?;

            let results = self.collapse(finished.done);
            if results.is_empty() {
                trace!(callee = %finished.method, "callee contributed no paths, dropping caller path");
                continue;
            }
            self.registry.register_forks(results.len() - 1)?;

            let anchor = partial
                .path
                .vertices()
                .get(partial.cursor.vertex)
                .map(|v| v.id)
                .ok_or_else(|| EngineError::internal("expansion cursor past the end of its path"))?;
            let cursor = Cursor {
                site: partial.cursor.site + 1,
                ..partial.cursor
            };
            for (sub_path, initialized) in results.into_iter().rev() {
                let sub_path = Arc::new(sub_path);
                let path = match (&site.target, site.expression) {
                    (SiteTarget::Method(_), Some(expression)) => {
                        partial.path.fork_with_invocation(anchor, expression, sub_path)
                    }
                    (SiteTarget::StaticInit { class, .. }, expression) => partial
                        .path
                        .fork_with_static_initializer(class, expression.map(|_| anchor), sub_path),
                    (SiteTarget::Method(_), None) => {
                        return Err(EngineError::internal("method site without an expression"))
                    }
                };
                parent.pending.push(Partial {
                    path,
                    initialized,
                    cursor,
                });
            }
        }
    }

    /// Move a partial path forward until it ends, is dropped, or waits on a callee frame
    fn advance(&mut self, mut partial: Partial, stack: &mut Vec<Frame>) -> Result<()> {
        let method = partial.path.method();
        loop {
            let Some(vertex) = partial.path.vertices().get(partial.cursor.vertex).copied() else {
                if let Some(frame) = stack.last_mut() {
                    frame.done.push((partial.path, partial.initialized));
                }
                return Ok(());
            };

            let sites = self.sites(method, partial.cursor.vertex, vertex.id);
            while let Some(site) = sites.get(partial.cursor.site) {
                match self.plan(site, &partial, stack)? {
                    Plan::Skip => partial.cursor.site += 1,
                    Plan::MarkInitialized(class) => {
                        partial.initialized.insert(class);
                        partial.cursor.site += 1;
                    }
                    Plan::Drop => return Ok(()),
                    Plan::Descend(callee_paths) => {
                        self.registry.register_expander();
                        let mut initialized = partial.initialized.clone();
                        if let SiteTarget::StaticInit { class, .. } = &site.target {
                            initialized.insert(class.to_lowercase());
                        }
                        let seeds = callee_paths
                            .iter()
                            .map(|path| Partial {
                                path: path.clone(),
                                initialized: initialized.clone(),
                                cursor: Cursor::default(),
                            })
                            .collect();
                        let child = Frame::new(site.callee(), seeds);
                        if let Some(frame) = stack.last_mut() {
                            frame.resume = Some((partial, site.clone()));
                        }
                        stack.push(child);
                        return Ok(());
                    }
                }
            }

            if self.annotate(&mut partial.path, vertex) == Decision::Exclude {
                trace!(vertex = %vertex.id, "path excluded");
                return Ok(());
            }
            partial.cursor = Cursor {
                vertex: partial.cursor.vertex + 1,
                site: 0,
            };
        }
    }

    fn plan(&self, site: &Site, partial: &Partial, stack: &[Frame]) -> Result<Plan> {
        let callee = site.callee();
        if stack.iter().any(|frame| frame.method == callee) {
            trace!(callee = %callee, "recursive invocation left unexpanded");
            return Ok(Plan::Skip);
        }
        if let SiteTarget::StaticInit { class, .. } = &site.target {
            if partial.initialized.contains(&class.to_lowercase()) {
                return Ok(Plan::Skip);
            }
        }
        if !self.stack_depth.allows(stack.len()) {
            debug!(
                callee = %callee,
                depth = stack.len(),
                "stack depth limit reached, dropping path"
            );
            return Ok(Plan::Drop);
        }

        let callee_paths = self.cache.get_or_enumerate(self.store, callee)?;
        if !callee_paths.is_empty() {
            return Ok(Plan::Descend(callee_paths));
        }
        Ok(match &site.target {
            SiteTarget::StaticInit { class, .. } => Plan::MarkInitialized(class.to_lowercase()),
            SiteTarget::Method(_) => Plan::Skip,
        })
    }

    /// Run constrainers and vertex predicates at `vertex`, then ask the excluders
    fn annotate(&self, path: &mut ApexPath, vertex: PathVertex) -> Decision {
        let config = self.config;
        if !config.constrainers.is_empty() {
            let ctx = ForkContext::new(self.resolver, path, vertex);
            let constraints: Vec<_> = config
                .constrainers
                .iter()
                .flat_map(|c| c.constrain(&ctx))
                .collect();
            path.metadata_mut().constraints.extend(constraints);
        }

        if !config.vertex_predicates.is_empty() {
            let v = VertexRef::new(self.store, vertex.id);
            let tracked: Vec<VertexId> = std::iter::once(v)
                .chain(v.evaluated_expressions().into_iter().filter(|e| e.id != vertex.id))
                .filter(|candidate| config.vertex_predicates.iter().any(|p| p.matches(*candidate)))
                .map(|candidate| candidate.id)
                .collect();
            path.metadata_mut().tracked.extend(tracked);
        }

        let store = self.store;
        if config
            .excluders
            .iter()
            .any(|e| e.decide(store, path) == Decision::Exclude)
        {
            Decision::Exclude
        } else {
            Decision::Keep
        }
    }

    /// Apply the collapsers in order, each keeping the first path of every key
    fn collapse(&self, mut results: Vec<(ApexPath, Initialized)>) -> Vec<(ApexPath, Initialized)> {
        for collapser in &self.config.collapsers {
            if results.len() < 2 {
                break;
            }
            let mut kept: Vec<(ApexPath, Initialized)> = Vec::with_capacity(results.len());
            let mut representative: FxHashMap<String, usize> = FxHashMap::default();
            for (path, initialized) in results {
                let Some(key) = collapser.collapse_key(self.store, &path) else {
                    kept.push((path, initialized));
                    continue;
                };
                match representative.get(&key) {
                    Some(&index) => {
                        let collapsed_by = &mut kept[index].0.metadata_mut().collapsed_by;
                        if !collapsed_by.contains(&collapser.name()) {
                            collapsed_by.push(collapser.name());
                        }
                    }
                    None => {
                        representative.insert(key, kept.len());
                        kept.push((path, initialized));
                    }
                }
            }
            results = kept;
        }
        results
    }

    // ════════════════════════════════════════════════════════════════
    // Sites
    // ════════════════════════════════════════════════════════════════

    fn sites(&mut self, method: VertexId, index: usize, vertex: VertexId) -> Arc<[Site]> {
        if !self.config.expand_method_calls {
            return Arc::from(Vec::new());
        }
        if index == 0 {
            if let Some(cached) = self.entry_sites.get(&method) {
                return Arc::clone(cached);
            }
            let mut sites: Vec<Site> = self.entry_site(method).into_iter().collect();
            sites.extend(self.vertex_sites(vertex).iter().cloned());
            let sites: Arc<[Site]> = Arc::from(sites);
            self.entry_sites.insert(method, Arc::clone(&sites));
            return sites;
        }
        self.vertex_sites(vertex)
    }

    /// Initialization of the method's own class, before its first vertex
    fn entry_site(&self, method: VertexId) -> Option<Site> {
        let class = self.resolver.enclosing_type(method)?;
        let invoker = self.resolver.static_invoker(class)?;
        Some(Site::static_init(None, self.resolver.types().name_of(class), invoker))
    }

    fn vertex_sites(&mut self, vertex: VertexId) -> Arc<[Site]> {
        if let Some(cached) = self.vertex_sites.get(&vertex) {
            return Arc::clone(cached);
        }
        let sites: Arc<[Site]> = Arc::from(self.collect_sites(vertex));
        self.vertex_sites.insert(vertex, Arc::clone(&sites));
        sites
    }

    fn collect_sites(&self, vertex: VertexId) -> Vec<Site> {
        let resolver = self.resolver;
        let mut sites: Vec<Site> = Vec::new();

        for expression in VertexRef::new(self.store, vertex).evaluated_expressions() {
            let label = expression.label();
            if matches!(
                label,
                NodeKind::NewObjectExpression | NodeKind::MethodCallExpression | NodeKind::VariableExpression
            ) {
                if let Some(site) = self.static_init_site(expression.id) {
                    let already = sites.iter().any(|s| match (&s.target, &site.target) {
                        (SiteTarget::StaticInit { class: a, .. }, SiteTarget::StaticInit { class: b, .. }) => {
                            a.eq_ignore_ascii_case(b)
                        }
                        _ => false,
                    });
                    if !already {
                        sites.push(site);
                    }
                }
            }

            let target = if label.is_invocable() {
                let target = resolver.resolve_invocation(expression.id);
                if target.is_none() {
                    trace!(
                        site = %expression.id,
                        method = expression.prop_str(keys::METHOD_NAME).unwrap_or("<init>"),
                        "unresolved invocation"
                    );
                }
                target
            } else if label == NodeKind::VariableExpression && !is_assignment_target(expression) {
                resolver.resolve_property_read(expression.id)
            } else if label == NodeKind::AssignmentExpression {
                resolver.resolve_property_write(expression.id)
            } else {
                None
            };
            if let Some(method) = target {
                sites.push(Site::call(expression.id, method));
            }
        }
        sites
    }

    fn static_init_site(&self, expression: VertexId) -> Option<Site> {
        let class = self.resolver.static_reference(expression)?;
        let invoker = self.resolver.static_invoker(class)?;
        Some(Site::static_init(
            Some(expression),
            self.resolver.types().name_of(class),
            invoker,
        ))
    }
}

/// Left side of a plain `=`; compound assignments also read the target
fn is_assignment_target(expression: VertexRef<'_>) -> bool {
    expression.parent().is_some_and(|parent| {
        parent.is(NodeKind::AssignmentExpression)
            && parent.prop_str(keys::OPERATOR) == Some("=")
            && expression.child_index() == 0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::features::graph_builder::build_graph;
    use crate::features::parsing::parse_compilation_unit;
    use crate::features::path_expansion::infrastructure::{
        ContradictoryConstraintExcluder, DmlStatementPredicate, NullCheckConstrainer,
        ReturnValueCollapser,
    };

    fn graph(source: &str) -> GraphStore {
        let config = EngineConfig {
            include_standard_library: false,
            ..EngineConfig::default()
        };
        let unit = parse_compilation_unit("A.cls", source).unwrap();
        build_graph(&config, &[unit]).unwrap()
    }

    fn method(store: &GraphStore, name: &str) -> VertexId {
        store
            .vertices_with_label(NodeKind::Method)
            .iter()
            .copied()
            .find(|m| store.prop_str(*m, keys::NAME) == Some(name))
            .unwrap()
    }

    fn expand_with(store: &GraphStore, name: &str, config: &ExpanderConfig, depth: Limit) -> Result<Vec<ApexPath>> {
        let resolver = MethodResolver::new(store);
        let cache = MethodPathCache::new();
        let registry = PathExpansionRegistry::new(Limit::UNLIMITED);
        let mut expander = PathExpander::new(&resolver, &cache, &registry, config, depth);
        expander.expand_method(method(store, name))
    }

    const BRANCHY: &str = "public class A { \
        void run() { helper(); helper(); } \
        void helper() { if (x()) { System.debug(1); } else { System.debug(2); } } \
        Boolean x() { return true; } }";

    #[test]
    fn test_forks_once_per_callee_path() {
        let store = graph(BRANCHY);
        let paths = expand_with(&store, "run", &ExpanderConfig::default(), Limit::UNLIMITED).unwrap();
        // two independent calls, two paths each
        assert_eq!(paths.len(), 4);
        for path in &paths {
            assert_eq!(path.invocations().len(), 2);
            assert_eq!(path.depth(), 2);
        }
    }

    #[test]
    fn test_no_expansion_keeps_seeds() {
        let store = graph(BRANCHY);
        let paths = expand_with(&store, "run", &ExpanderConfig::no_expansion(), Limit::UNLIMITED).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].is_expanded());
    }

    #[test]
    fn test_stack_depth_drops_deep_paths() {
        let store = graph(BRANCHY);
        // run → helper is allowed, helper → x is not
        let paths = expand_with(&store, "run", &ExpanderConfig::default(), Limit::bounded(1)).unwrap();
        assert!(paths.is_empty());
        let paths = expand_with(&store, "helper", &ExpanderConfig::default(), Limit::bounded(1)).unwrap();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_expansion_limit_aborts() {
        let store = graph(BRANCHY);
        let resolver = MethodResolver::new(&store);
        let cache = MethodPathCache::new();
        let registry = PathExpansionRegistry::new(Limit::bounded(1));
        let config = ExpanderConfig::default();
        let mut expander = PathExpander::new(&resolver, &cache, &registry, &config, Limit::UNLIMITED);
        let err = expander.expand_method(method(&store, "run")).unwrap_err();
        assert!(matches!(err, EngineError::PathExpansionLimitReached { limit: 1 }));
    }

    #[test]
    fn test_recursion_is_not_expanded() {
        let store = graph("public class A { Integer fact(Integer n) { if (n < 2) { return 1; } return n * fact(n - 1); } }");
        let paths = expand_with(&store, "fact", &ExpanderConfig::default(), Limit::UNLIMITED).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| !p.is_expanded()));
    }

    #[test]
    fn test_static_initializer_runs_once_per_path() {
        let store = graph(
            "public class A { static Integer seed; static { seed = 1; } \
             public static Integer next() { return seed; } \
             void run() { A.next(); A.next(); } }",
        );
        let paths = expand_with(&store, "run", &ExpanderConfig::default(), Limit::UNLIMITED).unwrap();
        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        // the class is initialized on entry to run, so only the entry initializer exists
        assert_eq!(path.static_initializers().len(), 1);
        assert_eq!(path.static_initializers()[0].anchor, None);
        assert_eq!(path.invocations().len(), 2);
    }

    #[test]
    fn test_plugins_collapse_exclude_and_track() {
        let store = graph(
            "public class A { static A instance; \
             static A getInstance() { if (instance == null) { instance = new A(); } return instance; } \
             void run(String s) { A a = getInstance(); if (s == null) { insert a; } if (s != null) { System.debug(s); } } }",
        );

        let plain = expand_with(&store, "run", &ExpanderConfig::default(), Limit::UNLIMITED).unwrap();
        // 2 accessor paths × 4 guard combinations
        assert_eq!(plain.len(), 8);

        let config = ExpanderConfig::builder()
            .with_collapser(ReturnValueCollapser)
            .with_constrainer(NullCheckConstrainer)
            .with_excluder(ContradictoryConstraintExcluder)
            .with_vertex_predicate(DmlStatementPredicate)
            .build();
        let paths = expand_with(&store, "run", &config, Limit::UNLIMITED).unwrap();
        // one accessor path survives; s == null and s != null exclude each other
        assert_eq!(paths.len(), 2);
        assert!(paths
            .iter()
            .all(|p| p.metadata().collapsed_by == vec!["ReturnValueCollapser"]));
        let tracked: Vec<usize> = paths.iter().map(|p| p.metadata().tracked.len()).collect();
        assert_eq!(tracked, vec![1, 0]);
    }
}
