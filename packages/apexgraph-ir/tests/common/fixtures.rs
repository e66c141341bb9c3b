//! Apex source fixtures and graph builders

use apexgraph_ir::config::EngineConfig;
use apexgraph_ir::features::graph_builder::build_graph;
use apexgraph_ir::features::parsing::parse_compilation_units;
use apexgraph_ir::features::property_graph::{GraphStore, VertexId};
use apexgraph_ir::shared::constants::keys;
use apexgraph_ir::shared::models::NodeKind;
use apexgraph_ir::AnalysisPipeline;

/// Engine configuration without the standard-library stubs
pub fn test_config() -> EngineConfig {
    EngineConfig {
        include_standard_library: false,
        ..EngineConfig::default()
    }
}

/// Build a graph from `(name, source)` pairs
pub fn graph_of(sources: &[(&str, &str)]) -> GraphStore {
    graph_with(&test_config(), sources)
}

pub fn graph_with(config: &EngineConfig, sources: &[(&str, &str)]) -> GraphStore {
    let units = parse_compilation_units(sources.iter().copied()).unwrap();
    build_graph(config, &units).unwrap()
}

/// Pipeline already built from `(name, source)` pairs
pub fn pipeline_of(config: EngineConfig, sources: &[(&str, &str)]) -> AnalysisPipeline {
    let mut pipeline = AnalysisPipeline::new(config);
    pipeline.build_sources(sources.iter().copied()).unwrap();
    pipeline
}

/// Method named `name` declared in `class` (case-insensitive)
pub fn method_in(store: &GraphStore, class: &str, name: &str) -> VertexId {
    store
        .query_label(NodeKind::Method)
        .has_ci(keys::DEFINING_TYPE, class)
        .has_ci(keys::NAME, name)
        .to_vec()
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("no method {class}.{name}"))
}

/// First vertex with `label` on source line `line`
pub fn vertex_at(store: &GraphStore, label: NodeKind, line: u32) -> VertexId {
    store
        .vertices_with_label(label)
        .iter()
        .copied()
        .find(|v| store.begin_line(*v) == line)
        .unwrap_or_else(|| panic!("no {label:?} on line {line}"))
}

/// Method with `guards` sequential `if (bN) { return; }` guards, then a DML insert
pub fn fixture_guarded_insert(guards: usize) -> String {
    let params: Vec<String> = (0..guards).map(|i| format!("Boolean b{i}")).collect();
    let checks: String = (0..guards)
        .map(|i| format!("        if (b{i}) {{\n            return;\n        }}\n"))
        .collect();
    let params = if params.is_empty() {
        "Account a".to_string()
    } else {
        format!("Account a, {}", params.join(", "))
    };
    format!("public class Guarded {{\n    public void save({params}) {{\n{checks}        insert a;\n    }}\n}}\n")
}

/// Method with `branches` sequential if/else statements
pub fn fixture_sequential_branches(branches: usize) -> String {
    let body: String = (0..branches)
        .map(|i| format!("        if (x > {i}) {{ System.debug('t{i}'); }} else {{ System.debug('f{i}'); }}\n"))
        .collect();
    format!("public class Branchy {{\n    public void run(Integer x) {{\n{body}    }}\n}}\n")
}

/// `switch on` with `whens` value blocks plus `when else`
pub fn fixture_switch(whens: usize) -> String {
    let blocks: String = (0..whens)
        .map(|i| format!("            when {}, {} {{ System.debug({i}); }}\n", i * 2, i * 2 + 1))
        .collect();
    format!(
        "public class Switcher {{\n    public void run(Integer x) {{\n        switch on x {{\n{blocks}            when else {{ System.debug(-1); }}\n        }}\n    }}\n}}\n"
    )
}
