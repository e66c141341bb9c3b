//! Domain assertions for path and value checks

use apexgraph_ir::features::path_enumeration::ApexPath;
use apexgraph_ir::features::property_graph::GraphStore;
use apexgraph_ir::features::symbolic_execution::ApexValue;
use apexgraph_ir::shared::models::NodeKind;

/// Assert the number of paths, listing their lengths on failure
pub fn assert_path_count(paths: &[ApexPath], expected: usize) {
    assert_eq!(
        paths.len(),
        expected,
        "Expected {expected} paths, got {}. Lengths: {:?}",
        paths.len(),
        paths.iter().map(ApexPath::len).collect::<Vec<_>>()
    );
}

/// Assert that every path ends at a vertex with one of `labels`
pub fn assert_paths_end_with(store: &GraphStore, paths: &[ApexPath], labels: &[NodeKind]) {
    for path in paths {
        let last = path.last().and_then(|v| store.label(v));
        assert!(
            last.is_some_and(|l| labels.contains(&l)),
            "path ends with {last:?}, expected one of {labels:?}"
        );
    }
}

pub fn assert_string_value(value: Option<&ApexValue>, expected: &str) {
    let actual = value.and_then(ApexValue::as_str);
    assert_eq!(actual, Some(expected), "value was {value:?}");
}

pub fn assert_integer_value(value: Option<&ApexValue>, expected: i64) {
    let actual = value.and_then(ApexValue::as_i64);
    assert_eq!(actual, Some(expected), "value was {value:?}");
}
