//! CFG synthesis over a whole graph

use tracing::debug;

use crate::errors::Result;
use crate::features::flow_graph::infrastructure::CfgSynthesizer;
use crate::features::property_graph::GraphStore;
use crate::shared::models::NodeKind;

/// Synthesize every method with a body; returns how many were synthesized
pub fn synthesize_all(store: &mut GraphStore) -> Result<usize> {
    let methods = store.vertices_with_label(NodeKind::Method).to_vec();
    let mut synthesizer = CfgSynthesizer::new(store);
    let mut count = 0;
    for method in methods {
        if synthesizer.synthesize(method)? {
            count += 1;
        }
    }
    debug!(methods = count, "CFG synthesis complete");
    Ok(count)
}
