//! Pipeline orchestration
//!
//! build → enumerate → expand → walk over one graph, sharing a path cache
//! and an expansion registry between every method it expands.

pub mod orchestrator;
pub mod result;

pub use orchestrator::AnalysisPipeline;
pub use result::{MethodExpansion, PipelineStats};
