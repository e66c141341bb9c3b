//! Control-flow synthesis
//!
//! Adds CFG edges and end-scope annotations to every method body. The CFG
//! is acyclic: loops are connected for a single pass, `continue` in a
//! `while`/`foreach` leaves the loop.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::synthesize_all;
pub use domain::{Continuation, ScopeFrame};
pub use infrastructure::CfgSynthesizer;
