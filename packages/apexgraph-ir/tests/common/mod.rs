//! Common test utilities for apexgraph-ir
//!
//! Shared fixtures (Apex sources, graph builders) and assertions for the
//! integration tests.

#![allow(dead_code)]

mod assertions;
mod fixtures;

pub use assertions::*;
pub use fixtures::*;
