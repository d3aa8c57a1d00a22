//! Etymology: which vocabulary entries derive from which.

pub mod graph;
pub mod tree;

pub use graph::AncestryGraph;
pub use tree::{AncestryTree, EntrySummary};
