//! Gradient-boosted decision tree (GBDT) representation.

/// Node identifier: an index into a tree's parallel arrays.
pub type NodeId = u32;

mod forest;
mod tree;

pub use forest::{Forest, ForestValidationError};
pub use tree::{MutableTree, Tree, TreeValidationError};
