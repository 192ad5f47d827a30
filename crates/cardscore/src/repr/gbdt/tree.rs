//! Immutable decision tree (SoA layout) and its mutable builder.
//!
//! Nodes are addressed by [`NodeId`], an index into parallel arrays. The root
//! is always node 0. Only numeric splits are represented: a sample goes left
//! when `value < threshold`, and missing values (NaN) follow `default_left`.

use ndarray::ArrayView1;

use super::NodeId;

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("node {node} references {side} child {child} but tree has {n_nodes} nodes")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    #[error("node {node} references itself as a child")]
    SelfLoop { node: NodeId },
    #[error("node {node} is reachable by more than one path")]
    DuplicateVisit { node: NodeId },
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
}

/// Immutable decision tree with scalar leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    split_indices: Box<[u32]>,
    thresholds: Box<[f32]>,
    left_children: Box<[NodeId]>,
    right_children: Box<[NodeId]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
}

impl Tree {
    /// Number of nodes (splits and leaves).
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Walk from the root to the leaf selected by `sample`.
    ///
    /// Feature indices beyond the sample length are treated as missing.
    #[inline]
    pub fn traverse_to_leaf(&self, sample: ArrayView1<'_, f32>) -> NodeId {
        let mut node: NodeId = 0;

        while !self.is_leaf(node) {
            let fvalue = sample
                .get(self.split_index(node) as usize)
                .copied()
                .unwrap_or(f32::NAN);

            node = if fvalue.is_nan() {
                if self.default_left(node) {
                    self.left_child(node)
                } else {
                    self.right_child(node)
                }
            } else if fvalue < self.split_threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }

        node
    }

    /// Leaf value reached by `sample`.
    #[inline]
    pub fn predict_row(&self, sample: ArrayView1<'_, f32>) -> f32 {
        self.leaf_value(self.traverse_to_leaf(sample))
    }

    /// Check that every node is reached exactly once from the root.
    ///
    /// Rejects out-of-bounds children, self loops, shared subtrees, cycles and
    /// orphaned nodes. Converted models are validated before use, which is what
    /// lets [`traverse_to_leaf`](Self::traverse_to_leaf) index without checks.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];

        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut visited[node as usize], true) {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            if self.is_leaf(node) {
                continue;
            }

            for (side, child) in [("left", self.left_child(node)), ("right", self.right_child(node))] {
                if child == node {
                    return Err(TreeValidationError::SelfLoop { node });
                }
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                stack.push(child);
            }
        }

        match visited.iter().position(|&seen| !seen) {
            Some(node) => Err(TreeValidationError::UnreachableNode { node: node as NodeId }),
            None => Ok(()),
        }
    }
}

/// Builder for [`Tree`].
///
/// Nodes are pre-allocated with [`init_root_with_n_nodes`](Self::init_root_with_n_nodes)
/// and then filled in any order. Unfilled nodes are leaves with value 0.
#[derive(Debug, Default)]
pub struct MutableTree {
    split_indices: Vec<u32>,
    thresholds: Vec<f32>,
    left_children: Vec<NodeId>,
    right_children: Vec<NodeId>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
}

impl MutableTree {
    pub fn with_capacity(n_nodes: usize) -> Self {
        Self {
            split_indices: Vec::with_capacity(n_nodes),
            thresholds: Vec::with_capacity(n_nodes),
            left_children: Vec::with_capacity(n_nodes),
            right_children: Vec::with_capacity(n_nodes),
            default_left: Vec::with_capacity(n_nodes),
            is_leaf: Vec::with_capacity(n_nodes),
            leaf_values: Vec::with_capacity(n_nodes),
        }
    }

    /// Reset the builder to `n_nodes` placeholder leaves.
    pub fn init_root_with_n_nodes(&mut self, n_nodes: usize) {
        self.split_indices = vec![0; n_nodes];
        self.thresholds = vec![0.0; n_nodes];
        self.left_children = vec![0; n_nodes];
        self.right_children = vec![0; n_nodes];
        self.default_left = vec![false; n_nodes];
        self.is_leaf = vec![true; n_nodes];
        self.leaf_values = vec![0.0; n_nodes];
    }

    pub fn make_leaf(&mut self, node: NodeId, value: f32) {
        let idx = node as usize;
        self.is_leaf[idx] = true;
        self.leaf_values[idx] = value;
    }

    pub fn set_numeric_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
        left: NodeId,
        right: NodeId,
    ) {
        let idx = node as usize;
        self.is_leaf[idx] = false;
        self.split_indices[idx] = feature;
        self.thresholds[idx] = threshold;
        self.default_left[idx] = default_left;
        self.left_children[idx] = left;
        self.right_children[idx] = right;
    }

    pub fn freeze(self) -> Tree {
        Tree {
            split_indices: self.split_indices.into_boxed_slice(),
            thresholds: self.thresholds.into_boxed_slice(),
            left_children: self.left_children.into_boxed_slice(),
            right_children: self.right_children.into_boxed_slice(),
            default_left: self.default_left.into_boxed_slice(),
            is_leaf: self.is_leaf.into_boxed_slice(),
            leaf_values: self.leaf_values.into_boxed_slice(),
        }
    }
}
