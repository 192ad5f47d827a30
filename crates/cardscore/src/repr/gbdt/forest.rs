//! Forest of decision trees with per-group accumulation.

use ndarray::{Array2, ArrayView2};

use super::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("base score has {len} entries but forest has {n_groups} groups")]
    BaseScoreLenMismatch { n_groups: u32, len: usize },
    #[error("tree {tree_idx} is assigned to group {group} but forest has {n_groups} groups")]
    TreeGroupOutOfRange {
        tree_idx: usize,
        group: u32,
        n_groups: u32,
    },
    #[error("tree {tree_idx}: {error}")]
    InvalidTree {
        tree_idx: usize,
        #[source]
        error: TreeValidationError,
    },
}

/// Additive tree ensemble.
///
/// Each tree contributes `weight * leaf` to one output group; every group
/// starts from its base score. Plain gradient boosting uses unit weights,
/// DART ensembles carry per-tree weights.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<u32>,
    tree_weights: Vec<f32>,
    n_groups: u32,
    base_score: Vec<f32>,
}

impl Forest {
    /// Create an empty forest with `n_groups` outputs and zero base score.
    pub fn new(n_groups: u32) -> Self {
        Self {
            trees: Vec::new(),
            tree_groups: Vec::new(),
            tree_weights: Vec::new(),
            n_groups,
            base_score: vec![0.0; n_groups as usize],
        }
    }

    /// Set the per-group base score (margin space).
    pub fn with_base_score(mut self, base_score: Vec<f32>) -> Self {
        debug_assert_eq!(base_score.len(), self.n_groups as usize);
        self.base_score = base_score;
        self
    }

    pub fn push_tree(&mut self, tree: Tree, group: u32) {
        self.push_weighted_tree(tree, group, 1.0);
    }

    pub fn push_weighted_tree(&mut self, tree: Tree, group: u32, weight: f32) {
        debug_assert!(group < self.n_groups, "group out of range");
        self.trees.push(tree);
        self.tree_groups.push(group);
        self.tree_weights.push(weight);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn n_groups(&self) -> u32 {
        self.n_groups
    }

    #[inline]
    pub fn base_score(&self) -> &[f32] {
        &self.base_score
    }

    pub fn tree_weights(&self) -> &[f32] {
        &self.tree_weights
    }

    /// Iterate over `(tree, group, weight)`.
    pub fn trees_with_groups(&self) -> impl Iterator<Item = (&Tree, u32, f32)> {
        self.trees
            .iter()
            .zip(&self.tree_groups)
            .zip(&self.tree_weights)
            .map(|((tree, &group), &weight)| (tree, group, weight))
    }

    /// Validate group assignments, base score and every tree.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.base_score.len() != self.n_groups as usize {
            return Err(ForestValidationError::BaseScoreLenMismatch {
                n_groups: self.n_groups,
                len: self.base_score.len(),
            });
        }

        for (tree_idx, (tree, group, _)) in self.trees_with_groups().enumerate() {
            if group >= self.n_groups {
                return Err(ForestValidationError::TreeGroupOutOfRange {
                    tree_idx,
                    group,
                    n_groups: self.n_groups,
                });
            }
            tree.validate()
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;
        }

        Ok(())
    }

    /// Raw margins for a row-major feature matrix, shape `(n_rows, n_groups)`.
    pub fn predict_margins(&self, features: ArrayView2<'_, f32>) -> Array2<f32> {
        let mut output = Array2::zeros((features.nrows(), self.n_groups as usize));
        for mut row in output.rows_mut() {
            row.iter_mut()
                .zip(&self.base_score)
                .for_each(|(out, &base)| *out = base);
        }

        for (tree, group, weight) in self.trees_with_groups() {
            for (sample, mut out) in features.rows().into_iter().zip(output.rows_mut()) {
                out[group as usize] += weight * tree.predict_row(sample);
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::gbdt::MutableTree;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn stump(feature: u32, threshold: f32, left: f32, right: f32) -> Tree {
        let mut tree = MutableTree::with_capacity(3);
        tree.init_root_with_n_nodes(3);
        tree.set_numeric_split(0, feature, threshold, true, 1, 2);
        tree.make_leaf(1, left);
        tree.make_leaf(2, right);
        tree.freeze()
    }

    #[test]
    fn trees_sum_on_top_of_base_score() {
        let mut forest = Forest::new(1).with_base_score(vec![0.5]);
        forest.push_tree(stump(0, 0.5, 1.0, 2.0), 0);
        forest.push_tree(stump(0, 0.5, 0.5, 1.5), 0);

        let margins = forest.predict_margins(array![[0.3f32], [0.7]].view());
        assert_eq!(margins, array![[2.0f32], [4.0]]);
    }

    #[test]
    fn weighted_trees_scale_contributions() {
        let mut forest = Forest::new(1);
        forest.push_weighted_tree(stump(0, 0.5, 1.0, 2.0), 0, 0.5);
        forest.push_weighted_tree(stump(0, 0.5, 4.0, 8.0), 0, 0.25);

        let margins = forest.predict_margins(array![[0.0f32], [1.0]].view());
        assert_abs_diff_eq!(margins[[0, 0]], 1.5);
        assert_abs_diff_eq!(margins[[1, 0]], 3.0);
        assert_eq!(forest.tree_weights(), &[0.5f32, 0.25]);
    }

    #[test]
    fn groups_accumulate_independently() {
        let mut forest = Forest::new(3);
        forest.push_tree(stump(0, 0.5, 1.0, -1.0), 0);
        forest.push_tree(stump(1, 0.5, 2.0, -2.0), 1);
        forest.push_tree(stump(0, 0.5, 3.0, -3.0), 2);

        let margins = forest.predict_margins(array![[0.0f32, 1.0]].view());
        assert_eq!(margins, array![[1.0f32, -2.0, 3.0]]);
        assert_eq!(forest.n_trees(), 3);
    }

    #[test]
    fn validate_checks_base_score_and_trees() {
        let forest = Forest::new(2).with_base_score(vec![0.0, 0.0]);
        assert!(forest.validate().is_ok());

        let mut forest = Forest::new(2);
        forest.base_score = vec![0.0];
        assert_eq!(
            forest.validate(),
            Err(ForestValidationError::BaseScoreLenMismatch { n_groups: 2, len: 1 })
        );

        let mut forest = Forest::new(1);
        forest.push_tree(MutableTree::default().freeze(), 0);
        assert!(matches!(
            forest.validate(),
            Err(ForestValidationError::InvalidTree { tree_idx: 0, .. })
        ));
    }
}
