//! Conversion from XGBoost JSON types to native types.

use crate::model::{Classifier, OutputTransform};
use crate::repr::gbdt::{Forest, ForestValidationError, MutableTree, Tree};

use super::json::{GradientBooster, ModelTrees, Tree as XgbTree, XgbModel};

/// Error type for XGBoost model conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("unsupported booster '{0}': only gbtree and dart models can be served")]
    UnsupportedBooster(&'static str),
    #[error("unsupported objective '{0}': expected a classification objective")]
    UnsupportedObjective(String),
    #[error("multi-target models are not supported (num_target = {0})")]
    MultiTarget(i64),
    #[error("tree {0} has no nodes")]
    EmptyTree(usize),
    #[error("tree {tree}: '{field}' has {len} entries but the tree has {num_nodes} nodes")]
    InconsistentTree {
        tree: usize,
        field: &'static str,
        len: usize,
        num_nodes: usize,
    },
    #[error(
        "invalid node index in tree {tree}: node {node} references child {child} but tree has {num_nodes} nodes"
    )]
    InvalidNodeIndex {
        tree: usize,
        node: usize,
        child: i32,
        num_nodes: usize,
    },
    #[error("tree {tree}: node {node} splits on feature {feature}, model has {n_features} features")]
    FeatureIndexOutOfRange {
        tree: usize,
        node: usize,
        feature: i32,
        n_features: usize,
    },
    #[error("tree {tree}: node {node} uses a categorical split, which is not supported")]
    CategoricalSplit { tree: usize, node: usize },
    #[error("tree {tree} is assigned to group {group}, model has {n_groups} groups")]
    TreeGroupOutOfRange { tree: usize, group: i32, n_groups: u32 },
    #[error("'{field}' has {len} entries but the model has {n_trees} trees")]
    TreeCountMismatch {
        field: &'static str,
        len: usize,
        n_trees: usize,
    },
    #[error("model lists {len} feature names but declares {n_features} features")]
    FeatureNamesLength { len: usize, n_features: usize },
    #[error("base_score has {len} entries, expected 1 or {n_groups}")]
    BaseScoreLength { len: usize, n_groups: u32 },
    #[error("invalid forest: {0}")]
    InvalidForest(#[source] ForestValidationError),
}

/// Convert base_score from probability space to margin space.
///
/// XGBoost stores `base_score` untransformed in JSON; the logistic objectives
/// add it to the margin after a logit.
fn prob_to_margin(base_score: f32, transform: OutputTransform) -> f32 {
    match transform {
        OutputTransform::Sigmoid => {
            let p = base_score.clamp(1e-7, 1.0 - 1e-7);
            (p / (1.0 - p)).ln()
        }
        OutputTransform::Identity | OutputTransform::Softmax => base_score,
    }
}

/// Link function for each supported classification objective.
fn objective_transform(name: &str) -> Result<(&'static str, OutputTransform), ConversionError> {
    Ok(match name {
        "binary:logistic" => ("binary:logistic", OutputTransform::Sigmoid),
        "reg:logistic" => ("reg:logistic", OutputTransform::Sigmoid),
        "binary:logitraw" => ("binary:logitraw", OutputTransform::Identity),
        "binary:hinge" => ("binary:hinge", OutputTransform::Identity),
        "multi:softprob" => ("multi:softprob", OutputTransform::Softmax),
        "multi:softmax" => ("multi:softmax", OutputTransform::Softmax),
        other => return Err(ConversionError::UnsupportedObjective(other.to_string())),
    })
}

impl XgbModel {
    /// Number of features the model was trained on.
    pub fn n_features(&self) -> usize {
        self.learner.learner_model_param.n_features.max(0) as usize
    }

    /// Number of output groups: 1 for binary, `num_class` for multiclass.
    pub fn n_groups(&self) -> u32 {
        match self.learner.learner_model_param.n_class {
            n if n <= 1 => 1,
            n => n as u32,
        }
    }

    /// Returns true if this model uses the DART booster.
    pub fn is_dart(&self) -> bool {
        matches!(&self.learner.gradient_booster, GradientBooster::Dart { .. })
    }

    /// Convert into a classifier that predicts class labels.
    ///
    /// Fails for non-classification objectives, gblinear models,
    /// categorical splits and structurally invalid trees.
    pub fn to_classifier(&self) -> Result<Classifier, ConversionError> {
        let (objective, transform) = objective_transform(&self.learner.objective.name)?;

        let num_target = self.learner.learner_model_param.num_target;
        if num_target > 1 {
            return Err(ConversionError::MultiTarget(num_target));
        }

        let forest = self.to_forest(transform)?;
        let classifier =
            Classifier::new(forest, transform, self.n_features()).with_objective(objective);

        let names = &self.learner.feature_names;
        if names.is_empty() {
            return Ok(classifier);
        }
        if names.len() != self.n_features() {
            return Err(ConversionError::FeatureNamesLength {
                len: names.len(),
                n_features: self.n_features(),
            });
        }
        Ok(classifier.with_feature_names(names.clone()))
    }

    /// Convert the tree ensemble, with base score mapped into margin space.
    fn to_forest(&self, transform: OutputTransform) -> Result<Forest, ConversionError> {
        let (model_trees, weights) = match &self.learner.gradient_booster {
            GradientBooster::Gbtree { model } => (model, None),
            GradientBooster::Dart {
                gbtree,
                weight_drop,
            } => (&gbtree.model, Some(weight_drop.as_slice())),
            booster @ GradientBooster::Gblinear {} => {
                return Err(ConversionError::UnsupportedBooster(booster.name()));
            }
        };

        let n_trees = model_trees.num_trees();
        check_tree_count("tree_info", model_trees.tree_info.len(), n_trees)?;
        if let Some(weights) = weights {
            check_tree_count("weight_drop", weights.len(), n_trees)?;
        }

        let n_groups = self.n_groups();
        let base_score = self.base_margins(n_groups, transform)?;
        let mut forest = Forest::new(n_groups).with_base_score(base_score);

        for (tree_idx, xgb_tree) in model_trees.trees.iter().enumerate() {
            let group = model_trees.tree_info[tree_idx];
            if group < 0 || group as u32 >= n_groups {
                return Err(ConversionError::TreeGroupOutOfRange {
                    tree: tree_idx,
                    group,
                    n_groups,
                });
            }

            let tree = convert_tree(xgb_tree, tree_idx, self.n_features())?;
            let weight = weights.map_or(1.0, |w| w[tree_idx]);
            forest.push_weighted_tree(tree, group as u32, weight);
        }

        forest.validate().map_err(ConversionError::InvalidForest)?;
        Ok(forest)
    }

    /// One margin-space base score per group; a single stored score is
    /// shared by every group.
    fn base_margins(
        &self,
        n_groups: u32,
        transform: OutputTransform,
    ) -> Result<Vec<f32>, ConversionError> {
        let scores = &self.learner.learner_model_param.base_score;
        let margins = match scores.as_slice() {
            [score] => vec![*score; n_groups as usize],
            scores if scores.len() == n_groups as usize => scores.to_vec(),
            scores => {
                return Err(ConversionError::BaseScoreLength {
                    len: scores.len(),
                    n_groups,
                });
            }
        };
        Ok(margins
            .into_iter()
            .map(|score| prob_to_margin(score, transform))
            .collect())
    }
}

fn check_tree_count(field: &'static str, len: usize, n_trees: usize) -> Result<(), ConversionError> {
    if len == n_trees {
        Ok(())
    } else {
        Err(ConversionError::TreeCountMismatch { field, len, n_trees })
    }
}

/// Convert a single XGBoost tree to a native [`Tree`].
fn convert_tree(
    xgb_tree: &XgbTree,
    tree_idx: usize,
    n_features: usize,
) -> Result<Tree, ConversionError> {
    let num_nodes = xgb_tree.tree_param.num_nodes.max(0) as usize;
    if num_nodes == 0 {
        return Err(ConversionError::EmptyTree(tree_idx));
    }

    let lengths = [
        ("left_children", xgb_tree.left_children.len()),
        ("right_children", xgb_tree.right_children.len()),
        ("split_indices", xgb_tree.split_indices.len()),
        ("split_conditions", xgb_tree.split_conditions.len()),
        ("default_left", xgb_tree.default_left.len()),
        ("base_weights", xgb_tree.base_weights.len()),
    ];
    for (field, len) in lengths {
        if len < num_nodes {
            return Err(ConversionError::InconsistentTree {
                tree: tree_idx,
                field,
                len,
                num_nodes,
            });
        }
    }
    if let Some(&node) = xgb_tree.categories_nodes.first() {
        return Err(ConversionError::CategoricalSplit {
            tree: tree_idx,
            node: node.max(0) as usize,
        });
    }

    let mut tree = MutableTree::with_capacity(num_nodes);
    tree.init_root_with_n_nodes(num_nodes);

    for node_idx in 0..num_nodes {
        let left_child = xgb_tree.left_children[node_idx];
        let right_child = xgb_tree.right_children[node_idx];

        if left_child == -1 {
            tree.make_leaf(node_idx as u32, xgb_tree.base_weights[node_idx]);
            continue;
        }

        for child in [left_child, right_child] {
            if child < 0 || child as usize >= num_nodes {
                return Err(ConversionError::InvalidNodeIndex {
                    tree: tree_idx,
                    node: node_idx,
                    child,
                    num_nodes,
                });
            }
        }

        if xgb_tree.split_type.get(node_idx).copied().unwrap_or(0) != 0 {
            return Err(ConversionError::CategoricalSplit {
                tree: tree_idx,
                node: node_idx,
            });
        }

        let feature = xgb_tree.split_indices[node_idx];
        if feature < 0 || feature as usize >= n_features {
            return Err(ConversionError::FeatureIndexOutOfRange {
                tree: tree_idx,
                node: node_idx,
                feature,
                n_features,
            });
        }

        tree.set_numeric_split(
            node_idx as u32,
            feature as u32,
            xgb_tree.split_conditions[node_idx],
            xgb_tree.default_left[node_idx],
            left_child as u32,
            right_child as u32,
        );
    }

    Ok(tree.freeze())
}
