//! Tree-ensemble classifier with checked feature layout.

use ndarray::Array2;

use crate::features::FeatureMatrix;
use crate::repr::gbdt::Forest;

use super::OutputTransform;

/// Errors raised while scoring a feature matrix.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("feature shape mismatch, expected: {expected}, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("feature_names mismatch at position {position}: expected '{expected}', got '{actual}'")]
    FeatureNameMismatch {
        position: usize,
        expected: String,
        actual: String,
    },
    #[error("input contains an infinite value in column '{column}' (row {row})")]
    InfiniteFeature { row: usize, column: String },
}

/// Gradient-boosted tree classifier.
///
/// Immutable once built; shared across request handlers by reference.
#[derive(Debug, Clone)]
pub struct Classifier {
    forest: Forest,
    transform: OutputTransform,
    objective: &'static str,
    n_features: usize,
    feature_names: Option<Vec<String>>,
}

impl Classifier {
    pub fn new(forest: Forest, transform: OutputTransform, n_features: usize) -> Self {
        Self {
            forest,
            transform,
            objective: "",
            n_features,
            feature_names: None,
        }
    }

    /// Attach the training objective name (informational).
    pub fn with_objective(mut self, objective: &'static str) -> Self {
        self.objective = objective;
        self
    }

    /// Require scored matrices to carry exactly these column names, in order.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn transform(&self) -> OutputTransform {
        self.transform
    }

    pub fn objective(&self) -> &'static str {
        self.objective
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of classes the labels range over.
    pub fn n_classes(&self) -> usize {
        match self.forest.n_groups() {
            1 => 2,
            n => n as usize,
        }
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Check that `columns` is the layout this model was trained on.
    pub fn check_features(&self, columns: &[&str]) -> Result<(), ModelError> {
        if columns.len() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                actual: columns.len(),
            });
        }

        if let Some(names) = &self.feature_names {
            let mismatch = names
                .iter()
                .zip(columns)
                .position(|(expected, actual)| expected != actual);
            if let Some(position) = mismatch {
                return Err(ModelError::FeatureNameMismatch {
                    position,
                    expected: names[position].clone(),
                    actual: columns[position].to_string(),
                });
            }
        }

        Ok(())
    }

    /// Transformed scores, shape `(n_rows, n_groups)`.
    pub fn predict_scores(&self, features: &FeatureMatrix) -> Result<Array2<f32>, ModelError> {
        let (scores, n_groups) = self.transformed_scores(features)?;
        let n_rows = scores.len() / n_groups;
        Ok(Array2::from_shape_vec((n_rows, n_groups), scores)
            .expect("one score per row and group"))
    }

    /// Class label per row.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<u32>, ModelError> {
        let (scores, n_groups) = self.transformed_scores(features)?;
        Ok(scores
            .chunks_exact(n_groups)
            .map(|row| self.transform.label(row))
            .collect())
    }

    /// Row-major transformed scores and the row width.
    fn transformed_scores(&self, features: &FeatureMatrix) -> Result<(Vec<f32>, usize), ModelError> {
        self.check_features(features.columns())?;

        let values = features.to_f32();
        if let Some(((row, col), _)) = values.indexed_iter().find(|(_, v)| v.is_infinite()) {
            return Err(ModelError::InfiniteFeature {
                row,
                column: features.columns()[col].to_string(),
            });
        }

        let margins = self.forest.predict_margins(values.view());
        let n_groups = margins.ncols().max(1);
        // `iter` walks in logical order whatever the memory layout
        let mut scores: Vec<f32> = margins.iter().copied().collect();
        scores
            .chunks_exact_mut(n_groups)
            .for_each(|row| self.transform.transform_inplace(row));
        Ok((scores, n_groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::gbdt::MutableTree;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn stump(feature: u32, left: f32, right: f32) -> crate::repr::gbdt::Tree {
        let mut tree = MutableTree::with_capacity(3);
        tree.init_root_with_n_nodes(3);
        tree.set_numeric_split(0, feature, 0.0, true, 1, 2);
        tree.make_leaf(1, left);
        tree.make_leaf(2, right);
        tree.freeze()
    }

    fn binary_classifier() -> Classifier {
        let mut forest = Forest::new(1);
        forest.push_tree(stump(1, -2.0, 2.0), 0);
        Classifier::new(forest, OutputTransform::Sigmoid, 2)
            .with_objective("binary:logistic")
            .with_feature_names(vec!["a".into(), "b".into()])
    }

    fn matrix(columns: Vec<&'static str>, values: Array2<f64>) -> FeatureMatrix {
        FeatureMatrix::new(columns, values)
    }

    #[test]
    fn binary_predicts_from_sigmoid_scores() {
        let clf = binary_classifier();
        let features = matrix(vec!["a", "b"], array![[0.0, -1.0], [0.0, 1.0]]);

        let scores = clf.predict_scores(&features).unwrap();
        assert_abs_diff_eq!(scores[[0, 0]], 1.0 / (1.0 + 2.0f32.exp()), epsilon = 1e-6);
        assert_eq!(clf.predict(&features).unwrap(), vec![0, 1]);
        assert_eq!(clf.n_classes(), 2);
        assert_eq!(clf.objective(), "binary:logistic");
    }

    #[test]
    fn rejects_wrong_feature_layout() {
        let clf = binary_classifier();

        let too_few = matrix(vec!["a"], array![[0.0]]);
        assert_eq!(
            clf.predict(&too_few),
            Err(ModelError::FeatureCountMismatch { expected: 2, actual: 1 })
        );

        let swapped = matrix(vec!["b", "a"], array![[0.0, 0.0]]);
        assert!(matches!(
            clf.predict(&swapped),
            Err(ModelError::FeatureNameMismatch { position: 0, .. })
        ));
    }

    #[test]
    fn rejects_infinite_inputs() {
        let clf = binary_classifier();
        let features = matrix(vec!["a", "b"], array![[0.0, f64::INFINITY]]);
        assert_eq!(
            clf.predict(&features),
            Err(ModelError::InfiniteFeature { row: 0, column: "b".into() })
        );
    }

    #[test]
    fn multiclass_takes_argmax() {
        let mut forest = Forest::new(3);
        forest.push_tree(stump(0, 1.0, 0.0), 0);
        forest.push_tree(stump(0, 0.0, 0.5), 1);
        forest.push_tree(stump(0, 0.5, 2.0), 2);
        let clf = Classifier::new(forest, OutputTransform::Softmax, 1);

        let features = matrix(vec!["x"], array![[-1.0], [1.0]]);
        assert_eq!(clf.predict(&features).unwrap(), vec![0, 2]);
        assert_eq!(clf.n_classes(), 3);
        assert!(clf.feature_names().is_none());
    }

    #[test]
    fn every_multiclass_row_is_normalised() {
        let mut forest = Forest::new(3);
        forest.push_tree(stump(0, 1.0, 0.0), 0);
        forest.push_tree(stump(0, 0.0, 0.5), 1);
        forest.push_tree(stump(0, 0.5, 2.0), 2);
        let clf = Classifier::new(forest, OutputTransform::Softmax, 1);

        let features = matrix(vec!["x"], array![[-1.0], [1.0], [-2.0]]);
        let scores = clf.predict_scores(&features).unwrap();
        assert_eq!(scores.dim(), (3, 3));
        for row in scores.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-6);
        }
        assert_eq!(clf.predict(&features).unwrap(), vec![0, 2, 0]);
    }
}
