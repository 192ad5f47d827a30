//! Feature pipeline: raw applicant records to the scaled matrix the model
//! was trained on.
//!
//! ```text
//! RawRecord[] --engineer--> FeatureMatrix (ENGINEERED_COLUMNS)
//!             --scale_and_assemble--> FeatureMatrix (MODEL_FEATURE_ORDER)
//! ```

use ndarray::{Array2, ArrayView1, ArrayView2, Axis, concatenate};

mod assemble;
mod engineer;
mod record;
mod scaler;

pub use assemble::scale_and_assemble;
pub use engineer::engineer;
pub use record::{Gender, Ownership, RawRecord};
pub use scaler::{FittedScaler, MinMaxScaler, ScalerError, StandardScaler};

/// Column order the classifier was trained on.
pub const MODEL_FEATURE_ORDER: [&str; 12] = [
    "Num_Children",
    "Income",
    "Income_per_Child",
    "Total_Owned_Assets",
    "Income_Interaction",
    "Income_Stability_Score",
    "Gender",
    "Own_Housing",
    "Own_Car",
    "Financial_Stability",
    "Large_Family",
    "Gender_Family_Interaction",
];

/// Columns excluded from scaling.
pub const BINARY_FEATURES: [&str; 6] = [
    "Gender",
    "Own_Housing",
    "Own_Car",
    "Financial_Stability",
    "Large_Family",
    "Gender_Family_Interaction",
];

/// Column order produced by [`engineer`]: raw inputs first, then derived
/// columns in the order they are computed.
pub const ENGINEERED_COLUMNS: [&str; 12] = [
    "Num_Children",
    "Gender",
    "Income",
    "Own_Car",
    "Own_Housing",
    "Income_per_Child",
    "Financial_Stability",
    "Large_Family",
    "Total_Owned_Assets",
    "Gender_Family_Interaction",
    "Income_Interaction",
    "Income_Stability_Score",
];

/// Errors raised while preparing the model input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreprocessError {
    #[error("unknown feature column '{0}'")]
    UnknownColumn(String),
    #[error("cannot join feature blocks with {left} and {right} rows")]
    RowCountMismatch { left: usize, right: usize },
    #[error(transparent)]
    Scaling(#[from] ScalerError),
}

/// Dense row-major matrix with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<&'static str>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// # Panics
    ///
    /// Panics if the number of names differs from the number of value columns.
    pub fn new(columns: Vec<&'static str>, values: Array2<f64>) -> Self {
        assert_eq!(
            columns.len(),
            values.ncols(),
            "column names must match value columns"
        );
        Self { columns, values }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|&c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.position(name).map(|idx| self.values.column(idx))
    }

    /// New matrix holding `names`, in that order.
    pub fn select(&self, names: &[&'static str]) -> Result<Self, PreprocessError> {
        let indices = names
            .iter()
            .map(|&name| {
                self.position(name)
                    .ok_or_else(|| PreprocessError::UnknownColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            columns: names.to_vec(),
            values: self.values.select(Axis(1), &indices),
        })
    }

    /// New matrix without `names`, keeping the remaining columns in order.
    pub fn without(&self, names: &[&str]) -> Self {
        let (indices, columns): (Vec<usize>, Vec<&'static str>) = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !names.contains(*name))
            .map(|(idx, &name)| (idx, name))
            .unzip();

        Self {
            columns,
            values: self.values.select(Axis(1), &indices),
        }
    }

    /// Append the columns of `other` to the right of `self`.
    pub fn hstack(&self, other: &Self) -> Result<Self, PreprocessError> {
        if self.n_rows() != other.n_rows() {
            return Err(PreprocessError::RowCountMismatch {
                left: self.n_rows(),
                right: other.n_rows(),
            });
        }

        let values = concatenate(Axis(1), &[self.values.view(), other.values.view()]).map_err(
            |_| PreprocessError::RowCountMismatch {
                left: self.n_rows(),
                right: other.n_rows(),
            },
        )?;
        let columns = self.columns.iter().chain(&other.columns).copied().collect();

        Ok(Self { columns, values })
    }

    /// Values narrowed to `f32`, the precision trees are evaluated in.
    pub fn to_f32(&self) -> Array2<f32> {
        self.values.mapv(|v| v as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> FeatureMatrix {
        FeatureMatrix::new(vec!["a", "b", "c"], array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])
    }

    #[test]
    fn select_reorders_columns() {
        let picked = sample().select(&["c", "a"]).unwrap();
        assert_eq!(picked.columns(), &["c", "a"]);
        assert_eq!(picked.values(), array![[3.0, 1.0], [6.0, 4.0]]);
    }

    #[test]
    fn select_reports_unknown_column() {
        assert_eq!(
            sample().select(&["a", "z"]),
            Err(PreprocessError::UnknownColumn("z".into()))
        );
    }

    #[test]
    fn without_and_hstack_restore_all_columns() {
        let m = sample();
        let rest = m.without(&["b"]);
        assert_eq!(rest.columns(), &["a", "c"]);

        let joined = rest.hstack(&m.select(&["b"]).unwrap()).unwrap();
        assert_eq!(joined.columns(), &["a", "c", "b"]);
        assert_eq!(joined.column("b").unwrap().to_vec(), vec![2.0, 5.0]);
    }

    #[test]
    fn hstack_rejects_row_mismatch() {
        let short = FeatureMatrix::new(vec!["d"], array![[0.0]]);
        assert_eq!(
            sample().hstack(&short),
            Err(PreprocessError::RowCountMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn engineered_columns_cover_model_order() {
        let mut engineered = ENGINEERED_COLUMNS.to_vec();
        let mut model = MODEL_FEATURE_ORDER.to_vec();
        engineered.sort_unstable();
        model.sort_unstable();
        assert_eq!(engineered, model);
        assert!(BINARY_FEATURES.iter().all(|c| MODEL_FEATURE_ORDER.contains(c)));
    }
}
