//! Fitted scikit-learn scalers, loaded from a JSON export of their attributes.
//!
//! The export mirrors the fitted estimator's trailing-underscore attributes
//! and is tagged by `kind`:
//!
//! ```json
//! {
//!   "kind": "standard",
//!   "mean_": [1.0, 40000.0],
//!   "scale_": [1.0, 20000.0],
//!   "n_features_in_": 2,
//!   "feature_names_in_": ["Num_Children", "Income"]
//! }
//! ```

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2};
use serde::Deserialize;

/// Errors from loading or applying a fitted scaler.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScalerError {
    #[error("scaler parameter '{name}' has {len} entries, expected {expected}")]
    ParameterLength {
        name: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("scaler parameter '{name}' contains a non-finite value")]
    NonFiniteParameter { name: &'static str },
    #[error("scaler parameter 'scale_' is zero for feature {index}")]
    ZeroScale { index: usize },
    #[error("X has {actual} features, but the scaler is expecting {expected} features as input")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("The feature names should match those that were passed during fit: expected {expected:?}, got {actual:?}")]
    FeatureNamesMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

fn default_true() -> bool {
    true
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// `StandardScaler`: `(x - mean_) / scale_`.
///
/// `mean_` is absent when fitted with `with_mean=False`; `scale_` is absent
/// when fitted with `with_std=False`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardScaler {
    #[serde(rename = "mean_", default)]
    pub mean: Option<Vec<f64>>,
    #[serde(rename = "scale_", default)]
    pub scale: Option<Vec<f64>>,
    #[serde(default = "default_true")]
    pub with_mean: bool,
    #[serde(default = "default_true")]
    pub with_std: bool,
    #[serde(rename = "n_features_in_")]
    pub n_features_in: usize,
    #[serde(rename = "feature_names_in_", default)]
    pub feature_names_in: Option<Vec<String>>,
}

/// `MinMaxScaler`: `x * scale_ + min_`, optionally clipped to `feature_range`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MinMaxScaler {
    #[serde(rename = "min_")]
    pub min: Vec<f64>,
    #[serde(rename = "scale_")]
    pub scale: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
    #[serde(default)]
    pub clip: bool,
    #[serde(rename = "n_features_in_")]
    pub n_features_in: usize,
    #[serde(rename = "feature_names_in_", default)]
    pub feature_names_in: Option<Vec<String>>,
}

/// A fitted transform for the continuous feature block. Immutable at serving time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl FittedScaler {
    /// Read and validate a scaler export.
    ///
    /// Returns the I/O error, or an `InvalidData` error wrapping the parse or
    /// validation failure.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let scaler: Self = serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        scaler
            .validate()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(scaler)
    }

    /// Number of input columns the scaler was fitted on.
    pub fn n_features_in(&self) -> usize {
        match self {
            FittedScaler::Standard(s) => s.n_features_in,
            FittedScaler::MinMax(s) => s.n_features_in,
        }
    }

    /// Column names seen at fit time, if the scaler was fitted on a frame.
    pub fn feature_names_in(&self) -> Option<&[String]> {
        match self {
            FittedScaler::Standard(s) => s.feature_names_in.as_deref(),
            FittedScaler::MinMax(s) => s.feature_names_in.as_deref(),
        }
    }

    /// Check that all parameter vectors agree with `n_features_in_`.
    pub fn validate(&self) -> Result<(), ScalerError> {
        let expected = self.n_features_in();
        let mut params: Vec<(&'static str, &[f64])> = Vec::new();
        match self {
            FittedScaler::Standard(s) => {
                if let Some(mean) = &s.mean {
                    params.push(("mean_", mean));
                }
                if let Some(scale) = &s.scale {
                    params.push(("scale_", scale));
                }
            }
            FittedScaler::MinMax(s) => {
                params.push(("min_", &s.min));
                params.push(("scale_", &s.scale));
            }
        }
        if let Some(names) = self.feature_names_in() {
            if names.len() != expected {
                return Err(ScalerError::ParameterLength {
                    name: "feature_names_in_",
                    len: names.len(),
                    expected,
                });
            }
        }

        for (name, values) in params {
            if values.len() != expected {
                return Err(ScalerError::ParameterLength {
                    name,
                    len: values.len(),
                    expected,
                });
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ScalerError::NonFiniteParameter { name });
            }
        }

        // scale_ is a divisor
        if let FittedScaler::Standard(StandardScaler {
            scale: Some(scale),
            with_std: true,
            ..
        }) = self
        {
            if let Some(index) = scale.iter().position(|&v| v == 0.0) {
                return Err(ScalerError::ZeroScale { index });
            }
        }
        Ok(())
    }

    /// Check the supplied column layout against what the scaler was fitted on.
    pub fn check_columns(&self, columns: &[&str]) -> Result<(), ScalerError> {
        if columns.len() != self.n_features_in() {
            return Err(ScalerError::FeatureCountMismatch {
                expected: self.n_features_in(),
                actual: columns.len(),
            });
        }
        if let Some(names) = self.feature_names_in() {
            if names.iter().zip(columns).any(|(fitted, given)| fitted != given) {
                return Err(ScalerError::FeatureNamesMismatch {
                    expected: names.to_vec(),
                    actual: columns.iter().map(|c| c.to_string()).collect(),
                });
            }
        }
        Ok(())
    }

    /// Apply the fitted transform to `values`, whose columns are named `columns`.
    pub fn transform(
        &self,
        columns: &[&str],
        values: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, ScalerError> {
        self.check_columns(columns)?;

        let mut out = values.to_owned();
        match self {
            FittedScaler::Standard(s) => {
                if s.with_mean {
                    if let Some(mean) = &s.mean {
                        out -= &Array1::from(mean.clone());
                    }
                }
                if s.with_std {
                    if let Some(scale) = &s.scale {
                        out /= &Array1::from(scale.clone());
                    }
                }
            }
            FittedScaler::MinMax(s) => {
                out *= &Array1::from(s.scale.clone());
                out += &Array1::from(s.min.clone());
                if s.clip {
                    let (lo, hi) = s.feature_range;
                    out.mapv_inplace(|v| v.clamp(lo, hi));
                }
            }
        }
        Ok(out)
    }
}
