//! XGBoost JSON model support.
//!
//! Parses the JSON written by `Booster.save_model("*.json")` (and the
//! scikit-learn wrapper's `save_model`) into foreign types, then converts
//! tree-based classifiers into a native [`Classifier`](crate::model::Classifier).

mod convert;
mod json;

pub use convert::ConversionError;
pub use json::*;
