//! cardscore: credit card approval scoring over HTTP.
//!
//! Loads an XGBoost JSON classifier and a fitted scaler export at startup,
//! then serves `POST /predict`. Each request is turned into applicant
//! records, expanded into the engineered feature set, scaled, reordered into
//! the training layout and scored by a native tree-ensemble evaluator.
//!
//! # Key Types
//!
//! - [`Artifacts`] - classifier + scaler, loaded once and shared
//! - [`ServeConfig`] - artifact paths and listen address
//! - [`model::Classifier`] - tree ensemble with a checked feature layout
//! - [`features::FeatureMatrix`] - named-column matrix flowing through the pipeline
//!
//! # Loading XGBoost Models
//!
//! Use [`compat::xgboost::XgbModel`] to parse JSON models, then
//! [`XgbModel::to_classifier`](compat::xgboost::XgbModel::to_classifier).

pub mod artifacts;
pub mod compat;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod repr;
pub mod server;

pub use artifacts::Artifacts;
pub use config::{ConfigError, ServeConfig};
pub use error::{ArtifactError, PredictError, ValidationError};
