//! Loaders for models trained in other libraries.

pub mod xgboost;
