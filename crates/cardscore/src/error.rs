//! Error types for startup and request handling.

use std::path::PathBuf;

use crate::compat::xgboost::ConversionError;
use crate::features::PreprocessError;
use crate::model::ModelError;

/// Startup-fatal failures: the service cannot serve without both artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("model not found or could not be loaded from {}: {source}", path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model at {} cannot be served: {source}", path.display())]
    Conversion {
        path: PathBuf,
        #[source]
        source: ConversionError,
    },
    #[error("scaler not found or could not be loaded from {}: {source}", path.display())]
    Scaler {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Problems with the content of a prediction request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
    #[error("All arrays must be of the same length: '{field}' has {len} values, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("request contains no records")]
    EmptyBatch,
}

/// Request-scoped failures.
///
/// Only [`PredictError::MissingField`] is the client's fault in the HTTP
/// contract; everything else is reported as a server error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error("Missing key in input data: '{0}'")]
    MissingField(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl PredictError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::MissingField(_))
    }
}
