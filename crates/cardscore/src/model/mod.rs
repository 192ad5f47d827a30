//! Classifier built from a converted tree ensemble.

mod classifier;
mod transform;

pub use classifier::{Classifier, ModelError};
pub use transform::OutputTransform;
