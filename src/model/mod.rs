//! Model artifacts: predictors, label encoders and the store that owns them.
//!
//! Everything here is loaded once at startup and shared read-only across
//! requests afterwards.

pub mod encoder;
pub mod store;
pub mod tree;

pub use encoder::LabelEncoder;
pub use store::{ArtifactPaths, ArtifactStore, ArtifactStoreBuilder, ArtifactSummary, ModelSummary};
pub use tree::{ModelKind, TreeClassifier};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;

/// A class a predictor can emit.
///
/// Classifiers trained on raw strings carry text classes; classifiers
/// trained on label-encoded targets carry integer codes that must be
/// decoded through a [`LabelEncoder`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Code(i64),
    Text(String),
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for ClassLabel {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<i64> for ClassLabel {
    fn from(code: i64) -> Self {
        Self::Code(code)
    }
}

/// Inference over a fixed-length numeric feature vector.
///
/// Implementations must be deterministic: the same vector always yields
/// the same class.
pub trait Predictor: Send + Sync {
    /// Number of features `predict` expects.
    fn n_features(&self) -> usize;

    /// Every class this predictor can emit, in index order.
    fn classes(&self) -> &[ClassLabel];

    /// Predict the class for one feature vector.
    fn predict(&self, features: &[f64]) -> Result<ClassLabel>;
}
