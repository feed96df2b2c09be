//! Cropwise error types

use std::path::PathBuf;

/// Cropwise error types
#[derive(Debug, thiserror::Error)]
pub enum CropwiseError {
    // Request errors
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unknown {field} '{value}': not in encoder vocabulary")]
    UnknownCategory { field: &'static str, value: String },

    // Inference errors
    #[error("prediction failed: {0}")]
    Prediction(String),

    // Startup errors
    #[error("artifact {path:?}: {reason}")]
    Artifact { path: PathBuf, reason: String },

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`CropwiseError`].
///
/// Lets callers and tests branch on what went wrong without matching
/// every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request payload was malformed, incomplete or mistyped.
    Validation,
    /// A categorical field named a label the encoder has never seen.
    UnknownCategory,
    /// The predictor or label decoding failed.
    Prediction,
    /// Artifacts, configuration or I/O failed before serving.
    Startup,
}

impl CropwiseError {
    /// Which kind of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::UnknownCategory { .. } => ErrorKind::UnknownCategory,
            Self::Prediction(_) => ErrorKind::Prediction,
            Self::Artifact { .. }
            | Self::InvalidModel(_)
            | Self::Configuration(_)
            | Self::Json(_)
            | Self::Io(_) => ErrorKind::Startup,
        }
    }

    pub(crate) fn artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Artifact {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for Cropwise operations
pub type Result<T> = std::result::Result<T, CropwiseError>;
