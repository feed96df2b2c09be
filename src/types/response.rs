//! Response bodies

use serde::{Deserialize, Serialize};

use crate::model::ArtifactSummary;

/// Successful prediction. Exactly one field is set per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_fertilizer: Option<String>,
}

impl PredictionResponse {
    pub fn crop(label: impl Into<String>) -> Self {
        Self {
            recommended_crop: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn fertilizer(label: impl Into<String>) -> Self {
        Self {
            recommended_fertilizer: Some(label.into()),
            ..Default::default()
        }
    }
}

/// Error envelope: `{"detail": ...}`.
///
/// Internal failures carry a message string; validation failures carry
/// one entry per offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message { detail: String },
    Fields { detail: Vec<FieldError> },
}

/// One validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending value, starting at `"body"`.
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub artifacts: ArtifactSummary,
}
