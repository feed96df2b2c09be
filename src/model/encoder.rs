//! Label encoders: string label <-> integer code.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{CropwiseError, Result};

/// On-disk layout of a label encoder. Code `i` is `classes[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderArtifact {
    pub classes: Vec<String>,
}

/// Bidirectional mapping between a fixed vocabulary and codes `0..n`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "EncoderArtifact")]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, i64>,
}

impl LabelEncoder {
    /// Build an encoder; labels must be unique.
    pub fn new<I, S>(classes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_from(EncoderArtifact {
            classes: classes.into_iter().map(Into::into).collect(),
        })
    }

    /// Parse and validate an encoder from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Code for `label`, or `None` when the label is outside the vocabulary.
    ///
    /// Matching is exact; no case folding or trimming.
    pub fn encode(&self, label: &str) -> Option<i64> {
        self.codes.get(label).copied()
    }

    /// Label for `code`, or `None` when the code is out of range.
    pub fn decode(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.classes.get(idx))
            .map(String::as_str)
    }

    /// The vocabulary in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TryFrom<EncoderArtifact> for LabelEncoder {
    type Error = CropwiseError;

    fn try_from(artifact: EncoderArtifact) -> Result<Self> {
        if artifact.classes.is_empty() {
            return Err(CropwiseError::InvalidModel("encoder has no classes".into()));
        }

        let mut codes = HashMap::with_capacity(artifact.classes.len());
        for (code, label) in artifact.classes.iter().enumerate() {
            if codes.insert(label.clone(), code as i64).is_some() {
                return Err(CropwiseError::InvalidModel(format!(
                    "duplicate encoder label '{label}'"
                )));
            }
        }

        Ok(Self {
            classes: artifact.classes,
            codes,
        })
    }
}
