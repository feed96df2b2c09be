//! The artifact store: both predictors and all three label encoders.
//!
//! Built once before the server starts, then shared behind an `Arc` and
//! never mutated. Any missing or corrupt artifact aborts startup; the
//! service has nothing to offer without its models.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{LabelEncoder, Predictor, TreeClassifier};
use crate::recommend::{CROP_FEATURES, FERTILIZER_FEATURES};
use crate::{CropwiseError, Result};

/// File name of the crop recommendation model.
pub const CROP_MODEL_FILE: &str = "RandomForest.json";
/// File name of the fertilizer recommendation model.
pub const FERTILIZER_MODEL_FILE: &str = "fertilizer.json";
/// File name of the soil-type encoder.
pub const SOIL_ENCODER_FILE: &str = "soil_label_encoder.json";
/// File name of the crop-type encoder used by the fertilizer model.
pub const CROP_ENCODER_FILE: &str = "crop_label_encoder.json";
/// File name of the fertilizer-name encoder.
pub const FERTILIZER_ENCODER_FILE: &str = "fertilizer_encoder.json";

/// Locations of the five artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub crop_model: PathBuf,
    pub fertilizer_model: PathBuf,
    pub soil_encoder: PathBuf,
    pub crop_encoder: PathBuf,
    pub fertilizer_encoder: PathBuf,
}

impl ArtifactPaths {
    /// The standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            crop_model: dir.join(CROP_MODEL_FILE),
            fertilizer_model: dir.join(FERTILIZER_MODEL_FILE),
            soil_encoder: dir.join(SOIL_ENCODER_FILE),
            crop_encoder: dir.join(CROP_ENCODER_FILE),
            fertilizer_encoder: dir.join(FERTILIZER_ENCODER_FILE),
        }
    }
}

/// Read-only holder of every model artifact.
#[derive(Clone)]
pub struct ArtifactStore {
    crop_model: Arc<dyn Predictor>,
    fertilizer_model: Arc<dyn Predictor>,
    soil_encoder: LabelEncoder,
    crop_encoder: LabelEncoder,
    fertilizer_encoder: LabelEncoder,
}

impl ArtifactStore {
    /// Load all artifacts from the standard file names in `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_from(&ArtifactPaths::in_dir(dir))
    }

    /// Load all artifacts from explicit paths.
    pub fn load_from(paths: &ArtifactPaths) -> Result<Self> {
        let crop_model: TreeClassifier = read_artifact(&paths.crop_model)?;
        let fertilizer_model: TreeClassifier = read_artifact(&paths.fertilizer_model)?;

        // Attribute feature-count mismatches to the offending file.
        check_features(&crop_model, CROP_FEATURES.len(), "crop")
            .map_err(|e| CropwiseError::artifact(&paths.crop_model, e))?;
        check_features(&fertilizer_model, FERTILIZER_FEATURES.len(), "fertilizer")
            .map_err(|e| CropwiseError::artifact(&paths.fertilizer_model, e))?;

        Self::builder()
            .crop_model(Arc::new(crop_model))
            .fertilizer_model(Arc::new(fertilizer_model))
            .soil_encoder(read_artifact(&paths.soil_encoder)?)
            .crop_encoder(read_artifact(&paths.crop_encoder)?)
            .fertilizer_encoder(read_artifact(&paths.fertilizer_encoder)?)
            .build()
    }

    /// Assemble a store from in-memory parts.
    pub fn builder() -> ArtifactStoreBuilder {
        ArtifactStoreBuilder::default()
    }

    pub fn crop_model(&self) -> &dyn Predictor {
        self.crop_model.as_ref()
    }

    pub fn fertilizer_model(&self) -> &dyn Predictor {
        self.fertilizer_model.as_ref()
    }

    pub fn soil_encoder(&self) -> &LabelEncoder {
        &self.soil_encoder
    }

    pub fn crop_encoder(&self) -> &LabelEncoder {
        &self.crop_encoder
    }

    pub fn fertilizer_encoder(&self) -> &LabelEncoder {
        &self.fertilizer_encoder
    }

    /// Describe what is loaded, for logs and the health endpoint.
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            crop_model: ModelSummary::of(self.crop_model()),
            fertilizer_model: ModelSummary::of(self.fertilizer_model()),
            soil_types: self.soil_encoder.classes().to_vec(),
            crop_types: self.crop_encoder.classes().to_vec(),
            fertilizers: self.fertilizer_encoder.classes().to_vec(),
        }
    }
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("summary", &self.summary())
            .finish()
    }
}

/// Builder for [`ArtifactStore`]. Every part is required.
#[derive(Default)]
pub struct ArtifactStoreBuilder {
    crop_model: Option<Arc<dyn Predictor>>,
    fertilizer_model: Option<Arc<dyn Predictor>>,
    soil_encoder: Option<LabelEncoder>,
    crop_encoder: Option<LabelEncoder>,
    fertilizer_encoder: Option<LabelEncoder>,
}

impl ArtifactStoreBuilder {
    pub fn crop_model(mut self, model: Arc<dyn Predictor>) -> Self {
        self.crop_model = Some(model);
        self
    }

    pub fn fertilizer_model(mut self, model: Arc<dyn Predictor>) -> Self {
        self.fertilizer_model = Some(model);
        self
    }

    pub fn soil_encoder(mut self, encoder: LabelEncoder) -> Self {
        self.soil_encoder = Some(encoder);
        self
    }

    pub fn crop_encoder(mut self, encoder: LabelEncoder) -> Self {
        self.crop_encoder = Some(encoder);
        self
    }

    pub fn fertilizer_encoder(mut self, encoder: LabelEncoder) -> Self {
        self.fertilizer_encoder = Some(encoder);
        self
    }

    /// Check that every part is present and the models match the
    /// request schemas.
    pub fn build(self) -> Result<ArtifactStore> {
        let crop_model = self.crop_model.ok_or_else(|| missing("crop model"))?;
        let fertilizer_model = self
            .fertilizer_model
            .ok_or_else(|| missing("fertilizer model"))?;

        check_features(crop_model.as_ref(), CROP_FEATURES.len(), "crop")?;
        check_features(
            fertilizer_model.as_ref(),
            FERTILIZER_FEATURES.len(),
            "fertilizer",
        )?;

        Ok(ArtifactStore {
            crop_model,
            fertilizer_model,
            soil_encoder: self.soil_encoder.ok_or_else(|| missing("soil encoder"))?,
            crop_encoder: self.crop_encoder.ok_or_else(|| missing("crop encoder"))?,
            fertilizer_encoder: self
                .fertilizer_encoder
                .ok_or_else(|| missing("fertilizer encoder"))?,
        })
    }
}

/// Shape of one loaded predictor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub n_features: usize,
    pub classes: Vec<String>,
}

impl ModelSummary {
    fn of(model: &dyn Predictor) -> Self {
        Self {
            n_features: model.n_features(),
            classes: model.classes().iter().map(ToString::to_string).collect(),
        }
    }
}

/// Everything the store holds, in reportable form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactSummary {
    pub crop_model: ModelSummary,
    pub fertilizer_model: ModelSummary,
    pub soil_types: Vec<String>,
    pub crop_types: Vec<String>,
    pub fertilizers: Vec<String>,
}

fn missing(part: &str) -> CropwiseError {
    CropwiseError::Configuration(format!("artifact store is missing the {part}"))
}

fn check_features(model: &dyn Predictor, expected: usize, name: &str) -> Result<()> {
    if model.n_features() != expected {
        return Err(CropwiseError::InvalidModel(format!(
            "{name} model expects {} features, requests provide {expected}",
            model.n_features()
        )));
    }
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| CropwiseError::artifact(path, e))?;
    let artifact = serde_json::from_str(&content).map_err(|e| CropwiseError::artifact(path, e))?;
    debug!(path = %path.display(), "loaded artifact");
    Ok(artifact)
}
