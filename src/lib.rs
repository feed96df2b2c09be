//! Cropwise - crop and fertilizer recommendation service
//!
//! Serves two pre-trained tree-ensemble classifiers over HTTP. Model
//! artifacts and label encoders are loaded once into an [`ArtifactStore`],
//! which is then injected into the [`Recommender`] and the axum router.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cropwise::{ArtifactStore, CropInput, Recommender};
//!
//! fn main() -> cropwise::Result<()> {
//!     let store = ArtifactStore::load("Models")?;
//!     let recommender = Recommender::new(Arc::new(store));
//!
//!     let crop = recommender.recommend_crop(&CropInput {
//!         nitrogen: 90.0,
//!         phosphorus: 42.0,
//!         potassium: 43.0,
//!         temperature: 20.8,
//!         humidity: 82.0,
//!         ph: 6.5,
//!         rainfall: 202.9,
//!     })?;
//!
//!     println!("{crop}");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod model;
pub mod recommend;
pub mod server;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use error::{CropwiseError, ErrorKind, Result};
pub use model::{ArtifactStore, ClassLabel, LabelEncoder, Predictor, TreeClassifier};
pub use recommend::{Recommender, get_crop_recommendation, get_fertilizer_recommendation};
pub use types::{CropInput, FertilizerInput, PredictionResponse};
pub use version::{GIT_BRANCH, GIT_SHA, PKG_VERSION, version_string};
