//! Store-backed recommender with tracing and metrics.

use std::sync::Arc;
use std::time::Instant;

use tracing::{instrument, warn};

use super::{get_crop_recommendation, get_fertilizer_recommendation};
use crate::model::ArtifactStore;
use crate::telemetry;
use crate::types::{CropInput, FertilizerInput};
use crate::{CropwiseError, Result};

/// Operation label for crop recommendations.
pub const CROP_OPERATION: &str = "crop_recommendation";
/// Operation label for fertilizer recommendations.
pub const FERTILIZER_OPERATION: &str = "fertilizer_recommendation";

/// Runs recommendations against a shared, read-only [`ArtifactStore`].
///
/// Cheap to clone; every clone shares the same store.
#[derive(Debug, Clone)]
pub struct Recommender {
    store: Arc<ArtifactStore>,
}

impl Recommender {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    #[instrument(skip_all, fields(operation = CROP_OPERATION))]
    pub fn recommend_crop(&self, input: &CropInput) -> Result<String> {
        let start = Instant::now();
        let result = get_crop_recommendation(input, self.store.crop_model());
        record(CROP_OPERATION, start, &result);
        result
    }

    #[instrument(
        skip_all,
        fields(
            operation = FERTILIZER_OPERATION,
            soil_type = %input.soil_type,
            crop_type = %input.crop_type,
        )
    )]
    pub fn recommend_fertilizer(&self, input: &FertilizerInput) -> Result<String> {
        let start = Instant::now();
        let result = get_fertilizer_recommendation(
            input,
            self.store.fertilizer_model(),
            self.store.soil_encoder(),
            self.store.crop_encoder(),
            self.store.fertilizer_encoder(),
        );
        record(FERTILIZER_OPERATION, start, &result);
        result
    }
}

/// Record outcome metrics (counter + histogram) and log failures.
fn record(operation: &'static str, start: Instant, result: &Result<String>) {
    let elapsed = start.elapsed().as_secs_f64();
    let status = if result.is_ok() { "ok" } else { "error" };

    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "operation" => operation,
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::PREDICTION_DURATION_SECONDS,
        "operation" => operation,
    )
    .record(elapsed);

    if let Err(err) = result {
        if let CropwiseError::UnknownCategory { field, .. } = err {
            metrics::counter!(telemetry::UNKNOWN_CATEGORY_TOTAL, "field" => *field).increment(1);
        }
        warn!(error = %err, kind = ?err.kind(), "recommendation failed");
    }
}
