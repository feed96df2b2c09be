//! Telemetry metric name constants.
//!
//! Centralised metric names for cropwise operations. The daemon does not
//! install a recorder itself; embedders install their own `metrics`
//! recorder (e.g. prometheus, statsd). Without one, all metric calls are
//! no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `cropwise_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation`: "crop_recommendation" or "fertilizer_recommendation"
//! - `status`: "ok" or "error"

/// Total recommendations attempted (requests that passed validation).
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "cropwise_requests_total";

/// Time spent encoding, predicting and decoding, in seconds.
///
/// Labels: `operation`.
pub const PREDICTION_DURATION_SECONDS: &str = "cropwise_prediction_duration_seconds";

/// Requests rejected because a categorical value was not in the encoder
/// vocabulary.
///
/// Labels: `field` ("soil_type" | "crop_type").
pub const UNKNOWN_CATEGORY_TOTAL: &str = "cropwise_unknown_category_total";
