//! Public request and response types.

mod input;
mod response;

pub use input::{CropInput, FertilizerInput, FieldKind, RequestSchema};
pub use response::{ErrorDetail, FieldError, HealthResponse, PredictionResponse};
