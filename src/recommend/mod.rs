//! Translation between request payloads and model inputs/outputs.
//!
//! These functions are pure: they take the artifacts they need as
//! arguments and hold no state. [`Recommender`] wraps them with the
//! artifact store and telemetry.

mod service;

pub use service::Recommender;

use crate::model::{ClassLabel, LabelEncoder, Predictor};
use crate::types::{CropInput, FertilizerInput};
use crate::{CropwiseError, Result};

/// Crop model feature order. Must match the order used at training time.
pub const CROP_FEATURES: [&str; 7] = [
    "nitrogen",
    "phosphorus",
    "potassium",
    "temperature",
    "humidity",
    "ph",
    "rainfall",
];

/// Fertilizer model feature order. Must match the order used at training
/// time; `soil_type` and `crop_type` enter as their encoder codes.
pub const FERTILIZER_FEATURES: [&str; 8] = [
    "temperature",
    "humidity",
    "moisture",
    "soil_type",
    "crop_type",
    "nitrogen",
    "potassium",
    "phosphorous",
];

/// Recommend a crop for the given soil and climate readings.
///
/// The crop model carries its own class labels, so no decoding step is
/// needed. A model trained on integer classes yields the code rendered
/// as a string.
pub fn get_crop_recommendation(input: &CropInput, model: &dyn Predictor) -> Result<String> {
    let features = crop_features(input)?;
    let label = model.predict(&features)?;
    Ok(label.to_string())
}

/// Recommend a fertilizer for the given field conditions and crop.
pub fn get_fertilizer_recommendation(
    input: &FertilizerInput,
    model: &dyn Predictor,
    soil_encoder: &LabelEncoder,
    crop_encoder: &LabelEncoder,
    fertilizer_encoder: &LabelEncoder,
) -> Result<String> {
    let soil_code = encode(soil_encoder, "soil_type", &input.soil_type)?;
    let crop_code = encode(crop_encoder, "crop_type", &input.crop_type)?;
    let features = fertilizer_features(input, soil_code, crop_code)?;

    match model.predict(&features)? {
        ClassLabel::Code(code) => fertilizer_encoder
            .decode(code)
            .map(str::to_string)
            .ok_or_else(|| {
                CropwiseError::Prediction(format!(
                    "fertilizer code {code} is outside the encoder's {} labels",
                    fertilizer_encoder.len()
                ))
            }),
        ClassLabel::Text(text) => Err(CropwiseError::Prediction(format!(
            "fertilizer model returned label '{text}', expected an encoded class"
        ))),
    }
}

/// Feature vector for the crop model, in [`CROP_FEATURES`] order.
pub fn crop_features(input: &CropInput) -> Result<Vec<f64>> {
    checked(
        &CROP_FEATURES,
        vec![
            input.nitrogen,
            input.phosphorus,
            input.potassium,
            input.temperature,
            input.humidity,
            input.ph,
            input.rainfall,
        ],
    )
}

/// Feature vector for the fertilizer model, in [`FERTILIZER_FEATURES`]
/// order.
pub fn fertilizer_features(
    input: &FertilizerInput,
    soil_code: i64,
    crop_code: i64,
) -> Result<Vec<f64>> {
    checked(
        &FERTILIZER_FEATURES,
        vec![
            input.temperature,
            input.humidity,
            input.moisture,
            soil_code as f64,
            crop_code as f64,
            input.nitrogen,
            input.potassium,
            input.phosphorous,
        ],
    )
}

fn encode(encoder: &LabelEncoder, field: &'static str, value: &str) -> Result<i64> {
    encoder
        .encode(value)
        .ok_or_else(|| CropwiseError::UnknownCategory {
            field,
            value: value.to_string(),
        })
}

fn checked(names: &[&str], features: Vec<f64>) -> Result<Vec<f64>> {
    if let Some((name, value)) = names.iter().zip(&features).find(|(_, v)| !v.is_finite()) {
        return Err(CropwiseError::Validation(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    Ok(features)
}
