//! Request payloads.
//!
//! Every field is required. The HTTP extractor checks bodies against
//! [`RequestSchema::FIELDS`] and rejects missing or mistyped fields before
//! any translation runs. Unknown extra fields are ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// JSON type a request field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Text,
}

/// A request body whose fields can be checked one by one before
/// deserializing, so every bad field is reported, not just the first.
pub trait RequestSchema: DeserializeOwned {
    /// Every required field and its JSON type.
    const FIELDS: &'static [(&'static str, FieldKind)];
}

/// Soil and climate readings for a crop recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropInput {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

/// Field conditions and crop for a fertilizer recommendation.
///
/// Note the `phosphorous` spelling, which is part of the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerInput {
    pub temperature: f64,
    pub humidity: f64,
    pub moisture: f64,
    pub soil_type: String,
    pub crop_type: String,
    pub nitrogen: f64,
    pub potassium: f64,
    pub phosphorous: f64,
}

impl RequestSchema for CropInput {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("nitrogen", FieldKind::Number),
        ("phosphorus", FieldKind::Number),
        ("potassium", FieldKind::Number),
        ("temperature", FieldKind::Number),
        ("humidity", FieldKind::Number),
        ("ph", FieldKind::Number),
        ("rainfall", FieldKind::Number),
    ];
}

impl RequestSchema for FertilizerInput {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("temperature", FieldKind::Number),
        ("humidity", FieldKind::Number),
        ("moisture", FieldKind::Number),
        ("soil_type", FieldKind::Text),
        ("crop_type", FieldKind::Text),
        ("nitrogen", FieldKind::Number),
        ("potassium", FieldKind::Number),
        ("phosphorous", FieldKind::Number),
    ];
}
