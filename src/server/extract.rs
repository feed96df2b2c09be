//! Request body extraction with field-level diagnostics.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, header};
use serde_json::{Number, Value};

use super::ApiError;
use crate::types::{FieldError, FieldKind, RequestSchema};

/// JSON body extractor that reports every invalid field at once.
///
/// Rejections become a 422 before the handler (and so the predictor)
/// ever runs. Bodies that cannot be read at all keep the status of the
/// underlying rejection (413 for oversized bodies).
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: RequestSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_request(req.headers()) {
            return Err(ApiError::Invalid(vec![FieldError::body(
                "model_attributes_type",
                "Input should be a valid dictionary or object to extract fields from",
            )]));
        }
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(ApiError::Unreadable)?;
        validate_body(&bytes).map(Self).map_err(ApiError::Invalid)
    }
}

/// A body is parsed as JSON when it has no content type, or one of
/// `application/json` and `application/*+json`.
fn is_json_request(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

/// Check `bytes` against `T`'s schema and deserialize it.
///
/// Number fields also accept strings holding a finite number (`"90"`,
/// `" 6.5 "`); they are converted before deserialization.
pub fn validate_body<T: RequestSchema>(bytes: &[u8]) -> Result<T, Vec<FieldError>> {
    let mut value: Value = serde_json::from_slice(bytes)
        .map_err(|e| vec![FieldError::body("json_invalid", e.to_string())])?;

    let Some(object) = value.as_object_mut() else {
        return Err(vec![FieldError::body(
            "dict_type",
            "Input should be a valid JSON object",
        )]);
    };

    let errors: Vec<FieldError> = T::FIELDS
        .iter()
        .filter_map(|(name, kind)| {
            let Some(slot) = object.get_mut(*name) else {
                return Some(FieldError::field(name, "missing", "Field required"));
            };
            match (kind, &*slot) {
                (FieldKind::Number, Value::Number(_)) | (FieldKind::Text, Value::String(_)) => {
                    None
                }
                (FieldKind::Number, Value::String(text)) => match parse_number(text) {
                    Some(number) => {
                        *slot = Value::Number(number);
                        None
                    }
                    None => Some(FieldError::field(
                        name,
                        "float_parsing",
                        "Input should be a valid number, unable to parse string as a number",
                    )),
                },
                (FieldKind::Number, _) => Some(FieldError::field(
                    name,
                    "float_type",
                    "Input should be a valid number",
                )),
                (FieldKind::Text, _) => Some(FieldError::field(
                    name,
                    "string_type",
                    "Input should be a valid string",
                )),
            }
        })
        .collect();
    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(value).map_err(|e| vec![FieldError::body("value_error", e.to_string())])
}

/// `None` for unparsable or non-finite text.
fn parse_number(text: &str) -> Option<Number> {
    text.trim().parse::<f64>().ok().and_then(Number::from_f64)
}

impl FieldError {
    fn body(kind: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    fn field(name: &str, kind: &str, msg: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), name.to_string()],
            msg: msg.to_string(),
            kind: kind.to_string(),
        }
    }
}
