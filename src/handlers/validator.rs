//! Input validation for `POST /api/analyze`.
//!
//! Runs before any network access and only looks at the request body, so its cost is linear
//! in the payload size.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::error::AnalyzeError;
use crate::models::{AnalysisRequest, AnalyzeBody};

pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Base64 is ~4/3 of the original size, so this admits images of roughly 10 MB.
pub const MAX_IMAGE_BASE64_LEN: usize = 13 * 1024 * 1024;
pub const MAX_FOOD_NAME_CHARS: usize = 200;
pub const MAX_AMOUNT_CHARS: usize = 100;

static BASE64_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/=]+$").unwrap());

/// A field counts as provided unless it is absent, `null` or an empty string.
fn provided(value: &Option<Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v),
    }
}

/// Checks a raw body and returns every violation found.
///
/// A missing or ambiguous image/food name stops validation with a single message; all other
/// rules accumulate.
pub fn validate(body: &AnalyzeBody) -> Result<(), Vec<String>> {
    let image = provided(&body.image);
    let food_name = provided(&body.food_name);

    match (image, food_name) {
        (None, None) => return Err(vec!["No image or food name provided".to_string()]),
        (Some(_), Some(_)) => {
            return Err(vec![
                "Provide either an image or a food name, not both".to_string()
            ])
        }
        _ => {}
    }

    let mut errors = Vec::new();

    if let Some(image) = image {
        let mime_ok = body
            .mime_type
            .as_ref()
            .and_then(Value::as_str)
            .is_some_and(|m| ALLOWED_MIME_TYPES.contains(&m));
        if !mime_ok {
            errors.push(format!(
                "Invalid image type. Allowed: {}",
                ALLOWED_MIME_TYPES.join(", ")
            ));
        }

        match image.as_str() {
            Some(data) => {
                if !BASE64_PATTERN.is_match(data) {
                    errors.push("Invalid image data format".to_string());
                }
                if data.len() > MAX_IMAGE_BASE64_LEN {
                    errors.push("Image too large (max 10MB)".to_string());
                }
            }
            None => errors.push("Invalid image data format".to_string()),
        }
    }

    if let Some(food_name) = food_name {
        match food_name.as_str() {
            None => errors.push("Food name must be a string".to_string()),
            Some(name) if name.chars().count() > MAX_FOOD_NAME_CHARS => errors.push(format!(
                "Food name too long (max {} characters)",
                MAX_FOOD_NAME_CHARS
            )),
            Some(name) if name.trim().is_empty() => {
                errors.push("Food name cannot be empty".to_string())
            }
            Some(_) => {}
        }
    }

    if let Some(amount) = provided(&body.amount) {
        match amount.as_str() {
            None => errors.push("Amount must be a string".to_string()),
            Some(a) if a.chars().count() > MAX_AMOUNT_CHARS => errors.push(format!(
                "Amount too long (max {} characters)",
                MAX_AMOUNT_CHARS
            )),
            Some(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl TryFrom<AnalyzeBody> for AnalysisRequest {
    type Error = AnalyzeError;

    fn try_from(body: AnalyzeBody) -> Result<Self, Self::Error> {
        validate(&body).map_err(AnalyzeError::Validation)?;

        let as_string = |v: Option<Value>| match v {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        let request = match (as_string(body.image), as_string(body.food_name)) {
            (Some(data), _) if !data.is_empty() => AnalysisRequest::Image {
                data,
                mime_type: as_string(body.mime_type).unwrap_or_default(),
            },
            (_, Some(food_name)) => {
                let amount = as_string(body.amount);
                AnalysisRequest::text(&food_name, amount.as_deref())
            }
            _ => {
                return Err(AnalyzeError::Validation(vec![
                    "No image or food name provided".to_string(),
                ]))
            }
        };

        Ok(request)
    }
}
