//! Turns the model's free-text reply into a `NutritionResult`.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::error::{AnalyzeError, ParseError};
use crate::models::NutritionResult;

/// Interior of a ```json fenced block (language tag optional).
static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").unwrap());

/// First `{` through the last `}` of the reply.
static BARE_JSON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// Candidate JSON spans in priority order. Evaluated lazily.
fn candidates(reply: &str) -> impl Iterator<Item = &str> + '_ {
    let fenced = std::iter::once_with(move || {
        FENCED_JSON
            .captures(reply)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    });
    let bare = std::iter::once_with(move || BARE_JSON.find(reply).map(|m| m.as_str()));

    fenced.chain(bare).flatten()
}

/// Finds the first candidate span that parses as JSON.
pub fn extract_json(reply: &str) -> Result<Value, ParseError> {
    let mut last_error = None;

    for span in candidates(reply) {
        match serde_json::from_str::<Value>(span) {
            Ok(value) => return Ok(value),
            Err(e) => {
                log::debug!("Candidate JSON span rejected: {}", e);
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(e) => ParseError::InvalidJson(e),
        None => ParseError::NoJson,
    })
}

fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Parses a model reply.
///
/// An `error` field in the reply is the model refusing the input and becomes
/// `AnalyzeError::Rejected`; everything else that is wrong with the reply is a `ParseError`.
pub fn parse_nutrition_response(reply: &str) -> Result<NutritionResult, AnalyzeError> {
    let value = extract_json(reply)?;

    if let Some(reason) = value.get("error").filter(|v| is_set(Some(v))) {
        let reason = match reason {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(AnalyzeError::Rejected(reason));
    }

    if !is_set(value.get("foodName")) {
        return Err(ParseError::MissingField("foodName").into());
    }
    if !is_set(value.get("nutrition")) {
        return Err(ParseError::MissingField("nutrition").into());
    }

    let result: NutritionResult =
        serde_json::from_value(value).map_err(ParseError::InvalidShape)?;

    if !result.has_known_confidence() {
        log::warn!(
            "⚠️ Model reported unexpected confidence {:?} for {}",
            result.confidence,
            result.food_name
        );
    }

    Ok(result)
}
