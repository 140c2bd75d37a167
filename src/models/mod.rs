use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw `POST /api/analyze` body.
///
/// Every field is kept as an untyped JSON value so that a wrong type shows up as a
/// validation message instead of a deserialisation failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default)]
    pub mime_type: Option<Value>,
    #[serde(default)]
    pub food_name: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
}

/// A validated analysis request: either a photo or a named food with a quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Image { data: String, mime_type: String },
    Text { food_name: String, amount: String },
}

impl AnalysisRequest {
    pub const DEFAULT_AMOUNT: &'static str = "1 serving";

    /// Builds the text variant, trimming both fields and defaulting a blank amount.
    pub fn text(food_name: &str, amount: Option<&str>) -> Self {
        let amount = amount
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(Self::DEFAULT_AMOUNT);

        AnalysisRequest::Text {
            food_name: food_name.trim().to_string(),
            amount: amount.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisRequest::Image { .. } => "image",
            AnalysisRequest::Text { .. } => "text",
        }
    }
}

/// One piece of content handed to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Image { media_type: String, data: String },
    Text(String),
}

/// Ordered content for a single model call: at most one image part, then exactly one text part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    parts: Vec<ContentPart>,
}

impl PromptPayload {
    pub fn text_only(text: String) -> Self {
        Self {
            parts: vec![ContentPart::Text(text)],
        }
    }

    pub fn with_image(media_type: String, data: String, text: String) -> Self {
        Self {
            parts: vec![
                ContentPart::Image { media_type, data },
                ContentPart::Text(text),
            ],
        }
    }

    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    pub fn has_image(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, ContentPart::Image { .. }))
    }

    /// Approximate size in bytes, for logging.
    pub fn approx_size(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match p {
                ContentPart::Image { data, .. } => data.len(),
                ContentPart::Text(text) => text.len(),
            })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub fiber: f64,
}

/// Public response contract of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionResult {
    pub food_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    pub nutrition: Nutrition,
    /// Model-reported certainty. Usually "high", "medium" or "low", passed through unchecked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
}

impl NutritionResult {
    pub const KNOWN_CONFIDENCE: [&'static str; 3] = ["high", "medium", "low"];

    pub fn has_known_confidence(&self) -> bool {
        match &self.confidence {
            Some(c) => Self::KNOWN_CONFIDENCE.contains(&c.as_str()),
            None => false,
        }
    }
}
