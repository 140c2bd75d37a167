//! Error types for the analysis pipeline and their HTTP mapping.

use thiserror::Error;

pub const MSG_PARSE_FAILED: &str = "Failed to parse nutrition data";
pub const MSG_OVERLOADED: &str = "Service temporarily overloaded. Please try again in a moment.";
pub const MSG_CONFIGURATION: &str = "API configuration error. Please contact support.";
pub const MSG_INVALID_REQUEST: &str = "Invalid request. Please check your input.";
pub const MSG_IMAGE_TOO_LARGE: &str = "Image too large. Please use a smaller image.";
pub const MSG_GENERIC: &str = "Failed to analyze. Please try again.";

/// Failure reported by the model capability.
///
/// `status` is the upstream HTTP status when the provider answered, `None` for transport
/// failures and unreadable envelopes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("model provider error (status {status:?}): {message}")]
pub struct ModelError {
    pub status: Option<u16>,
    pub message: String,
}

impl ModelError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// The model reply could not be turned into a `NutritionResult`.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("No JSON found in response")]
    NoJson,

    #[error("Invalid JSON in response: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Missing {0} in response")]
    MissingField(&'static str),

    #[error("Response does not match the nutrition schema: {0}")]
    InvalidShape(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// The model declined to analyse the input, e.g. the photo shows no food.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Upstream(#[from] ModelError),
}

impl AnalyzeError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            AnalyzeError::Validation(_) | AnalyzeError::Rejected(_) => 400,
            AnalyzeError::Parse(_) => 500,
            AnalyzeError::Upstream(e) => match e.status {
                Some(429) | Some(529) => 429,
                Some(401) | Some(403) => 500,
                Some(400) => 400,
                Some(413) => 413,
                _ => 500,
            },
        }
    }

    /// Message safe to show to the client. Never contains raw model output or upstream text.
    pub fn client_message(&self) -> String {
        match self {
            AnalyzeError::Validation(_) | AnalyzeError::Rejected(_) => self.to_string(),
            AnalyzeError::Parse(_) => MSG_PARSE_FAILED.to_string(),
            AnalyzeError::Upstream(e) => match e.status {
                Some(429) | Some(529) => MSG_OVERLOADED,
                Some(401) | Some(403) => MSG_CONFIGURATION,
                Some(400) => MSG_INVALID_REQUEST,
                Some(413) => MSG_IMAGE_TOO_LARGE,
                _ => MSG_GENERIC,
            }
            .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16) -> AnalyzeError {
        AnalyzeError::Upstream(ModelError::from_status(
            status,
            "{\"error\":{\"message\":\"sk-secret-key rejected\"}}",
        ))
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = AnalyzeError::Validation(vec![
            "Invalid image data format".to_string(),
            "Image too large (max 10MB)".to_string(),
        ]);

        assert_eq!(err.status(), 400);
        assert_eq!(
            err.client_message(),
            "Invalid image data format; Image too large (max 10MB)"
        );
    }

    #[test]
    fn test_rejection_passes_model_reason_through() {
        let err = AnalyzeError::Rejected("Please upload an image of food".to_string());

        assert_eq!(err.status(), 400);
        assert_eq!(err.client_message(), "Please upload an image of food");
    }

    #[test]
    fn test_parse_errors_hide_details() {
        let err = AnalyzeError::from(ParseError::MissingField("nutrition"));

        assert_eq!(err.status(), 500);
        assert_eq!(err.client_message(), MSG_PARSE_FAILED);
        assert_eq!(err.to_string(), "Missing nutrition in response");
    }

    #[test]
    fn test_upstream_status_mapping() {
        assert_eq!(upstream(429).status(), 429);
        assert_eq!(upstream(529).status(), 429);
        assert_eq!(upstream(401).status(), 500);
        assert_eq!(upstream(403).status(), 500);
        assert_eq!(upstream(400).status(), 400);
        assert_eq!(upstream(413).status(), 413);
        assert_eq!(upstream(502).status(), 500);
        assert_eq!(
            AnalyzeError::from(ModelError::transport("connection reset")).status(),
            500
        );
    }

    #[test]
    fn test_upstream_messages_never_leak_provider_text() {
        assert_eq!(upstream(429).client_message(), MSG_OVERLOADED);
        assert_eq!(upstream(401).client_message(), MSG_CONFIGURATION);
        assert_eq!(upstream(400).client_message(), MSG_INVALID_REQUEST);
        assert_eq!(upstream(413).client_message(), MSG_IMAGE_TOO_LARGE);
        assert_eq!(upstream(500).client_message(), MSG_GENERIC);

        for status in [400, 401, 413, 429, 500] {
            assert!(!upstream(status).client_message().contains("sk-secret"));
        }
    }
}
