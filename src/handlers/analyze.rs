use std::sync::Arc;

use crate::error::AnalyzeError;
use crate::handlers::prompt::build_prompt;
use crate::handlers::response_parser::parse_nutrition_response;
use crate::models::{AnalysisRequest, AnalyzeBody, NutritionResult};
use crate::services::ModelService;

/// Runs one analysis: validate, build the prompt, call the model once, parse the reply.
pub struct AnalyzeHandler {
    model: Arc<dyn ModelService>,
}

impl AnalyzeHandler {
    pub fn new(model: Arc<dyn ModelService>) -> Self {
        Self { model }
    }

    pub async fn analyze(&self, body: AnalyzeBody) -> Result<NutritionResult, AnalyzeError> {
        let request = AnalysisRequest::try_from(body).map_err(|e| {
            log::info!("🚫 Rejected invalid request: {}", e);
            e
        })?;

        match &request {
            AnalysisRequest::Image { data, mime_type } => log::info!(
                "📸 Analyzing {} image ({} base64 bytes)",
                mime_type,
                data.len()
            ),
            AnalysisRequest::Text { food_name, amount } => {
                log::info!("🍽️ Analyzing '{}' ({})", food_name, amount)
            }
        }

        let payload = build_prompt(&request);

        let reply = self.model.generate(&payload).await.map_err(|e| {
            log::error!(
                "❌ {} ({}) call failed: {}",
                self.model.provider(),
                self.model.model(),
                e
            );
            AnalyzeError::Upstream(e)
        })?;

        log::debug!("💬 Model reply: {} bytes", reply.len());

        match parse_nutrition_response(&reply) {
            Ok(result) => {
                log::info!(
                    "✅ {} request analyzed: {} ({} kcal)",
                    request.kind(),
                    result.food_name,
                    result.nutrition.calories
                );
                Ok(result)
            }
            Err(AnalyzeError::Rejected(reason)) => {
                log::info!("🙅 Model declined the input: {}", reason);
                Err(AnalyzeError::Rejected(reason))
            }
            Err(e) => {
                log::error!("❌ Parse error: {}", e);
                log::error!("📄 Raw content: {}", reply);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{ModelError, ParseError};
    use crate::models::{ContentPart, PromptPayload};
    use serde_json::json;
    use std::sync::Mutex;

    /// Canned model used by handler and router tests.
    pub(crate) struct FakeModel {
        reply: Result<String, ModelError>,
        pub(crate) calls: Mutex<Vec<PromptPayload>>,
    }

    impl FakeModel {
        pub(crate) fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(status: Option<u16>, message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(ModelError {
                    status,
                    message: message.to_string(),
                }),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl ModelService for FakeModel {
        async fn generate(&self, payload: &PromptPayload) -> Result<String, ModelError> {
            self.calls.lock().unwrap().push(payload.clone());
            self.reply.clone()
        }

        fn provider(&self) -> &'static str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }

    pub(crate) const PANEER_REPLY: &str = "```json\n{\"foodName\":\"Paneer Tikka\",\"nutrition\":{\"calories\":250,\"protein\":12,\"carbohydrates\":8,\"fat\":18,\"fiber\":2},\"confidence\":\"high\"}\n```";

    fn body(value: serde_json::Value) -> AnalyzeBody {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_text_request_end_to_end() {
        let model = FakeModel::replying(PANEER_REPLY);
        let handler = AnalyzeHandler::new(model.clone());

        let result = handler
            .analyze(body(json!({"foodName": "Paneer Tikka", "amount": "6 pieces"})))
            .await
            .unwrap();

        assert_eq!(result.food_name, "Paneer Tikka");
        assert_eq!(result.nutrition.calories, 250.0);
        assert_eq!(model.call_count(), 1);

        let calls = model.calls.lock().unwrap();
        match calls[0].parts() {
            [ContentPart::Text(text)] => assert!(text.contains("quantity: \"6 pieces\"")),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_image_request_sends_image_first() {
        let model = FakeModel::replying(PANEER_REPLY);
        let handler = AnalyzeHandler::new(model.clone());

        handler
            .analyze(body(json!({"image": "aGVsbG8=", "mimeType": "image/jpeg"})))
            .await
            .unwrap();

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            &calls[0].parts()[0],
            ContentPart::Image { media_type, .. } if media_type == "image/jpeg"
        ));
    }

    #[tokio::test]
    async fn test_invalid_request_never_calls_model() {
        let model = FakeModel::replying(PANEER_REPLY);
        let handler = AnalyzeHandler::new(model.clone());

        for invalid in [
            json!({}),
            json!({"amount": "1 cup"}),
            json!({"image": "%%%", "mimeType": "image/png"}),
            json!({"foodName": "x".repeat(201)}),
        ] {
            let err = handler.analyze(body(invalid)).await.unwrap_err();
            assert!(matches!(err, AnalyzeError::Validation(_)));
        }

        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_rejection() {
        let model = FakeModel::replying("{\"error\":\"Please upload an image of food\"}");
        let handler = AnalyzeHandler::new(model);

        let err = handler
            .analyze(body(json!({"image": "aGVsbG8=", "mimeType": "image/png"})))
            .await
            .unwrap_err();

        assert_eq!(err.status(), 400);
        assert_eq!(err.client_message(), "Please upload an image of food");
    }

    #[tokio::test]
    async fn test_unparseable_reply() {
        let model = FakeModel::replying("The dish looks delicious but I am not sure.");
        let handler = AnalyzeHandler::new(model);

        let err = handler
            .analyze(body(json!({"foodName": "Idli"})))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::Parse(ParseError::NoJson)));
        assert_eq!(err.client_message(), "Failed to parse nutrition data");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_mapped() {
        let model = FakeModel::failing(Some(429), "rate_limit_error: slow down");
        let handler = AnalyzeHandler::new(model.clone());

        let err = handler
            .analyze(body(json!({"foodName": "Idli"})))
            .await
            .unwrap_err();

        assert_eq!(err.status(), 429);
        assert!(!err.client_message().contains("rate_limit_error"));
        assert_eq!(model.call_count(), 1);
    }
}
