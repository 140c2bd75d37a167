use crate::error::ModelError;
use crate::models::PromptPayload;

/// A multimodal language model: takes a prompt with an optional image and answers with free text.
#[async_trait::async_trait]
pub trait ModelService: Send + Sync {
    /// Issues exactly one upstream call. No retries.
    async fn generate(&self, payload: &PromptPayload) -> Result<String, ModelError>;

    fn provider(&self) -> &'static str;

    fn model(&self) -> &str;
}

/// Reads a non-2xx provider response into a `ModelError`, keeping the body for the logs.
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> ModelError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());

    log::error!("❌ {} API error ({}): {}", provider, status, body);
    ModelError::from_status(status.as_u16(), body)
}
