use serde::{Deserialize, Serialize};

use super::ai_service::{error_from_response, ModelService};
use crate::error::ModelError;
use crate::models::{ContentPart, PromptPayload};

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API client.
pub struct AnthropicService {
    api_key: String,
    model: String,
    api_base: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicService {
    pub fn new(api_key: String, model: String, api_base: String, max_tokens: u32) -> Self {
        Self {
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
            max_tokens,
            client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, payload: &PromptPayload) -> MessagesRequest {
        let content = payload
            .parts()
            .iter()
            .map(|part| match part {
                ContentPart::Image { media_type, data } => ContentBlock::Image {
                    source: ImageSource {
                        source_type: "base64".to_string(),
                        media_type: media_type.clone(),
                        data: data.clone(),
                    },
                },
                ContentPart::Text(text) => ContentBlock::Text { text: text.clone() },
            })
            .collect();

        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content,
            }],
        }
    }
}

#[async_trait::async_trait]
impl ModelService for AnthropicService {
    async fn generate(&self, payload: &PromptPayload) -> Result<String, ModelError> {
        let request = self.build_request(payload);

        log::info!("🤖 Sending request to Anthropic with model: {}", self.model);
        log::debug!(
            "📤 Prompt size: {} bytes (image: {})",
            payload.approx_size(),
            payload.has_image()
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::transport(format!("Anthropic request failed: {}", e)))?;

        log::debug!("📥 Anthropic response status: {}", response.status());

        if !response.status().is_success() {
            return Err(error_from_response("Anthropic", response).await);
        }

        let messages_response: MessagesResponse = response.json().await.map_err(|e| {
            ModelError::transport(format!("Unreadable Anthropic response: {}", e))
        })?;

        messages_response
            .content
            .into_iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ModelError::transport("Anthropic returned no text content"))
    }

    fn provider(&self) -> &'static str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
