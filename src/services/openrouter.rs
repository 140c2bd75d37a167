use serde::{Deserialize, Serialize};

use super::ai_service::{error_from_response, ModelService};
use crate::error::ModelError;
use crate::models::{ContentPart, PromptPayload};

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout:free";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatContent {
    Text { text: String },
    ImageUrl { image_url: ImageData },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

/// OpenRouter (OpenAI-compatible chat completions) client.
pub struct OpenRouterService {
    api_key: String,
    model: String,
    api_base: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenRouterService {
    pub fn new(api_key: String, model: String, api_base: String, max_tokens: u32) -> Self {
        Self {
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
            max_tokens,
            client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, payload: &PromptPayload) -> ChatRequest {
        let content = payload
            .parts()
            .iter()
            .map(|part| match part {
                ContentPart::Image { media_type, data } => ChatContent::ImageUrl {
                    image_url: ImageData {
                        url: format!("data:{};base64,{}", media_type, data),
                    },
                },
                ContentPart::Text(text) => ChatContent::Text { text: text.clone() },
            })
            .collect();

        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait::async_trait]
impl ModelService for OpenRouterService {
    async fn generate(&self, payload: &PromptPayload) -> Result<String, ModelError> {
        let request = self.build_request(payload);

        log::info!("🤖 Sending request to OpenRouter with model: {}", self.model);
        log::debug!(
            "📤 Prompt size: {} bytes (image: {})",
            payload.approx_size(),
            payload.has_image()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", "https://github.com/nutrition-analyzer")
            .header("X-Title", "Nutrition Analyzer")
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::transport(format!("OpenRouter request failed: {}", e)))?;

        log::debug!("📥 OpenRouter response status: {}", response.status());

        if !response.status().is_success() {
            return Err(error_from_response("OpenRouter", response).await);
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            ModelError::transport(format!("Unreadable OpenRouter response: {}", e))
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ModelError::transport("OpenRouter returned no content"))
    }

    fn provider(&self) -> &'static str {
        "openrouter"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
