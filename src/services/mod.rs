pub mod ai_service;
pub mod anthropic; // Anthropic Messages API
pub mod openrouter; // OpenRouter AI service

pub use ai_service::ModelService;
pub use anthropic::AnthropicService;
pub use openrouter::OpenRouterService;
