//! Process configuration, read once at startup.

use std::sync::Arc;
use thiserror::Error;

use crate::services::{anthropic, openrouter, AnthropicService, ModelService, OpenRouterService};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Startup failures. Any of these means the server must not accept traffic.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingCredential(&'static str),

    #[error("Unknown MODEL_PROVIDER '{0}' (expected 'openrouter' or 'anthropic')")]
    UnknownProvider(String),

    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenRouter,
    Anthropic,
}

impl Provider {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openrouter" => Some(Provider::OpenRouter),
            "anthropic" => Some(Provider::Anthropic),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Provider::OpenRouter => "openrouter",
            Provider::Anthropic => "anthropic",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    pub port: u16,
    /// Allowed CORS origin; any origin when unset.
    pub frontend_url: Option<String>,
}

// Keeps the credential out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .field("port", &self.port)
            .field("frontend_url", &self.frontend_url)
            .finish()
    }
}

impl Config {
    /// Reads configuration from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let provider = match get("MODEL_PROVIDER") {
            Some(p) => Provider::from_string(&p).ok_or(ConfigError::UnknownProvider(p))?,
            None => Provider::OpenRouter,
        };

        let (key_var, model_var, base_var, default_model, default_base) = match provider {
            Provider::OpenRouter => (
                "OPENROUTER_API_KEY",
                "OPENROUTER_MODEL",
                "OPENROUTER_API_BASE",
                openrouter::DEFAULT_MODEL,
                openrouter::DEFAULT_API_BASE,
            ),
            Provider::Anthropic => (
                "ANTHROPIC_API_KEY",
                "ANTHROPIC_MODEL",
                "ANTHROPIC_API_BASE",
                anthropic::DEFAULT_MODEL,
                anthropic::DEFAULT_API_BASE,
            ),
        };

        let api_key = get(key_var).ok_or(ConfigError::MissingCredential(key_var))?;

        let max_tokens = match get("MODEL_MAX_TOKENS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "MODEL_MAX_TOKENS",
                    value: v,
                })?,
            None => DEFAULT_MAX_TOKENS,
        };

        let port = match get("PORT") {
            Some(v) => v.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: v,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            provider,
            api_key: api_key.trim().to_string(),
            model: get(model_var).unwrap_or_else(|| default_model.to_string()),
            api_base: get(base_var).unwrap_or_else(|| default_base.to_string()),
            max_tokens,
            port,
            frontend_url: get("FRONTEND_URL").filter(|u| u != "*"),
        })
    }

    /// Builds the model client for the configured provider.
    pub fn build_model_service(&self) -> Arc<dyn ModelService> {
        match self.provider {
            Provider::OpenRouter => Arc::new(OpenRouterService::new(
                self.api_key.clone(),
                self.model.clone(),
                self.api_base.clone(),
                self.max_tokens,
            )),
            Provider::Anthropic => Arc::new(AnthropicService::new(
                self.api_key.clone(),
                self.model.clone(),
                self.api_base.clone(),
                self.max_tokens,
            )),
        }
    }
}
