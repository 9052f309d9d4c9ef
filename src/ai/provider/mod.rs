//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait for a single text-generation call.
//! Providers return `LlmResponse` with the raw generated text plus usage
//! metrics; interpreting that text is the job of [`crate::ai::response`].

mod gemini;

pub use gemini::GeminiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::types::{CodeLensError, Result};

// =============================================================================
// Generation Request
// =============================================================================

/// One request to the external generation API
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// User prompt text
    pub prompt: String,
    /// System instruction
    pub system_instruction: String,
    /// Sampling temperature; `None` leaves the model default
    pub temperature: Option<f32>,
    /// JSON schema constraining the output (implies a JSON MIME type)
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: system_instruction.into(),
            temperature: None,
            response_schema: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_schema(mut self, schema: Option<Value>) -> Self {
        self.response_schema = schema;
        self
    }
}

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Complete LLM response including text and usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text (empty if the model returned none)
    pub text: String,
    pub usage: TokenUsage,
    pub timing: ResponseTiming,
}

impl LlmResponse {
    /// Create response with text only (usage unknown)
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Text generation backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Issue exactly one generation call
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Shared LLM provider type
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Model Client
// =============================================================================

/// Model API handle, constructed once at startup.
///
/// `Unconfigured` is an explicit state: callers match on it instead of
/// checking for a missing client at each call site.
#[derive(Clone)]
pub enum ModelClient {
    Configured(SharedProvider),
    Unconfigured,
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configured(provider) => f
                .debug_tuple("Configured")
                .field(&format_args!("{}/{}", provider.name(), provider.model()))
                .finish(),
            Self::Unconfigured => f.write_str("Unconfigured"),
        }
    }
}

impl ModelClient {
    /// Build the client from configuration.
    ///
    /// A missing API key yields `Unconfigured`; an unknown provider or a
    /// broken HTTP client is a hard configuration error.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        if config.provider != "gemini" {
            return Err(CodeLensError::Config(format!(
                "Unknown provider: {}. Supported: gemini",
                config.provider
            )));
        }

        match config.resolve_api_key() {
            Some(api_key) => {
                let provider = GeminiProvider::new(config, api_key)?;
                info!(
                    "Model client configured ({}/{})",
                    provider.name(),
                    provider.model()
                );
                Ok(Self::Configured(Arc::new(provider)))
            }
            None => {
                warn!("No model API key configured; analysis is disabled");
                Ok(Self::Unconfigured)
            }
        }
    }

    pub fn with_provider(provider: impl LlmProvider + 'static) -> Self {
        Self::Configured(Arc::new(provider))
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    pub fn provider(&self) -> Option<&SharedProvider> {
        match self {
            Self::Configured(provider) => Some(provider),
            Self::Unconfigured => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new("p", "s")
            .with_temperature(0.3)
            .with_schema(Some(serde_json::json!({"type": "OBJECT"})));
        assert_eq!(request.temperature, Some(0.3));
        assert!(request.response_schema.is_some());
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ModelClient::from_config(&config),
            Err(CodeLensError::Config(_))
        ));
    }

    #[test]
    fn test_configured_with_explicit_key() {
        let config = LlmConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let client = ModelClient::from_config(&config).unwrap();
        assert!(client.is_configured());
        assert_eq!(client.provider().unwrap().model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }
}
