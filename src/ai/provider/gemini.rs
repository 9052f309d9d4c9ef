//! Gemini API Provider
//!
//! LLM provider using the Gemini `generateContent` REST endpoint.
//! Returns LlmResponse with token usage metrics from `usageMetadata`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{GenerationRequest, LlmProvider, LlmResponse, ResponseTiming, TokenUsage};
use crate::config::LlmConfig;
use crate::constants::llm::DEFAULT_API_BASE;
use crate::types::{CodeLensError, ErrorCategory, ErrorClassifier, LlmError, Result};

const PROVIDER_NAME: &str = "gemini";
const JSON_MIME_TYPE: &str = "application/json";

/// Gemini API Provider with secure API key handling
pub struct GeminiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CodeLensError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base,
            model: config.model.clone(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
        let response_mime_type = request
            .response_schema
            .as_ref()
            .map(|_| JSON_MIME_TYPE.to_string());

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(request.system_instruction.clone()),
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type,
                response_schema: request.response_schema.clone(),
            },
        }
    }
}

/// Concatenate the text parts of the first candidate
fn response_text(body: &GenerateContentResponse) -> String {
    body.candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse> {
        info!(
            "Generating with Gemini (model: {}, temperature: {:?}, structured: {})",
            self.model,
            request.temperature,
            request.response_schema.is_some()
        );

        let start_time = Instant::now();
        let body = Self::build_request(request);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Gemini API error ({}): {}", status, text),
                PROVIDER_NAME,
            )
            .into());
        }

        let response_body: GenerateContentResponse = response.json().await.map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::ParseError,
                format!("Failed to parse Gemini response: {}", e),
                PROVIDER_NAME,
            )
        })?;

        let llm_response = into_llm_response(&response_body, elapsed);
        debug!(
            "Received Gemini response ({} tokens, {}ms)",
            llm_response.usage.total(),
            llm_response.timing.total_ms
        );

        Ok(llm_response)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn into_llm_response(body: &GenerateContentResponse, elapsed: Duration) -> LlmResponse {
    let usage = body
        .usage_metadata
        .as_ref()
        .map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        })
        .unwrap_or_default();

    LlmResponse {
        text: response_text(body),
        usage,
        timing: ResponseTiming::from_duration(elapsed),
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_request_body() {
        let request = GenerationRequest::new("Explain this", "Be helpful").with_temperature(0.3);
        let body = serde_json::to_value(GeminiProvider::build_request(&request)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Explain this");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be helpful");
        assert!(body["systemInstruction"].get("role").is_none());
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.3).abs() < 1e-6);
        assert!(body["generationConfig"].get("responseMimeType").is_none());
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_structured_request_sets_json_mime_type() {
        let schema = json!({"type": "OBJECT"});
        let request = GenerationRequest::new("p", "s").with_schema(Some(schema.clone()));
        let body = serde_json::to_value(GeminiProvider::build_request(&request)).unwrap();

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"], schema);
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]}}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
        }))
        .unwrap();
        assert_eq!(response_text(&body), "Hello, world");
    }

    #[test]
    fn test_llm_response_carries_usage_and_timing() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 5}
        }))
        .unwrap();
        let response = into_llm_response(&body, Duration::from_millis(250));

        assert_eq!(response.text, "ok");
        assert_eq!(response.usage.total(), 17);
        assert_eq!(response.timing.total_ms, 250);
    }

    #[test]
    fn test_response_text_empty_when_no_candidates() {
        let body: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response_text(&body), "");
    }

    #[test]
    fn test_endpoint_and_redacted_debug() {
        let config = LlmConfig {
            api_base: Some("http://localhost:9000/v1beta/".to_string()),
            ..Default::default()
        };
        let provider = GeminiProvider::new(&config, "secret-key".to_string()).unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(!format!("{:?}", provider).contains("secret-key"));
    }
}
