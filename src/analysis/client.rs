//! Analysis Client
//!
//! One analysis = one model call. The client owns nothing but the
//! [`ModelClient`]; prompt construction and response parsing are delegated.

use tracing::{debug, error, info};

use crate::ai::{ModelClient, build_prompt, parse_response};
use crate::constants::messages;
use crate::types::{AnalysisMode, AnalysisRequest, AnalysisResult, CodeLensError, Result};

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    model: ModelClient,
}

impl AnalysisClient {
    pub fn new(model: ModelClient) -> Self {
        Self { model }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_configured()
    }

    /// Analyze `code` in `mode`.
    ///
    /// Errors: `Validation` for blank code, `NotConfigured` without an API key
    /// (no call is made), `AnalysisFailed` for any provider failure.
    pub async fn analyze(&self, code: &str, mode: AnalysisMode) -> Result<AnalysisResult> {
        let request = AnalysisRequest::new(code, mode)?;
        self.analyze_request(&request).await
    }

    pub async fn analyze_request(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let ModelClient::Configured(provider) = &self.model else {
            return Err(CodeLensError::NotConfigured(
                messages::NOT_CONFIGURED.to_string(),
            ));
        };

        let mode = request.mode();
        let generation = build_prompt(request.code(), mode).into_request();
        debug!(
            "Dispatching {} analysis ({} chars) to {}/{}",
            mode,
            request.code().len(),
            provider.name(),
            provider.model()
        );

        let response = provider.generate(&generation).await.map_err(|e| {
            error!("Model call failed for {} analysis: {}", mode, e);
            CodeLensError::AnalysisFailed(messages::ANALYSIS_FAILED.to_string())
        })?;

        info!(
            "{} analysis completed in {}ms ({} tokens)",
            mode,
            response.timing.total_ms,
            response.usage.total()
        );

        Ok(parse_response(mode, &response.text))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ai::{GenerationRequest, LlmProvider, LlmResponse};
    use crate::types::{ErrorCategory, LlmError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Canned provider that records every request it receives
    pub(crate) struct MockProvider {
        reply: std::result::Result<String, ErrorCategory>,
        pub calls: Arc<AtomicUsize>,
        pub requests: Arc<Mutex<Vec<GenerationRequest>>>,
    }

    impl MockProvider {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn failing(category: ErrorCategory) -> Self {
            Self {
                reply: Err(category),
                ..Self::replying("")
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(LlmResponse::text_only(text.clone())),
                Err(category) => Err(LlmError::new(*category, "mock failure").into()),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    #[tokio::test]
    async fn test_unconfigured_makes_no_call() {
        let client = AnalysisClient::new(ModelClient::Unconfigured);
        let err = client
            .analyze("x()", AnalysisMode::Explain)
            .await
            .unwrap_err();
        assert!(matches!(err, CodeLensError::NotConfigured(_)));
        assert_eq!(err.to_string(), messages::NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_blank_code_rejected_before_call() {
        let mock = MockProvider::replying("unused");
        let calls = mock.calls.clone();
        let client = AnalysisClient::new(ModelClient::with_provider(mock));

        let err = client
            .analyze("  \n ", AnalysisMode::Explain)
            .await
            .unwrap_err();
        assert!(matches!(err, CodeLensError::Validation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_find_bugs_sends_safety_directive() {
        let mock = MockProvider::replying("No bugs found.");
        let calls = mock.calls.clone();
        let requests = mock.requests.clone();
        let client = AnalysisClient::new(ModelClient::with_provider(mock));

        let code = "function add(a,b){return a+b}";
        let result = client.analyze(code, AnalysisMode::FindBugs).await.unwrap();

        assert_eq!(result.markdown, "No bugs found.");
        assert!(result.code.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let sent = requests.lock().unwrap()[0].clone();
        assert!(sent.prompt.contains(code));
        assert!(
            sent.system_instruction
                .ends_with("Focus strictly on correctness and safety.")
        );
        assert_eq!(sent.temperature, Some(0.3));
        assert!(sent.response_schema.is_none());
    }

    #[tokio::test]
    async fn test_improve_requests_schema_and_parses() {
        let mock = MockProvider::replying(
            r#"{"improvedCode":"```js\nconst add = (a, b) => a + b;\n```","explanation":"Arrow fn."}"#,
        );
        let requests = mock.requests.clone();
        let client = AnalysisClient::new(ModelClient::with_provider(mock));

        let result = client
            .analyze("function add(a,b){return a+b}", AnalysisMode::Improve)
            .await
            .unwrap();

        assert_eq!(result.markdown, "Arrow fn.");
        assert_eq!(result.code.as_deref(), Some("const add = (a, b) => a + b;"));
        assert!(requests.lock().unwrap()[0].response_schema.is_some());
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_generic_message() {
        for category in [ErrorCategory::RateLimit, ErrorCategory::Network, ErrorCategory::Auth] {
            let mock = MockProvider::failing(category);
            let calls = mock.calls.clone();
            let client = AnalysisClient::new(ModelClient::with_provider(mock));

            let err = client
                .analyze("x()", AnalysisMode::Explain)
                .await
                .unwrap_err();
            assert!(matches!(err, CodeLensError::AnalysisFailed(_)));
            assert_eq!(err.to_string(), messages::ANALYSIS_FAILED);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }
}
