//! AI Integration Layer
//!
//! Prompt construction, the model API client and response interpretation.

pub mod prompt;
pub mod provider;
pub mod response;

pub use prompt::{AnalysisPrompt, build_callable_prompt, build_prompt};
pub use provider::{
    GeminiProvider, GenerationRequest, LlmProvider, LlmResponse, ModelClient, SharedProvider,
    TokenUsage,
};
pub use response::{StructuredOutcome, decode_improvement, parse_response, strip_code_fences};
